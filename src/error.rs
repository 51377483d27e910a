//! Error types for the reel client

use std::time::Duration;

use crate::locale::Locale;

/// Result type for reel client operations
pub type Result<T> = std::result::Result<T, ReelError>;

/// Everything that can end a submission or a poll
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Input rejected before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Feature disabled: {0}")]
    FeatureDisabled(&'static str),

    /// Non-2xx response from the API
    #[error("API error {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Request {
        status: u16,
        message: Option<String>,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The server reported the job as failed
    #[error("Job failed: {0}")]
    JobFailed(String),

    #[error("Job timed out after {attempts} polls ({}s)", .elapsed.as_secs())]
    Timeout { attempts: u32, elapsed: Duration },

    #[error("Polling cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A spawned poll or encode task panicked or was aborted
    #[error("Task error: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ReelError {
    /// Text shown in the failed presentation
    pub fn user_message(&self, locale: Locale) -> String {
        let strings = locale.strings();
        match self {
            ReelError::Request { message, .. } => message
                .clone()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| strings.start_failed.to_string()),
            ReelError::JobFailed(message) => message.clone(),
            ReelError::Timeout { elapsed, .. } => strings.timed_out(*elapsed),
            ReelError::Cancelled => strings.cancelled.to_string(),
            ReelError::Validation(message) => message.clone(),
            other => other.to_string(),
        }
    }
}
