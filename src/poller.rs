//! Bounded status polling for a submitted job

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::api::ReelApi;
use crate::config::PollingConfig;
use crate::error::{ReelError, Result};
use crate::locale::Locale;
use crate::status::{present, JobStatus};
use crate::view::StatusSink;

/// Delay and attempt budget for one poll loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(3000),
            max_attempts: 120,
        }
    }
}

impl From<&PollingConfig> for PollSettings {
    fn from(config: &PollingConfig) -> Self {
        Self {
            interval: config.interval(),
            max_attempts: config.max_attempts,
        }
    }
}

impl PollSettings {
    /// Longest a loop can run, ignoring request latency
    pub fn ceiling(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

/// A job that reached `completed`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOutcome {
    pub job_id: String,
    pub video_url: Option<String>,
    pub attempts: u32,
}

/// Drives status requests for one job until it ends
#[derive(Clone)]
pub struct JobPoller {
    api: Arc<dyn ReelApi>,
    settings: PollSettings,
    locale: Locale,
}

impl JobPoller {
    pub fn new(api: Arc<dyn ReelApi>, settings: PollSettings, locale: Locale) -> Self {
        Self { api, settings, locale }
    }

    pub fn settings(&self) -> PollSettings {
        self.settings
    }

    /// Poll until `completed`, `failed`, the attempt budget runs out, or
    /// `cancel` fires.
    ///
    /// Any failed request ends the loop; there is no retry. Status changes
    /// are not validated, whatever the server reports is projected.
    pub async fn run(
        &self,
        job_id: &str,
        sink: &dyn StatusSink,
        cancel: &CancellationToken,
    ) -> Result<PollOutcome> {
        let max_attempts = self.settings.max_attempts;
        let mut attempts = 0;

        while attempts < max_attempts {
            let response = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Polling for job {} cancelled", job_id);
                    return Err(ReelError::Cancelled);
                }
                result = self.api.job_status(job_id) => result.map_err(|e| {
                    error!("Poll error for job {}: {}", job_id, e);
                    e
                })?,
            };
            attempts += 1;

            debug!(
                "Job {} poll {}/{}: {}",
                job_id, attempts, max_attempts, response.status
            );
            let presentation = present(
                &response.status,
                response.status_message.as_deref(),
                self.locale,
            );
            sink.on_status(&response.status, &presentation);

            match response.status {
                JobStatus::Completed => {
                    info!("🎉 Job {} completed after {} polls", job_id, attempts);
                    return Ok(PollOutcome {
                        job_id: job_id.to_string(),
                        video_url: response.final_video_url,
                        attempts,
                    });
                }
                JobStatus::Failed => {
                    let message = response
                        .error
                        .filter(|e| !e.trim().is_empty())
                        .unwrap_or_else(|| self.locale.strings().job_failed.to_string());
                    error!("❌ Job {} failed: {}", job_id, message);
                    return Err(ReelError::JobFailed(message));
                }
                _ => {}
            }

            if attempts < max_attempts {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        info!("Polling for job {} cancelled", job_id);
                        return Err(ReelError::Cancelled);
                    }
                    _ = tokio::time::sleep(self.settings.interval) => {}
                }
            }
        }

        error!("Job {} did not finish within {} polls", job_id, attempts);
        Err(ReelError::Timeout {
            attempts,
            elapsed: self.settings.ceiling(),
        })
    }
}

/// A poll loop running as its own task, stoppable from outside
pub struct PollTask {
    cancel: CancellationToken,
    handle: JoinHandle<Result<PollOutcome>>,
}

impl PollTask {
    pub fn start(poller: JobPoller, job_id: String, sink: Arc<dyn StatusSink>) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::spawn(async move { poller.run(&job_id, sink.as_ref(), &token).await });
        Self { cancel, handle }
    }

    /// Ask the loop to stop; `join` then yields `ReelError::Cancelled`
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub async fn join(self) -> Result<PollOutcome> {
        self.handle.await?
    }
}
