//! Wire models for the generation API

use serde::{Deserialize, Deserializer, Serialize};

use crate::status::JobStatus;

/// Body of the create-job request.
///
/// Optional fields are left out of the JSON entirely when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub website: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub consent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_position: Option<String>,
}

/// Successful create-job response
#[derive(Debug, Clone, Deserialize)]
pub struct CreateJobResponse {
    /// Older deployments answer `jobId`, newer ones `id`
    #[serde(rename = "jobId", alias = "id")]
    pub job_id: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Error body returned with non-2xx responses
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.message.or(self.error)
    }
}

/// Status endpoint response.
///
/// A missing or null `status` reads as an unrecognised status, so it is
/// shown with the generic presentation and polling carries on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusResponse {
    #[serde(default = "unknown_status", deserialize_with = "status_or_unknown")]
    pub status: JobStatus,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub final_video_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

fn unknown_status() -> JobStatus {
    JobStatus::Other(String::new())
}

fn status_or_unknown<'de, D>(deserializer: D) -> Result<JobStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.map(JobStatus::from).unwrap_or_else(unknown_status))
}
