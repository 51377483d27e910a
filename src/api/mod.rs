//! Client for the ReelBerlin generation API
//!
//! The [`ReelApi`] trait is the seam the form controller and the poller talk
//! to; [`HttpReelApi`] is the reqwest implementation.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{ApiConfig, ApiProfile};
use crate::error::{ReelError, Result};

pub mod models;

pub use models::{ApiErrorBody, CreateJobRequest, CreateJobResponse, JobStatusResponse};

/// Operations the generation service offers
#[async_trait]
pub trait ReelApi: Send + Sync {
    /// Submit a job and return its id
    async fn create_job(&self, request: &CreateJobRequest) -> Result<String>;

    /// Current status of a job
    async fn job_status(&self, job_id: &str) -> Result<JobStatusResponse>;

    /// Liveness probe; never fails, only reports
    async fn is_available(&self) -> bool;
}

/// reqwest-backed API client
pub struct HttpReelApi {
    base_url: String,
    profile: ApiProfile,
    client: reqwest::Client,
}

impl HttpReelApi {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            profile: config.profile,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl ReelApi for HttpReelApi {
    async fn create_job(&self, request: &CreateJobRequest) -> Result<String> {
        let endpoint = self.endpoint(self.profile.create_path());
        debug!("Submitting job to {}", endpoint);

        let response = self.client.post(&endpoint).json(request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .ok()
                .and_then(ApiErrorBody::into_message);
            warn!("Create job rejected with {}: {}", status, text);
            return Err(ReelError::Request { status, message });
        }

        let body = response.text().await?;
        let created: CreateJobResponse = serde_json::from_str(&body)?;
        info!("🚀 Job started: {}", created.job_id);
        Ok(created.job_id)
    }

    async fn job_status(&self, job_id: &str) -> Result<JobStatusResponse> {
        let endpoint = self.endpoint(&self.profile.status_path(job_id));

        let response = self.client.get(&endpoint).send().await?;

        let code = response.status();
        let body = response.text().await?;

        if code.is_success() {
            return Ok(serde_json::from_str(&body)?);
        }

        // A JSON body is projected like any other status reply; only an
        // unreadable one ends the loop.
        match serde_json::from_str::<JobStatusResponse>(&body) {
            Ok(job) => {
                warn!("Status for job {} returned {}, reporting {}", job_id, code, job.status);
                Ok(job)
            }
            Err(_) => {
                let message = serde_json::from_str::<ApiErrorBody>(&body)
                    .ok()
                    .and_then(ApiErrorBody::into_message)
                    .or_else(|| Some(body.trim().to_string()).filter(|m| !m.is_empty()));
                Err(ReelError::Request {
                    status: code.as_u16(),
                    message,
                })
            }
        }
    }

    async fn is_available(&self) -> bool {
        let endpoint = self.endpoint("/health");

        match self.client.get(&endpoint).send().await {
            Ok(response) if response.status().is_success() => {
                info!("✅ API connected");
                true
            }
            Ok(response) => {
                warn!("⚠️ API health check returned {}", response.status());
                false
            }
            Err(e) => {
                warn!("⚠️ API not reachable at {}: {}", self.base_url, e);
                false
            }
        }
    }
}
