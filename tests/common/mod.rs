#![allow(dead_code)]

use async_trait::async_trait;
use base64::Engine;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use reel_client::{
    CreateJobRequest, FormView, JobStatus, JobStatusResponse, MediaFile, ReelApi, ReelError,
    Result, StatusPresentation, StatusSink, UploadedImage,
};

/// 1x1 transparent PNG
pub const PNG_B64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg==";

pub fn png(name: &str) -> MediaFile {
    let bytes = base64::engine::general_purpose::STANDARD.decode(PNG_B64).unwrap();
    MediaFile::new(name, "image/png", bytes)
}

pub fn status(raw: &str) -> JobStatusResponse {
    JobStatusResponse {
        status: JobStatus::from(raw),
        status_message: None,
        final_video_url: None,
        error: None,
    }
}

pub fn completed(url: &str) -> JobStatusResponse {
    JobStatusResponse {
        final_video_url: Some(url.to_string()),
        ..status("completed")
    }
}

pub fn failed(error: Option<&str>) -> JobStatusResponse {
    JobStatusResponse {
        error: error.map(str::to_string),
        ..status("failed")
    }
}

/// Fake API answering from a script; once the script runs out every poll
/// reports `pending`.
pub struct ScriptedApi {
    job_id: String,
    create_error: Mutex<Option<ReelError>>,
    statuses: Mutex<VecDeque<Result<JobStatusResponse>>>,
    created: Mutex<Vec<CreateJobRequest>>,
    status_calls: AtomicU32,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self {
            job_id: "job-1".to_string(),
            create_error: Mutex::new(None),
            statuses: Mutex::new(VecDeque::new()),
            created: Mutex::new(Vec::new()),
            status_calls: AtomicU32::new(0),
        }
    }

    pub fn rejecting(self, error: ReelError) -> Self {
        *self.create_error.lock().unwrap() = Some(error);
        self
    }

    pub fn then(self, response: JobStatusResponse) -> Self {
        self.statuses.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn then_error(self, error: ReelError) -> Self {
        self.statuses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn create_requests(&self) -> Vec<CreateJobRequest> {
        self.created.lock().unwrap().clone()
    }

    pub fn status_calls(&self) -> u32 {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReelApi for ScriptedApi {
    async fn create_job(&self, request: &CreateJobRequest) -> Result<String> {
        self.created.lock().unwrap().push(request.clone());
        match self.create_error.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(self.job_id.clone()),
        }
    }

    async fn job_status(&self, _job_id: &str) -> Result<JobStatusResponse> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.statuses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(status("pending")))
    }

    async fn is_available(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Alert(String),
    Notice(String),
    Submitting(bool),
    Previews(Vec<String>),
    Status(JobStatus, StatusPresentation),
    Video(String),
}

/// View that records everything it is asked to show
#[derive(Default)]
pub struct RecordingView {
    events: Mutex<Vec<ViewEvent>>,
}

impl RecordingView {
    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ViewEvent::Alert(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn notices(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ViewEvent::Notice(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn statuses(&self) -> Vec<StatusPresentation> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ViewEvent::Status(_, presentation) => Some(presentation),
                _ => None,
            })
            .collect()
    }

    pub fn last_status(&self) -> Option<StatusPresentation> {
        self.statuses().pop()
    }

    /// Submit control state after the last toggle (false when never toggled)
    pub fn is_submitting(&self) -> bool {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ViewEvent::Submitting(state) => Some(state),
                _ => None,
            })
            .last()
            .unwrap_or(false)
    }

    fn push(&self, event: ViewEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl StatusSink for RecordingView {
    fn on_status(&self, status: &JobStatus, presentation: &StatusPresentation) {
        self.push(ViewEvent::Status(status.clone(), presentation.clone()));
    }
}

impl FormView for RecordingView {
    fn alert(&self, message: &str) {
        self.push(ViewEvent::Alert(message.to_string()));
    }

    fn notice(&self, message: &str) {
        self.push(ViewEvent::Notice(message.to_string()));
    }

    fn set_submitting(&self, submitting: bool) {
        self.push(ViewEvent::Submitting(submitting));
    }

    fn render_previews(&self, images: &[UploadedImage]) {
        self.push(ViewEvent::Previews(
            images.iter().map(|i| i.original_name.clone()).collect(),
        ));
    }

    fn show_video(&self, url: &str) {
        self.push(ViewEvent::Video(url.to_string()));
    }
}
