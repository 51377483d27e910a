mod common;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

use common::{png, RecordingView};
use reel_client::config::ApiConfig;
use reel_client::{
    ApiProfile, ConfigBuilder, FormController, FormInput, HttpReelApi, JobStatus, ReelApi,
    ReelError,
};

#[derive(Clone, Default)]
struct MockBackend {
    bodies: Arc<Mutex<Vec<serde_json::Value>>>,
    polls: Arc<Mutex<u32>>,
}

async fn create_job(
    State(backend): State<MockBackend>,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    backend.bodies.lock().unwrap().push(body.clone());
    if body["website"] == "https://blocked.example" {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"message": "Website is blocked"})),
        );
    }
    (
        StatusCode::OK,
        Json(serde_json::json!({"id": "test-job-id", "status": "created"})),
    )
}

async fn legacy_create_job(Json(_body): Json<serde_json::Value>) -> impl IntoResponse {
    Json(serde_json::json!({"jobId": "legacy-job"}))
}

async fn job_status(
    State(backend): State<MockBackend>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match id.as_str() {
        "missing" => return (StatusCode::NOT_FOUND, "Not Found").into_response(),
        "busy" => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({"status": "rendering", "statusMessage": "Queue is busy"})),
            )
                .into_response()
        }
        _ => {}
    }
    let mut polls = backend.polls.lock().unwrap();
    *polls += 1;
    let body = if *polls < 2 {
        serde_json::json!({"status": "rendering", "statusMessage": "Encoding"})
    } else {
        serde_json::json!({"status": "completed", "finalVideoUrl": format!("https://cdn.example/{id}.mp4")})
    };
    (StatusCode::OK, Json(body)).into_response()
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

/// Serve the mock backend on an ephemeral port and return its base URL
async fn spawn_backend(backend: MockBackend) -> String {
    let app = Router::new()
        .route("/health", get(health))
        .route("/api/website", post(create_job))
        .route("/jobs/:id", get(job_status))
        .route("/api/reels/website", post(legacy_create_job))
        .route("/api/jobs/:id", get(job_status))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn api_config(base_url: &str, profile: ApiProfile) -> ApiConfig {
    ApiConfig {
        base_url: format!("{}/", base_url),
        profile,
        request_timeout_seconds: Some(5),
    }
}

#[tokio::test]
async fn test_health_probe() {
    let base_url = spawn_backend(MockBackend::default()).await;
    let api = HttpReelApi::new(&api_config(&base_url, ApiProfile::Website)).unwrap();
    assert!(api.is_available().await);

    // Nothing listens on port 9 of the loopback
    let unreachable = HttpReelApi::new(&api_config("http://127.0.0.1:9", ApiProfile::Website)).unwrap();
    assert!(!unreachable.is_available().await);
}

#[tokio::test]
async fn test_create_job_reads_id_field() {
    let backend = MockBackend::default();
    let base_url = spawn_backend(backend.clone()).await;
    let api = HttpReelApi::new(&api_config(&base_url, ApiProfile::Website)).unwrap();
    assert_eq!(api.base_url(), base_url);

    let request = reel_client::CreateJobRequest {
        website: "https://example.com".to_string(),
        consent: true,
        ..Default::default()
    };
    let job_id = assert_ok!(api.create_job(&request).await);

    assert_eq!(job_id, "test-job-id");
    let bodies = backend.bodies.lock().unwrap();
    assert_eq!(bodies[0], serde_json::json!({"website": "https://example.com", "consent": true}));
}

#[tokio::test]
async fn test_legacy_profile_paths() {
    let base_url = spawn_backend(MockBackend::default()).await;
    let api = HttpReelApi::new(&api_config(&base_url, ApiProfile::Legacy)).unwrap();

    let request = reel_client::CreateJobRequest {
        website: "https://example.com".to_string(),
        consent: true,
        ..Default::default()
    };
    assert_eq!(api.create_job(&request).await.unwrap(), "legacy-job");

    let status = api.job_status("legacy-job").await.unwrap();
    assert_eq!(status.status, JobStatus::Rendering);
    assert_eq!(status.status_message.as_deref(), Some("Encoding"));
}

#[tokio::test]
async fn test_rejected_create_carries_server_message() {
    let base_url = spawn_backend(MockBackend::default()).await;
    let api = HttpReelApi::new(&api_config(&base_url, ApiProfile::Website)).unwrap();

    let request = reel_client::CreateJobRequest {
        website: "https://blocked.example".to_string(),
        consent: true,
        ..Default::default()
    };
    let err = assert_err!(api.create_job(&request).await);

    match err {
        ReelError::Request { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message.as_deref(), Some("Website is blocked"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_status_unreadable_error_body_is_an_error() {
    let base_url = spawn_backend(MockBackend::default()).await;
    let api = HttpReelApi::new(&api_config(&base_url, ApiProfile::Website)).unwrap();

    let err = assert_err!(api.job_status("missing").await);
    match err {
        ReelError::Request { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message.as_deref(), Some("Not Found"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_status_error_reply_with_json_body_is_reported() {
    let base_url = spawn_backend(MockBackend::default()).await;
    let api = HttpReelApi::new(&api_config(&base_url, ApiProfile::Website)).unwrap();

    let job = assert_ok!(api.job_status("busy").await);
    assert_eq!(job.status, JobStatus::Rendering);
    assert_eq!(job.status_message.as_deref(), Some("Queue is busy"));
}

#[tokio::test]
async fn test_end_to_end_submission_with_png() {
    let backend = MockBackend::default();
    let base_url = spawn_backend(backend.clone()).await;
    let config = ConfigBuilder::new()
        .with_base_url(base_url)
        .with_poll_interval(Duration::from_millis(5))
        .build();
    let api: Arc<dyn ReelApi> = Arc::new(HttpReelApi::new(&config.api).unwrap());
    let mut form = FormController::new(api, Arc::new(RecordingView::default()), config);

    form.add_images(vec![png("test-submit.png")]).await.unwrap();
    let outcome = form
        .submit(&FormInput::new("https://example.com").with_consent(true))
        .await
        .unwrap();

    assert_eq!(outcome.job_id, "test-job-id");
    assert_eq!(outcome.video_url.as_deref(), Some("https://cdn.example/test-job-id.mp4"));
    assert_eq!(outcome.attempts, 2);

    let bodies = backend.bodies.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    let media = bodies[0]["media"].as_array().unwrap();
    assert_eq!(media.len(), 1);
    assert!(media[0].as_str().unwrap().contains("data:image/png;base64"));
    assert!(!form.view().is_submitting());
}
