//! Test utilities for integration tests
#![allow(dead_code)]

use std::sync::{Arc, RwLock};

use anyhow::anyhow;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use futures::stream;
use serde_json::Value;
use tempfile::TempDir;
use tower::util::ServiceExt;

use advisor::api::AppState;
use advisor::api::app;
use advisor::auth::password::low_cost_params;
use advisor::core::AppConfig;
use advisor::core::db::open_and_initialize;
use advisor::openai::{CompletionProvider, DeltaStream, Message};

pub const TEST_SYSTEM_MESSAGE: &str = "You are a cybersecurity expert.";

/// Replies to every prompt with "re: <prompt>" streamed as two deltas.
pub struct EchoProvider;

impl CompletionProvider for EchoProvider {
    fn stream(&self, messages: &[Message]) -> DeltaStream {
        let prompt = messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        Box::pin(stream::iter(vec![Ok("re: ".to_string()), Ok(prompt)]))
    }
}

/// Streams the given deltas then fails with `error` if set.
pub struct ScriptedProvider {
    pub deltas: Vec<String>,
    pub error: Option<String>,
}

impl CompletionProvider for ScriptedProvider {
    fn stream(&self, _messages: &[Message]) -> DeltaStream {
        let mut items: Vec<anyhow::Result<String>> =
            self.deltas.iter().cloned().map(Ok).collect();
        if let Some(error) = &self.error {
            items.push(Err(anyhow!(error.clone())));
        }
        Box::pin(stream::iter(items))
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: Arc<RwLock<AppState>>,
    // Held so the database directory lives as long as the app
    _dir: TempDir,
}

/// Creates a test application router backed by a database in a
/// temporary directory.
pub async fn test_app() -> TestApp {
    test_app_with_provider(Arc::new(EchoProvider)).await
}

pub async fn test_app_with_provider(provider: Arc<dyn CompletionProvider>) -> TestApp {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("db");
    let db_path = db_path.to_str().unwrap();

    let db = open_and_initialize(db_path)
        .await
        .expect("Failed to initialize db");

    let app_config = AppConfig {
        db_path: db_path.to_string(),
        llm_api_hostname: String::from("http://localhost:0"),
        llm_api_key: String::from("test-api-key"),
        llm_model: String::from("llama-3.3-70b-versatile"),
        system_message: String::from(TEST_SYSTEM_MESSAGE),
        require_email_identifier: true,
        session_idle_minutes: 60,
    };
    let mut app_state = AppState::new(db, app_config, provider);
    // Keep password hashing cheap in tests
    app_state.credentials = app_state.credentials.clone().with_params(low_cost_params());

    let state = Arc::new(RwLock::new(app_state));
    TestApp {
        router: app(Arc::clone(&state)),
        state,
        _dir: dir,
    }
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not utf8")
}

pub async fn send(
    app: &TestApp,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, String) {
    let request = Request::builder().uri(uri).method(method);
    let request = match body {
        Some(json) => request
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, body_to_string(response.into_body()).await)
}

pub async fn create_session(app: &TestApp) -> String {
    let (status, body) = send(app, "POST", "/api/session", None).await;
    assert_eq!(status, StatusCode::CREATED);
    let json: Value = serde_json::from_str(&body).unwrap();
    json["session_id"].as_str().unwrap().to_string()
}

/// Create an account and a session that is logged into it.
pub async fn logged_in_session(app: &TestApp, identifier: &str) -> String {
    let session_id = create_session(app).await;
    let (status, _) = send(
        app,
        "POST",
        "/api/auth/signup",
        Some(serde_json::json!({"identifier": identifier, "secret": "s3cret"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        app,
        "POST",
        "/api/auth/login",
        Some(serde_json::json!({
            "session_id": session_id,
            "identifier": identifier,
            "secret": "s3cret"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    session_id
}

/// Parse the JSON payload of every `data:` line in an SSE body.
pub fn sse_events(body: &str) -> Vec<Value> {
    body.lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(str::trim)
        .filter(|data| !data.is_empty())
        .map(|data| serde_json::from_str(data).expect("Invalid event payload"))
        .collect()
}
