//! Router-level tests: requests go through the full axum stack without a socket.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use agent_starter::api::{router, AppState, DiscoveryDocument};
use agent_starter::build_agent_with_client;
use agent_starter::config::{AgentSettings, PromptSettings, Settings};
use agent_starter::llm::{GenerateRequest, LlmClient, LlmError, ModelResponse, Part};
use agent_starter::tools::default_tools;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

const CARD: &str = "{\n  \"name\": \"travel_agent\",\n  \"url\": \"http://localhost:8080/run\"\n}\n";

/// Answers every call the same way and counts how often it was asked.
struct FixedLlm {
    reply: fn() -> Result<ModelResponse, LlmError>,
    calls: AtomicUsize,
    tools_seen: AtomicUsize,
}

#[async_trait]
impl LlmClient for FixedLlm {
    async fn generate(&self, request: GenerateRequest<'_>) -> Result<ModelResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.tools_seen.store(request.tools.len(), Ordering::SeqCst);
        (self.reply)()
    }
}

fn greeting() -> Result<ModelResponse, LlmError> {
    Ok(ModelResponse {
        parts: vec![Part::Text("Where would you like to go?".to_string())],
        finish_reason: Some("STOP".to_string()),
    })
}

fn overloaded() -> Result<ModelResponse, LlmError> {
    Err(LlmError::Api {
        status: 503,
        message: "model overloaded".to_string(),
    })
}

fn settings() -> Settings {
    Settings::new(
        "test-key".to_string(),
        AgentSettings {
            name: "travel_agent".to_string(),
            display_name: "Travel Planner".to_string(),
            description: "Plans trips".to_string(),
            model: "gemini-1.5-flash".to_string(),
            max_iterations: 4,
        },
        PromptSettings {
            system_instruction: "You are a travel agent.".to_string(),
        },
    )
}

fn app(
    reply: fn() -> Result<ModelResponse, LlmError>,
    with_tools: bool,
) -> (Router, Arc<FixedLlm>) {
    let llm = Arc::new(FixedLlm {
        reply,
        calls: AtomicUsize::new(0),
        tools_seen: AtomicUsize::new(0),
    });
    let settings = settings();
    let tools = if with_tools { default_tools() } else { Vec::new() };
    let agent = build_agent_with_client(&settings, tools, llm.clone());
    let discovery = DiscoveryDocument::from_bytes(CARD).expect("card");
    let state = Arc::new(AppState::new(&settings, Arc::new(agent), discovery));
    (router(state), llm)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>, Option<String>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec(), content_type)
}

async fn post_run(app: Router, body: impl Into<Body>) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/run")
                .header(header::CONTENT_TYPE, "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

fn run_body(app_name: &str, text: &str) -> String {
    json!({
        "appName": app_name,
        "userId": "u1",
        "sessionId": "s1",
        "newMessage": {"role": "user", "parts": [{"text": text}]}
    })
    .to_string()
}

#[tokio::test]
async fn health_does_not_touch_the_model() {
    let (app, llm) = app(overloaded, true);
    let (status, body, _) = get(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn root_reports_agent_metadata() {
    let (app, _) = app(greeting, true);
    let (status, body, _) = get(app, "/").await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["name"], "travel_agent");
    assert_eq!(body["display_name"], "Travel Planner");
    assert_eq!(body["model"], "gemini-1.5-flash");
    assert_eq!(body["status"], "running");
}

#[tokio::test]
async fn discovery_document_is_served_verbatim() {
    let (app, _) = app(greeting, true);
    let (status, body, content_type) = get(app, "/.well-known/agent.json").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, CARD.as_bytes());
    assert_eq!(content_type.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn run_returns_the_agent_reply() {
    let (app, llm) = app(greeting, true);
    let (status, body) = post_run(app, run_body("travel_agent", "Plan a trip")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "Where would you like to go?");
    assert_eq!(body["appName"], "travel_agent");
    assert_eq!(body["sessionId"], "s1");
    assert!(body["invocationId"].as_str().is_some());
    assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    assert_eq!(llm.tools_seen.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn run_works_with_no_tools() {
    let (app, llm) = app(greeting, false);
    let (status, _) = post_run(app, run_body("travel_agent", "Hi")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(llm.tools_seen.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_body_is_rejected_before_the_agent_runs() {
    let (app, llm) = app(greeting, true);
    let (status, body) = post_run(app, "{}").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "validation_error");
    assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let (app, llm) = app(greeting, true);
    let (status, _) = post_run(app, "{not json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn blank_message_is_rejected() {
    let (app, llm) = app(greeting, true);
    let (status, _) = post_run(app, run_body("travel_agent", "   ")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn streaming_requests_are_rejected() {
    let (app, _) = app(greeting, true);
    let mut body: Value = serde_json::from_str(&run_body("travel_agent", "Hi")).unwrap();
    body["streaming"] = json!(true);
    let (status, _) = post_run(app, body.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_app_is_not_found() {
    let (app, llm) = app(greeting, true);
    let (status, body) = post_run(app, run_body("other_agent", "Hi")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["type"], "not_found");
    assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn upstream_failure_is_a_bad_gateway() {
    let (app, _) = app(overloaded, true);
    let (status, body) = post_run(app, run_body("travel_agent", "Hi")).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["type"], "upstream_error");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("model overloaded"));
}

#[tokio::test]
async fn docs_routes_are_served() {
    let (app, _) = app(greeting, true);
    let (status, body, content_type) = get(app.clone(), "/docs").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/html"));
    assert!(String::from_utf8(body).unwrap().contains("Travel Planner"));

    let (status, body, _) = get(app, "/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    let doc: Value = serde_json::from_slice(&body).unwrap();
    assert!(doc["paths"]["/run"]["post"].is_object());
}
