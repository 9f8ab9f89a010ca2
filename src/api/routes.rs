//! HTTP route table and handlers.

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, Method},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use super::docs;
use super::error::ApiError;
use super::types::{HealthResponse, RootResponse, RunRequest, RunResponse};
use crate::agent::Agent;
use crate::config::{ConfigError, Settings};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The A2A discovery document, kept as the exact bytes read from disk.
#[derive(Debug, Clone)]
pub struct DiscoveryDocument(Bytes);

impl DiscoveryDocument {
    /// Read the document and check that it is JSON.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        let raw = std::fs::read(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(raw).map_err(|e| {
            ConfigError::InvalidValue(path.display().to_string(), e.to_string())
        })
    }

    pub fn from_bytes(raw: impl Into<Bytes>) -> Result<Self, serde_json::Error> {
        let raw = raw.into();
        serde_json::from_slice::<serde_json::Value>(&raw)?;
        Ok(Self(raw))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Shared state for all handlers. Read-only after startup.
pub struct AppState {
    pub agent: Arc<Agent>,
    pub display_name: String,
    pub discovery: DiscoveryDocument,
}

impl AppState {
    pub fn new(settings: &Settings, agent: Arc<Agent>, discovery: DiscoveryDocument) -> Self {
        Self {
            agent,
            display_name: settings.agent_display_name().to_string(),
            discovery,
        }
    }
}

/// Build the router without binding a socket.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/run", post(run_agent))
        .route("/docs", get(docs::docs_page))
        .route("/openapi.json", get(docs::openapi_spec))
        .route("/.well-known/agent.json", get(agent_card))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind `host:port` and serve until Ctrl-C or SIGTERM.
pub async fn serve(
    settings: &Settings,
    agent: Arc<Agent>,
    discovery: DiscoveryDocument,
) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(settings, agent, discovery));
    let app = router(state);

    let addr = settings.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

/// GET / - agent metadata.
async fn root(State(state): State<Arc<AppState>>) -> Json<RootResponse> {
    Json(RootResponse {
        name: state.agent.name().to_string(),
        display_name: state.display_name.clone(),
        description: state.agent.description().to_string(),
        model: state.agent.model().to_string(),
        status: "running".to_string(),
        version: VERSION.to_string(),
    })
}

/// GET /health - liveness only; never touches the agent.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: VERSION.to_string(),
    })
}

/// GET /.well-known/agent.json - discovery document, byte-for-byte.
async fn agent_card(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        state.discovery.0.clone(),
    )
}

/// POST /run - invoke the agent with one message.
async fn run_agent(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<RunResponse>, ApiError> {
    // Parsed by hand so every malformed body is a 400, never reaching the agent.
    let req: RunRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::Validation(format!("Invalid request body: {}", e)))?;

    if req.streaming {
        return Err(ApiError::Validation(
            "Streaming is not supported by this endpoint".to_string(),
        ));
    }

    if req.app_name != state.agent.name() {
        return Err(ApiError::NotFound(format!("Unknown app: {}", req.app_name)));
    }

    let message = req.new_message.text().ok_or_else(|| {
        ApiError::Validation("newMessage must contain at least one non-empty text part".to_string())
    })?;

    let invocation_id = Uuid::new_v4();
    info!(
        %invocation_id,
        user_id = %req.user_id,
        session_id = %req.session_id,
        "Running agent"
    );

    let reply = state.agent.run(&message).await?;

    info!(%invocation_id, events = reply.events.len(), "Agent finished");

    Ok(Json(RunResponse {
        app_name: req.app_name,
        user_id: req.user_id,
        session_id: req.session_id,
        invocation_id,
        author: state.agent.name().to_string(),
        reply: reply.text,
        events: reply.events,
    }))
}
