//! HTTP API for the agent.
//!
//! ## Endpoints
//!
//! - `GET /` - Agent metadata and status
//! - `GET /health` - Liveness check
//! - `POST /run` - Invoke the agent with one message
//! - `GET /docs` - API documentation page
//! - `GET /openapi.json` - OpenAPI description
//! - `GET /.well-known/agent.json` - A2A discovery document

mod docs;
mod error;
mod routes;
pub mod types;

pub use error::ApiError;
pub use routes::{router, serve, AppState, DiscoveryDocument};
