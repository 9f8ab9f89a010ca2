//! API request and response types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agent::AgentEvent;

/// Request to invoke the agent (`POST /run`).
///
/// Field names follow the ADK run request (camelCase); snake_case is
/// accepted too.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    /// Must match the agent name
    #[serde(alias = "app_name")]
    pub app_name: String,

    #[serde(alias = "user_id")]
    pub user_id: String,

    /// Echoed back; conversations are not persisted between requests
    #[serde(alias = "session_id")]
    pub session_id: String,

    #[serde(alias = "new_message")]
    pub new_message: NewMessage,

    /// Streaming replies are not supported; `true` is rejected
    #[serde(default)]
    pub streaming: bool,
}

/// The user's message.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMessage {
    #[serde(default)]
    pub role: Option<String>,

    pub parts: Vec<MessagePart>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessagePart {
    #[serde(default)]
    pub text: Option<String>,
}

impl NewMessage {
    /// Joined non-empty text parts, or `None` if there are none.
    pub fn text(&self) -> Option<String> {
        let texts: Vec<&str> = self
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .filter(|t| !t.trim().is_empty())
            .collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.join("\n"))
        }
    }
}

/// Response to a successful `POST /run`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResponse {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,

    /// Unique identifier of this invocation
    pub invocation_id: Uuid,

    /// Agent that produced the reply
    pub author: String,

    /// Final text answer
    pub reply: String,

    /// Tool calls, tool results and the final response, in order
    pub events: Vec<AgentEvent>,
}

/// Metadata served at `GET /`.
#[derive(Debug, Clone, Serialize)]
pub struct RootResponse {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub model: String,
    pub status: String,
    pub version: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

/// Error payload returned by every failing route.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub r#type: String,
}
