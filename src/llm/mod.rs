//! LLM client abstraction.
//!
//! The agent loop talks to the model through [`LlmClient`]; the production
//! implementation is [`GeminiClient`], tests plug in scripted clients.

mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request to model API failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("model API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("could not decode model response: {0}")]
    Decode(String),

    #[error("model returned no candidates{}", .0.as_deref().map(|r| format!(" (blocked: {})", r)).unwrap_or_default())]
    EmptyResponse(Option<String>),
}

/// Conversation role of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// A function call requested by the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Call id, echoed on the matching [`FunctionResponse`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    #[serde(default)]
    pub args: Value,

    /// Opaque signature attached to the part carrying this call. It lives
    /// next to `functionCall` on the wire and must be replayed unchanged.
    #[serde(skip)]
    pub thought_signature: Option<String>,
}

/// The result of a function call, sent back to the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    pub response: Value,
}

/// One piece of a turn.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    FunctionCall(FunctionCall),
    FunctionResponse(FunctionResponse),
}

/// One turn of the conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::Text(text.into())],
        }
    }
}

/// Tool declaration advertised to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Everything needed for one model turn.
#[derive(Debug, Clone)]
pub struct GenerateRequest<'a> {
    pub model: &'a str,
    pub system_instruction: &'a str,
    pub contents: &'a [Content],
    pub tools: &'a [FunctionDeclaration],
}

/// The model's reply for one turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelResponse {
    pub parts: Vec<Part>,
    pub finish_reason: Option<String>,
}

impl ModelResponse {
    /// Concatenated text parts, or `None` if the reply has no text.
    pub fn text(&self) -> Option<String> {
        let text: String = self
            .parts
            .iter()
            .filter_map(|p| match p {
                Part::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    pub fn function_calls(&self) -> Vec<FunctionCall> {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::FunctionCall(call) => Some(call.clone()),
                _ => None,
            })
            .collect()
    }

    /// Convert the reply into a history entry.
    pub fn into_content(self) -> Content {
        Content {
            role: Role::Model,
            parts: self.parts,
        }
    }
}

/// A chat model that can be asked for one turn at a time.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate(&self, request: GenerateRequest<'_>) -> Result<ModelResponse, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_joins_text_parts_only() {
        let response = ModelResponse {
            parts: vec![
                Part::Text("Hello ".to_string()),
                Part::FunctionCall(FunctionCall {
                    name: "noop".to_string(),
                    args: json!({}),
                    ..Default::default()
                }),
                Part::Text("world".to_string()),
            ],
            finish_reason: None,
        };
        assert_eq!(response.text().as_deref(), Some("Hello world"));
        assert_eq!(response.function_calls().len(), 1);
    }

    #[test]
    fn whitespace_only_reply_has_no_text() {
        let response = ModelResponse {
            parts: vec![Part::Text("  \n".to_string())],
            finish_reason: Some("STOP".to_string()),
        };
        assert!(response.text().is_none());
        assert!(response.function_calls().is_empty());
    }

    #[test]
    fn empty_response_message_mentions_block_reason() {
        let err = LlmError::EmptyResponse(Some("SAFETY".to_string()));
        assert_eq!(err.to_string(), "model returned no candidates (blocked: SAFETY)");
        assert_eq!(
            LlmError::EmptyResponse(None).to_string(),
            "model returned no candidates"
        );
    }
}
