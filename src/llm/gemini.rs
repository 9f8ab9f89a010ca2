//! Gemini `generateContent` REST client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{
    Content, FunctionCall, FunctionDeclaration, FunctionResponse, GenerateRequest, LlmClient,
    LlmError, ModelResponse, Part, Role,
};

/// Client for the Gemini API (Google AI Studio flavour).
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, model: &str) -> String {
        let model = model.strip_prefix("models/").unwrap_or(model);
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        )
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(&self, request: GenerateRequest<'_>) -> Result<ModelResponse, LlmError> {
        let body = WireRequest::from_request(&request);
        let url = self.endpoint(request.model);

        tracing::debug!(model = %request.model, turns = request.contents.len(), "Calling Gemini");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<WireErrorEnvelope>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            tracing::warn!(status = status.as_u16(), "Gemini request failed");
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let decoded: WireResponse =
            serde_json::from_str(&text).map_err(|e| LlmError::Decode(e.to_string()))?;
        decoded.into_model_response()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest {
    system_instruction: WireContent,
    contents: Vec<WireContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
}

impl WireRequest {
    fn from_request(request: &GenerateRequest<'_>) -> Self {
        let tools = if request.tools.is_empty() {
            Vec::new()
        } else {
            vec![WireTool {
                function_declarations: request.tools.to_vec(),
            }]
        };

        Self {
            system_instruction: WireContent {
                role: None,
                parts: vec![WirePart::text(request.system_instruction)],
            },
            contents: request.contents.iter().map(WireContent::from).collect(),
            tools,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireTool {
    function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct WireContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<Role>,
    #[serde(default)]
    parts: Vec<WirePart>,
}

impl From<&Content> for WireContent {
    fn from(content: &Content) -> Self {
        Self {
            role: Some(content.role),
            parts: content.parts.iter().map(WirePart::from).collect(),
        }
    }
}

/// Gemini parts are objects with exactly one payload key; unknown keys
/// (thought signatures, inline data) are ignored.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<FunctionResponse>,
    #[serde(default, skip_serializing)]
    thought: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thought_signature: Option<String>,
}

impl WirePart {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Default::default()
        }
    }

    fn into_part(self) -> Option<Part> {
        if self.thought == Some(true) {
            return None;
        }
        if let Some(mut call) = self.function_call {
            call.thought_signature = self.thought_signature;
            return Some(Part::FunctionCall(call));
        }
        if let Some(response) = self.function_response {
            return Some(Part::FunctionResponse(response));
        }
        self.text.map(Part::Text)
    }
}

impl From<&Part> for WirePart {
    fn from(part: &Part) -> Self {
        match part {
            Part::Text(text) => Self::text(text),
            Part::FunctionCall(call) => Self {
                function_call: Some(call.clone()),
                thought_signature: call.thought_signature.clone(),
                ..Default::default()
            },
            Part::FunctionResponse(response) => Self {
                function_response: Some(response.clone()),
                ..Default::default()
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireResponse {
    #[serde(default)]
    candidates: Vec<WireCandidate>,
    #[serde(default)]
    prompt_feedback: Option<WirePromptFeedback>,
}

impl WireResponse {
    fn into_model_response(self) -> Result<ModelResponse, LlmError> {
        let block_reason = self.prompt_feedback.and_then(|f| f.block_reason);
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or(LlmError::EmptyResponse(block_reason))?;

        let parts = candidate
            .content
            .unwrap_or_default()
            .parts
            .into_iter()
            .filter_map(WirePart::into_part)
            .collect();

        Ok(ModelResponse {
            parts,
            finish_reason: candidate.finish_reason,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCandidate {
    #[serde(default)]
    content: Option<WireContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireErrorEnvelope {
    error: WireError,
}

#[derive(Debug, Deserialize)]
struct WireError {
    message: String,
}
