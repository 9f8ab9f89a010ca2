//! Agent module - assembly and the tool-calling loop.
//!
//! The agent follows a "tools in a loop" pattern:
//! 1. Send the system instruction, the conversation and the tool declarations
//! 2. If the model requests tool calls, execute them and feed the results back
//! 3. Repeat until the model answers with text or the iteration limit is hit

mod agent_loop;

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::config::Settings;
use crate::llm::{GeminiClient, LlmClient, LlmError};
use crate::tools::{Tool, ToolRegistry};

pub use agent_loop::Agent;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("model call failed: {0}")]
    Upstream(#[from] LlmError),

    #[error("model returned neither text nor tool calls")]
    EmptyResponse,

    #[error("max iterations ({0}) reached without a final answer")]
    IterationLimit(usize),
}

/// Final answer of one invocation plus what happened on the way.
#[derive(Debug, Clone, Serialize)]
pub struct AgentReply {
    pub text: String,
    pub events: Vec<AgentEvent>,
}

/// A single entry in the invocation log.
#[derive(Debug, Clone, Serialize)]
pub struct AgentEvent {
    /// Timestamp (RFC 3339)
    pub timestamp: String,

    pub event_type: AgentEventType,

    /// Tool name for tool events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,

    pub content: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentEventType {
    ToolCall,
    ToolResult,
    ToolError,
    Response,
}

/// Compose the agent from settings and a tool list, talking to Gemini.
///
/// Pure construction: no network I/O happens until the first invocation.
pub fn build_agent(settings: &Settings, tools: Vec<Arc<dyn Tool>>) -> Agent {
    let llm = Arc::new(GeminiClient::new(
        settings.gemini_api_key.clone(),
        settings.gemini_base_url.clone(),
    ));
    build_agent_with_client(settings, tools, llm)
}

/// Same as [`build_agent`] with an explicit model client.
pub fn build_agent_with_client(
    settings: &Settings,
    tools: Vec<Arc<dyn Tool>>,
    llm: Arc<dyn LlmClient>,
) -> Agent {
    Agent::new(
        settings.agent_name().to_string(),
        settings.agent_description().to_string(),
        settings.model_id().to_string(),
        settings.system_instruction().to_string(),
        ToolRegistry::from_tools(tools),
        llm,
        settings.agent.max_iterations,
    )
}
