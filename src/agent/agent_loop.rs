//! Core agent loop implementation.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::llm::{
    Content, FunctionCall, FunctionResponse, GenerateRequest, LlmClient, Part, Role,
};
use crate::tools::{ToolInfo, ToolRegistry};

use super::{AgentError, AgentEvent, AgentEventType, AgentReply};

/// Where the loop is between model turns.
enum LoopState {
    AwaitingModel,
    InvokingTool(Vec<FunctionCall>),
    AwaitingToolResult(Vec<FunctionResponse>),
    Responding(String),
}

/// The assembled agent. Immutable after construction; share it as `Arc<Agent>`.
pub struct Agent {
    name: String,
    description: String,
    model: String,
    instruction: String,
    tools: ToolRegistry,
    llm: Arc<dyn LlmClient>,
    max_iterations: usize,
}

impl Agent {
    pub(crate) fn new(
        name: String,
        description: String,
        model: String,
        instruction: String,
        tools: ToolRegistry,
        llm: Arc<dyn LlmClient>,
        max_iterations: usize,
    ) -> Self {
        Self {
            name,
            description,
            model,
            instruction,
            tools,
            llm,
            max_iterations,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn tools(&self) -> Vec<ToolInfo> {
        self.tools.list_tools()
    }

    /// Answer one user message, calling tools as the model requests.
    pub async fn run(&self, message: &str) -> Result<AgentReply, AgentError> {
        let mut history = Vec::new();
        self.run_in(&mut history, message).await
    }

    /// Answer `message` on top of an existing conversation.
    ///
    /// `contents` is extended with every turn, including partial ones when
    /// the invocation fails.
    pub async fn run_in(
        &self,
        contents: &mut Vec<Content>,
        message: &str,
    ) -> Result<AgentReply, AgentError> {
        let declarations = self.tools.declarations();
        contents.push(Content::user_text(message));
        let mut events = Vec::new();
        let mut model_turns = 0;
        let mut state = LoopState::AwaitingModel;

        loop {
            state = match state {
                LoopState::AwaitingModel => {
                    if model_turns == self.max_iterations {
                        return Err(AgentError::IterationLimit(self.max_iterations));
                    }
                    model_turns += 1;
                    tracing::debug!(agent = %self.name, turn = model_turns, "Agent iteration");

                    let response = self
                        .llm
                        .generate(GenerateRequest {
                            model: &self.model,
                            system_instruction: &self.instruction,
                            contents: contents.as_slice(),
                            tools: &declarations,
                        })
                        .await?;

                    let calls = response.function_calls();
                    let text = response.text();
                    contents.push(response.into_content());

                    if !calls.is_empty() {
                        LoopState::InvokingTool(calls)
                    } else if let Some(text) = text {
                        LoopState::Responding(text)
                    } else {
                        return Err(AgentError::EmptyResponse);
                    }
                }

                LoopState::InvokingTool(calls) => {
                    let mut results = Vec::with_capacity(calls.len());
                    for call in calls {
                        events.push(event(
                            AgentEventType::ToolCall,
                            Some(&call.name),
                            call.args.clone(),
                        ));

                        let response = match self.tools.execute(&call.name, call.args).await {
                            Ok(output) => {
                                events.push(event(
                                    AgentEventType::ToolResult,
                                    Some(&call.name),
                                    output.clone(),
                                ));
                                wrap_output(output)
                            }
                            Err(e) => {
                                tracing::warn!(tool = %call.name, error = %e, "Tool call failed");
                                events.push(event(
                                    AgentEventType::ToolError,
                                    Some(&call.name),
                                    Value::String(e.to_string()),
                                ));
                                json!({ "error": e.to_string() })
                            }
                        };

                        results.push(FunctionResponse {
                            id: call.id,
                            name: call.name,
                            response,
                        });
                    }
                    LoopState::AwaitingToolResult(results)
                }

                LoopState::AwaitingToolResult(results) => {
                    contents.push(Content {
                        role: Role::User,
                        parts: results.into_iter().map(Part::FunctionResponse).collect(),
                    });
                    LoopState::AwaitingModel
                }

                LoopState::Responding(text) => {
                    events.push(event(
                        AgentEventType::Response,
                        None,
                        Value::String(text.clone()),
                    ));
                    return Ok(AgentReply { text, events });
                }
            };
        }
    }
}

/// Gemini requires the function response to be a JSON object.
fn wrap_output(output: Value) -> Value {
    match output {
        Value::Object(_) => output,
        other => json!({ "result": other }),
    }
}

fn event(event_type: AgentEventType, tool: Option<&str>, content: Value) -> AgentEvent {
    AgentEvent {
        timestamp: chrono::Utc::now().to_rfc3339(),
        event_type,
        tool: tool.map(str::to_string),
        content,
    }
}
