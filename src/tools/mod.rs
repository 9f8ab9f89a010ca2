//! Tool system for the agent.
//!
//! Tools are typed functions the model may call. Each tool declares a JSON
//! schema for its arguments; the model reads the tool description and the
//! per-field descriptions to decide when and how to call it.

pub mod schema;
mod travel;

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use schemars::gen::SchemaSettings;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::llm::FunctionDeclaration;

pub use travel::{confirm_travel_plan, process_user_request};

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("invalid arguments for {tool}: {message}")]
    Validation { tool: String, message: String },

    #[error("{tool} failed: {message}")]
    Execution { tool: String, message: String },

    #[error("unknown tool: {0}")]
    NotFound(String),

    #[error("could not serialize output of {tool}: {message}")]
    Serialization { tool: String, message: String },
}

/// Trait for implementing tools.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool name.
    fn name(&self) -> &str;

    /// Get the tool description.
    fn description(&self) -> &str;

    /// Get the JSON schema for the tool parameters.
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with the given arguments.
    async fn execute(&self, args: Value) -> Result<Value, ToolError>;

    /// Declaration advertised to the model.
    fn declaration(&self) -> FunctionDeclaration {
        FunctionDeclaration {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A tool backed by a plain function from a typed input to a typed output.
///
/// Arguments are deserialized into `I` before the body runs; a mismatch is
/// reported as [`ToolError::Validation`] and the body is never called.
pub struct FunctionTool<I, O, F> {
    name: String,
    description: String,
    schema: Value,
    func: F,
    _types: PhantomData<fn(I) -> O>,
}

impl<I, O, F, E> FunctionTool<I, O, F>
where
    I: DeserializeOwned + JsonSchema,
    O: Serialize,
    F: Fn(I) -> Result<O, E> + Send + Sync,
    E: fmt::Display,
{
    pub fn new(name: impl Into<String>, description: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            schema: parameters_schema_for::<I>(),
            func,
            _types: PhantomData,
        }
    }
}

#[async_trait]
impl<I, O, F, E> Tool for FunctionTool<I, O, F>
where
    I: DeserializeOwned + JsonSchema + Send,
    O: Serialize + Send,
    F: Fn(I) -> Result<O, E> + Send + Sync,
    E: fmt::Display,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> Value {
        self.schema.clone()
    }

    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        // Models omit `args` entirely for tools without required fields.
        let args = if args.is_null() {
            Value::Object(Default::default())
        } else {
            args
        };

        let input: I = serde_json::from_value(args).map_err(|e| ToolError::Validation {
            tool: self.name.clone(),
            message: e.to_string(),
        })?;

        let output = (self.func)(input).map_err(|e| ToolError::Execution {
            tool: self.name.clone(),
            message: e.to_string(),
        })?;

        serde_json::to_value(output).map_err(|e| ToolError::Serialization {
            tool: self.name.clone(),
            message: e.to_string(),
        })
    }
}

/// JSON schema for `T` in the OpenAPI subset accepted by Gemini function
/// declarations: subschemas inlined, optional fields marked `nullable`.
pub fn parameters_schema_for<T: JsonSchema>() -> Value {
    let generator = SchemaSettings::openapi3()
        .with(|s| {
            s.inline_subschemas = true;
            s.meta_schema = None;
        })
        .into_generator();
    let root = generator.into_root_schema_for::<T>();

    let mut schema = serde_json::to_value(root.schema).unwrap_or_else(|_| serde_json::json!({}));
    if let Some(obj) = schema.as_object_mut() {
        obj.remove("title");
        obj.remove("$schema");
        obj.remove("definitions");
    }
    schema
}

/// Registry of available tools, in registration order.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

/// Information about a tool for display purposes.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a list of tools.
    pub fn from_tools(tools: Vec<Arc<dyn Tool>>) -> Self {
        let mut registry = Self::new();
        for tool in tools {
            registry.register(tool);
        }
        registry
    }

    /// Register a tool. A tool with the same name replaces the earlier one.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if let Some(&pos) = self.index.get(&name) {
            tracing::warn!(tool = %name, "Replacing previously registered tool");
            self.tools[pos] = tool;
        } else {
            self.index.insert(name, self.tools.len());
            self.tools.push(tool);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.index.get(name).map(|&pos| &self.tools[pos])
    }

    /// List all available tools.
    pub fn list_tools(&self) -> Vec<ToolInfo> {
        self.tools
            .iter()
            .map(|t| ToolInfo {
                name: t.name().to_string(),
                description: t.description().to_string(),
            })
            .collect()
    }

    /// Declarations for every registered tool, in registration order.
    pub fn declarations(&self) -> Vec<FunctionDeclaration> {
        self.tools.iter().map(|t| t.declaration()).collect()
    }

    /// Execute a tool by name.
    pub async fn execute(&self, name: &str, args: Value) -> Result<Value, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        tool.execute(args).await
    }
}

/// The tools the shipped agent registers.
pub fn default_tools() -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(FunctionTool::new(
            "process_user_request",
            "Check which details of the user's travel request are known (destination, dates, \
             budget, preferences) and which are still missing, so you can ask clarifying questions.",
            process_user_request,
        )) as Arc<dyn Tool>,
        Arc::new(FunctionTool::new(
            "confirm_travel_plan",
            "Interpret the user's reply to a proposed itinerary: whether they confirmed it, \
             declined it, or the answer was unclear and needs a yes/no follow-up.",
            confirm_travel_plan,
        )) as Arc<dyn Tool>,
    ]
}
