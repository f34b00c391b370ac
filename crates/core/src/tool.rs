//! Tool trait — the abstraction over agent capabilities.
//!
//! Tools are what the model can call during a run: arithmetic, the clock,
//! asset lookups, ledger operations. Every tool returns a tagged JSON object
//! (`{"type": ..., "message": ..., ...}`) that is fed back to the model and
//! streamed to the client as-is.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use tracing::warn;

use crate::error::ToolError;
use crate::message::MessageToolCall;
use crate::provider::ToolDefinition;

/// A request to execute a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique call ID (matches the LLM's tool_call.id)
    pub id: String,

    /// Name of the tool to execute
    pub name: String,

    /// Arguments as a JSON value
    pub arguments: Value,
}

impl From<&MessageToolCall> for ToolCall {
    /// Arguments that are not valid JSON are kept as a raw string so that
    /// validation reports them instead of silently substituting `{}`.
    fn from(call: &MessageToolCall) -> Self {
        let arguments = if call.arguments.trim().is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_str(&call.arguments)
                .unwrap_or_else(|_| Value::String(call.arguments.clone()))
        };
        Self {
            id: call.id.clone(),
            name: call.name.clone(),
            arguments,
        }
    }
}

/// The result of a tool call, attributed to its originating call id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// The call ID this result is for
    pub call_id: String,

    /// The tool that was called
    pub tool_name: String,

    /// False when the output is an error payload
    pub success: bool,

    /// The tagged output object
    pub output: Value,
}

/// Build the `{type: "error", message, error}` payload used for every
/// failure that is reported back to the model.
pub fn error_payload(message: impl Into<String>, error: impl Into<String>) -> Value {
    json!({
        "type": "error",
        "message": message.into(),
        "error": error.into(),
    })
}

/// The core Tool trait.
///
/// Implementations describe their arguments with a typed input struct:
/// [`parameters_schema`](Tool::parameters_schema) returns
/// [`schema_of`](crate::schema::schema_of) for it, and `execute` starts with
/// [`parse_input`](crate::schema::parse_input) so that the body never runs on
/// arguments that do not fit.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "calculator").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the LLM).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with the model's raw arguments.
    async fn execute(&self, input: Value) -> std::result::Result<Value, ToolError>;

    /// Convert this tool into a ToolDefinition for sending to the LLM.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A registry of available tools.
///
/// The agent loop uses this to:
/// 1. Get tool definitions to send to the LLM
/// 2. Validate and execute tool calls when the LLM requests them
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a tool.
    ///
    /// Fails if the name is already taken or the parameters schema does not
    /// describe an object.
    pub fn register(&mut self, tool: Box<dyn Tool>) -> std::result::Result<(), ToolError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(ToolError::Duplicate(name));
        }
        let schema = tool.parameters_schema();
        if schema.get("type").and_then(Value::as_str) != Some("object") {
            return Err(ToolError::InvalidSchema {
                tool_name: name,
                reason: "parameters must be a JSON Schema with type \"object\"".into(),
            });
        }
        self.order.push(name.clone());
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Get all tool definitions in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|t| t.to_definition())
            .collect()
    }

    /// Look up the call's tool and execute it.
    ///
    /// Errors are returned as-is; see [`invoke`](Self::invoke) for the
    /// variant that folds them into an error payload.
    pub async fn execute(&self, call: &ToolCall) -> std::result::Result<Value, ToolError> {
        let tool = self
            .tools
            .get(&call.name)
            .ok_or_else(|| ToolError::NotFound(call.name.clone()))?;
        tool.execute(call.arguments.clone()).await
    }

    /// Execute a tool call and always produce a result.
    ///
    /// Unknown tools, schema violations and execution failures become
    /// `{type: "error"}` outputs; the tool body never runs on invalid input.
    pub async fn invoke(&self, call: &ToolCall) -> ToolResult {
        let output = match self.execute(call).await {
            Ok(output) => output,
            Err(e) => {
                warn!(tool = %call.name, call_id = %call.id, error = %e, "Tool call failed");
                let message = match &e {
                    ToolError::NotFound(name) => format!("Unknown tool: {name}"),
                    ToolError::InvalidArguments { tool_name, .. } => {
                        format!("Invalid arguments for {tool_name}")
                    }
                    _ => format!("{} failed", call.name),
                };
                error_payload(message, e.to_string())
            }
        };

        ToolResult {
            call_id: call.id.clone(),
            tool_name: call.name.clone(),
            success: output.get("type").and_then(Value::as_str) != Some("error"),
            output,
        }
    }

    /// List all registered tool names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
