//! Provider trait — the abstraction over LLM backends.
//!
//! A Provider knows how to send a message history to an LLM and get a
//! response back, either as a complete message or as a stream of deltas, and
//! how to ask for a structured object matching a JSON schema.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::message::{Message, MessageToolCall};

/// Configuration for a provider request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The model to use (e.g., "gpt-5-nano")
    pub model: String,

    /// The conversation messages, system prompt first
    pub messages: Vec<Message>,

    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Available tools the model can call
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,

    /// Whether to stream the response
    #[serde(default)]
    pub stream: bool,
}

/// A tool definition sent to the LLM so it knows what tools it can call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

/// A complete (non-streaming) response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// The generated message
    pub message: Message,

    /// Token usage statistics
    pub usage: Option<Usage>,

    /// Which model actually responded (may differ from requested)
    pub model: String,
}

/// Token usage information.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl Usage {
    /// Sum two usage records (one run spans several model calls).
    pub fn add(self, other: Usage) -> Usage {
        Usage {
            prompt_tokens: self.prompt_tokens + other.prompt_tokens,
            completion_tokens: self.completion_tokens + other.completion_tokens,
            total_tokens: self.total_tokens + other.total_tokens,
        }
    }
}

/// A single chunk in a streaming response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamChunk {
    /// Partial content delta
    #[serde(default)]
    pub content: Option<String>,

    /// Completed tool calls (delivered on the final chunk)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<MessageToolCall>,

    /// Whether this is the final chunk
    #[serde(default)]
    pub done: bool,

    /// Usage info (typically only in the final chunk)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// A request for a structured object instead of free text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectRequest {
    pub model: String,

    /// System instructions for the object generator
    pub system: String,

    /// The user prompt to convert
    pub prompt: String,

    /// Name given to the schema on the wire
    pub schema_name: String,

    /// JSON Schema describing the object, usually from
    /// [`schema_of`](crate::schema::schema_of)
    pub schema: serde_json::Value,
}

/// Receiver side of a provider stream.
pub type ChunkReceiver =
    tokio::sync::mpsc::Receiver<std::result::Result<StreamChunk, ProviderError>>;

/// The core Provider trait.
///
/// The agent loop calls `stream()` and the natural-language query tool calls
/// `generate_object()` without knowing which backend is configured.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "openai").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError>;

    /// Send a request and get a stream of response chunks.
    ///
    /// Default implementation calls `complete()` and wraps the result as a single chunk.
    async fn stream(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ChunkReceiver, ProviderError> {
        let response = self.complete(request).await?;
        let (tx, rx) = tokio::sync::mpsc::channel(1);
        let _ = tx
            .send(Ok(StreamChunk {
                content: Some(response.message.content),
                tool_calls: response.message.tool_calls,
                done: true,
                usage: response.usage,
            }))
            .await;
        Ok(rx)
    }

    /// Generate a JSON object shaped by `request.schema`.
    ///
    /// Callers deserialize the object into their own type; that is where a
    /// mismatch is caught. Default implementation asks for JSON in the system
    /// prompt and parses the completion text.
    async fn generate_object(
        &self,
        request: ObjectRequest,
    ) -> std::result::Result<serde_json::Value, ProviderError> {
        let system = format!(
            "{}\n\nRespond with a single JSON object that matches this JSON Schema, and nothing else:\n{}",
            request.system, request.schema
        );
        let response = self
            .complete(ProviderRequest {
                model: request.model,
                messages: vec![Message::system(system), Message::user(request.prompt)],
                temperature: None,
                max_tokens: None,
                tools: Vec::new(),
                stream: false,
            })
            .await?;
        parse_object(&response.message.content)
    }

    /// Health check — can we reach the provider?
    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(true)
    }
}

/// Parse model text as a JSON object.
///
/// Tolerates a surrounding Markdown code fence.
pub fn parse_object(text: &str) -> std::result::Result<serde_json::Value, ProviderError> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| ProviderError::InvalidObject(format!("not valid JSON: {e}")))?;

    if !value.is_object() {
        return Err(ProviderError::InvalidObject(format!(
            "expected a JSON object, got {value}"
        )));
    }
    Ok(value)
}
