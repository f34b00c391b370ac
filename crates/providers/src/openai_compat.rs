//! OpenAI-compatible provider implementation.
//!
//! Works with OpenAI itself and any endpoint that speaks the
//! `/chat/completions` dialect (Ollama, vLLM, OpenRouter, ...).
//!
//! Supports:
//! - Chat completions (non-streaming and streaming SSE)
//! - Tool use / function calling
//! - Structured objects via `response_format: json_schema`

use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use toolchat_core::error::ProviderError;
use toolchat_core::message::{Message, MessageToolCall, Role};
use toolchat_core::provider::*;
use tracing::{debug, trace, warn};

/// An OpenAI-compatible LLM provider.
pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a new OpenAI-compatible provider.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Create an OpenAI provider (convenience constructor).
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::new("openai", "https://api.openai.com/v1", api_key)
    }

    /// Create an Ollama provider (convenience constructor).
    pub fn ollama(base_url: Option<&str>) -> Self {
        Self::new(
            "ollama",
            base_url.unwrap_or("http://localhost:11434/v1"),
            "ollama", // Ollama doesn't need a real key
        )
    }

    /// Convert our Message types to OpenAI API format.
    fn to_api_messages(messages: &[Message]) -> Vec<ApiMessage> {
        messages
            .iter()
            .map(|m| ApiMessage {
                role: match m.role {
                    Role::User => "user".into(),
                    Role::Assistant => "assistant".into(),
                    Role::System => "system".into(),
                    Role::Tool => "tool".into(),
                },
                // Assistant turns that only call tools carry no content
                content: if m.role == Role::Assistant
                    && m.content.is_empty()
                    && !m.tool_calls.is_empty()
                {
                    None
                } else {
                    Some(m.content.clone())
                },
                tool_calls: if m.tool_calls.is_empty() {
                    None
                } else {
                    Some(
                        m.tool_calls
                            .iter()
                            .map(|tc| ApiToolCall {
                                id: tc.id.clone(),
                                r#type: "function".into(),
                                function: ApiFunction {
                                    name: tc.name.clone(),
                                    arguments: tc.arguments.clone(),
                                },
                            })
                            .collect(),
                    )
                },
                tool_call_id: m.tool_call_id.clone(),
            })
            .collect()
    }

    /// Convert tool definitions to OpenAI API format.
    fn to_api_tools(tools: &[ToolDefinition]) -> Vec<ApiToolDefinition> {
        tools
            .iter()
            .map(|t| ApiToolDefinition {
                r#type: "function".into(),
                function: ApiToolFunction {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.parameters.clone(),
                },
            })
            .collect()
    }

    /// Build the `/chat/completions` request body.
    fn request_body(request: &ProviderRequest, stream: bool) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": request.model,
            "messages": Self::to_api_messages(&request.messages),
            "stream": stream,
        });

        if stream {
            body["stream_options"] = serde_json::json!({ "include_usage": true });
        }

        if let Some(temperature) = request.temperature {
            body["temperature"] = serde_json::json!(temperature);
        }

        if let Some(max_tokens) = request.max_tokens {
            body["max_completion_tokens"] = serde_json::json!(max_tokens);
        }

        if !request.tools.is_empty() {
            body["tools"] = serde_json::json!(Self::to_api_tools(&request.tools));
        }

        body
    }

    /// POST a body to `/chat/completions` and map non-200 statuses to errors.
    async fn post(
        &self,
        body: &serde_json::Value,
        accept_sse: bool,
    ) -> std::result::Result<reqwest::Response, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut builder = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json");
        if accept_sse {
            builder = builder.header("Accept", "text/event-stream");
        }

        let response = builder
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status == 200 {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        let error_body = response.text().await.unwrap_or_default();
        warn!(provider = %self.name, status, body = %error_body, "Provider returned error");
        Err(status_error(status, error_body, retry_after))
    }
}

/// Map an HTTP error status to a provider error.
fn status_error(status: u16, body: String, retry_after: Option<u64>) -> ProviderError {
    match status {
        429 => ProviderError::RateLimited {
            retry_after_secs: retry_after.unwrap_or(5),
        },
        401 | 403 => ProviderError::AuthenticationFailed(
            "Invalid API key or insufficient permissions".into(),
        ),
        _ => ProviderError::ApiError {
            status_code: status,
            message: body,
        },
    }
}

#[async_trait]
impl toolchat_core::Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let body = Self::request_body(&request, false);

        debug!(provider = %self.name, model = %request.model, "Sending completion request");

        let response = self.post(&body, false).await?;
        let api_response: ApiResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        api_response.into_provider_response()
    }

    async fn stream(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ChunkReceiver, ProviderError> {
        let body = Self::request_body(&request, true);

        debug!(provider = %self.name, model = %request.model, "Sending streaming request");

        let response = self.post(&body, true).await?;

        let (tx, rx) = tokio::sync::mpsc::channel(64);
        let provider_name = self.name.clone();

        // Spawn task to read the SSE byte stream and parse chunks
        tokio::spawn(pump_sse(response.bytes_stream(), tx, provider_name));

        Ok(rx)
    }

    async fn generate_object(
        &self,
        request: ObjectRequest,
    ) -> std::result::Result<serde_json::Value, ProviderError> {
        let messages = vec![
            Message::system(request.system.clone()),
            Message::user(request.prompt.clone()),
        ];
        let body = serde_json::json!({
            "model": request.model,
            "messages": Self::to_api_messages(&messages),
            "stream": false,
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": request.schema_name,
                    "schema": request.schema,
                },
            },
        });

        debug!(provider = %self.name, model = %request.model, schema = %request.schema_name, "Sending structured output request");

        let response = self.post(&body, false).await?;
        let api_response: ApiResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            })?;
        let message = api_response.into_provider_response()?.message;

        parse_object(&message.content)
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(response.status().is_success())
    }
}

type ChunkResult = std::result::Result<StreamChunk, ProviderError>;

/// Drive a raw SSE byte stream through [`SseParser`] into `tx`.
///
/// Stops after the terminal chunk, the first error, or when the receiver is
/// dropped. A body that ends before the response completed is reported as
/// [`ProviderError::StreamInterrupted`].
async fn pump_sse<S, B, E>(
    mut byte_stream: S,
    tx: tokio::sync::mpsc::Sender<ChunkResult>,
    provider_name: String,
) where
    S: futures::Stream<Item = std::result::Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let mut parser = SseParser::default();

    while let Some(chunk_result) = byte_stream.next().await {
        let items = match chunk_result {
            Ok(bytes) => parser.feed(bytes.as_ref()),
            Err(e) => vec![Err(ProviderError::StreamInterrupted(e.to_string()))],
        };
        if forward(&tx, items, &provider_name).await {
            return;
        }
    }

    let items = parser.end_of_stream();
    if let Some(Err(e)) = items.last() {
        warn!(provider = %provider_name, error = %e, "Stream ended early");
    }
    forward(&tx, items, &provider_name).await;
}

/// Send parsed items; true once the stream is over for the caller.
async fn forward(
    tx: &tokio::sync::mpsc::Sender<ChunkResult>,
    items: Vec<ChunkResult>,
    provider_name: &str,
) -> bool {
    for item in items {
        let terminal = matches!(&item, Ok(chunk) if chunk.done) || item.is_err();
        if tx.send(item).await.is_err() {
            trace!(provider = %provider_name, "Stream receiver dropped");
            return true;
        }
        if terminal {
            return true;
        }
    }
    false
}

/// Incremental parser for the `/chat/completions` SSE stream.
///
/// Bytes are buffered until a full line is available, so a multibyte
/// character split across network reads is decoded intact. Content deltas
/// are yielded as they arrive. Tool call fragments are accumulated by index
/// and released, in index order, on the final chunk. After a `done` chunk or
/// an error nothing more is yielded.
#[derive(Default)]
struct SseParser {
    buffer: Vec<u8>,
    tool_calls: BTreeMap<u32, ToolCallAccumulator>,
    /// A choice carried a `finish_reason`; the turn is complete even if the
    /// `[DONE]` marker never arrives.
    saw_finish_reason: bool,
    finished: bool,
}

impl SseParser {
    fn feed(&mut self, bytes: &[u8]) -> Vec<ChunkResult> {
        let mut out = Vec::new();
        if self.finished {
            return out;
        }
        self.buffer.extend_from_slice(bytes);

        while let Some(line_end) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=line_end).collect();
            let line = match std::str::from_utf8(&raw) {
                Ok(line) => line,
                Err(e) => {
                    self.finished = true;
                    out.push(Err(ProviderError::StreamInterrupted(format!(
                        "invalid UTF-8 in stream: {e}"
                    ))));
                    return out;
                }
            };
            let line = line.trim_end_matches(['\r', '\n']);

            // Skip empty lines, SSE comments and non-data fields
            let Some(data) = line.strip_prefix("data:") else {
                continue;
            };
            let data = data.trim();

            if data == "[DONE]" {
                out.push(Ok(self.finish()));
                return out;
            }

            let parsed = match serde_json::from_str::<StreamResponse>(data) {
                Ok(parsed) => parsed,
                Err(e) => {
                    trace!(data = %data, error = %e, "Ignoring unparseable SSE chunk");
                    continue;
                }
            };

            if let Some(error) = parsed.error {
                self.finished = true;
                out.push(Err(ProviderError::StreamInterrupted(error.message)));
                return out;
            }

            if let Some(choice) = parsed.choices.into_iter().next() {
                if choice.finish_reason.is_some() {
                    self.saw_finish_reason = true;
                }
                for tc_delta in choice.delta.tool_calls.unwrap_or_default() {
                    let acc = self.tool_calls.entry(tc_delta.index).or_default();
                    if let Some(id) = tc_delta.id {
                        acc.id = id;
                    }
                    if let Some(func) = tc_delta.function {
                        if let Some(name) = func.name {
                            acc.name = name;
                        }
                        if let Some(args) = func.arguments {
                            acc.arguments.push_str(&args);
                        }
                    }
                }

                if let Some(content) = choice.delta.content.filter(|c| !c.is_empty()) {
                    out.push(Ok(StreamChunk {
                        content: Some(content),
                        ..StreamChunk::default()
                    }));
                }
            }

            // Usage arrives in the last chunk when stream_options.include_usage is set
            if let Some(usage) = parsed.usage {
                let mut last = self.finish();
                last.usage = Some(usage.into());
                out.push(Ok(last));
                return out;
            }
        }

        out
    }

    /// The body closed. Flush a trailing unterminated line, then either
    /// complete the turn or report it as interrupted.
    fn end_of_stream(&mut self) -> Vec<ChunkResult> {
        let mut out = Vec::new();
        if !self.finished && !self.buffer.is_empty() {
            out = self.feed(b"\n");
        }
        if self.finished {
            return out;
        }
        if self.saw_finish_reason {
            out.push(Ok(self.finish()));
        } else {
            self.finished = true;
            out.push(Err(ProviderError::StreamInterrupted(
                "connection closed before the response completed".into(),
            )));
        }
        out
    }

    /// Produce the final chunk carrying the accumulated tool calls.
    fn finish(&mut self) -> StreamChunk {
        self.finished = true;
        StreamChunk {
            content: None,
            tool_calls: std::mem::take(&mut self.tool_calls)
                .into_values()
                .map(ToolCallAccumulator::into_tool_call)
                .collect(),
            done: true,
            usage: None,
        }
    }
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ApiToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolCall {
    id: String,
    r#type: String,
    function: ApiFunction,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolDefinition {
    r#type: String,
    function: ApiToolFunction,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    model: String,
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

impl ApiResponse {
    fn into_provider_response(self) -> std::result::Result<ProviderResponse, ProviderError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::ApiError {
                status_code: 200,
                message: "No choices in response".into(),
            })?;

        let tool_calls: Vec<MessageToolCall> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| MessageToolCall {
                id: tc.id,
                name: tc.function.name,
                arguments: tc.function.arguments,
            })
            .collect();

        Ok(ProviderResponse {
            message: Message::assistant(choice.message.content.unwrap_or_default())
                .with_tool_calls(tool_calls),
            usage: self.usage.map(Usage::from),
            model: self.model,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

impl From<ApiUsage> for Usage {
    fn from(u: ApiUsage) -> Self {
        Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }
    }
}

// --- Streaming SSE types ---

/// A single SSE `data: {...}` chunk from a streaming response.
#[derive(Debug, Deserialize)]
struct StreamResponse {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
    #[serde(default)]
    error: Option<StreamError>,
}

#[derive(Debug, Deserialize)]
struct StreamError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<StreamToolCallDelta>>,
}

/// A tool call delta — arrives incrementally across chunks.
#[derive(Debug, Deserialize)]
struct StreamToolCallDelta {
    index: u32,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    function: Option<StreamFunctionDelta>,
}

#[derive(Debug, Deserialize)]
struct StreamFunctionDelta {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
}

/// Accumulates incremental tool call deltas into a complete tool call.
#[derive(Default)]
struct ToolCallAccumulator {
    id: String,
    name: String,
    arguments: String,
}

impl ToolCallAccumulator {
    fn into_tool_call(self) -> MessageToolCall {
        MessageToolCall {
            id: self.id,
            name: self.name,
            arguments: self.arguments,
        }
    }
}
