//! Shared test helpers for agent tests.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;
use toolchat_core::error::ProviderError;
use toolchat_core::message::{Message, MessageToolCall};
use toolchat_core::provider::{
    ChunkReceiver, Provider, ProviderRequest, ProviderResponse, StreamChunk, Usage,
};

/// One scripted model turn.
pub enum Turn {
    Respond(ProviderResponse),
    Fail(ProviderError),
}

/// A mock provider that plays back a script of turns.
///
/// Each call to `stream` or `complete` consumes the next turn and records the
/// request. Text is streamed word by word. Panics when the script runs out.
pub struct ScriptedProvider {
    turns: Mutex<Vec<Turn>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(turns: Vec<Turn>) -> Self {
        Self {
            turns: Mutex::new(turns),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// First returns tool calls, then a final answer.
    pub fn tool_then_answer(tool_calls: Vec<MessageToolCall>, answer: &str) -> Self {
        Self::new(vec![
            Turn::Respond(make_tool_call_response(tool_calls, "")),
            Turn::Respond(make_text_response(answer)),
        ])
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_turn(&self, request: ProviderRequest) -> Turn {
        let mut requests = self.requests.lock().unwrap();
        let mut turns = self.turns.lock().unwrap();
        if turns.is_empty() {
            panic!(
                "ScriptedProvider: no more turns (call #{})",
                requests.len() + 1
            );
        }
        requests.push(request);
        turns.remove(0)
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        match self.next_turn(request) {
            Turn::Respond(response) => Ok(response),
            Turn::Fail(e) => Err(e),
        }
    }

    async fn stream(&self, request: ProviderRequest) -> Result<ChunkReceiver, ProviderError> {
        let response = match self.next_turn(request) {
            Turn::Respond(response) => response,
            Turn::Fail(e) => return Err(e),
        };

        let (tx, rx) = tokio::sync::mpsc::channel(64);
        for word in response.message.content.split_inclusive(' ') {
            let _ = tx
                .send(Ok(StreamChunk {
                    content: Some(word.to_string()),
                    ..StreamChunk::default()
                }))
                .await;
        }
        let _ = tx
            .send(Ok(StreamChunk {
                content: None,
                tool_calls: response.message.tool_calls,
                done: true,
                usage: response.usage,
            }))
            .await;
        Ok(rx)
    }
}

fn usage() -> Option<Usage> {
    Some(Usage {
        prompt_tokens: 10,
        completion_tokens: 5,
        total_tokens: 15,
    })
}

/// Create a simple text response (no tool calls).
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: usage(),
        model: "mock-model".into(),
    }
}

/// Create a response with tool calls and optional leading text.
pub fn make_tool_call_response(tool_calls: Vec<MessageToolCall>, text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text).with_tool_calls(tool_calls),
        usage: usage(),
        model: "mock-model".into(),
    }
}

/// Helper to create a tool call with id `call_<id>`.
pub fn make_tool_call(id: &str, name: &str, args: Value) -> MessageToolCall {
    MessageToolCall {
        id: format!("call_{id}"),
        name: name.to_string(),
        arguments: serde_json::to_string(&args).unwrap(),
    }
}
