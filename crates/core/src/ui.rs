//! Client-facing message types.
//!
//! A UI message is a list of parts: text fragments and tool invocations.
//! This is the shape the chat endpoint accepts and the shape the client chat
//! state renders. [`convert_to_model_messages`] flattens it into the
//! model-facing [`Message`] history.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::message::{Message, MessageToolCall};

/// Who authored a UI message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiRole {
    User,
    Assistant,
    System,
}

/// Lifecycle of a tool invocation part. Moves forward exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolState {
    Pending,
    OutputAvailable,
}

/// One renderable piece of a UI message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Part {
    Text {
        text: String,
    },
    ToolInvocation {
        tool_name: String,
        tool_call_id: String,
        #[serde(default)]
        input: Value,
        state: ToolState,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        output: Option<Value>,
    },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }
}

/// A chat message as exchanged with the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiMessage {
    pub id: String,
    pub role: UiRole,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl UiMessage {
    pub fn new(role: UiRole, parts: Vec<Part>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            parts,
        }
    }

    /// A user message with a single text part.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(UiRole::User, vec![Part::text(text)])
    }

    /// All text parts concatenated in order.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Text { text } => Some(text.as_str()),
                Part::ToolInvocation { .. } => None,
            })
            .collect()
    }
}

/// Flatten UI messages into the model history.
///
/// - user/system: text parts joined into one message
/// - assistant: split into one block per model step. A block is the text
///   and completed tool invocations up to the next text that follows a tool
///   invocation; it becomes an assistant message carrying those tool calls,
///   followed by one `tool` message per call with the serialized output.
///
/// Pending invocations have no output and are dropped, as are blocks left
/// with neither text nor calls.
pub fn convert_to_model_messages(messages: &[UiMessage]) -> Vec<Message> {
    let mut out = Vec::with_capacity(messages.len());

    for ui in messages {
        match ui.role {
            UiRole::User | UiRole::System => {
                let text = ui
                    .parts
                    .iter()
                    .filter_map(|part| match part {
                        Part::Text { text } => Some(text.as_str()),
                        Part::ToolInvocation { .. } => None,
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                let mut msg = if ui.role == UiRole::User {
                    Message::user(text)
                } else {
                    Message::system(text)
                };
                msg.id = ui.id.clone();
                out.push(msg);
            }
            UiRole::Assistant => {
                let first = out.len();
                let mut step = StepBlock::default();

                for part in &ui.parts {
                    match part {
                        Part::Text { text } => {
                            if !step.calls.is_empty() {
                                std::mem::take(&mut step).flush_into(&mut out);
                            }
                            step.content.push_str(text);
                        }
                        Part::ToolInvocation {
                            tool_name,
                            tool_call_id,
                            input,
                            state: ToolState::OutputAvailable,
                            output,
                        } => {
                            step.calls.push(MessageToolCall {
                                id: tool_call_id.clone(),
                                name: tool_name.clone(),
                                arguments: input.to_string(),
                            });
                            let output = output.clone().unwrap_or(Value::Null);
                            step.results
                                .push(Message::tool_result(tool_call_id, output.to_string()));
                        }
                        Part::ToolInvocation {
                            state: ToolState::Pending,
                            ..
                        } => {}
                    }
                }
                step.flush_into(&mut out);

                if let Some(msg) = out.get_mut(first) {
                    msg.id = ui.id.clone();
                }
            }
        }
    }

    out
}

/// One model step of an assistant message: its text, the calls it made,
/// and their results.
#[derive(Default)]
struct StepBlock {
    content: String,
    calls: Vec<MessageToolCall>,
    results: Vec<Message>,
}

impl StepBlock {
    fn flush_into(self, out: &mut Vec<Message>) {
        if self.content.is_empty() && self.calls.is_empty() {
            return;
        }
        out.push(Message::assistant(self.content).with_tool_calls(self.calls));
        out.extend(self.results);
    }
}
