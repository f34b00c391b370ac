//! Client chat state.
//!
//! `ChatState` holds the conversation a client is showing and folds
//! [`AgentStreamEvent`]s into it as they arrive. It is an explicit fold:
//! callers own the value and feed it events through [`ChatState::apply`].

use serde_json::Value;
use toolchat_core::message::Message;
use toolchat_core::ui::{Part, ToolState, UiMessage, UiRole, convert_to_model_messages};

use crate::stream_event::AgentStreamEvent;

/// Submission status of the chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatStatus {
    /// Idle; a new message may be submitted
    Ready,
    /// A message was submitted and no response has started yet
    Submitted,
    /// An assistant message is being streamed
    Streaming,
    /// The last run failed; prior messages are kept
    Error,
}

#[derive(Debug, Clone)]
pub struct ChatState {
    messages: Vec<UiMessage>,
    status: ChatStatus,
    /// Id of the assistant message currently growing
    streaming_id: Option<String>,
    error: Option<String>,
}

impl ChatState {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            status: ChatStatus::Ready,
            streaming_id: None,
            error: None,
        }
    }

    pub fn messages(&self) -> &[UiMessage] {
        &self.messages
    }

    pub fn status(&self) -> ChatStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True while `message_id` is still receiving parts.
    pub fn is_streaming(&self, message_id: &str) -> bool {
        self.streaming_id.as_deref() == Some(message_id)
    }

    /// The model history for the next run.
    pub fn model_messages(&self) -> Vec<Message> {
        convert_to_model_messages(&self.messages)
    }

    /// Append a user message and move to `Submitted`.
    ///
    /// Returns `None` without changing anything when the text is blank or a
    /// response is still in flight. Submitting after an error clears it.
    pub fn submit(&mut self, text: &str) -> Option<&UiMessage> {
        let text = text.trim();
        if text.is_empty() || matches!(self.status, ChatStatus::Submitted | ChatStatus::Streaming)
        {
            return None;
        }
        self.messages.push(UiMessage::user(text));
        self.status = ChatStatus::Submitted;
        self.error = None;
        self.messages.last()
    }

    /// Fold one stream event into the state.
    pub fn apply(&mut self, event: &AgentStreamEvent) {
        match event {
            AgentStreamEvent::Start { message_id } => {
                self.messages
                    .push(UiMessage::new(UiRole::Assistant, Vec::new()));
                if let Some(msg) = self.messages.last_mut() {
                    msg.id = message_id.clone();
                }
                self.streaming_id = Some(message_id.clone());
                self.status = ChatStatus::Streaming;
            }

            AgentStreamEvent::StepStart { .. } | AgentStreamEvent::StepFinish { .. } => {}

            AgentStreamEvent::TextDelta { delta } => {
                let Some(parts) = self.streaming_parts() else {
                    return;
                };
                match parts.last_mut() {
                    Some(Part::Text { text }) => text.push_str(delta),
                    _ => parts.push(Part::text(delta.clone())),
                }
            }

            AgentStreamEvent::ToolCall {
                tool_call_id,
                tool_name,
                input,
            } => {
                let Some(parts) = self.streaming_parts() else {
                    return;
                };
                parts.push(Part::ToolInvocation {
                    tool_name: tool_name.clone(),
                    tool_call_id: tool_call_id.clone(),
                    input: input.clone(),
                    state: ToolState::Pending,
                    output: None,
                });
            }

            AgentStreamEvent::ToolResult {
                tool_call_id,
                output,
                ..
            } => {
                let Some(parts) = self.streaming_parts() else {
                    return;
                };
                for part in parts.iter_mut() {
                    if let Part::ToolInvocation {
                        tool_call_id: id,
                        state,
                        output: slot,
                        ..
                    } = part
                        && id == tool_call_id
                        && *state == ToolState::Pending
                    {
                        *state = ToolState::OutputAvailable;
                        *slot = Some(output.clone());
                        break;
                    }
                }
            }

            AgentStreamEvent::Finish { .. } => {
                self.streaming_id = None;
                self.status = ChatStatus::Ready;
            }

            AgentStreamEvent::Error { message } => {
                self.streaming_id = None;
                self.status = ChatStatus::Error;
                self.error = Some(message.clone());
            }
        }
    }

    fn streaming_parts(&mut self) -> Option<&mut Vec<Part>> {
        let id = self.streaming_id.as_deref()?;
        self.messages
            .iter_mut()
            .rev()
            .find(|m| m.id == id)
            .map(|m| &mut m.parts)
    }
}

impl Default for ChatState {
    fn default() -> Self {
        Self::new()
    }
}

/// Human-readable name for a tool: `getCurrentTime` → `Get Current Time`.
pub fn tool_display_name(tool_name: &str) -> String {
    let mut out = String::with_capacity(tool_name.len() + 4);
    let mut at_word_start = true;
    for c in tool_name.chars() {
        if c == '_' || c == '-' {
            if !out.ends_with(' ') && !out.is_empty() {
                out.push(' ');
            }
            at_word_start = true;
            continue;
        }
        if c.is_uppercase() && !out.is_empty() && !out.ends_with(' ') {
            out.push(' ');
            at_word_start = true;
        }
        if at_word_start {
            out.extend(c.to_uppercase());
            at_word_start = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Render a message as plain text for a terminal.
pub fn render_message(message: &UiMessage) -> String {
    let speaker = match message.role {
        UiRole::User => "You",
        UiRole::Assistant => "Assistant",
        UiRole::System => "System",
    };

    let mut lines = vec![format!("{speaker}:")];
    for part in &message.parts {
        match part {
            Part::Text { text } => lines.push(text.clone()),
            Part::ToolInvocation {
                tool_name,
                input,
                state: ToolState::Pending,
                ..
            } => lines.push(format!(
                "[{}] running with {}",
                tool_display_name(tool_name),
                compact(input)
            )),
            Part::ToolInvocation {
                tool_name,
                state: ToolState::OutputAvailable,
                output,
                ..
            } => {
                let output = output.as_ref().unwrap_or(&Value::Null);
                let summary = output
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| compact(output));
                lines.push(format!("[{}] {}", tool_display_name(tool_name), summary));
            }
        }
    }
    lines.join("\n")
}

fn compact(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream_event::FinishReason;
    use serde_json::json;

    fn start(state: &mut ChatState) {
        state.apply(&AgentStreamEvent::Start {
            message_id: "msg-1".into(),
        });
    }

    fn tool_call(id: &str) -> AgentStreamEvent {
        AgentStreamEvent::ToolCall {
            tool_call_id: id.into(),
            tool_name: "calculator".into(),
            input: json!({"operation": "multiply", "a": 7, "b": 6}),
        }
    }

    fn tool_result(id: &str, result: i64) -> AgentStreamEvent {
        AgentStreamEvent::ToolResult {
            tool_call_id: id.into(),
            tool_name: "calculator".into(),
            output: json!({"type": "calculation_complete", "result": result}),
            is_error: false,
        }
    }

    #[test]
    fn submit_moves_to_submitted() {
        let mut state = ChatState::new();
        assert!(state.submit("hello").is_some());
        assert_eq!(state.status(), ChatStatus::Submitted);
        assert_eq!(state.messages()[0].text(), "hello");

        // Busy: a second submit is refused
        assert!(state.submit("again").is_none());
        assert_eq!(state.messages().len(), 1);
    }

    #[test]
    fn blank_submit_is_ignored() {
        let mut state = ChatState::new();
        assert!(state.submit("   ").is_none());
        assert_eq!(state.status(), ChatStatus::Ready);
    }

    #[test]
    fn full_turn_fold() {
        let mut state = ChatState::new();
        state.submit("What is 7 times 6?");
        start(&mut state);
        assert_eq!(state.status(), ChatStatus::Streaming);
        assert!(state.is_streaming("msg-1"));

        state.apply(&AgentStreamEvent::StepStart { step: 1 });
        state.apply(&tool_call("call_1"));
        state.apply(&tool_result("call_1", 42));
        state.apply(&AgentStreamEvent::TextDelta {
            delta: "The answer ".into(),
        });
        state.apply(&AgentStreamEvent::TextDelta { delta: "is 42.".into() });
        state.apply(&AgentStreamEvent::Finish {
            message_id: "msg-1".into(),
            finish_reason: FinishReason::Stop,
            steps: 2,
            tool_calls: 1,
            usage: None,
        });

        assert_eq!(state.status(), ChatStatus::Ready);
        assert!(!state.is_streaming("msg-1"));
        let assistant = &state.messages()[1];
        assert_eq!(assistant.id, "msg-1");
        assert_eq!(assistant.parts.len(), 2);
        match &assistant.parts[0] {
            Part::ToolInvocation { state, output, .. } => {
                assert_eq!(*state, ToolState::OutputAvailable);
                assert_eq!(output.as_ref().unwrap()["result"], 42);
            }
            other => panic!("Expected tool part, got {other:?}"),
        }
        assert_eq!(assistant.text(), "The answer is 42.");
    }

    #[test]
    fn text_after_tool_opens_new_part() {
        let mut state = ChatState::new();
        start(&mut state);
        state.apply(&AgentStreamEvent::TextDelta { delta: "Let me check.".into() });
        state.apply(&tool_call("call_1"));
        state.apply(&AgentStreamEvent::TextDelta { delta: "Done.".into() });

        let parts = &state.messages()[0].parts;
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2], Part::text("Done."));
    }

    #[test]
    fn tool_result_applies_once() {
        let mut state = ChatState::new();
        start(&mut state);
        state.apply(&tool_call("call_1"));
        state.apply(&tool_result("call_1", 42));
        state.apply(&tool_result("call_1", 99));

        match &state.messages()[0].parts[0] {
            Part::ToolInvocation { output, .. } => {
                assert_eq!(output.as_ref().unwrap()["result"], 42)
            }
            other => panic!("Expected tool part, got {other:?}"),
        }
    }

    #[test]
    fn results_match_by_call_id() {
        let mut state = ChatState::new();
        start(&mut state);
        state.apply(&tool_call("call_a"));
        state.apply(&tool_call("call_b"));
        state.apply(&tool_result("call_b", 2));

        let parts = &state.messages()[0].parts;
        assert!(matches!(
            parts[0],
            Part::ToolInvocation {
                state: ToolState::Pending,
                ..
            }
        ));
        assert!(matches!(
            parts[1],
            Part::ToolInvocation {
                state: ToolState::OutputAvailable,
                ..
            }
        ));
    }

    #[test]
    fn error_keeps_partial_history() {
        let mut state = ChatState::new();
        state.submit("hi");
        start(&mut state);
        state.apply(&AgentStreamEvent::TextDelta { delta: "Partial".into() });
        state.apply(&AgentStreamEvent::Error {
            message: "Network error: reset".into(),
        });

        assert_eq!(state.status(), ChatStatus::Error);
        assert_eq!(state.error(), Some("Network error: reset"));
        assert_eq!(state.messages().len(), 2);
        assert_eq!(state.messages()[1].text(), "Partial");

        // A new submit is allowed after an error
        assert!(state.submit("retry").is_some());
        assert!(state.error().is_none());
    }

    #[test]
    fn events_without_a_streaming_message_are_ignored() {
        let mut state = ChatState::new();
        state.apply(&AgentStreamEvent::TextDelta { delta: "stray".into() });
        assert!(state.messages().is_empty());
    }

    #[test]
    fn model_messages_include_completed_tools() {
        let mut state = ChatState::new();
        state.submit("7 * 6");
        start(&mut state);
        state.apply(&tool_call("call_1"));
        state.apply(&tool_result("call_1", 42));
        state.apply(&AgentStreamEvent::TextDelta { delta: "42".into() });

        let history = state.model_messages();
        assert_eq!(history.len(), 4);
        assert_eq!(history[1].tool_calls.len(), 1);
        assert_eq!(history[2].tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(history[3].content, "42");
        assert!(history[3].tool_calls.is_empty());
    }

    #[test]
    fn display_names() {
        assert_eq!(tool_display_name("getCurrentTime"), "Get Current Time");
        assert_eq!(tool_display_name("calculator"), "Calculator");
        assert_eq!(
            tool_display_name("queryCodeInAssets"),
            "Query Code In Assets"
        );
        assert_eq!(tool_display_name("search_assets"), "Search Assets");
    }

    #[test]
    fn render_shows_tool_summary() {
        let mut state = ChatState::new();
        start(&mut state);
        state.apply(&tool_call("call_1"));
        let pending = render_message(&state.messages()[0]);
        assert!(pending.contains("[Calculator] running with"));

        state.apply(&AgentStreamEvent::ToolResult {
            tool_call_id: "call_1".into(),
            tool_name: "calculator".into(),
            output: json!({"type": "calculation_complete", "message": "7 × 6 = 42"}),
            is_error: false,
        });
        let done = render_message(&state.messages()[0]);
        assert!(done.starts_with("Assistant:"));
        assert!(done.contains("[Calculator] 7 × 6 = 42"));
    }
}
