//! Agent-level streaming events.
//!
//! `AgentStreamEvent` is what a run emits while it executes. The gateway
//! forwards each one as an SSE frame whose event name is the `type` tag, and
//! [`crate::ChatState`] folds them into UI messages.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use toolchat_core::provider::Usage;

/// Why a step or a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FinishReason {
    /// The model answered without calling tools
    Stop,
    /// The step ended with tool calls; another step follows
    ToolCalls,
    /// The step budget ran out while the model still wanted tools
    StepLimit,
}

/// Events emitted by the agent during a run.
///
/// - `start`       — a new assistant message begins
/// - `step_start`  — a model call is about to be made
/// - `text_delta`  — partial text from the model
/// - `tool_call`   — the model requested a tool (part enters `pending`)
/// - `tool_result` — a tool finished (part becomes `output-available`)
/// - `step_finish` — the step's model call and tools are done
/// - `finish`      — the run is complete
/// - `error`       — the run aborted on a transport failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentStreamEvent {
    Start {
        message_id: String,
    },

    StepStart {
        step: usize,
    },

    TextDelta {
        delta: String,
    },

    ToolCall {
        tool_call_id: String,
        tool_name: String,
        input: Value,
    },

    ToolResult {
        tool_call_id: String,
        tool_name: String,
        output: Value,
        is_error: bool,
    },

    StepFinish {
        step: usize,
        finish_reason: FinishReason,
    },

    Finish {
        message_id: String,
        finish_reason: FinishReason,
        steps: usize,
        tool_calls: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        usage: Option<Usage>,
    },

    Error {
        message: String,
    },
}

impl AgentStreamEvent {
    /// SSE event name for this event type.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Start { .. } => "start",
            Self::StepStart { .. } => "step_start",
            Self::TextDelta { .. } => "text_delta",
            Self::ToolCall { .. } => "tool_call",
            Self::ToolResult { .. } => "tool_result",
            Self::StepFinish { .. } => "step_finish",
            Self::Finish { .. } => "finish",
            Self::Error { .. } => "error",
        }
    }

    /// True for the events that end a run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finish { .. } | Self::Error { .. })
    }
}
