//! The bounded tool-calling agent loop.
//!
//! Each run follows a **Call → Act → Observe** cycle:
//!
//! 1. **Send** the history, system prompt and tool definitions to the model
//! 2. **Forward** streamed text to the caller as it arrives
//! 3. **If tool calls**: validate and execute them concurrently, append the
//!    results to the history, and loop back to step 1
//! 4. **If text only**: finish
//!
//! The loop also stops once the configured step budget is spent.
//! [`ChatState`] is the client side: it folds the emitted
//! [`AgentStreamEvent`]s into render-ready UI messages.

pub mod chat_state;
pub mod loop_runner;
pub mod stream_event;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use chat_state::{ChatState, ChatStatus, render_message, tool_display_name};
pub use loop_runner::{Agent, DEFAULT_SYSTEM_PROMPT, RunSummary};
pub use stream_event::{AgentStreamEvent, FinishReason};
