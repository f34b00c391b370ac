//! # toolchat core
//!
//! Domain types, traits, and error definitions for the toolchat agent service.
//! Nothing in here talks to the network or the filesystem; the other crates
//! implement against these definitions.
//!
//! - [`message`]: the model-facing message shape (what the LLM sees)
//! - [`ui`]: the client-facing message shape (text and tool-invocation parts)
//! - [`provider`]: the LLM backend abstraction
//! - [`tool`] / [`schema`]: tools, the tool registry, and typed tool inputs

pub mod error;
pub mod message;
pub mod provider;
pub mod schema;
pub mod tool;
pub mod ui;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use message::{Message, MessageToolCall, Role};
pub use provider::{ObjectRequest, Provider, ProviderRequest, ProviderResponse, StreamChunk};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult};
pub use ui::{Part, ToolState, UiMessage, UiRole};
