//! AI chat backends for linklet.
//!
//! The chat feature is a pure passthrough: messages in, completion text
//! out, no orchestration. This crate provides:
//!
//! - **ChatBackend**: the single interface the rest of the system sees
//! - **Providers**: OpenAI and Deepseek, both speaking the
//!   OpenAI-compatible chat completions protocol, selected once at startup

pub mod backend;
pub mod error;
pub mod provider;

pub use backend::{ChatBackend, ChatMessage, ChatOptions, ChatRole};
pub use error::AiError;
pub use provider::{ChatBackendConfig, ChatProvider, HttpChatBackend};
