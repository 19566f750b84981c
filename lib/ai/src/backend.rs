//! The chat backend abstraction.
//!
//! One interface for every completion provider; the concrete provider is
//! chosen once at startup, never branched on per call.

use crate::error::AiError;
use crate::provider::ChatProvider;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// System instruction.
    System,
    /// User/human message.
    User,
    /// Assistant message.
    Assistant,
}

impl ChatRole {
    /// The provider wire name of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A message in a chat exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the sender.
    pub role: ChatRole,
    /// The content of the message.
    pub content: String,
}

impl ChatMessage {
    /// Creates a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Creates an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Sampling options for a completion request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatOptions {
    /// Temperature for sampling.
    pub temperature: Option<f32>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
}

impl ChatOptions {
    /// Sets the temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the max tokens.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Trait for chat completion backends.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Generates a response for the given conversation.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider call fails.
    async fn generate_chat_response(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<String, AiError>;

    /// Returns the provider type.
    fn provider(&self) -> ChatProvider;

    /// Returns the model name.
    fn model(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_constructors() {
        let msg = ChatMessage::user("Bonjour !");
        assert_eq!(msg.role, ChatRole::User);
        assert_eq!(msg.content, "Bonjour !");

        assert_eq!(ChatMessage::system("x").role, ChatRole::System);
        assert_eq!(ChatMessage::assistant("x").role, ChatRole::Assistant);
    }

    #[test]
    fn options_builder() {
        let options = ChatOptions::default()
            .with_temperature(0.7)
            .with_max_tokens(500);
        assert_eq!(options.temperature, Some(0.7));
        assert_eq!(options.max_tokens, Some(500));
    }

    #[test]
    fn role_wire_names() {
        assert_eq!(ChatRole::System.as_str(), "system");
        assert_eq!(ChatRole::User.as_str(), "user");
        assert_eq!(ChatRole::Assistant.as_str(), "assistant");
    }
}
