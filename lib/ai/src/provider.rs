//! Provider configuration and the HTTP chat backend.
//!
//! OpenAI and Deepseek both expose the OpenAI-compatible chat completions
//! protocol, so one HTTP implementation covers both; only the endpoint,
//! model, and key differ.

use crate::backend::{ChatBackend, ChatMessage, ChatOptions};
use crate::error::AiError;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Available chat providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatProvider {
    /// OpenAI API.
    OpenAi,
    /// Deepseek API.
    Deepseek,
}

impl ChatProvider {
    /// Configuration name of the provider.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Deepseek => "deepseek",
        }
    }
}

impl fmt::Display for ChatProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ChatProvider {
    type Err = AiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "deepseek" => Ok(Self::Deepseek),
            other => Err(AiError::InvalidConfig {
                reason: format!("unknown chat provider '{other}'"),
            }),
        }
    }
}

/// Configuration for a chat backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatBackendConfig {
    /// The provider type.
    pub provider: ChatProvider,
    /// Base URL for the API.
    pub base_url: String,
    /// API key.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl ChatBackendConfig {
    /// Creates an OpenAI backend configuration.
    #[must_use]
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            provider: ChatProvider::OpenAi,
            base_url: "https://api.openai.com".to_string(),
            api_key: api_key.into(),
            model: "gpt-3.5-turbo".to_string(),
            timeout_seconds: 30,
        }
    }

    /// Creates a Deepseek backend configuration.
    #[must_use]
    pub fn deepseek(api_key: impl Into<String>) -> Self {
        Self {
            provider: ChatProvider::Deepseek,
            base_url: "https://api.deepseek.com".to_string(),
            api_key: api_key.into(),
            model: "deepseek-chat".to_string(),
            timeout_seconds: 30,
        }
    }

    /// Overrides the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Chat backend speaking the OpenAI-compatible completions protocol.
pub struct HttpChatBackend {
    http: reqwest::Client,
    config: ChatBackendConfig,
}

impl HttpChatBackend {
    /// Creates a backend from configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the HTTP client cannot be built.
    pub fn new(config: ChatBackendConfig) -> Result<Self, AiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AiError::InvalidConfig {
                reason: e.to_string(),
            })?;

        Ok(Self { http, config })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn build_request<'a>(
        &'a self,
        messages: &'a [ChatMessage],
        options: &ChatOptions,
    ) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.config.model,
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        }
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn generate_chat_response(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<String, AiError> {
        let url = self.completions_url();
        let body = self.build_request(messages, options);

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AiError::Timeout
                } else {
                    AiError::ConnectionFailed {
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                provider = %self.config.provider,
                status = %status,
                "chat completion request failed"
            );
            return Err(rejection(status, body));
        }

        let completion: ChatCompletionResponse =
            response.json().await.map_err(|e| AiError::ConnectionFailed {
                reason: format!("invalid response body: {e}"),
            })?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or(AiError::EmptyCompletion)?;

        Ok(choice.message.content.trim().to_string())
    }

    fn provider(&self) -> ChatProvider {
        self.config.provider
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

fn rejection(status: StatusCode, message: String) -> AiError {
    AiError::Rejected {
        status: status.as_u16(),
        message,
    }
}
