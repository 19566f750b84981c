//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables
//! (nested sections use the `__` separator, e.g. `ENGINE__BASE_URL`).

use linklet_ai::{AiError, ChatBackendConfig, ChatProvider};
use linklet_platform_access::RateLimitConfig;
use serde::Deserialize;

/// Server configuration composed from section configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// PostgreSQL database connection URL.
    pub database_url: String,

    /// Address to bind the HTTP listener on.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Remote workflow engine configuration.
    pub engine: EngineSettings,

    /// AI chat provider configuration.
    pub ai: AiSettings,

    /// Inbound rate limiting.
    #[serde(default)]
    pub rate_limit: RateLimitSettings,

    /// Conversation session configuration.
    #[serde(default)]
    pub session: SessionSettings,
}

/// Remote engine connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    /// Engine instance URL (e.g. `http://localhost:5678`).
    pub base_url: String,
    /// Engine API key.
    pub api_key: String,
    /// Public base URL under which the engine serves webhooks.
    pub webhook_base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_engine_timeout_seconds")]
    pub timeout_seconds: u64,
}

/// AI chat provider settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AiSettings {
    /// Provider name: `openai` or `deepseek`.
    pub provider: String,
    /// Provider API key.
    pub api_key: String,
    /// Model override; each provider has a default.
    #[serde(default)]
    pub model: Option<String>,
    /// Endpoint override; each provider has a default.
    #[serde(default)]
    pub base_url: Option<String>,
}

impl AiSettings {
    /// Resolves the provider selection into a backend configuration.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown provider name.
    pub fn backend_config(&self) -> Result<ChatBackendConfig, AiError> {
        let provider = self.provider.parse::<ChatProvider>()?;
        let mut config = match provider {
            ChatProvider::OpenAi => ChatBackendConfig::openai(&self.api_key),
            ChatProvider::Deepseek => ChatBackendConfig::deepseek(&self.api_key),
        };
        if let Some(model) = &self.model {
            config = config.with_model(model);
        }
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url);
        }
        Ok(config)
    }
}

/// Inbound rate limiting settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSettings {
    /// Maximum requests per user per window.
    #[serde(default = "default_rate_limit_requests")]
    pub max_requests: u32,
    /// Window duration in seconds.
    #[serde(default = "default_rate_limit_window_seconds")]
    pub window_seconds: u32,
}

impl RateLimitSettings {
    /// Converts to the limiter's configuration type.
    #[must_use]
    pub fn to_config(&self) -> RateLimitConfig {
        RateLimitConfig::new(self.max_requests, self.window_seconds)
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_requests: default_rate_limit_requests(),
            window_seconds: default_rate_limit_window_seconds(),
        }
    }
}

/// Conversation session settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    /// Idle minutes before an unfinished conversation is discarded.
    #[serde(default = "default_session_ttl_minutes")]
    pub ttl_minutes: i64,

    /// Interval between conversation sweep runs, in seconds.
    #[serde(default = "default_cleanup_interval_seconds")]
    pub cleanup_interval_seconds: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ttl_minutes: default_session_ttl_minutes(),
            cleanup_interval_seconds: default_cleanup_interval_seconds(),
        }
    }
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_engine_timeout_seconds() -> u64 {
    30
}

fn default_rate_limit_requests() -> u32 {
    30
}

fn default_rate_limit_window_seconds() -> u32 {
    60
}

fn default_session_ttl_minutes() -> i64 {
    30
}

fn default_cleanup_interval_seconds() -> u64 {
    300
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linklet_ai::ChatProvider;

    #[test]
    fn rate_limit_settings_have_bot_defaults() {
        let settings = RateLimitSettings::default();
        assert_eq!(settings.max_requests, 30);
        assert_eq!(settings.window_seconds, 60);
    }

    #[test]
    fn session_settings_have_correct_defaults() {
        let settings = SessionSettings::default();
        assert_eq!(settings.ttl_minutes, 30);
        assert_eq!(settings.cleanup_interval_seconds, 300);
    }

    #[test]
    fn ai_settings_resolve_provider_once() {
        let settings = AiSettings {
            provider: "deepseek".to_string(),
            api_key: "sk-test".to_string(),
            model: None,
            base_url: None,
        };

        let config = settings.backend_config().expect("valid provider");
        assert_eq!(config.provider, ChatProvider::Deepseek);
        assert_eq!(config.model, "deepseek-chat");
    }

    #[test]
    fn ai_settings_apply_overrides() {
        let settings = AiSettings {
            provider: "openai".to_string(),
            api_key: "sk-test".to_string(),
            model: Some("gpt-4o-mini".to_string()),
            base_url: Some("https://proxy.example.com".to_string()),
        };

        let config = settings.backend_config().expect("valid provider");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.base_url, "https://proxy.example.com");
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let settings = AiSettings {
            provider: "mistral".to_string(),
            api_key: "sk-test".to_string(),
            model: None,
            base_url: None,
        };
        assert!(settings.backend_config().is_err());
    }
}
