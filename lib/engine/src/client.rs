//! The engine client trait and its HTTP implementation.
//!
//! All calls are request/response against the engine's REST API under
//! `/api/v1/`, authenticated with a static API key header. Non-success
//! responses are always surfaced as adapter errors, never swallowed.

use crate::error::EngineError;
use crate::wire::{
    CreateWorkflowRequest, RemoteWorkflow, SetActiveRequest, TriggerUpdate, TriggerUpdateRequest,
};
use async_trait::async_trait;
use linklet_core::RemoteWorkflowId;
use reqwest::StatusCode;
use serde_json::Value as JsonValue;
use std::time::Duration;

/// Header carrying the engine API key.
const API_KEY_HEADER: &str = "X-N8N-API-KEY";

/// Configuration for the HTTP engine client.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Engine instance URL (e.g. `http://localhost:5678`).
    pub base_url: String,
    /// Static API key for authentication.
    pub api_key: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl EngineConfig {
    /// Creates a configuration with the default timeout.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout_seconds: 30,
        }
    }

    /// Overrides the request timeout.
    #[must_use]
    pub fn with_timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }
}

/// Abstract workflow operations against the remote automation engine.
///
/// The adapter owns no state; every call is an independent round-trip.
#[async_trait]
pub trait EngineClient: Send + Sync {
    /// Creates a remote workflow with the given action graph.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` on transport failure, `Rejected` on a 4xx
    /// validation response.
    async fn create(
        &self,
        name: &str,
        actions: &[JsonValue],
    ) -> Result<RemoteWorkflowId, EngineError>;

    /// Replaces the trigger definition of a remote workflow.
    async fn update_trigger(
        &self,
        remote_id: &RemoteWorkflowId,
        trigger: &TriggerUpdate,
    ) -> Result<(), EngineError>;

    /// Flips the remote activation flag.
    async fn set_active(
        &self,
        remote_id: &RemoteWorkflowId,
        active: bool,
    ) -> Result<(), EngineError>;

    /// Executes a remote workflow, forwarding an optional payload.
    /// The result is opaque to linklet.
    async fn execute(
        &self,
        remote_id: &RemoteWorkflowId,
        payload: Option<&JsonValue>,
    ) -> Result<JsonValue, EngineError>;

    /// Deletes a remote workflow. An already-absent workflow is success.
    async fn delete(&self, remote_id: &RemoteWorkflowId) -> Result<(), EngineError>;
}

/// reqwest-based engine client.
pub struct HttpEngineClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpEngineClient {
    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the underlying HTTP client cannot be built.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| EngineError::Unavailable {
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.base_url, path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, EngineError> {
        request
            .header(API_KEY_HEADER, self.api_key.as_str())
            .send()
            .await
            .map_err(transport_error)
    }
}

fn transport_error(error: reqwest::Error) -> EngineError {
    let reason = if error.is_timeout() {
        "request timed out".to_string()
    } else {
        error.to_string()
    };
    EngineError::Unavailable { reason }
}

fn status_error(status: StatusCode, body: String) -> EngineError {
    if status.is_client_error() {
        EngineError::Rejected {
            status: status.as_u16(),
            message: body,
        }
    } else {
        EngineError::Unavailable {
            reason: format!("HTTP {status}: {body}"),
        }
    }
}

/// Consumes a response, failing on non-success statuses.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, EngineError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, body))
}

#[async_trait]
impl EngineClient for HttpEngineClient {
    async fn create(
        &self,
        name: &str,
        actions: &[JsonValue],
    ) -> Result<RemoteWorkflowId, EngineError> {
        let url = self.api_url("workflows");
        let body = CreateWorkflowRequest {
            name,
            nodes: actions,
            connections: serde_json::json!({}),
            active: false,
        };

        let response = self.send(self.http.post(&url).json(&body)).await?;
        let response = check_status(response).await?;

        let workflow: RemoteWorkflow =
            response
                .json()
                .await
                .map_err(|e| EngineError::Unavailable {
                    reason: format!("invalid response body: {e}"),
                })?;

        tracing::debug!(remote_id = %workflow.id, name, "created remote workflow");
        Ok(workflow.id)
    }

    async fn update_trigger(
        &self,
        remote_id: &RemoteWorkflowId,
        trigger: &TriggerUpdate,
    ) -> Result<(), EngineError> {
        let url = self.api_url(&format!("workflows/{remote_id}"));
        let body = TriggerUpdateRequest { trigger };

        let response = self.send(self.http.put(&url).json(&body)).await?;
        check_status(response).await?;

        tracing::debug!(%remote_id, "updated remote trigger");
        Ok(())
    }

    async fn set_active(
        &self,
        remote_id: &RemoteWorkflowId,
        active: bool,
    ) -> Result<(), EngineError> {
        let url = self.api_url(&format!("workflows/{remote_id}"));
        let body = SetActiveRequest { active };

        let response = self.send(self.http.put(&url).json(&body)).await?;
        check_status(response).await?;

        tracing::debug!(%remote_id, active, "updated remote activation state");
        Ok(())
    }

    async fn execute(
        &self,
        remote_id: &RemoteWorkflowId,
        payload: Option<&JsonValue>,
    ) -> Result<JsonValue, EngineError> {
        let url = self.api_url(&format!("workflows/{remote_id}/execute"));
        let body = payload.cloned().unwrap_or_else(|| serde_json::json!({}));

        let response = self.send(self.http.post(&url).json(&body)).await?;
        let response = check_status(response).await?;

        response.json().await.map_err(|e| EngineError::Unavailable {
            reason: format!("invalid response body: {e}"),
        })
    }

    async fn delete(&self, remote_id: &RemoteWorkflowId) -> Result<(), EngineError> {
        let url = self.api_url(&format!("workflows/{remote_id}"));

        let response = self.send(self.http.delete(&url)).await?;

        // A workflow that is already gone counts as deleted.
        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(%remote_id, "remote workflow already absent");
            return Ok(());
        }
        check_status(response).await?;

        tracing::debug!(%remote_id, "deleted remote workflow");
        Ok(())
    }
}
