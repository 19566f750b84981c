//! Error mapping to HTTP responses.
//!
//! Every error maps to a distinct, non-leaking message. Engine rejections
//! are surfaced verbatim; anything unexpected is reported as a generic
//! technical failure and logged with full detail server-side.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use linklet_conversation::SessionError;
use linklet_workflow::WorkflowError;
use serde::Serialize;

/// API-level error, carrying exactly what the transport may show users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Validation failure; the reason is safe to show.
    InvalidInput { reason: String },
    /// Workflow missing or not owned by the caller.
    WorkflowNotFound,
    /// Execute was attempted on an inactive workflow.
    WorkflowNotActive,
    /// The automation engine could not be reached.
    EngineUnavailable,
    /// The automation engine rejected the request.
    EngineRejected { message: String },
    /// The caller sent too many requests.
    RateLimited { retry_after_secs: i64 },
    /// The caller has no conversation in progress.
    NoConversation,
    /// The caller's conversation sat idle too long and was discarded.
    ConversationExpired,
    /// Anything unexpected; details are logged, not returned.
    Internal,
}

/// JSON error body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            Self::WorkflowNotFound | Self::NoConversation => StatusCode::NOT_FOUND,
            Self::WorkflowNotActive => StatusCode::CONFLICT,
            Self::EngineUnavailable | Self::EngineRejected { .. } => StatusCode::BAD_GATEWAY,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::ConversationExpired => StatusCode::GONE,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::InvalidInput { reason } => reason.clone(),
            Self::WorkflowNotFound => "Workflow not found".to_string(),
            Self::WorkflowNotActive => "Workflow is not active".to_string(),
            Self::EngineUnavailable => "Automation engine is unavailable".to_string(),
            Self::EngineRejected { message } => {
                format!("Automation engine rejected the request: {message}")
            }
            Self::RateLimited { retry_after_secs } => {
                format!("Too many requests; retry in {retry_after_secs}s")
            }
            Self::NoConversation => "No conversation in progress".to_string(),
            Self::ConversationExpired => "Conversation expired; start again".to_string(),
            Self::Internal => "A technical error occurred".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<WorkflowError> for ApiError {
    fn from(error: WorkflowError) -> Self {
        match error {
            WorkflowError::InvalidInput { reason } => Self::InvalidInput { reason },
            WorkflowError::NotFound { .. } => Self::WorkflowNotFound,
            WorkflowError::NotActive { .. } => Self::WorkflowNotActive,
            WorkflowError::RemoteUnavailable { reason } => {
                tracing::warn!(%reason, "engine unavailable");
                Self::EngineUnavailable
            }
            WorkflowError::RemoteRejected { status, message } => {
                tracing::warn!(status, %message, "engine rejected request");
                Self::EngineRejected { message }
            }
            WorkflowError::Storage { details } => {
                tracing::error!(%details, "storage failure");
                Self::Internal
            }
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::NoActiveSession => Self::NoConversation,
            SessionError::Expired => Self::ConversationExpired,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linklet_core::WorkflowId;

    #[test]
    fn status_codes() {
        assert_eq!(
            ApiError::InvalidInput {
                reason: "x".to_string()
            }
            .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::WorkflowNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::WorkflowNotActive.status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::EngineUnavailable.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            ApiError::RateLimited {
                retry_after_secs: 30
            }
            .status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(ApiError::Internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn not_found_and_not_owned_are_indistinguishable() {
        // Both cases arrive as WorkflowError::NotFound and map to the same
        // message, so callers cannot probe for existence.
        let err: ApiError = WorkflowError::NotFound {
            workflow_id: WorkflowId::new(),
        }
        .into();
        assert_eq!(err, ApiError::WorkflowNotFound);
        assert_eq!(err.message(), "Workflow not found");
    }

    #[test]
    fn storage_details_never_reach_the_caller() {
        let err: ApiError = WorkflowError::Storage {
            details: "password authentication failed for user postgres".to_string(),
        }
        .into();
        assert_eq!(err, ApiError::Internal);
        assert!(!err.message().contains("postgres"));
    }

    #[test]
    fn engine_rejection_is_surfaced_verbatim() {
        let err: ApiError = WorkflowError::RemoteRejected {
            status: 422,
            message: "cron field out of range".to_string(),
        }
        .into();
        assert!(err.message().contains("cron field out of range"));
    }

    #[test]
    fn session_errors_map_to_distinct_responses() {
        assert_eq!(
            ApiError::from(SessionError::NoActiveSession).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(SessionError::Expired).status(),
            StatusCode::GONE
        );
    }
}
