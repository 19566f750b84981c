//! Error types for the workflow crate.
//!
//! `WorkflowError` is the orchestrator's taxonomy, mapped one-to-one onto
//! caller-visible outcomes. `RepositoryError` is the storage contract's
//! error; the orchestrator folds it into the generic `Storage` case since
//! storage failures are never user-correctable.

use linklet_core::WorkflowId;
use linklet_engine::EngineError;
use std::fmt;

/// Errors from orchestrated workflow operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// Caller-supplied data failed validation. Recoverable by re-prompting.
    InvalidInput { reason: String },
    /// No workflow with that id is visible to the caller. Deliberately
    /// covers both "missing" and "owned by someone else".
    NotFound { workflow_id: WorkflowId },
    /// Execute was attempted on an inactive workflow.
    NotActive { workflow_id: WorkflowId },
    /// The remote engine could not be reached. Recoverable by user retry;
    /// never retried internally.
    RemoteUnavailable { reason: String },
    /// The remote engine rejected the request; its message is preserved.
    RemoteRejected { status: u16, message: String },
    /// Local storage failed. Reported to callers as a generic technical
    /// failure.
    Storage { details: String },
}

impl fmt::Display for WorkflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput { reason } => {
                write!(f, "invalid input: {reason}")
            }
            Self::NotFound { workflow_id } => {
                write!(f, "workflow not found: {workflow_id}")
            }
            Self::NotActive { workflow_id } => {
                write!(f, "workflow is not active: {workflow_id}")
            }
            Self::RemoteUnavailable { reason } => {
                write!(f, "workflow engine unavailable: {reason}")
            }
            Self::RemoteRejected { status, message } => {
                write!(f, "workflow engine rejected request (HTTP {status}): {message}")
            }
            Self::Storage { details } => {
                write!(f, "storage failure: {details}")
            }
        }
    }
}

impl std::error::Error for WorkflowError {}

impl From<EngineError> for WorkflowError {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::Unavailable { reason } => Self::RemoteUnavailable { reason },
            EngineError::Rejected { status, message } => Self::RemoteRejected { status, message },
        }
    }
}

impl From<RepositoryError> for WorkflowError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Backend { details } => Self::Storage { details },
        }
    }
}

/// Errors from workflow storage operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The storage backend failed.
    Backend { details: String },
}

impl RepositoryError {
    /// Creates a backend error from any displayable cause.
    #[must_use]
    pub fn backend(details: impl Into<String>) -> Self {
        Self::Backend {
            details: details.into(),
        }
    }
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backend { details } => write!(f, "storage backend failure: {details}"),
        }
    }
}

impl std::error::Error for RepositoryError {}
