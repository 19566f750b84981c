//! Error types for the engine adapter.
//!
//! The adapter collapses all failures into two cases the caller can act on:
//! the engine could not be reached (retryable by the user), or the engine
//! understood the request and rejected it (surfaced verbatim).

use std::fmt;

/// Errors from remote engine operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The engine could not be reached or failed internally
    /// (connection failure, timeout, or a 5xx response).
    Unavailable { reason: String },
    /// The engine rejected the request with a 4xx validation response.
    /// The response body is preserved for the caller.
    Rejected { status: u16, message: String },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { reason } => {
                write!(f, "workflow engine unavailable: {reason}")
            }
            Self::Rejected { status, message } => {
                write!(f, "workflow engine rejected request (HTTP {status}): {message}")
            }
        }
    }
}

impl std::error::Error for EngineError {}
