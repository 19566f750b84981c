//! Error types for the platform-access crate.

use std::fmt;

/// Errors from user directory operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// The backing store failed.
    StorageFailed { details: String },
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StorageFailed { details } => {
                write!(f, "user storage operation failed: {details}")
            }
        }
    }
}

impl std::error::Error for AccessError {}
