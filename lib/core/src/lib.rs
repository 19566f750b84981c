//! Core domain types and utilities for the linklet assistant.
//!
//! This crate provides the foundational types, error handling, and shared
//! utilities used throughout linklet's workflow delegation service.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{OwnerId, RemoteWorkflowId, WorkflowId};
