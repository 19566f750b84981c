//! Remote workflow engine adapter for linklet.
//!
//! The automation engine (an n8n-compatible HTTP service) owns the actual
//! workflow objects: their action graphs, schedules, and webhook endpoints.
//! This crate translates linklet's abstract workflow operations into calls
//! against that service:
//!
//! - **EngineClient**: the adapter trait consumed by the orchestrator
//! - **HttpEngineClient**: reqwest-based implementation with API-key auth
//! - **Wire types**: the engine's workflow representation and update payloads

pub mod client;
pub mod error;
pub mod wire;

pub use client::{EngineClient, EngineConfig, HttpEngineClient};
pub use error::EngineError;
pub use wire::{RemoteWorkflow, TriggerUpdate};
