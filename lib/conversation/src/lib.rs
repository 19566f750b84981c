//! Workflow creation conversation for linklet.
//!
//! This crate owns the multi-turn exchange that collects structured fields
//! from a user before workflow operations are finalized:
//!
//! - **Prompt/TurnInput**: the per-turn contract with the chat transport
//! - **CreationFlow**: the state machine walking name → description →
//!   trigger selection, driving the orchestrator at each transition
//! - **SessionStore**: one suspended flow per owner, with an idle TTL

pub mod error;
pub mod flow;
pub mod prompt;
pub mod store;

pub use error::SessionError;
pub use flow::{CreationFlow, FlowOutcome, FlowState};
pub use prompt::{Prompt, PromptOption, TurnInput};
pub use store::SessionStore;
