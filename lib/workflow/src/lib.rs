//! Workflow lifecycle orchestration for linklet.
//!
//! This crate owns the local side of workflow management:
//!
//! - **Workflow**: the persisted record tying a local owner to a remote
//!   engine object
//! - **Trigger**: the validated trigger variants (manual, schedule, webhook)
//! - **Schedule**: cron validation and the natural-language daily phrase
//!   conversion
//! - **WorkflowRepository**: the storage contract (plus an in-memory
//!   implementation)
//! - **WorkflowOrchestrator**: the reconciliation core that keeps the
//!   repository and the remote engine consistent

pub mod error;
pub mod orchestrator;
pub mod repository;
pub mod schedule;
pub mod trigger;
pub mod workflow;

pub use error::{RepositoryError, WorkflowError};
pub use orchestrator::WorkflowOrchestrator;
pub use repository::{InMemoryWorkflowRepository, WorkflowRepository};
pub use schedule::{ScheduleError, daily_phrase_to_cron, validate_cron};
pub use trigger::{Trigger, TriggerChoice, TriggerType};
pub use workflow::Workflow;
