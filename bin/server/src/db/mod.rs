//! Postgres-backed implementations of the storage contracts.

pub mod user;
pub mod workflow;

pub use user::PgUserDirectory;
pub use workflow::PgWorkflowRepository;
