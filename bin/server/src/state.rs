//! Shared application state.
//!
//! All services are constructed once at startup and passed in explicitly;
//! nothing here is process-global.

use crate::db::{PgUserDirectory, PgWorkflowRepository};
use linklet_ai::ChatBackend;
use linklet_conversation::SessionStore;
use linklet_engine::HttpEngineClient;
use linklet_platform_access::RateLimiter;
use linklet_workflow::WorkflowOrchestrator;
use std::sync::Arc;

/// Everything the request handlers need.
pub struct AppState {
    /// The workflow lifecycle core.
    pub orchestrator: WorkflowOrchestrator<PgWorkflowRepository, HttpEngineClient>,
    /// Suspended creation conversations.
    pub sessions: SessionStore,
    /// User auto-registration.
    pub users: PgUserDirectory,
    /// Per-user request limiting.
    pub limiter: RateLimiter,
    /// Chat completion backend, selected once at startup.
    pub chat: Arc<dyn ChatBackend>,
}

impl AppState {
    /// Bundles the constructed services.
    #[must_use]
    pub fn new(
        orchestrator: WorkflowOrchestrator<PgWorkflowRepository, HttpEngineClient>,
        sessions: SessionStore,
        users: PgUserDirectory,
        limiter: RateLimiter,
        chat: Arc<dyn ChatBackend>,
    ) -> Self {
        Self {
            orchestrator,
            sessions,
            users,
            limiter,
            chat,
        }
    }
}
