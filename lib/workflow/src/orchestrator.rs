//! The workflow orchestrator.
//!
//! Coordinates user-driven creation, configuration, and owner-authorized
//! mutation of workflows, keeping the local repository and the remote
//! engine consistent. The ordering rule is uniform: the remote call goes
//! first, and local state changes only after the engine acknowledged.
//! On any remote failure the operation aborts without local mutation
//! (deleting an already-absent remote object is the one exception).
//!
//! No retries happen here; retry is a caller concern. There is also no
//! cross-operation locking: concurrent configuration of the same workflow
//! resolves as last-remote-write-then-last-local-write wins.

use crate::error::WorkflowError;
use crate::repository::WorkflowRepository;
use crate::trigger::{Trigger, TriggerChoice};
use crate::workflow::Workflow;
use linklet_core::{OwnerId, WorkflowId};
use linklet_engine::{EngineClient, TriggerUpdate};
use serde_json::Value as JsonValue;
use tracing::{info, instrument};

/// Minimum workflow name length, in characters, after trimming.
pub const MIN_NAME_CHARS: usize = 3;

/// Orchestrates workflow lifecycle operations for authenticated callers.
pub struct WorkflowOrchestrator<R, E> {
    repository: R,
    engine: E,
    webhook_base_url: String,
}

impl<R, E> WorkflowOrchestrator<R, E>
where
    R: WorkflowRepository,
    E: EngineClient,
{
    /// Creates an orchestrator.
    ///
    /// `webhook_base_url` is the public base under which the engine exposes
    /// webhook endpoints; derived webhook URLs are rooted there.
    pub fn new(repository: R, engine: E, webhook_base_url: impl Into<String>) -> Self {
        Self {
            repository,
            engine,
            webhook_base_url: webhook_base_url.into(),
        }
    }

    /// Creates a workflow for the caller.
    ///
    /// The remote object is created first, with an empty action graph; the
    /// local record is only persisted once the engine returned an id. On
    /// remote failure nothing is written locally.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the trimmed name is shorter than
    /// [`MIN_NAME_CHARS`]; `RemoteUnavailable`/`RemoteRejected` from the
    /// engine.
    #[instrument(skip(self, description))]
    pub async fn create_workflow(
        &self,
        owner_id: OwnerId,
        name: &str,
        description: Option<String>,
    ) -> Result<Workflow, WorkflowError> {
        let name = name.trim();
        if name.chars().count() < MIN_NAME_CHARS {
            return Err(WorkflowError::InvalidInput {
                reason: format!("name must be at least {MIN_NAME_CHARS} characters"),
            });
        }

        let remote_id = self.engine.create(name, &[]).await?;

        let workflow = Workflow::new(owner_id, name.to_string(), description, remote_id);
        self.repository.insert(&workflow).await?;

        info!(
            workflow_id = %workflow.id,
            remote_id = %workflow.remote_id,
            "workflow created"
        );
        Ok(workflow)
    }

    /// Lists the caller's workflows in creation order.
    ///
    /// An empty list is a valid, non-error result.
    pub async fn list_workflows(&self, owner_id: OwnerId) -> Result<Vec<Workflow>, WorkflowError> {
        Ok(self.repository.find_by_owner(owner_id).await?)
    }

    /// Configures the trigger of an owned workflow.
    ///
    /// Ownership is verified before any remote call. The trigger definition
    /// is pushed to the engine first; the stored trigger only changes after
    /// the engine acknowledged, so from the caller's perspective the update
    /// is atomic: both sides or neither.
    ///
    /// # Errors
    ///
    /// `NotFound` for an id the caller does not own, `InvalidInput` for a
    /// malformed cron expression, engine errors otherwise.
    #[instrument(skip(self, choice))]
    pub async fn configure_trigger(
        &self,
        workflow_id: WorkflowId,
        owner_id: OwnerId,
        choice: TriggerChoice,
    ) -> Result<Workflow, WorkflowError> {
        let mut workflow = self.owned_workflow(workflow_id, owner_id).await?;

        let trigger = match choice {
            TriggerChoice::Manual => Trigger::manual(),
            TriggerChoice::Schedule { cron } => {
                Trigger::schedule(cron).map_err(|e| WorkflowError::InvalidInput {
                    reason: e.to_string(),
                })?
            }
            TriggerChoice::Webhook => Trigger::webhook(&self.webhook_base_url, workflow_id),
        };

        self.engine
            .update_trigger(&workflow.remote_id, &TriggerUpdate::from(&trigger))
            .await?;

        workflow.set_trigger(trigger);
        self.repository.update(&workflow).await?;

        info!(trigger = ?workflow.trigger_type(), "trigger configured");
        Ok(workflow)
    }

    /// Activates an owned workflow.
    ///
    /// Idempotent: activating an already-active workflow is not an error.
    /// The remote call is still issued; the local flag is not trusted as a
    /// shortcut for remote state.
    pub async fn activate_workflow(
        &self,
        workflow_id: WorkflowId,
        owner_id: OwnerId,
    ) -> Result<Workflow, WorkflowError> {
        self.set_active_state(workflow_id, owner_id, true).await
    }

    /// Deactivates an owned workflow. Idempotent, like activation.
    pub async fn deactivate_workflow(
        &self,
        workflow_id: WorkflowId,
        owner_id: OwnerId,
    ) -> Result<Workflow, WorkflowError> {
        self.set_active_state(workflow_id, owner_id, false).await
    }

    #[instrument(skip(self))]
    async fn set_active_state(
        &self,
        workflow_id: WorkflowId,
        owner_id: OwnerId,
        active: bool,
    ) -> Result<Workflow, WorkflowError> {
        let mut workflow = self.owned_workflow(workflow_id, owner_id).await?;

        self.engine.set_active(&workflow.remote_id, active).await?;

        workflow.set_active(active);
        self.repository.update(&workflow).await?;

        info!(active, "workflow activation state updated");
        Ok(workflow)
    }

    /// Executes an owned, active workflow and returns the engine's result
    /// verbatim.
    ///
    /// # Errors
    ///
    /// `NotActive` if the workflow is inactive; no remote call is issued
    /// in that case.
    #[instrument(skip(self, payload))]
    pub async fn execute_workflow(
        &self,
        workflow_id: WorkflowId,
        owner_id: OwnerId,
        payload: Option<JsonValue>,
    ) -> Result<JsonValue, WorkflowError> {
        let workflow = self.owned_workflow(workflow_id, owner_id).await?;

        if !workflow.is_active {
            return Err(WorkflowError::NotActive { workflow_id });
        }

        let result = self
            .engine
            .execute(&workflow.remote_id, payload.as_ref())
            .await?;

        info!("workflow executed");
        Ok(result)
    }

    /// Deletes an owned workflow, remote object first.
    ///
    /// If the remote delete fails the local record is preserved and the
    /// error surfaced; a local record must never outlive its remote
    /// counterpart silently. The engine adapter treats an already-absent
    /// remote object as success, and a repeated local delete is likewise a
    /// success.
    #[instrument(skip(self))]
    pub async fn delete_workflow(
        &self,
        workflow_id: WorkflowId,
        owner_id: OwnerId,
    ) -> Result<(), WorkflowError> {
        let Some(workflow) = self.repository.find_by_id(workflow_id).await? else {
            // Already gone; deleting twice is not an error.
            return Ok(());
        };
        if workflow.owner_id != owner_id {
            return Err(WorkflowError::NotFound { workflow_id });
        }

        self.engine.delete(&workflow.remote_id).await?;
        self.repository.delete(workflow_id).await?;

        info!(remote_id = %workflow.remote_id, "workflow deleted");
        Ok(())
    }

    /// Loads a workflow and verifies the caller owns it.
    ///
    /// A missing record and a record owned by someone else produce the
    /// same `NotFound`, so callers cannot probe for existence.
    async fn owned_workflow(
        &self,
        workflow_id: WorkflowId,
        owner_id: OwnerId,
    ) -> Result<Workflow, WorkflowError> {
        let workflow = self
            .repository
            .find_by_id(workflow_id)
            .await?
            .ok_or(WorkflowError::NotFound { workflow_id })?;

        if workflow.owner_id != owner_id {
            return Err(WorkflowError::NotFound { workflow_id });
        }
        Ok(workflow)
    }
}
