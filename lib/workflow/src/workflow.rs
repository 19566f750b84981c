//! The workflow record.

use crate::trigger::{Trigger, TriggerType};
use chrono::{DateTime, Utc};
use linklet_core::{OwnerId, RemoteWorkflowId, WorkflowId};
use serde::{Deserialize, Serialize};

/// A locally-managed workflow, backed by an object in the remote engine.
///
/// A value of this type is only ever constructed after remote creation
/// succeeded: `remote_id` is proof of remote existence, so the repository
/// can never hold a record for a failed remote creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    /// Locally-generated unique identifier.
    pub id: WorkflowId,
    /// The owning user. Immutable after creation; every mutation and
    /// execution is scoped to this owner.
    pub owner_id: OwnerId,
    /// Human-readable name, at least 3 characters after trimming.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Identifier of the counterpart object in the remote engine.
    pub remote_id: RemoteWorkflowId,
    /// Configured trigger; unset until the user configures one.
    pub trigger: Option<Trigger>,
    /// Mirrors the remote activation state. Only flipped after the
    /// corresponding remote call succeeded.
    pub is_active: bool,
    /// When the record was created. Immutable.
    pub created_at: DateTime<Utc>,
}

impl Workflow {
    /// Creates a new workflow record for a freshly-created remote object.
    ///
    /// Starts inactive with no trigger configured.
    #[must_use]
    pub fn new(
        owner_id: OwnerId,
        name: String,
        description: Option<String>,
        remote_id: RemoteWorkflowId,
    ) -> Self {
        Self {
            id: WorkflowId::new(),
            owner_id,
            name,
            description,
            remote_id,
            trigger: None,
            is_active: false,
            created_at: Utc::now(),
        }
    }

    /// Replaces the configured trigger.
    pub fn set_trigger(&mut self, trigger: Trigger) {
        self.trigger = Some(trigger);
    }

    /// Updates the activation flag.
    pub fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }

    /// Returns the configured trigger type, if any.
    #[must_use]
    pub fn trigger_type(&self) -> Option<TriggerType> {
        self.trigger.as_ref().map(Trigger::trigger_type)
    }
}
