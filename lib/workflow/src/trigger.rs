//! Trigger variants for workflow initiation.
//!
//! A trigger describes when the remote engine fires a workflow. Variants
//! are validated at construction and stored in tagged form, never as an
//! untyped configuration blob.

use crate::schedule::{self, ScheduleError};
use linklet_core::WorkflowId;
use linklet_engine::TriggerUpdate;
use serde::{Deserialize, Serialize};

/// The type of trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    /// User-initiated only.
    Manual,
    /// Time-based trigger with cron expression.
    Schedule,
    /// HTTP webhook trigger.
    Webhook,
}

/// A configured workflow trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trigger {
    /// Fired only by explicit execute requests.
    Manual,
    /// Fired on a cron schedule (5-field expression, validated).
    Schedule { cron: String },
    /// Fired by HTTP POST to a URL derived from the workflow id.
    Webhook { url: String },
}

impl Trigger {
    /// Creates a manual trigger.
    #[must_use]
    pub fn manual() -> Self {
        Self::Manual
    }

    /// Creates a schedule trigger from a cron expression.
    ///
    /// # Errors
    ///
    /// Returns an error if the expression is not a 5-field cron.
    pub fn schedule(cron: impl Into<String>) -> Result<Self, ScheduleError> {
        let cron = cron.into();
        schedule::validate_cron(&cron)?;
        Ok(Self::Schedule { cron })
    }

    /// Creates a webhook trigger.
    ///
    /// The URL is derived deterministically from the base URL and the
    /// workflow id; it is never user-supplied.
    #[must_use]
    pub fn webhook(base_url: &str, workflow_id: WorkflowId) -> Self {
        Self::Webhook {
            url: format!("{}/workflow/{workflow_id}", base_url.trim_end_matches('/')),
        }
    }

    /// Returns the trigger type.
    #[must_use]
    pub fn trigger_type(&self) -> TriggerType {
        match self {
            Self::Manual => TriggerType::Manual,
            Self::Schedule { .. } => TriggerType::Schedule,
            Self::Webhook { .. } => TriggerType::Webhook,
        }
    }
}

impl From<&Trigger> for TriggerUpdate {
    /// Converts to the engine's wire form. The webhook URL stays local:
    /// the engine addresses webhooks by workflow id.
    fn from(trigger: &Trigger) -> Self {
        match trigger {
            Trigger::Manual => Self::Manual,
            Trigger::Schedule { cron } => Self::Schedule { cron: cron.clone() },
            Trigger::Webhook { .. } => Self::Webhook,
        }
    }
}

/// A caller's trigger selection, before derivation and validation.
///
/// The webhook variant carries no URL on purpose; the orchestrator
/// derives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriggerChoice {
    /// Manual execution only.
    Manual,
    /// Cron schedule.
    Schedule { cron: String },
    /// Webhook; URL derived from the workflow id.
    Webhook,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_trigger_validates_cron() {
        let trigger = Trigger::schedule("0 9 * * *").expect("valid cron");
        assert_eq!(trigger.trigger_type(), TriggerType::Schedule);

        assert!(Trigger::schedule("whenever").is_err());
    }

    #[test]
    fn webhook_url_is_derived_from_workflow_id() {
        let workflow_id = WorkflowId::new();
        let trigger = Trigger::webhook("https://hooks.example.com/", workflow_id);

        let Trigger::Webhook { url } = &trigger else {
            panic!("expected webhook trigger");
        };
        assert_eq!(
            url,
            &format!("https://hooks.example.com/workflow/{workflow_id}")
        );
    }

    #[test]
    fn trigger_serde_is_tagged() {
        let trigger = Trigger::schedule("0 9 * * *").expect("valid cron");
        let value = serde_json::to_value(&trigger).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({"type": "schedule", "cron": "0 9 * * *"})
        );

        let parsed: Trigger = serde_json::from_value(value).expect("deserialize");
        assert_eq!(parsed, trigger);
    }

    #[test]
    fn wire_conversion_drops_webhook_url() {
        let workflow_id = WorkflowId::new();
        let trigger = Trigger::webhook("https://hooks.example.com", workflow_id);
        assert_eq!(TriggerUpdate::from(&trigger), TriggerUpdate::Webhook);

        let trigger = Trigger::manual();
        assert_eq!(TriggerUpdate::from(&trigger), TriggerUpdate::Manual);
    }
}
