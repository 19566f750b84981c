//! Wire types for the engine's HTTP JSON protocol.
//!
//! The engine represents a workflow as `{id, name, nodes, connections,
//! active}`. Trigger changes are sent as a `{"trigger": {...}}` object
//! merged into the workflow's update payload.

use linklet_core::RemoteWorkflowId;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A workflow object as the engine returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteWorkflow {
    /// Engine-assigned identifier.
    pub id: RemoteWorkflowId,
    /// Workflow name.
    pub name: String,
    /// Action graph nodes.
    #[serde(default)]
    pub nodes: Vec<JsonValue>,
    /// Connections between nodes.
    #[serde(default)]
    pub connections: JsonValue,
    /// Whether the engine will fire the workflow's triggers.
    #[serde(default)]
    pub active: bool,
}

/// Trigger definition in the engine's update payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriggerUpdate {
    /// Fired only on explicit execute calls.
    Manual,
    /// Fired by the engine on a cron schedule.
    Schedule { cron: String },
    /// Fired by an inbound HTTP call to the engine's webhook endpoint.
    Webhook,
}

/// Body for workflow creation.
#[derive(Debug, Serialize)]
pub(crate) struct CreateWorkflowRequest<'a> {
    pub name: &'a str,
    pub nodes: &'a [JsonValue],
    pub connections: JsonValue,
    // Inactive by default for safety
    pub active: bool,
}

/// Body for trigger updates.
#[derive(Debug, Serialize)]
pub(crate) struct TriggerUpdateRequest<'a> {
    pub trigger: &'a TriggerUpdate,
}

/// Body for activation-state updates.
#[derive(Debug, Serialize)]
pub(crate) struct SetActiveRequest {
    pub active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_workflow_deserializes_engine_shape() {
        let json = r#"{
            "id": "r-1",
            "name": "Daily Backup",
            "nodes": [],
            "connections": {},
            "active": false
        }"#;

        let workflow: RemoteWorkflow = serde_json::from_str(json).expect("deserialize");
        assert_eq!(workflow.id.as_str(), "r-1");
        assert_eq!(workflow.name, "Daily Backup");
        assert!(workflow.nodes.is_empty());
        assert!(!workflow.active);
    }

    #[test]
    fn remote_workflow_tolerates_missing_graph_fields() {
        let json = r#"{"id": "r-2", "name": "Minimal"}"#;
        let workflow: RemoteWorkflow = serde_json::from_str(json).expect("deserialize");
        assert_eq!(workflow.id.as_str(), "r-2");
        assert!(workflow.nodes.is_empty());
    }

    #[test]
    fn trigger_update_wire_shapes() {
        let manual = serde_json::to_value(TriggerUpdate::Manual).expect("serialize");
        assert_eq!(manual, serde_json::json!({"type": "manual"}));

        let schedule = serde_json::to_value(TriggerUpdate::Schedule {
            cron: "0 9 * * *".to_string(),
        })
        .expect("serialize");
        assert_eq!(
            schedule,
            serde_json::json!({"type": "schedule", "cron": "0 9 * * *"})
        );

        let webhook = serde_json::to_value(TriggerUpdate::Webhook).expect("serialize");
        assert_eq!(webhook, serde_json::json!({"type": "webhook"}));
    }

    #[test]
    fn create_request_shape() {
        let request = CreateWorkflowRequest {
            name: "Daily Backup",
            nodes: &[],
            connections: serde_json::json!({}),
            active: false,
        };

        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({
                "name": "Daily Backup",
                "nodes": [],
                "connections": {},
                "active": false
            })
        );
    }

    #[test]
    fn trigger_update_request_nests_under_trigger_key() {
        let trigger = TriggerUpdate::Schedule {
            cron: "30 7 * * *".to_string(),
        };
        let request = TriggerUpdateRequest { trigger: &trigger };

        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({"trigger": {"type": "schedule", "cron": "30 7 * * *"}})
        );
    }
}
