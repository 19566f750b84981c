//! HTTP surface for the chat transport adapter.
//!
//! Every request body carries the caller's transport-supplied identity.
//! Handlers share one gate: rate limiting first, then user
//! auto-registration, then the operation itself.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use linklet_ai::{ChatMessage, ChatOptions};
use linklet_conversation::{FlowOutcome, Prompt, TurnInput};
use linklet_core::WorkflowId;
use linklet_platform_access::{RateLimitResult, UserDirectory, UserProfile};
use linklet_workflow::{TriggerChoice, Workflow, schedule};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::str::FromStr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// System prompt for the assistant persona.
const CHAT_SYSTEM_PROMPT: &str = "Tu es Linklet, un assistant spécialisé dans l'automatisation \
     et les workflows. Réponds de manière concise et utile en français.";

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/conversation", post(begin_conversation))
        .route("/conversation/turn", post(advance_conversation))
        .route("/workflows/list", post(list_workflows))
        .route("/workflows/{id}/trigger", post(configure_trigger))
        .route("/workflows/{id}/activate", post(activate_workflow))
        .route("/workflows/{id}/deactivate", post(deactivate_workflow))
        .route("/workflows/{id}/execute", post(execute_workflow))
        .route("/workflows/{id}/delete", post(delete_workflow))
        .route("/chat", post(chat))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Request carrying only the caller identity.
#[derive(Debug, Deserialize)]
pub struct CallerRequest {
    /// Transport-supplied identity.
    pub caller: UserProfile,
}

/// One conversation turn.
#[derive(Debug, Deserialize)]
pub struct TurnRequest {
    pub caller: UserProfile,
    pub input: TurnInput,
}

/// Trigger configuration request.
#[derive(Debug, Deserialize)]
pub struct TriggerRequest {
    pub caller: UserProfile,
    pub trigger: TriggerSelection,
}

/// The transport's trigger selection; schedules arrive as the user's
/// natural-language phrase and are converted server-side.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriggerSelection {
    Manual,
    Schedule { phrase: String },
    Webhook,
}

/// Execution request with an optional payload forwarded to the engine.
#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    pub caller: UserProfile,
    #[serde(default)]
    pub payload: Option<JsonValue>,
}

/// AI chat request.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub caller: UserProfile,
    pub message: String,
}

/// Outcome of a conversation turn.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TurnResponse {
    Prompt { prompt: Prompt },
    Completed { workflow: Workflow },
    Cancelled { workflow: Option<Workflow> },
}

/// Owned workflows, in creation order.
#[derive(Debug, Serialize)]
pub struct WorkflowListResponse {
    pub workflows: Vec<Workflow>,
}

/// A single workflow after a mutation.
#[derive(Debug, Serialize)]
pub struct WorkflowResponse {
    pub workflow: Workflow,
}

/// The engine's opaque execution result.
#[derive(Debug, Serialize)]
pub struct ExecutionResponse {
    pub result: JsonValue,
}

/// Deletion acknowledgement.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

/// AI chat reply.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Rate-limits and registers the caller; runs before every operation.
async fn gate(state: &AppState, caller: &UserProfile) -> Result<(), ApiError> {
    if let RateLimitResult::Exceeded { retry_after, .. } =
        state.limiter.check_and_increment(caller.id)
    {
        return Err(ApiError::RateLimited {
            retry_after_secs: retry_after.num_seconds().max(1),
        });
    }

    state.users.ensure_registered(caller).await.map_err(|e| {
        tracing::error!(error = %e, owner_id = %caller.id, "user registration failed");
        ApiError::Internal
    })?;

    Ok(())
}

fn parse_workflow_id(raw: &str) -> Result<WorkflowId, ApiError> {
    WorkflowId::from_str(raw).map_err(|_| ApiError::InvalidInput {
        reason: format!("invalid workflow id '{raw}'"),
    })
}

fn trigger_choice(selection: TriggerSelection) -> Result<TriggerChoice, ApiError> {
    match selection {
        TriggerSelection::Manual => Ok(TriggerChoice::Manual),
        TriggerSelection::Schedule { phrase } => {
            let cron =
                schedule::daily_phrase_to_cron(&phrase).map_err(|e| ApiError::InvalidInput {
                    reason: e.to_string(),
                })?;
            Ok(TriggerChoice::Schedule { cron })
        }
        TriggerSelection::Webhook => Ok(TriggerChoice::Webhook),
    }
}

async fn begin_conversation(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CallerRequest>,
) -> Result<Json<TurnResponse>, ApiError> {
    gate(&state, &request.caller).await?;

    let prompt = state.sessions.begin(request.caller.id);
    Ok(Json(TurnResponse::Prompt { prompt }))
}

async fn advance_conversation(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TurnRequest>,
) -> Result<Json<TurnResponse>, ApiError> {
    gate(&state, &request.caller).await?;

    let mut flow = state.sessions.take(request.caller.id)?;
    let outcome = flow.advance(request.input, &state.orchestrator).await;

    let response = match outcome {
        FlowOutcome::Prompt(prompt) => {
            // Suspend again only while the flow is still in progress.
            state.sessions.suspend(flow);
            TurnResponse::Prompt { prompt }
        }
        FlowOutcome::Completed(workflow) => TurnResponse::Completed { workflow },
        FlowOutcome::Cancelled { workflow } => TurnResponse::Cancelled { workflow },
    };
    Ok(Json(response))
}

async fn list_workflows(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CallerRequest>,
) -> Result<Json<WorkflowListResponse>, ApiError> {
    gate(&state, &request.caller).await?;

    let workflows = state.orchestrator.list_workflows(request.caller.id).await?;
    Ok(Json(WorkflowListResponse { workflows }))
}

async fn configure_trigger(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<TriggerRequest>,
) -> Result<Json<WorkflowResponse>, ApiError> {
    gate(&state, &request.caller).await?;

    let workflow_id = parse_workflow_id(&id)?;
    let choice = trigger_choice(request.trigger)?;
    let workflow = state
        .orchestrator
        .configure_trigger(workflow_id, request.caller.id, choice)
        .await?;
    Ok(Json(WorkflowResponse { workflow }))
}

async fn activate_workflow(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<CallerRequest>,
) -> Result<Json<WorkflowResponse>, ApiError> {
    gate(&state, &request.caller).await?;

    let workflow_id = parse_workflow_id(&id)?;
    let workflow = state
        .orchestrator
        .activate_workflow(workflow_id, request.caller.id)
        .await?;
    Ok(Json(WorkflowResponse { workflow }))
}

async fn deactivate_workflow(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<CallerRequest>,
) -> Result<Json<WorkflowResponse>, ApiError> {
    gate(&state, &request.caller).await?;

    let workflow_id = parse_workflow_id(&id)?;
    let workflow = state
        .orchestrator
        .deactivate_workflow(workflow_id, request.caller.id)
        .await?;
    Ok(Json(WorkflowResponse { workflow }))
}

async fn execute_workflow(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<ExecuteRequest>,
) -> Result<Json<ExecutionResponse>, ApiError> {
    gate(&state, &request.caller).await?;

    let workflow_id = parse_workflow_id(&id)?;
    let result = state
        .orchestrator
        .execute_workflow(workflow_id, request.caller.id, request.payload)
        .await?;
    Ok(Json(ExecutionResponse { result }))
}

async fn delete_workflow(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<CallerRequest>,
) -> Result<Json<DeleteResponse>, ApiError> {
    gate(&state, &request.caller).await?;

    let workflow_id = parse_workflow_id(&id)?;
    state
        .orchestrator
        .delete_workflow(workflow_id, request.caller.id)
        .await?;
    Ok(Json(DeleteResponse { deleted: true }))
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    gate(&state, &request.caller).await?;

    let messages = [
        ChatMessage::system(CHAT_SYSTEM_PROMPT),
        ChatMessage::user(request.message),
    ];
    let options = ChatOptions::default()
        .with_temperature(0.7)
        .with_max_tokens(500);

    let reply = state
        .chat
        .generate_chat_response(&messages, &options)
        .await
        .map_err(|e| {
            // Provider failures are all technical from the user's side.
            tracing::warn!(error = %e, "chat completion failed");
            ApiError::Internal
        })?;

    Ok(Json(ChatResponse { reply }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_selection_deserializes() {
        let manual: TriggerSelection =
            serde_json::from_value(serde_json::json!({"type": "manual"})).expect("deserialize");
        assert_eq!(manual, TriggerSelection::Manual);

        let schedule: TriggerSelection = serde_json::from_value(
            serde_json::json!({"type": "schedule", "phrase": "9:00 tous les jours"}),
        )
        .expect("deserialize");
        assert_eq!(
            schedule,
            TriggerSelection::Schedule {
                phrase: "9:00 tous les jours".to_string()
            }
        );
    }

    #[test]
    fn schedule_phrase_converts_to_cron_choice() {
        let choice = trigger_choice(TriggerSelection::Schedule {
            phrase: "9:00 tous les jours".to_string(),
        })
        .expect("supported phrase");
        assert_eq!(
            choice,
            TriggerChoice::Schedule {
                cron: "0 9 * * *".to_string()
            }
        );
    }

    #[test]
    fn unsupported_phrase_is_invalid_input() {
        let err = trigger_choice(TriggerSelection::Schedule {
            phrase: "tous les jours à 9h".to_string(),
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput { .. }));
    }

    #[test]
    fn malformed_workflow_id_is_invalid_input() {
        let err = parse_workflow_id("not_an_id").unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput { .. }));

        let id = WorkflowId::new();
        assert_eq!(parse_workflow_id(&id.to_string()).expect("parse"), id);
    }

    #[test]
    fn turn_response_serializes_with_status_tag() {
        let response = TurnResponse::Prompt {
            prompt: Prompt::text("Comment voulez-vous nommer ce workflow ?"),
        };
        let value = serde_json::to_value(&response).expect("serialize");
        assert_eq!(value["status"], "prompt");
        assert!(value["prompt"]["text"].is_string());
    }
}
