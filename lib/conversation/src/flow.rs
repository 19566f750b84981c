//! The workflow creation state machine.
//!
//! States: `AwaitingName → AwaitingDescription → (created)
//! AwaitingTriggerType → {AwaitingSchedule | AwaitingWebhookAck | done}`.
//! Invalid input re-prompts without a state change; a remote failure
//! during creation re-prompts at the description step (never regressing
//! to the name); cancellation is honored everywhere, but once the
//! workflow is created it stays created and must be deleted explicitly.

use crate::prompt::{Prompt, PromptOption, TurnInput};
use linklet_core::OwnerId;
use linklet_engine::EngineClient;
use linklet_workflow::orchestrator::MIN_NAME_CHARS;
use linklet_workflow::schedule;
use linklet_workflow::{
    Trigger, TriggerChoice, Workflow, WorkflowError, WorkflowOrchestrator, WorkflowRepository,
};
use tracing::debug;

/// Option token that aborts the conversation.
pub const CANCEL_TOKEN: &str = "cancel";

const MANUAL_TOKEN: &str = "manual";
const SCHEDULE_TOKEN: &str = "schedule";
const WEBHOOK_TOKEN: &str = "webhook";
const ACK_TOKEN: &str = "ok";

/// Where the conversation currently stands.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowState {
    /// Waiting for the workflow name.
    AwaitingName,
    /// Name accepted; waiting for the description.
    AwaitingDescription { name: String },
    /// Workflow persisted; waiting for a trigger type selection.
    AwaitingTriggerType { workflow: Workflow },
    /// Waiting for the schedule phrase.
    AwaitingSchedule { workflow: Workflow },
    /// Webhook configured; waiting for acknowledgement.
    AwaitingWebhookAck { workflow: Workflow },
    /// Terminal.
    Done,
}

/// Result of advancing the flow by one turn.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowOutcome {
    /// The next prompt; the flow continues.
    Prompt(Prompt),
    /// The workflow is persisted and its trigger configured.
    Completed(Workflow),
    /// The flow ended early. A workflow created before cancellation
    /// survives and is returned.
    Cancelled { workflow: Option<Workflow> },
}

/// A suspended creation conversation for one owner.
#[derive(Debug, Clone, PartialEq)]
pub struct CreationFlow {
    owner_id: OwnerId,
    state: FlowState,
}

impl CreationFlow {
    /// Starts a new flow for the owner.
    #[must_use]
    pub fn new(owner_id: OwnerId) -> Self {
        Self {
            owner_id,
            state: FlowState::AwaitingName,
        }
    }

    /// Returns the owner this flow belongs to.
    #[must_use]
    pub fn owner_id(&self) -> OwnerId {
        self.owner_id
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Returns true once the flow reached a terminal state.
    #[must_use]
    pub fn is_done(&self) -> bool {
        matches!(self.state, FlowState::Done)
    }

    /// The opening prompt of a fresh flow.
    #[must_use]
    pub fn initial_prompt() -> Prompt {
        Prompt::text("Comment voulez-vous nommer ce workflow ?")
    }

    /// Advances the flow with one turn of input, driving the orchestrator
    /// at the transitions that have side effects.
    pub async fn advance<R, E>(
        &mut self,
        input: TurnInput,
        orchestrator: &WorkflowOrchestrator<R, E>,
    ) -> FlowOutcome
    where
        R: WorkflowRepository,
        E: EngineClient,
    {
        if is_cancel(&input) {
            let workflow = self.created_workflow();
            debug!(owner_id = %self.owner_id, created = workflow.is_some(), "flow cancelled");
            self.state = FlowState::Done;
            return FlowOutcome::Cancelled { workflow };
        }

        match std::mem::replace(&mut self.state, FlowState::Done) {
            FlowState::AwaitingName => self.on_name(input),
            FlowState::AwaitingDescription { name } => {
                self.on_description(name, input, orchestrator).await
            }
            FlowState::AwaitingTriggerType { workflow } => {
                self.on_trigger_type(workflow, input, orchestrator).await
            }
            FlowState::AwaitingSchedule { workflow } => {
                self.on_schedule(workflow, input, orchestrator).await
            }
            FlowState::AwaitingWebhookAck { workflow } => FlowOutcome::Completed(workflow),
            FlowState::Done => FlowOutcome::Cancelled { workflow: None },
        }
    }

    fn on_name(&mut self, input: TurnInput) -> FlowOutcome {
        let TurnInput::Text(name) = input else {
            self.state = FlowState::AwaitingName;
            return FlowOutcome::Prompt(Self::initial_prompt());
        };

        let name = name.trim().to_string();
        if name.chars().count() < MIN_NAME_CHARS {
            self.state = FlowState::AwaitingName;
            return FlowOutcome::Prompt(Prompt::text(format!(
                "Le nom doit faire au moins {MIN_NAME_CHARS} caractères. Essayez encore :"
            )));
        }

        self.state = FlowState::AwaitingDescription { name };
        FlowOutcome::Prompt(Prompt::text("Décrivez ce que fait ce workflow :"))
    }

    async fn on_description<R, E>(
        &mut self,
        name: String,
        input: TurnInput,
        orchestrator: &WorkflowOrchestrator<R, E>,
    ) -> FlowOutcome
    where
        R: WorkflowRepository,
        E: EngineClient,
    {
        let TurnInput::Text(description) = input else {
            self.state = FlowState::AwaitingDescription { name };
            return FlowOutcome::Prompt(Prompt::text("Décrivez ce que fait ce workflow :"));
        };

        let description = description.trim();
        let description = (!description.is_empty()).then(|| description.to_string());

        match orchestrator
            .create_workflow(self.owner_id, &name, description)
            .await
        {
            Ok(workflow) => {
                self.state = FlowState::AwaitingTriggerType {
                    workflow: workflow.clone(),
                };
                FlowOutcome::Prompt(trigger_type_prompt(&workflow))
            }
            Err(error) => {
                // Stay at the description step; the name is already good.
                self.state = FlowState::AwaitingDescription { name };
                FlowOutcome::Prompt(Prompt::text(format!(
                    "La création a échoué : {}. Renvoyez la description pour réessayer.",
                    error_text(&error)
                )))
            }
        }
    }

    async fn on_trigger_type<R, E>(
        &mut self,
        workflow: Workflow,
        input: TurnInput,
        orchestrator: &WorkflowOrchestrator<R, E>,
    ) -> FlowOutcome
    where
        R: WorkflowRepository,
        E: EngineClient,
    {
        let token = match &input {
            TurnInput::Choice(token) => token.as_str(),
            TurnInput::Text(_) => "",
        };

        match token {
            MANUAL_TOKEN => {
                match orchestrator
                    .configure_trigger(workflow.id, self.owner_id, TriggerChoice::Manual)
                    .await
                {
                    Ok(configured) => FlowOutcome::Completed(configured),
                    Err(error) => {
                        self.state = FlowState::AwaitingTriggerType {
                            workflow: workflow.clone(),
                        };
                        FlowOutcome::Prompt(configure_failed_prompt(&workflow, &error))
                    }
                }
            }
            SCHEDULE_TOKEN => {
                self.state = FlowState::AwaitingSchedule { workflow };
                FlowOutcome::Prompt(Prompt::text(
                    "À quelle heure ? (exemple : '9:00 tous les jours')",
                ))
            }
            WEBHOOK_TOKEN => {
                match orchestrator
                    .configure_trigger(workflow.id, self.owner_id, TriggerChoice::Webhook)
                    .await
                {
                    Ok(configured) => {
                        let url = match &configured.trigger {
                            Some(Trigger::Webhook { url }) => url.clone(),
                            _ => String::new(),
                        };
                        self.state = FlowState::AwaitingWebhookAck {
                            workflow: configured,
                        };
                        FlowOutcome::Prompt(Prompt::with_options(
                            format!(
                                "URL du webhook : {url}\nDéclenchez le workflow par un POST sur cette URL."
                            ),
                            vec![PromptOption::new(ACK_TOKEN, "OK")],
                        ))
                    }
                    Err(error) => {
                        self.state = FlowState::AwaitingTriggerType {
                            workflow: workflow.clone(),
                        };
                        FlowOutcome::Prompt(configure_failed_prompt(&workflow, &error))
                    }
                }
            }
            _ => {
                self.state = FlowState::AwaitingTriggerType {
                    workflow: workflow.clone(),
                };
                FlowOutcome::Prompt(trigger_type_prompt(&workflow))
            }
        }
    }

    async fn on_schedule<R, E>(
        &mut self,
        workflow: Workflow,
        input: TurnInput,
        orchestrator: &WorkflowOrchestrator<R, E>,
    ) -> FlowOutcome
    where
        R: WorkflowRepository,
        E: EngineClient,
    {
        let TurnInput::Text(phrase) = input else {
            self.state = FlowState::AwaitingSchedule { workflow };
            return FlowOutcome::Prompt(Prompt::text(
                "À quelle heure ? (exemple : '9:00 tous les jours')",
            ));
        };

        let cron = match schedule::daily_phrase_to_cron(&phrase) {
            Ok(cron) => cron,
            Err(_) => {
                self.state = FlowState::AwaitingSchedule { workflow };
                return FlowOutcome::Prompt(Prompt::text(
                    "Format non supporté. Indiquez par exemple '9:00 tous les jours'.",
                ));
            }
        };

        match orchestrator
            .configure_trigger(workflow.id, self.owner_id, TriggerChoice::Schedule { cron })
            .await
        {
            Ok(configured) => FlowOutcome::Completed(configured),
            Err(error) => {
                self.state = FlowState::AwaitingSchedule {
                    workflow: workflow.clone(),
                };
                FlowOutcome::Prompt(Prompt::text(format!(
                    "La configuration du planning a échoué : {}. Réessayez.",
                    error_text(&error)
                )))
            }
        }
    }

    /// The workflow already persisted by this flow, if any.
    fn created_workflow(&self) -> Option<Workflow> {
        match &self.state {
            FlowState::AwaitingTriggerType { workflow }
            | FlowState::AwaitingSchedule { workflow }
            | FlowState::AwaitingWebhookAck { workflow } => Some(workflow.clone()),
            _ => None,
        }
    }
}

fn is_cancel(input: &TurnInput) -> bool {
    match input {
        TurnInput::Choice(token) => token == CANCEL_TOKEN,
        TurnInput::Text(text) => text.trim().eq_ignore_ascii_case("/cancel"),
    }
}

fn trigger_type_prompt(workflow: &Workflow) -> Prompt {
    Prompt::with_options(
        format!(
            "Workflow '{}' créé. Quand doit-il s'exécuter ?",
            workflow.name
        ),
        vec![
            PromptOption::new(MANUAL_TOKEN, "Manuellement"),
            PromptOption::new(SCHEDULE_TOKEN, "À heure fixe"),
            PromptOption::new(WEBHOOK_TOKEN, "Via une URL (webhook)"),
            PromptOption::new(CANCEL_TOKEN, "Annuler"),
        ],
    )
}

fn configure_failed_prompt(workflow: &Workflow, error: &WorkflowError) -> Prompt {
    let mut prompt = trigger_type_prompt(workflow);
    prompt.text = format!(
        "La configuration a échoué : {}. Choisissez à nouveau un déclencheur.",
        error_text(error)
    );
    prompt
}

/// User-facing error text. Engine rejections are surfaced verbatim;
/// everything unexpected collapses to a generic technical failure.
fn error_text(error: &WorkflowError) -> String {
    match error {
        WorkflowError::InvalidInput { reason } => reason.clone(),
        WorkflowError::RemoteUnavailable { .. } => {
            "le moteur d'automatisation est injoignable".to_string()
        }
        WorkflowError::RemoteRejected { message, .. } => message.clone(),
        WorkflowError::NotFound { .. } => "workflow introuvable".to_string(),
        WorkflowError::NotActive { .. } => "workflow inactif".to_string(),
        WorkflowError::Storage { .. } => "erreur technique".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use linklet_core::RemoteWorkflowId;
    use linklet_engine::{EngineError, TriggerUpdate};
    use linklet_workflow::InMemoryWorkflowRepository;
    use serde_json::Value as JsonValue;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Minimal engine double; failures are toggled per call kind.
    #[derive(Clone, Default)]
    struct ScriptedEngine {
        created: Arc<AtomicUsize>,
        trigger_updates: Arc<AtomicUsize>,
        fail_create: Arc<AtomicBool>,
        fail_update_trigger: Arc<AtomicBool>,
    }

    #[async_trait]
    impl EngineClient for ScriptedEngine {
        async fn create(
            &self,
            _name: &str,
            _actions: &[JsonValue],
        ) -> Result<RemoteWorkflowId, EngineError> {
            if self.fail_create.load(Ordering::SeqCst) {
                return Err(EngineError::Unavailable {
                    reason: "down".to_string(),
                });
            }
            let n = self.created.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(RemoteWorkflowId::new(format!("r-{n}")))
        }

        async fn update_trigger(
            &self,
            _remote_id: &RemoteWorkflowId,
            _trigger: &TriggerUpdate,
        ) -> Result<(), EngineError> {
            if self.fail_update_trigger.load(Ordering::SeqCst) {
                return Err(EngineError::Unavailable {
                    reason: "down".to_string(),
                });
            }
            self.trigger_updates.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn set_active(
            &self,
            _remote_id: &RemoteWorkflowId,
            _active: bool,
        ) -> Result<(), EngineError> {
            Ok(())
        }

        async fn execute(
            &self,
            _remote_id: &RemoteWorkflowId,
            _payload: Option<&JsonValue>,
        ) -> Result<JsonValue, EngineError> {
            Ok(serde_json::json!({}))
        }

        async fn delete(&self, _remote_id: &RemoteWorkflowId) -> Result<(), EngineError> {
            Ok(())
        }
    }

    fn setup() -> (
        WorkflowOrchestrator<InMemoryWorkflowRepository, ScriptedEngine>,
        ScriptedEngine,
        InMemoryWorkflowRepository,
    ) {
        let repository = InMemoryWorkflowRepository::new();
        let engine = ScriptedEngine::default();
        let orchestrator = WorkflowOrchestrator::new(
            repository.clone(),
            engine.clone(),
            "https://hooks.example.com",
        );
        (orchestrator, engine, repository)
    }

    fn owner() -> OwnerId {
        OwnerId::from_i64(42)
    }

    fn text(value: &str) -> TurnInput {
        TurnInput::Text(value.to_string())
    }

    fn choice(value: &str) -> TurnInput {
        TurnInput::Choice(value.to_string())
    }

    async fn flow_at_trigger_selection(
        orchestrator: &WorkflowOrchestrator<InMemoryWorkflowRepository, ScriptedEngine>,
    ) -> CreationFlow {
        let mut flow = CreationFlow::new(owner());
        flow.advance(text("Daily Backup"), orchestrator).await;
        let outcome = flow.advance(text("backs up files"), orchestrator).await;
        assert!(matches!(outcome, FlowOutcome::Prompt(_)));
        flow
    }

    #[tokio::test]
    async fn short_name_reprompts_without_state_change() {
        let (orchestrator, _, _) = setup();
        let mut flow = CreationFlow::new(owner());

        let outcome = flow.advance(text("ab"), &orchestrator).await;
        assert!(matches!(outcome, FlowOutcome::Prompt(_)));
        assert_eq!(flow.state(), &FlowState::AwaitingName);

        let outcome = flow.advance(text("Daily Backup"), &orchestrator).await;
        assert!(matches!(outcome, FlowOutcome::Prompt(_)));
        assert!(matches!(
            flow.state(),
            FlowState::AwaitingDescription { .. }
        ));
    }

    #[tokio::test]
    async fn cancel_before_creation_has_no_side_effects() {
        let (orchestrator, engine, repository) = setup();
        let mut flow = CreationFlow::new(owner());
        flow.advance(text("Daily Backup"), &orchestrator).await;

        let outcome = flow.advance(choice(CANCEL_TOKEN), &orchestrator).await;
        assert_eq!(outcome, FlowOutcome::Cancelled { workflow: None });
        assert!(flow.is_done());

        // Nothing persisted anywhere before the Created state.
        assert_eq!(engine.created.load(Ordering::SeqCst), 0);
        assert!(
            repository
                .find_by_owner(owner())
                .await
                .expect("list")
                .is_empty()
        );
    }

    #[tokio::test]
    async fn creation_failure_stays_at_description() {
        let (orchestrator, engine, _) = setup();
        engine.fail_create.store(true, Ordering::SeqCst);

        let mut flow = CreationFlow::new(owner());
        flow.advance(text("Daily Backup"), &orchestrator).await;
        let outcome = flow.advance(text("backs up files"), &orchestrator).await;

        let FlowOutcome::Prompt(prompt) = outcome else {
            panic!("expected a re-prompt");
        };
        assert!(prompt.text.contains("injoignable"));
        assert!(matches!(
            flow.state(),
            FlowState::AwaitingDescription { .. }
        ));

        // Retrying the description succeeds once the engine is back.
        engine.fail_create.store(false, Ordering::SeqCst);
        let outcome = flow.advance(text("backs up files"), &orchestrator).await;
        assert!(matches!(outcome, FlowOutcome::Prompt(_)));
        assert!(matches!(
            flow.state(),
            FlowState::AwaitingTriggerType { .. }
        ));
    }

    #[tokio::test]
    async fn manual_trigger_completes_immediately() {
        let (orchestrator, _, _) = setup();
        let mut flow = flow_at_trigger_selection(&orchestrator).await;

        let outcome = flow.advance(choice("manual"), &orchestrator).await;
        let FlowOutcome::Completed(workflow) = outcome else {
            panic!("expected completion");
        };
        assert_eq!(workflow.trigger, Some(Trigger::Manual));
    }

    #[tokio::test]
    async fn schedule_path_converts_daily_phrase() {
        let (orchestrator, _, _) = setup();
        let mut flow = flow_at_trigger_selection(&orchestrator).await;

        let outcome = flow.advance(choice("schedule"), &orchestrator).await;
        assert!(matches!(outcome, FlowOutcome::Prompt(_)));

        let outcome = flow
            .advance(text("9:00 tous les jours"), &orchestrator)
            .await;
        let FlowOutcome::Completed(workflow) = outcome else {
            panic!("expected completion");
        };
        assert_eq!(
            workflow.trigger,
            Some(Trigger::Schedule {
                cron: "0 9 * * *".to_string()
            })
        );
    }

    #[tokio::test]
    async fn unsupported_schedule_phrase_reprompts() {
        let (orchestrator, engine, _) = setup();
        let mut flow = flow_at_trigger_selection(&orchestrator).await;
        flow.advance(choice("schedule"), &orchestrator).await;

        let outcome = flow
            .advance(text("tous les jours à 9h"), &orchestrator)
            .await;
        assert!(matches!(outcome, FlowOutcome::Prompt(_)));
        assert!(matches!(flow.state(), FlowState::AwaitingSchedule { .. }));
        // The rejected phrase never reaches the engine.
        assert_eq!(engine.trigger_updates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn webhook_path_shows_derived_url_then_completes() {
        let (orchestrator, _, _) = setup();
        let mut flow = flow_at_trigger_selection(&orchestrator).await;

        let outcome = flow.advance(choice("webhook"), &orchestrator).await;
        let FlowOutcome::Prompt(prompt) = outcome else {
            panic!("expected webhook prompt");
        };
        assert!(prompt.text.contains("https://hooks.example.com/workflow/"));
        assert!(prompt.offers("ok"));

        let outcome = flow.advance(choice("ok"), &orchestrator).await;
        let FlowOutcome::Completed(workflow) = outcome else {
            panic!("expected completion");
        };
        assert!(matches!(workflow.trigger, Some(Trigger::Webhook { .. })));
    }

    #[tokio::test]
    async fn cancel_after_creation_keeps_the_workflow() {
        let (orchestrator, _, _) = setup();
        let mut flow = flow_at_trigger_selection(&orchestrator).await;

        let outcome = flow.advance(choice(CANCEL_TOKEN), &orchestrator).await;
        let FlowOutcome::Cancelled { workflow: Some(w) } = outcome else {
            panic!("expected cancellation with surviving workflow");
        };

        let listed = orchestrator.list_workflows(owner()).await.expect("list");
        assert_eq!(listed, vec![w]);
    }

    #[tokio::test]
    async fn unknown_choice_reprompts_trigger_selection() {
        let (orchestrator, _, _) = setup();
        let mut flow = flow_at_trigger_selection(&orchestrator).await;

        let outcome = flow.advance(choice("nonsense"), &orchestrator).await;
        let FlowOutcome::Prompt(prompt) = outcome else {
            panic!("expected re-prompt");
        };
        assert!(prompt.offers("manual"));
        assert!(prompt.offers("schedule"));
        assert!(prompt.offers("webhook"));
    }

    #[tokio::test]
    async fn configure_failure_returns_to_trigger_selection() {
        let (orchestrator, engine, _) = setup();
        let mut flow = flow_at_trigger_selection(&orchestrator).await;

        engine.fail_update_trigger.store(true, Ordering::SeqCst);
        let outcome = flow.advance(choice("manual"), &orchestrator).await;
        let FlowOutcome::Prompt(prompt) = outcome else {
            panic!("expected re-prompt");
        };
        assert!(prompt.offers("manual"));
        assert!(matches!(
            flow.state(),
            FlowState::AwaitingTriggerType { .. }
        ));
    }
}
