//! Tollgate state machine
//!
//! Drives one session's application through `Intake(step)` → `Reviewing` →
//! `Finalized`. [`TollgateStateMachine::advance`] is the single per-turn entry
//! point:
//!
//! 1. Undelivered scripted prompts of the current phase go out first, one per
//!    turn, verbatim and in order. The reply to a scripted prompt is recorded
//!    in the transcript but not mined for fields.
//! 2. In `Intake`, the message is merged by the [`FieldCollector`]; the
//!    earliest unmet required field is requested, or the machine moves to
//!    `Reviewing` once every required field is present.
//! 3. In `Reviewing`, the record is submitted, reviewed and decided within
//!    the turn, and the machine moves to `Finalized`.
//! 4. In `Finalized`, every turn answers with a fixed message.

use crate::ports::application_repository::ApplicationRepository;
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::use_cases::collect_fields::FieldCollector;
use crate::use_cases::review_application::ReviewCoordinator;
use permitflow_domain::{
    ApplicationRecord, ConsensusEngine, ConsensusResult, ConversationText, DomainError,
    PermitCatalog, PermitDefinition, TollgatePhase, TollgateState, Transcript,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Shared collaborators of every session's workflow
///
/// Built once at startup and cloned into each session.
#[derive(Clone)]
pub struct WorkflowServices {
    pub catalog: Arc<PermitCatalog>,
    pub collector: Arc<FieldCollector>,
    pub coordinator: Arc<ReviewCoordinator>,
    pub engine: Arc<ConsensusEngine>,
    pub repository: Arc<dyn ApplicationRepository>,
    pub conversation_logger: Arc<dyn ConversationLogger>,
    /// Transcript bound; matches the hub's history capacity
    pub transcript_capacity: usize,
}

/// Per-session tollgate workflow
pub struct TollgateStateMachine {
    session_id: String,
    services: WorkflowServices,
    definition: Option<PermitDefinition>,
    record: Option<ApplicationRecord>,
    state: TollgateState,
    transcript: Transcript,
    outcome: Option<ConsensusResult>,
}

impl TollgateStateMachine {
    pub fn new(session_id: impl Into<String>, services: WorkflowServices) -> Self {
        let transcript = Transcript::with_capacity(services.transcript_capacity);
        Self {
            session_id: session_id.into(),
            services,
            definition: None,
            record: None,
            state: TollgateState::initial(),
            transcript,
            outcome: None,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn state(&self) -> TollgateState {
        self.state
    }

    pub fn record(&self) -> Option<&ApplicationRecord> {
        self.record.as_ref()
    }

    /// The consensus of the finished review cycle, once finalized
    pub fn outcome(&self) -> Option<&ConsensusResult> {
        self.outcome.as_ref()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn catalog(&self) -> &PermitCatalog {
        &self.services.catalog
    }

    /// Whether an application has been started in this session
    pub fn is_active(&self) -> bool {
        self.record.is_some()
    }

    /// Start a fresh application of `permit_type` at `Intake(1)`.
    ///
    /// Returns the greeting: the first scripted Intake prompt, or a default
    /// opener followed by the first field request.
    pub async fn start(&mut self, permit_type: &str) -> Result<String, DomainError> {
        let definition = self.services.catalog.lookup(permit_type)?.clone();
        let record = ApplicationRecord::new(&self.session_id, &definition.name);

        info!(
            "Session {}: starting application {} ({})",
            self.session_id,
            record.id(),
            definition.name
        );
        self.services.conversation_logger.log(ConversationEvent::new(
            "application_started",
            serde_json::json!({
                "application_id": record.id().to_string(),
                "session_id": self.session_id,
                "permit_type": definition.name,
            }),
        ));

        self.state = TollgateState::initial();
        self.transcript.clear();
        self.outcome = None;
        self.record = Some(record);
        self.definition = Some(definition);

        let greeting = match self.prompt_at(TollgatePhase::Intake, 0) {
            Some(prompt) => prompt,
            None => {
                let opener = ConversationText::application_started(self.permit_type());
                format!("{} {}", opener, self.intake_reply()?)
            }
        };

        self.persist().await;
        self.transcript.push_bot(&greeting);
        Ok(greeting)
    }

    /// Process one user turn and return the reply.
    pub async fn advance(&mut self, message: &str) -> Result<String, DomainError> {
        if self.record.is_none() {
            return Err(DomainError::NoActiveApplication);
        }

        self.transcript.push_user(message);
        let phase = self.state.phase();

        let reply = if let Some(prompt) = self.next_scripted_prompt(phase) {
            debug!("Session {}: scripted prompt {}", self.session_id, self.state);
            self.state.next_step();
            prompt
        } else {
            match phase {
                TollgatePhase::Intake => self.intake_turn(message).await?,
                TollgatePhase::Reviewing => self.review_turn().await?,
                TollgatePhase::Finalized => ConversationText::process_complete().to_string(),
            }
        };

        self.transcript.push_bot(&reply);
        Ok(reply)
    }

    async fn intake_turn(&mut self, message: &str) -> Result<String, DomainError> {
        let (Some(record), Some(definition)) = (self.record.as_mut(), self.definition.as_ref())
        else {
            return Err(DomainError::NoActiveApplication);
        };

        let outcome = self
            .services
            .collector
            .merge(record, definition, message, &self.transcript)
            .await?;

        if outcome.has_changes() {
            self.persist().await;
        }

        self.intake_reply()
    }

    /// Ask for the earliest missing field, or enter `Reviewing` when none remain
    fn intake_reply(&mut self) -> Result<String, DomainError> {
        let (Some(record), Some(definition)) = (self.record.as_ref(), self.definition.as_ref())
        else {
            return Err(DomainError::NoActiveApplication);
        };

        if let Some(field) = definition.next_missing_field(record) {
            debug!("Session {}: requesting field {}", self.session_id, field.name);
            return Ok(ConversationText::ask_for_field(field));
        }

        info!(
            "Session {}: all required fields collected for {}",
            self.session_id,
            record.id()
        );
        self.state.enter(TollgatePhase::Reviewing);
        Ok(self
            .prompt_at(TollgatePhase::Reviewing, 0)
            .unwrap_or_else(|| ConversationText::ready_to_submit().to_string()))
    }

    async fn review_turn(&mut self) -> Result<String, DomainError> {
        let Some(record) = self.record.as_mut() else {
            return Err(DomainError::NoActiveApplication);
        };

        record.submit()?;
        record.begin_review()?;
        self.services.conversation_logger.log(ConversationEvent::new(
            "application_submitted",
            serde_json::json!({
                "application_id": record.id().to_string(),
                "session_id": self.session_id,
                "fields": record.fields(),
            }),
        ));
        self.persist().await;

        let Some(record) = self.record.as_mut() else {
            return Err(DomainError::NoActiveApplication);
        };
        let verdicts = self.services.coordinator.review(record).await;
        let errors = verdicts.error_count();
        if errors > 0 {
            warn!(
                "Session {}: {} of {} reviewer(s) gave no usable verdict for {}",
                self.session_id,
                errors,
                verdicts.len(),
                record.id()
            );
        }
        let result = self.services.engine.decide_set(&verdicts);

        for verdict in &result.verdicts {
            record.record_reviewer_decision(&verdict.reviewer, verdict.decision.as_str())?;
        }
        record.conclude(result.is_approved())?;

        info!(
            "Session {}: application {} decided {}{}",
            self.session_id,
            record.id(),
            result.decision,
            result
                .vetoed_by
                .as_deref()
                .map(|r| format!(" (vetoed by {r})"))
                .unwrap_or_default()
        );
        self.services.conversation_logger.log(ConversationEvent::new(
            "consensus_reached",
            serde_json::json!({
                "application_id": record.id().to_string(),
                "session_id": self.session_id,
                "decision": result.decision,
                "vetoed_by": result.vetoed_by,
                "score": result.score,
            }),
        ));

        self.state.enter(TollgatePhase::Finalized);
        let finalize = self
            .prompt_at(TollgatePhase::Finalized, 0)
            .unwrap_or_else(|| ConversationText::default_finalize().to_string());

        let summary = match self.record.as_ref() {
            Some(record) => ConversationText::final_summary(&finalize, record, &result),
            None => finalize,
        };
        self.outcome = Some(result);
        self.persist().await;
        Ok(summary)
    }

    /// Undelivered scripted prompt of the current phase, if any
    fn next_scripted_prompt(&self, phase: TollgatePhase) -> Option<String> {
        if phase.is_terminal() {
            return None;
        }
        let definition = self.definition.as_ref()?;
        let prompts = definition.prompts_for(phase.number());
        if self.state.has_unseen_prompt(prompts.len()) {
            prompts.get(self.state.next_prompt_index()).cloned()
        } else {
            None
        }
    }

    fn prompt_at(&self, phase: TollgatePhase, index: usize) -> Option<String> {
        self.definition
            .as_ref()?
            .prompts_for(phase.number())
            .get(index)
            .cloned()
    }

    fn permit_type(&self) -> &str {
        self.record
            .as_ref()
            .map(ApplicationRecord::permit_type)
            .unwrap_or_default()
    }

    async fn persist(&self) {
        let Some(record) = self.record.as_ref() else {
            return;
        };
        if let Err(e) = self.services.repository.save(record).await {
            warn!("Failed to save application {}: {}", record.id(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReviewParams;
    use crate::ports::application_repository::{NoApplicationRepository, RepositoryError};
    use crate::ports::conversation_logger::NoConversationLogger;
    use crate::ports::field_extractor::NoFieldExtractor;
    use crate::ports::reviewer::{Reviewer, ReviewerError};
    use async_trait::async_trait;
    use permitflow_domain::{
        ApplicationId, ApplicationStatus, Decision, FinalDecision, RequiredField, ReviewVerdict,
    };
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedReviewer {
        id: &'static str,
        decision: Decision,
        confidence: f64,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Reviewer for FixedReviewer {
        fn id(&self) -> &str {
            self.id
        }

        async fn review(&self, _application: &str) -> Result<ReviewVerdict, ReviewerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.decision {
                Decision::Error => Err(ReviewerError::Failed("unreachable".into())),
                decision => Ok(ReviewVerdict::new(self.id, decision, self.confidence, "noted")),
            }
        }
    }

    #[derive(Default)]
    struct RecordingRepository {
        saved: Mutex<HashMap<ApplicationId, ApplicationRecord>>,
    }

    #[async_trait]
    impl ApplicationRepository for RecordingRepository {
        async fn save(&self, record: &ApplicationRecord) -> Result<(), RepositoryError> {
            self.saved.lock().unwrap().insert(record.id(), record.clone());
            Ok(())
        }

        async fn get(&self, id: ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
            Ok(self.saved.lock().unwrap().get(&id).cloned())
        }

        async fn remove(&self, id: ApplicationId) -> Result<(), RepositoryError> {
            self.saved.lock().unwrap().remove(&id);
            Ok(())
        }
    }

    fn catalog() -> PermitCatalog {
        PermitCatalog::new(vec![
            PermitDefinition::new(
                "Permit to Build",
                vec![
                    RequiredField::new("project_name"),
                    RequiredField::new("owner"),
                    RequiredField::new("budget").with_question("What is the estimated budget?"),
                ],
            ),
            PermitDefinition::new("Permit to Design", vec![RequiredField::new("project_name")])
                .with_phase_prompts(vec![
                    vec!["Welcome to design intake.".into(), "Any prior designs?".into()],
                    vec!["Please confirm submission.".into()],
                    vec!["Thank you for applying.".into()],
                ]),
        ])
    }

    fn services_with(
        reviewers: Vec<Arc<dyn Reviewer>>,
        repository: Arc<dyn ApplicationRepository>,
    ) -> WorkflowServices {
        WorkflowServices {
            catalog: Arc::new(catalog()),
            collector: Arc::new(FieldCollector::new(Arc::new(NoFieldExtractor))),
            coordinator: Arc::new(ReviewCoordinator::new(reviewers, ReviewParams::default())),
            engine: Arc::new(ConsensusEngine::default()),
            repository,
            conversation_logger: Arc::new(NoConversationLogger),
            transcript_capacity: 20,
        }
    }

    fn approving_reviewers(calls: &Arc<AtomicUsize>) -> Vec<Arc<dyn Reviewer>> {
        ["cyber", "infra", "architecture"]
            .into_iter()
            .map(|id| {
                Arc::new(FixedReviewer {
                    id,
                    decision: Decision::Approve,
                    confidence: 0.9,
                    calls: Arc::clone(calls),
                }) as Arc<dyn Reviewer>
            })
            .collect()
    }

    fn machine(calls: &Arc<AtomicUsize>) -> TollgateStateMachine {
        TollgateStateMachine::new(
            "s1",
            services_with(approving_reviewers(calls), Arc::new(NoApplicationRepository)),
        )
    }

    #[tokio::test]
    async fn test_start_unknown_permit_type() {
        let mut sm = machine(&Arc::new(AtomicUsize::new(0)));
        let err = sm.start("Permit to Fly").await.unwrap_err();
        assert!(matches!(err, DomainError::UnknownPermitType(_)));
        assert!(!sm.is_active());
    }

    #[tokio::test]
    async fn test_advance_without_application() {
        let mut sm = machine(&Arc::new(AtomicUsize::new(0)));
        assert_eq!(
            sm.advance("hello").await.unwrap_err(),
            DomainError::NoActiveApplication
        );
    }

    #[tokio::test]
    async fn test_start_asks_first_field() {
        let mut sm = machine(&Arc::new(AtomicUsize::new(0)));
        let greeting = sm.start("permit to build").await.unwrap();
        assert_eq!(
            greeting,
            "Starting a new Permit to Build application. Could you tell me the project name?"
        );
        assert_eq!(sm.state(), TollgateState::initial());
        assert_eq!(sm.record().unwrap().permit_type(), "Permit to Build");
    }

    #[tokio::test]
    async fn test_fields_requested_in_declaration_order() {
        let mut sm = machine(&Arc::new(AtomicUsize::new(0)));
        sm.start("Permit to Build").await.unwrap();

        // Supplying a later field first still asks for the earliest unmet one
        let reply = sm.advance("owner: Dana").await.unwrap();
        assert_eq!(reply, "Could you tell me the project name?");

        let reply = sm.advance("nothing useful").await.unwrap();
        assert_eq!(reply, "Could you tell me the project name?");

        let reply = sm.advance("project name: Atlas").await.unwrap();
        assert_eq!(reply, "What is the estimated budget?");
        assert_eq!(sm.state().phase(), TollgatePhase::Intake);
    }

    #[tokio::test]
    async fn test_full_flow_reviews_once_and_finalizes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let repository = Arc::new(RecordingRepository::default());
        let mut sm = TollgateStateMachine::new(
            "s1",
            services_with(approving_reviewers(&calls), repository.clone()),
        );
        sm.start("Permit to Build").await.unwrap();

        let reply = sm
            .advance("project_name: Atlas\nowner: Dana\nbudget: 10k")
            .await
            .unwrap();
        assert_eq!(reply, ConversationText::ready_to_submit());
        assert_eq!(sm.state().phase(), TollgatePhase::Reviewing);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let summary = sm.advance("submit").await.unwrap();
        assert!(summary.contains("=== Application Summary ==="));
        assert!(summary.contains("Final decision: APPROVE"));
        assert_eq!(sm.state().phase(), TollgatePhase::Finalized);
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        let id = sm.record().unwrap().id();
        assert_eq!(sm.record().unwrap().status(), ApplicationStatus::Approved);
        assert_eq!(sm.outcome().unwrap().decision, FinalDecision::Approve);

        // Finalized never re-enters review
        let reply = sm.advance("again please").await.unwrap();
        assert_eq!(reply, ConversationText::process_complete());
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        let stored = repository.get(id).await.unwrap().unwrap();
        assert_eq!(stored.status(), ApplicationStatus::Approved);
    }

    #[tokio::test]
    async fn test_mixed_case_field_names_complete_intake() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut services = services_with(approving_reviewers(&calls), Arc::new(NoApplicationRepository));
        services.catalog = Arc::new(PermitCatalog::new(vec![PermitDefinition::new(
            "Permit to Ship",
            vec![RequiredField::new("Owner"), RequiredField::new("tech-stack")],
        )]));
        let mut sm = TollgateStateMachine::new("s1", services);

        assert_eq!(
            sm.start("Permit to Ship").await.unwrap(),
            "Starting a new Permit to Ship application. Could you tell me the owner?"
        );

        let reply = sm.advance("Owner: Dana").await.unwrap();
        assert_eq!(reply, "Could you tell me the tech stack?");
        assert_eq!(sm.state().phase(), TollgatePhase::Intake);

        let reply = sm.advance("Tech-Stack: rust").await.unwrap();
        assert_eq!(reply, ConversationText::ready_to_submit());
        assert_eq!(sm.state().phase(), TollgatePhase::Reviewing);

        let record = sm.record().unwrap();
        assert_eq!(record.field("owner"), Some("Dana"));
        assert_eq!(record.field("tech_stack"), Some("rust"));
    }

    #[tokio::test]
    async fn test_scripted_prompts_delivered_in_order_before_extraction() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut sm = machine(&calls);

        let greeting = sm.start("Permit to Design").await.unwrap();
        assert_eq!(greeting, "Welcome to design intake.");

        // Reply to a scripted prompt is not mined for fields
        let reply = sm.advance("project_name: Early").await.unwrap();
        assert_eq!(reply, "Any prior designs?");
        assert!(!sm.record().unwrap().has_field("project_name"));
        assert_eq!(sm.state().step(), 2);

        let reply = sm.advance("project_name: Orion").await.unwrap();
        assert_eq!(reply, "Please confirm submission.");
        assert_eq!(sm.state().phase(), TollgatePhase::Reviewing);

        let summary = sm.advance("yes").await.unwrap();
        assert!(summary.starts_with("Thank you for applying."));
        assert!(summary.contains("- project_name: Orion"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_veto_declines_application() {
        let calls = Arc::new(AtomicUsize::new(0));
        let reviewers: Vec<Arc<dyn Reviewer>> = vec![
            Arc::new(FixedReviewer {
                id: "cyber",
                decision: Decision::Decline,
                confidence: 0.8,
                calls: Arc::clone(&calls),
            }),
            Arc::new(FixedReviewer {
                id: "infra",
                decision: Decision::Approve,
                confidence: 1.0,
                calls: Arc::clone(&calls),
            }),
        ];
        let mut sm =
            TollgateStateMachine::new("s1", services_with(reviewers, Arc::new(NoApplicationRepository)));
        sm.start("Permit to Design").await.unwrap();
        sm.advance("ok").await.unwrap();
        sm.advance("project_name: Orion").await.unwrap();

        let summary = sm.advance("go").await.unwrap();
        assert!(summary.contains("Final decision: DECLINE"));
        assert!(summary.contains("Vetoed by: cyber"));
        assert_eq!(sm.record().unwrap().status(), ApplicationStatus::Declined);
    }

    #[tokio::test]
    async fn test_restart_resets_state() {
        let mut sm = machine(&Arc::new(AtomicUsize::new(0)));
        sm.start("Permit to Build").await.unwrap();
        sm.advance("project_name: Atlas").await.unwrap();
        let first_id = sm.record().unwrap().id();

        sm.start("Permit to Build").await.unwrap();
        assert_ne!(sm.record().unwrap().id(), first_id);
        assert!(sm.record().unwrap().fields().is_empty());
        assert_eq!(sm.transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_transcript_is_bounded() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut services = services_with(approving_reviewers(&calls), Arc::new(NoApplicationRepository));
        services.transcript_capacity = 4;
        let mut sm = TollgateStateMachine::new("s1", services);
        sm.start("Permit to Build").await.unwrap();

        for _ in 0..10 {
            sm.advance("hmm").await.unwrap();
        }
        assert_eq!(sm.transcript().len(), 4);
    }
}
