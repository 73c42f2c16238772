//! Per-session turn handler
//!
//! Wraps a [`TollgateStateMachine`] with permit-type selection: until an
//! application is active, every inbound message is treated as a choice of
//! permit type.

use crate::use_cases::tollgate::{TollgateStateMachine, WorkflowServices};
use permitflow_domain::{ConversationText, DomainError};
use tracing::{debug, warn};

/// One session's conversation with the bot
pub struct PermitConversation {
    machine: TollgateStateMachine,
}

impl PermitConversation {
    pub fn new(session_id: impl Into<String>, services: WorkflowServices) -> Self {
        Self {
            machine: TollgateStateMachine::new(session_id, services),
        }
    }

    pub fn machine(&self) -> &TollgateStateMachine {
        &self.machine
    }

    /// Message for a newly connected duplex client: the permit-type prompt
    /// while no application is active.
    pub fn opening(&self) -> Option<String> {
        if self.machine.is_active() {
            None
        } else {
            Some(ConversationText::permit_type_prompt(
                &self.machine.catalog().names(),
            ))
        }
    }

    /// Handle one inbound user message and return the bot's reply.
    ///
    /// Recoverable failures are turned into a conversational reply; the
    /// session always continues.
    pub async fn handle(&mut self, message: &str) -> String {
        if !self.machine.is_active() {
            return self.select_permit_type(message).await;
        }

        match self.machine.advance(message).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(
                    "Session {}: turn failed: {}",
                    self.machine.session_id(),
                    e
                );
                format!("Sorry, I couldn't process that: {e}")
            }
        }
    }

    async fn select_permit_type(&mut self, message: &str) -> String {
        let names: Vec<String> = self
            .machine
            .catalog()
            .names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();

        let selected = self
            .machine
            .catalog()
            .select(message)
            .map(|definition| definition.name.clone());

        let result = match selected {
            Ok(permit_type) => self.machine.start(&permit_type).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(greeting) => greeting,
            Err(DomainError::InvalidPermitTypeFormat(_)) => {
                debug!(
                    "Session {}: not a permit type selection",
                    self.machine.session_id()
                );
                ConversationText::retry_permit_type(&names)
            }
            Err(DomainError::UnknownPermitType(requested)) => {
                debug!(
                    "Session {}: unknown permit type {}",
                    self.machine.session_id(),
                    requested
                );
                ConversationText::unknown_permit_type(&requested, &names)
            }
            Err(e) => {
                warn!(
                    "Session {}: could not start application: {}",
                    self.machine.session_id(),
                    e
                );
                format!("Sorry, I couldn't start that application: {e}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReviewParams;
    use crate::ports::application_repository::NoApplicationRepository;
    use crate::ports::conversation_logger::NoConversationLogger;
    use crate::ports::field_extractor::NoFieldExtractor;
    use crate::use_cases::collect_fields::FieldCollector;
    use crate::use_cases::review_application::ReviewCoordinator;
    use permitflow_domain::{
        ConsensusEngine, PermitCatalog, PermitDefinition, RequiredField, TollgatePhase,
    };
    use std::sync::Arc;

    fn conversation() -> PermitConversation {
        let services = WorkflowServices {
            catalog: Arc::new(PermitCatalog::new(vec![
                PermitDefinition::new("Permit to Build", vec![RequiredField::new("project_name")]),
                PermitDefinition::new("Permit to Design", vec![RequiredField::new("owner")]),
            ])),
            collector: Arc::new(FieldCollector::new(Arc::new(NoFieldExtractor))),
            coordinator: Arc::new(ReviewCoordinator::new(vec![], ReviewParams::default())),
            engine: Arc::new(ConsensusEngine::default()),
            repository: Arc::new(NoApplicationRepository),
            conversation_logger: Arc::new(NoConversationLogger),
            transcript_capacity: 20,
        };
        PermitConversation::new("s1", services)
    }

    #[tokio::test]
    async fn test_opening_until_started() {
        let mut conv = conversation();
        let opening = conv.opening().unwrap();
        assert!(opening.contains("Permit to Build, Permit to Design"));

        conv.handle("Permit to Build").await;
        assert!(conv.opening().is_none());
    }

    #[tokio::test]
    async fn test_malformed_selection_gets_retry_prompt() {
        let mut conv = conversation();
        let reply = conv.handle("I want to build a shed").await;
        assert_eq!(
            reply,
            ConversationText::retry_permit_type(&["Permit to Build", "Permit to Design"])
        );
        assert!(!conv.machine().is_active());
    }

    #[tokio::test]
    async fn test_unknown_permit_type_lists_valid_types() {
        let mut conv = conversation();
        let reply = conv.handle("permit to fly").await;
        assert!(reply.contains("\"permit to fly\""));
        assert!(reply.contains("Permit to Build, Permit to Design"));
        assert!(!conv.machine().is_active());
    }

    #[tokio::test]
    async fn test_selection_is_case_insensitive() {
        let mut conv = conversation();
        let reply = conv.handle("  PERMIT   to design ").await;
        assert!(reply.contains("Permit to Design"));
        assert!(reply.ends_with("Could you tell me the owner?"));
    }

    #[tokio::test]
    async fn test_empty_reviewer_set_still_finalizes() {
        let mut conv = conversation();
        conv.handle("permit to build").await;
        conv.handle("project_name: Atlas").await;
        let summary = conv.handle("submit").await;

        // No verdicts: score 0 approves
        assert!(summary.contains("Final decision: APPROVE"));
        assert_eq!(conv.machine().state().phase(), TollgatePhase::Finalized);
    }
}
