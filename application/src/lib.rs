//! Application layer for permitflow
//!
//! This crate contains the workflow use cases, the session broadcast hub,
//! port definitions and application configuration. It depends only on the
//! domain layer.

pub mod config;
pub mod hub;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{HubParams, ReviewParams};
pub use hub::{
    HubError, PublishReport, SessionBroadcastHub, SessionMembership, SessionMessage, Sink,
    SinkId, SinkKind,
};
pub use ports::{
    application_repository::{ApplicationRepository, NoApplicationRepository, RepositoryError},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    field_extractor::{ExtractionError, ExtractionRequest, FieldExtractor, NoFieldExtractor},
    judgment_service::{JudgmentError, JudgmentService, NoJudgmentService},
    reviewer::{Reviewer, ReviewerError},
};
pub use use_cases::collect_fields::{
    ExtractionSource, FieldCollector, MergeOutcome, parse_literal_fields,
};
pub use use_cases::conversation::PermitConversation;
pub use use_cases::review_application::ReviewCoordinator;
pub use use_cases::tollgate::{TollgateStateMachine, WorkflowServices};
