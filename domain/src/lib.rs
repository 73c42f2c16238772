//! Domain layer for permitflow
//!
//! This crate contains the core business rules of the permit workflow. It has
//! no dependencies on infrastructure, transport or an async runtime.
//!
//! # Core Concepts
//!
//! ## Tollgates
//!
//! An application moves through ordered tollgates: **Intake** collects the
//! required fields, **Reviewing** submits the record to specialist reviewers,
//! **Finalized** reports the outcome. See [`tollgate`].
//!
//! ## Review consensus
//!
//! Each reviewer returns a [`ReviewVerdict`]. The [`ConsensusEngine`] applies a
//! veto rule, then a weighted score, to produce one [`ConsensusResult`].

pub mod core;
pub mod permit;
pub mod prompt;
pub mod review;
pub mod session;
pub mod tollgate;
pub mod util;

// Re-export commonly used types
pub use core::{
    error::DomainError,
    validation::{ConfigIssue, ConfigIssueCode, Severity},
};
pub use permit::{
    ApplicationEvent, ApplicationEventKind, ApplicationId, ApplicationRecord, ApplicationStatus,
    PermitCatalog, PermitDefinition, RequiredField, parse_permit_selection,
};
pub use prompt::{ConversationText, PromptTemplate};
pub use review::{
    ConsensusEngine, ConsensusResult, Decision, FinalDecision, ReviewVerdict, ReviewerWeight,
    VerdictSet,
};
pub use session::{Message, Role, Speaker, Transcript, TranscriptEntry};
pub use tollgate::{TollgatePhase, TollgateState};
