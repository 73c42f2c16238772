//! Domain error types

use crate::permit::record::ApplicationStatus;
use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Unknown permit type: {0}")]
    UnknownPermitType(String),

    #[error("Not a permit type: {0}")]
    InvalidPermitTypeFormat(String),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },

    #[error("Application is {0} and can no longer be edited")]
    RecordLocked(ApplicationStatus),

    #[error("No active application")]
    NoActiveApplication,
}

impl DomainError {
    /// Whether the user should be asked to pick a different permit type
    pub fn is_permit_selection_error(&self) -> bool {
        matches!(
            self,
            DomainError::UnknownPermitType(_) | DomainError::InvalidPermitTypeFormat(_)
        )
    }
}
