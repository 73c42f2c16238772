//! Configuration validation issues.
//!
//! Validation never fails fast: every problem found is reported as a
//! [`ConfigIssue`] and the caller decides what to do with each severity.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the service cannot start with this configuration.
    Error,
    /// Non-fatal: the service runs but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIssueCode {
    NoPermitTypes,
    PermitWithoutFields,
    DuplicatePermitType,
    /// Two required fields of one permit fold to the same key
    DuplicateField,
    /// A required field name has characters other than letters, digits and separators
    InvalidFieldName,
    NoReviewers,
    DuplicateReviewer,
    WeightOutOfRange,
    VetoThresholdOutOfRange,
    ZeroHistoryCapacity,
    /// Reviewer weights do not sum to 1.0
    WeightsUnbalanced,
    /// A veto reviewer is not in the reviewer list
    UnknownVetoReviewer,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", level, self.message)
    }
}
