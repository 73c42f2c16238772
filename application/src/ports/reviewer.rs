//! Reviewer port
//!
//! A reviewer is an independent judgment source that scores one application.
//! The set of reviewers is chosen by configuration; the consensus rules never
//! depend on which implementations are plugged in.

use async_trait::async_trait;
use permitflow_domain::ReviewVerdict;
use std::time::Duration;
use thiserror::Error;

/// Errors a reviewer call can end with
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReviewerError {
    #[error("Reviewer timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("Reviewer failed: {0}")]
    Failed(String),

    #[error("Malformed reviewer response: {0}")]
    Malformed(String),
}

/// Port for one specialist reviewer
#[async_trait]
pub trait Reviewer: Send + Sync {
    /// Reviewer tag (e.g. "cyber"); also the key into the weight table
    fn id(&self) -> &str;

    /// Review the application rendered as text and return a verdict
    async fn review(&self, application: &str) -> Result<ReviewVerdict, ReviewerError>;
}
