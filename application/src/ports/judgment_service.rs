//! Judgment service port
//!
//! The external chat-completion service behind LLM-backed reviewers and
//! field extraction. Constructed once at startup and shared by reference.

use async_trait::async_trait;
use permitflow_domain::Message;
use thiserror::Error;

/// Errors from the judgment service
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JudgmentError {
    #[error("Judgment service not configured")]
    NotConfigured,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Judgment service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed judgment response: {0}")]
    Malformed(String),
}

/// Port for a chat-completion style judgment service
#[async_trait]
pub trait JudgmentService: Send + Sync {
    /// Send a conversation and return the assistant's reply text
    async fn complete(&self, messages: &[Message]) -> Result<String, JudgmentError>;
}

/// Stand-in used when no endpoint is configured; every call fails.
pub struct NoJudgmentService;

#[async_trait]
impl JudgmentService for NoJudgmentService {
    async fn complete(&self, _messages: &[Message]) -> Result<String, JudgmentError> {
        Err(JudgmentError::NotConfigured)
    }
}
