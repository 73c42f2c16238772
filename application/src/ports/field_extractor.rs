//! Field extraction port
//!
//! Turns a free-form user message into field assignments. Implementations are
//! typically backed by the judgment service; the
//! [`FieldCollector`](crate::use_cases::collect_fields::FieldCollector) falls
//! back to literal `field: value` parsing whenever extraction yields nothing.

use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors from a field extractor
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    #[error("Extraction failed: {0}")]
    Failed(String),

    #[error("Malformed extraction response: {0}")]
    Malformed(String),
}

/// What the extractor is asked to find
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    /// The user's latest message
    pub message: String,
    /// Rendered recent transcript, oldest first
    pub history: String,
    /// Required fields still missing, in priority order
    pub missing_fields: Vec<String>,
}

/// Port for structured field extraction
#[async_trait]
pub trait FieldExtractor: Send + Sync {
    /// Extract field values from a message.
    ///
    /// `Ok(None)` means the extractor found nothing.
    async fn extract(
        &self,
        request: &ExtractionRequest,
    ) -> Result<Option<BTreeMap<String, String>>, ExtractionError>;
}

/// Extractor that never finds anything; literal parsing only.
pub struct NoFieldExtractor;

#[async_trait]
impl FieldExtractor for NoFieldExtractor {
    async fn extract(
        &self,
        _request: &ExtractionRequest,
    ) -> Result<Option<BTreeMap<String, String>>, ExtractionError> {
        Ok(None)
    }
}
