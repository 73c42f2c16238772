//! Field collection
//!
//! Merges field assertions from a user message into the active record.
//! Structured extraction is tried first; when it fails or yields nothing the
//! message is split literally on `field: value` lines.

use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger};
use crate::ports::field_extractor::{ExtractionRequest, FieldExtractor};
use permitflow_domain::util::field_key;
use permitflow_domain::{ApplicationRecord, DomainError, PermitDefinition, RequiredField, Transcript};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Longest key accepted by the literal parser
const MAX_LITERAL_KEY_LEN: usize = 64;

/// Where merged values came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionSource {
    Extractor,
    Literal,
    /// Neither extraction nor literal parsing found anything
    Nothing,
}

/// Result of one merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Fields whose value changed, in key order
    pub changed: Vec<String>,
    pub source: ExtractionSource,
}

impl MergeOutcome {
    pub fn has_changes(&self) -> bool {
        !self.changed.is_empty()
    }
}

/// Merges extracted or literal field values into a record
pub struct FieldCollector {
    extractor: Arc<dyn FieldExtractor>,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl FieldCollector {
    pub fn new(extractor: Arc<dyn FieldExtractor>) -> Self {
        Self {
            extractor,
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    /// Merge any field assignments found in `message` into `record`.
    ///
    /// Unknown fields are stored too; only required fields affect completion.
    /// Existing fields are never removed or blanked.
    pub async fn merge(
        &self,
        record: &mut ApplicationRecord,
        definition: &PermitDefinition,
        message: &str,
        transcript: &Transcript,
    ) -> Result<MergeOutcome, DomainError> {
        let missing = Self::missing_fields(definition, record);
        let request = ExtractionRequest {
            message: message.to_string(),
            history: transcript.render(),
            missing_fields: missing.iter().map(|f| f.name.clone()).collect(),
        };

        let extracted = match self.extractor.extract(&request).await {
            Ok(Some(values)) => non_empty(values),
            Ok(None) => BTreeMap::new(),
            Err(e) => {
                warn!("Field extraction failed, falling back to literal parsing: {}", e);
                BTreeMap::new()
            }
        };

        let (values, source) = if !extracted.is_empty() {
            (extracted, ExtractionSource::Extractor)
        } else {
            let literal = parse_literal_fields(message);
            if literal.is_empty() {
                (literal, ExtractionSource::Nothing)
            } else {
                (literal, ExtractionSource::Literal)
            }
        };

        let changed = record.merge_fields(values)?;
        debug!(
            "Application {}: merged {:?} via {:?}",
            record.id(),
            changed,
            source
        );

        if !changed.is_empty() {
            self.conversation_logger.log(ConversationEvent::new(
                "fields_merged",
                serde_json::json!({
                    "application_id": record.id().to_string(),
                    "session_id": record.session_id(),
                    "fields": changed,
                    "source": format!("{:?}", source).to_lowercase(),
                }),
            ));
        }

        Ok(MergeOutcome { changed, source })
    }

    /// Required fields not yet present, in declaration order
    pub fn missing_fields<'a>(
        definition: &'a PermitDefinition,
        record: &ApplicationRecord,
    ) -> Vec<&'a RequiredField> {
        definition.missing_fields(record)
    }
}

fn non_empty(values: BTreeMap<String, String>) -> BTreeMap<String, String> {
    values
        .into_iter()
        .filter(|(k, v)| !k.trim().is_empty() && !v.trim().is_empty())
        .collect()
}

/// Split a message into `field: value` assignments, one per line.
///
/// Keys are folded with [`field_key`] ("Project Name: Atlas" ->
/// `project_name = Atlas`). Lines whose key is not
/// a plain identifier are ignored. Later lines win on duplicate keys.
pub fn parse_literal_fields(message: &str) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();

    for line in message.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };

        let key = field_key(key);
        let value = value.trim();

        if key.is_empty()
            || value.is_empty()
            || key.len() > MAX_LITERAL_KEY_LEN
            || !key.chars().all(|c| c.is_alphanumeric() || c == '_')
        {
            continue;
        }

        fields.insert(key, value.to_string());
    }

    fields
}
