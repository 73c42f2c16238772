//! Permit catalog: Required fields and scripted prompts per permit type.

use super::record::ApplicationRecord;
use crate::core::error::DomainError;
use crate::util::{field_key, normalize_key};
use serde::{Deserialize, Serialize};

/// A field that must be collected before an application can be reviewed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredField {
    /// Field key as stored in the record (e.g. "project_name"), see [`field_key`]
    pub name: String,
    /// Custom question used when asking for this field
    pub question: Option<String>,
}

impl RequiredField {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: field_key(name.as_ref()),
            question: None,
        }
    }

    pub fn with_question(mut self, question: impl Into<String>) -> Self {
        self.question = Some(question.into());
        self
    }

    /// Human-readable label: "project_name" -> "project name"
    pub fn label(&self) -> String {
        self.name.replace(['_', '-'], " ")
    }
}

/// Configuration for one permit type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermitDefinition {
    /// Display name (e.g. "Permit to Build")
    pub name: String,
    /// Required fields in priority order
    pub required_fields: Vec<RequiredField>,
    /// Scripted prompts, indexed by phase number - 1
    pub phase_prompts: Vec<Vec<String>>,
}

impl PermitDefinition {
    pub fn new(name: impl Into<String>, required_fields: Vec<RequiredField>) -> Self {
        Self {
            name: name.into(),
            required_fields,
            phase_prompts: Vec::new(),
        }
    }

    pub fn with_phase_prompts(mut self, phase_prompts: Vec<Vec<String>>) -> Self {
        self.phase_prompts = phase_prompts;
        self
    }

    /// Scripted prompts for a 1-based phase number (empty if none configured)
    pub fn prompts_for(&self, phase_number: usize) -> &[String] {
        phase_number
            .checked_sub(1)
            .and_then(|i| self.phase_prompts.get(i))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Required fields not yet present in the record, in declaration order
    pub fn missing_fields<'a>(&'a self, record: &ApplicationRecord) -> Vec<&'a RequiredField> {
        self.required_fields
            .iter()
            .filter(|f| !record.has_field(&f.name))
            .collect()
    }

    /// The earliest unmet required field
    pub fn next_missing_field(&self, record: &ApplicationRecord) -> Option<&RequiredField> {
        self.required_fields
            .iter()
            .find(|f| !record.has_field(&f.name))
    }

    pub fn is_complete(&self, record: &ApplicationRecord) -> bool {
        self.next_missing_field(record).is_none()
    }
}

/// Check that a message has the shape of a permit type selection.
///
/// Accepted form: `permit to <word>[ <word>...]`, case-insensitive, where
/// words are alphanumeric (hyphens allowed). Returns the normalized form.
pub fn parse_permit_selection(message: &str) -> Result<String, DomainError> {
    let normalized = normalize_key(message);
    let mut words = normalized.split(' ');

    let well_formed = words.next() == Some("permit")
        && words.next() == Some("to")
        && {
            let rest: Vec<&str> = words.collect();
            !rest.is_empty()
                && rest.iter().all(|w| {
                    !w.is_empty() && w.chars().all(|c| c.is_alphanumeric() || c == '-')
                })
        };

    if well_formed {
        Ok(normalized)
    } else {
        Err(DomainError::InvalidPermitTypeFormat(message.trim().to_string()))
    }
}

/// All configured permit types
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermitCatalog {
    definitions: Vec<PermitDefinition>,
}

impl PermitCatalog {
    pub fn new(definitions: Vec<PermitDefinition>) -> Self {
        Self { definitions }
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn definitions(&self) -> &[PermitDefinition] {
        &self.definitions
    }

    /// Configured permit type names in configuration order
    pub fn names(&self) -> Vec<&str> {
        self.definitions.iter().map(|d| d.name.as_str()).collect()
    }

    /// Case- and whitespace-insensitive lookup by name
    pub fn lookup(&self, permit_type: &str) -> Result<&PermitDefinition, DomainError> {
        let key = normalize_key(permit_type);
        self.definitions
            .iter()
            .find(|d| normalize_key(&d.name) == key)
            .ok_or_else(|| DomainError::UnknownPermitType(permit_type.trim().to_string()))
    }

    /// Resolve a user message to a permit definition.
    ///
    /// An exact (normalized) name match always wins. Otherwise the message
    /// must look like a permit type selection; a well-formed but unknown
    /// type is [`DomainError::UnknownPermitType`].
    pub fn select(&self, message: &str) -> Result<&PermitDefinition, DomainError> {
        if let Ok(definition) = self.lookup(message) {
            return Ok(definition);
        }
        let normalized = parse_permit_selection(message)?;
        self.lookup(&normalized)
    }
}
