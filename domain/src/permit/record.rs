//! Application record: The collected data for one permit application.
//!
//! A record is created in [`ApplicationStatus::Draft`], accumulates field
//! values while in draft, and then moves through the review statuses.
//! Every mutation is appended to the record's event history.

use crate::core::error::DomainError;
use crate::util::{current_timestamp_ms, field_key};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_APPLICATION_ID: AtomicU64 = AtomicU64::new(1);

/// Generated identifier of an application record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(u64);

impl ApplicationId {
    /// Allocate a fresh, process-unique id
    pub fn generate() -> Self {
        Self(NEXT_APPLICATION_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "app-{}", self.0)
    }
}

/// Workflow status of an application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Draft,
    Submitted,
    Reviewing,
    Approved,
    Declined,
}

impl ApplicationStatus {
    /// Approved and Declined are terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, ApplicationStatus::Approved | ApplicationStatus::Declined)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Draft => "draft",
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::Reviewing => "reviewing",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Declined => "declined",
        }
    }

    fn can_transition_to(&self, next: ApplicationStatus) -> bool {
        use ApplicationStatus::*;
        matches!(
            (self, next),
            (Draft, Submitted) | (Submitted, Reviewing) | (Reviewing, Approved) | (Reviewing, Declined)
        )
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of an entry in the record history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationEventKind {
    Started,
    FieldsUpdated,
    Submitted,
    ReviewStarted,
    ReviewerDecision,
    Decided,
}

/// One entry in the record history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationEvent {
    pub kind: ApplicationEventKind,
    pub detail: String,
    pub timestamp_ms: u64,
}

impl ApplicationEvent {
    fn now(kind: ApplicationEventKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
            timestamp_ms: current_timestamp_ms(),
        }
    }
}

/// A permit application owned by one session.
///
/// # Example
///
/// ```
/// use permitflow_domain::permit::{ApplicationRecord, ApplicationStatus};
///
/// let mut record = ApplicationRecord::new("session-1", "Permit to Build");
/// record.merge_fields([("project_name".to_string(), "Atlas".to_string())]).unwrap();
/// assert_eq!(record.field("project_name"), Some("Atlas"));
///
/// record.submit().unwrap();
/// assert_eq!(record.status(), ApplicationStatus::Submitted);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    id: ApplicationId,
    session_id: String,
    permit_type: String,
    status: ApplicationStatus,
    fields: BTreeMap<String, String>,
    history: Vec<ApplicationEvent>,
    created_at_ms: u64,
    updated_at_ms: u64,
}

impl ApplicationRecord {
    /// Create an empty draft record
    pub fn new(session_id: impl Into<String>, permit_type: impl Into<String>) -> Self {
        let permit_type = permit_type.into();
        let now = current_timestamp_ms();
        Self {
            id: ApplicationId::generate(),
            session_id: session_id.into(),
            status: ApplicationStatus::Draft,
            fields: BTreeMap::new(),
            history: vec![ApplicationEvent::now(
                ApplicationEventKind::Started,
                permit_type.clone(),
            )],
            permit_type,
            created_at_ms: now,
            updated_at_ms: now,
        }
    }

    pub fn id(&self) -> ApplicationId {
        self.id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn permit_type(&self) -> &str {
        &self.permit_type
    }

    pub fn status(&self) -> ApplicationStatus {
        self.status
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    /// Look up a field by name; the name is folded with [`field_key`]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(&field_key(name)).map(String::as_str)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(&field_key(name))
    }

    pub fn history(&self) -> &[ApplicationEvent] {
        &self.history
    }

    pub fn created_at_ms(&self) -> u64 {
        self.created_at_ms
    }

    pub fn updated_at_ms(&self) -> u64 {
        self.updated_at_ms
    }

    /// Merge field assertions into the record.
    ///
    /// Names are folded with [`field_key`] and values are trimmed; empty
    /// entries are ignored and existing fields are never removed. Returns the
    /// names of fields whose value changed.
    pub fn merge_fields<I>(&mut self, updates: I) -> Result<Vec<String>, DomainError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        if self.status != ApplicationStatus::Draft {
            return Err(DomainError::RecordLocked(self.status));
        }

        let mut changed = Vec::new();
        for (name, value) in updates {
            let name = field_key(&name);
            let value = value.trim();
            if name.is_empty() || value.is_empty() {
                continue;
            }
            if self.fields.get(&name).map(String::as_str) == Some(value) {
                continue;
            }
            self.fields.insert(name.clone(), value.to_string());
            changed.push(name);
        }

        if !changed.is_empty() {
            self.push_event(ApplicationEventKind::FieldsUpdated, changed.join(", "));
        }
        Ok(changed)
    }

    /// Draft -> Submitted
    pub fn submit(&mut self) -> Result<(), DomainError> {
        self.transition(ApplicationStatus::Submitted)?;
        self.push_event(ApplicationEventKind::Submitted, "");
        Ok(())
    }

    /// Submitted -> Reviewing
    pub fn begin_review(&mut self) -> Result<(), DomainError> {
        self.transition(ApplicationStatus::Reviewing)?;
        self.push_event(ApplicationEventKind::ReviewStarted, "");
        Ok(())
    }

    /// Note one reviewer's decision in the history (only while reviewing)
    pub fn record_reviewer_decision(
        &mut self,
        reviewer: &str,
        decision: &str,
    ) -> Result<(), DomainError> {
        if self.status != ApplicationStatus::Reviewing {
            return Err(DomainError::RecordLocked(self.status));
        }
        self.push_event(
            ApplicationEventKind::ReviewerDecision,
            format!("{}: {}", reviewer, decision),
        );
        Ok(())
    }

    /// Reviewing -> Approved | Declined
    pub fn conclude(&mut self, approved: bool) -> Result<(), DomainError> {
        let next = if approved {
            ApplicationStatus::Approved
        } else {
            ApplicationStatus::Declined
        };
        self.transition(next)?;
        self.push_event(ApplicationEventKind::Decided, next.as_str());
        Ok(())
    }

    /// Render the record as the JSON document handed to reviewers
    pub fn to_review_document(&self) -> String {
        serde_json::json!({
            "application_id": self.id.to_string(),
            "permit_type": self.permit_type,
            "fields": self.fields,
        })
        .to_string()
    }

    fn transition(&mut self, next: ApplicationStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    fn push_event(&mut self, kind: ApplicationEventKind, detail: impl Into<String>) {
        let event = ApplicationEvent::now(kind, detail);
        self.updated_at_ms = event.timestamp_ms;
        self.history.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn test_new_record_is_draft() {
        let record = ApplicationRecord::new("s1", "Permit to Design");
        assert_eq!(record.status(), ApplicationStatus::Draft);
        assert_eq!(record.session_id(), "s1");
        assert_eq!(record.permit_type(), "Permit to Design");
        assert!(record.fields().is_empty());
        assert_eq!(record.history().len(), 1);
        assert_eq!(record.history()[0].kind, ApplicationEventKind::Started);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = ApplicationRecord::new("s1", "p");
        let b = ApplicationRecord::new("s1", "p");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_merge_ignores_empty_values() {
        let mut record = ApplicationRecord::new("s1", "p");
        record.merge_fields([pair("owner", "Bill")]).unwrap();
        let changed = record
            .merge_fields([pair("owner", "   "), pair("budget", "")])
            .unwrap();

        assert!(changed.is_empty());
        assert_eq!(record.field("owner"), Some("Bill"));
        assert!(!record.has_field("budget"));
    }

    #[test]
    fn test_merge_never_removes_fields() {
        let mut record = ApplicationRecord::new("s1", "p");
        record
            .merge_fields([pair("owner", "Bill"), pair("budget", "10k")])
            .unwrap();
        record.merge_fields([pair("owner", "Alice")]).unwrap();

        assert_eq!(record.field("owner"), Some("Alice"));
        assert_eq!(record.field("budget"), Some("10k"));
    }

    #[test]
    fn test_merge_reports_only_changed_fields() {
        let mut record = ApplicationRecord::new("s1", "p");
        record.merge_fields([pair("owner", "Bill")]).unwrap();
        let changed = record
            .merge_fields([pair("owner", "Bill"), pair("budget", " 10k ")])
            .unwrap();

        assert_eq!(changed, vec!["budget".to_string()]);
        assert_eq!(record.field("budget"), Some("10k"));
    }

    #[test]
    fn test_merge_rejected_after_submit() {
        let mut record = ApplicationRecord::new("s1", "p");
        record.submit().unwrap();
        let err = record.merge_fields([pair("owner", "Bill")]).unwrap_err();
        assert_eq!(err, DomainError::RecordLocked(ApplicationStatus::Submitted));
    }

    #[test]
    fn test_full_lifecycle() {
        let mut record = ApplicationRecord::new("s1", "p");
        record.submit().unwrap();
        record.begin_review().unwrap();
        record.record_reviewer_decision("cyber", "approve").unwrap();
        record.conclude(true).unwrap();

        assert_eq!(record.status(), ApplicationStatus::Approved);
        assert!(record.status().is_terminal());
        let kinds: Vec<_> = record.history().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ApplicationEventKind::Started,
                ApplicationEventKind::Submitted,
                ApplicationEventKind::ReviewStarted,
                ApplicationEventKind::ReviewerDecision,
                ApplicationEventKind::Decided,
            ]
        );
    }

    #[test]
    fn test_invalid_transition() {
        let mut record = ApplicationRecord::new("s1", "p");
        let err = record.conclude(false).unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidTransition {
                from: ApplicationStatus::Draft,
                to: ApplicationStatus::Declined,
            }
        );
        assert_eq!(record.status(), ApplicationStatus::Draft);
    }

    #[test]
    fn test_review_document_contains_fields() {
        let mut record = ApplicationRecord::new("s1", "Permit to Build");
        record.merge_fields([pair("project_name", "Atlas")]).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&record.to_review_document()).unwrap();

        assert_eq!(doc["permit_type"], "Permit to Build");
        assert_eq!(doc["fields"]["project_name"], "Atlas");
    }
}
