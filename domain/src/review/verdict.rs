//! Reviewer verdicts
//!
//! This module defines the verdict primitives produced by each reviewer
//! during a review cycle.

use serde::{Deserialize, Serialize};

/// A reviewer's decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Decline,
    /// The reviewer failed, timed out, or answered with something unusable
    Error,
}

impl Decision {
    /// Contribution sign in weighted scoring. Errors count against approval.
    pub fn sign(&self) -> f64 {
        match self {
            Decision::Approve => 1.0,
            Decision::Decline | Decision::Error => -1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approve => "approve",
            Decision::Decline => "decline",
            Decision::Error => "error",
        }
    }

    /// Parse a decision token as written by a reviewer.
    ///
    /// Returns `None` for anything that is not a clear approve/decline.
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "approve" | "approved" => Some(Decision::Approve),
            "decline" | "declined" | "reject" | "rejected" => Some(Decision::Decline),
            _ => None,
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single verdict from one reviewer in one review cycle
///
/// # Example
///
/// ```
/// use permitflow_domain::review::{Decision, ReviewVerdict};
///
/// let verdict = ReviewVerdict::approve("infra", "Capacity is fine.").with_confidence(0.9);
/// assert_eq!(verdict.decision, Decision::Approve);
///
/// let failed = ReviewVerdict::error("cyber", "timed out after 15s");
/// assert_eq!(failed.confidence, 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewVerdict {
    /// Reviewer tag (e.g. "cyber", "infra", "architecture")
    pub reviewer: String,
    pub decision: Decision,
    /// Confidence in [0.0, 1.0]
    pub confidence: f64,
    pub justification: String,
}

impl ReviewVerdict {
    pub fn new(
        reviewer: impl Into<String>,
        decision: Decision,
        confidence: f64,
        justification: impl Into<String>,
    ) -> Self {
        Self {
            reviewer: reviewer.into(),
            decision,
            confidence: clamp_confidence(confidence),
            justification: justification.into(),
        }
    }

    /// Approval with full confidence (adjust with [`with_confidence`](Self::with_confidence))
    pub fn approve(reviewer: impl Into<String>, justification: impl Into<String>) -> Self {
        Self::new(reviewer, Decision::Approve, 1.0, justification)
    }

    /// Decline with full confidence (adjust with [`with_confidence`](Self::with_confidence))
    pub fn decline(reviewer: impl Into<String>, justification: impl Into<String>) -> Self {
        Self::new(reviewer, Decision::Decline, 1.0, justification)
    }

    /// Synthetic verdict for a failed reviewer: `error` with zero confidence
    pub fn error(reviewer: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(reviewer, Decision::Error, 0.0, message)
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = clamp_confidence(confidence);
        self
    }

    pub fn is_error(&self) -> bool {
        self.decision == Decision::Error
    }

    /// One-line rendering: `[cyber] decline (0.85): Open ports`
    pub fn tagged_justification(&self) -> String {
        format!(
            "[{}] {} ({:.2}): {}",
            self.reviewer, self.decision, self.confidence, self.justification
        )
    }
}

fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

/// The verdicts collected in one review cycle, in configuration order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerdictSet {
    verdicts: Vec<ReviewVerdict>,
}

impl VerdictSet {
    pub fn new(verdicts: Vec<ReviewVerdict>) -> Self {
        Self { verdicts }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReviewVerdict> {
        self.verdicts.iter()
    }

    pub fn len(&self) -> usize {
        self.verdicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty()
    }

    pub fn get(&self, reviewer: &str) -> Option<&ReviewVerdict> {
        self.verdicts.iter().find(|v| v.reviewer == reviewer)
    }

    pub fn as_slice(&self) -> &[ReviewVerdict] {
        &self.verdicts
    }

    pub fn error_count(&self) -> usize {
        self.verdicts.iter().filter(|v| v.is_error()).count()
    }

    /// Visual summary, e.g. `[✓✗!]` for approve, decline, error
    pub fn summary(&self) -> String {
        let mut summary = String::from("[");
        for verdict in &self.verdicts {
            summary.push(match verdict.decision {
                Decision::Approve => '✓',
                Decision::Decline => '✗',
                Decision::Error => '!',
            });
        }
        summary.push(']');
        summary
    }
}

impl FromIterator<ReviewVerdict> for VerdictSet {
    fn from_iter<T: IntoIterator<Item = ReviewVerdict>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_sign() {
        assert_eq!(Decision::Approve.sign(), 1.0);
        assert_eq!(Decision::Decline.sign(), -1.0);
        assert_eq!(Decision::Error.sign(), -1.0);
    }

    #[test]
    fn test_decision_parse() {
        assert_eq!(Decision::parse("APPROVE"), Some(Decision::Approve));
        assert_eq!(Decision::parse(" declined "), Some(Decision::Decline));
        assert_eq!(Decision::parse("reject"), Some(Decision::Decline));
        assert_eq!(Decision::parse("maybe"), None);
        assert_eq!(Decision::parse("error"), None);
    }

    #[test]
    fn test_confidence_clamping() {
        let v = ReviewVerdict::approve("a", "ok").with_confidence(1.5);
        assert_eq!(v.confidence, 1.0);
        let v = ReviewVerdict::approve("a", "ok").with_confidence(-0.2);
        assert_eq!(v.confidence, 0.0);
        let v = ReviewVerdict::approve("a", "ok").with_confidence(f64::NAN);
        assert_eq!(v.confidence, 0.0);
    }

    #[test]
    fn test_error_verdict() {
        let v = ReviewVerdict::error("infra", "connection refused");
        assert!(v.is_error());
        assert_eq!(v.confidence, 0.0);
        assert_eq!(v.justification, "connection refused");
    }

    #[test]
    fn test_tagged_justification() {
        let v = ReviewVerdict::decline("cyber", "Open ports").with_confidence(0.85);
        assert_eq!(v.tagged_justification(), "[cyber] decline (0.85): Open ports");
    }

    #[test]
    fn test_verdict_set_summary() {
        let set: VerdictSet = vec![
            ReviewVerdict::approve("a", ""),
            ReviewVerdict::decline("b", ""),
            ReviewVerdict::error("c", ""),
        ]
        .into_iter()
        .collect();

        assert_eq!(set.summary(), "[✓✗!]");
        assert_eq!(set.error_count(), 1);
        assert_eq!(set.get("b").unwrap().decision, Decision::Decline);
        assert!(set.get("z").is_none());
    }
}
