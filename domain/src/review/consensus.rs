//! Consensus over a reviewer verdict set
//!
//! Two rules, applied in order:
//!
//! 1. **Veto**: a reviewer with veto authority that declines with
//!    `confidence >= veto_threshold` forces a decline.
//! 2. **Weighted score**: otherwise every verdict contributes
//!    `sign(decision) * confidence * weight(reviewer)`; the application is
//!    approved iff the total is `>= 0`.

use super::verdict::{Decision, ReviewVerdict, VerdictSet};
use serde::{Deserialize, Serialize};

/// Default veto threshold (inclusive)
pub const DEFAULT_VETO_THRESHOLD: f64 = 0.8;

/// Final outcome of a review cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinalDecision {
    Approve,
    Decline,
}

impl FinalDecision {
    pub fn is_approved(&self) -> bool {
        matches!(self, FinalDecision::Approve)
    }

    /// Uppercased token used in summaries
    pub fn as_token(&self) -> &'static str {
        match self {
            FinalDecision::Approve => "APPROVE",
            FinalDecision::Decline => "DECLINE",
        }
    }
}

impl std::fmt::Display for FinalDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_token())
    }
}

/// A reviewer and its scoring weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewerWeight {
    pub reviewer: String,
    pub weight: f64,
}

impl ReviewerWeight {
    pub fn new(reviewer: impl Into<String>, weight: f64) -> Self {
        Self {
            reviewer: reviewer.into(),
            weight,
        }
    }
}

/// Result of applying the consensus rules to one verdict set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResult {
    pub decision: FinalDecision,
    /// Every verdict's justification, tagged by reviewer, in configuration order
    pub justification: String,
    /// The reviewer whose veto decided the outcome, if any
    pub vetoed_by: Option<String>,
    /// Weighted total; `None` when the veto rule short-circuited scoring
    pub score: Option<f64>,
    /// The verdicts that produced this result, in configuration order
    pub verdicts: Vec<ReviewVerdict>,
}

impl ConsensusResult {
    pub fn is_vetoed(&self) -> bool {
        self.vetoed_by.is_some()
    }

    pub fn is_approved(&self) -> bool {
        self.decision.is_approved()
    }
}

/// Applies veto and weighted-scoring rules to verdict sets
///
/// # Example
///
/// ```
/// use permitflow_domain::review::{ConsensusEngine, FinalDecision, ReviewVerdict, ReviewerWeight};
///
/// let engine = ConsensusEngine::new(vec![
///     ReviewerWeight::new("infra", 0.6),
///     ReviewerWeight::new("architecture", 0.4),
/// ]);
///
/// let result = engine.decide(&[
///     ReviewVerdict::approve("infra", "Capacity ok").with_confidence(0.6),
///     ReviewVerdict::decline("architecture", "Tight coupling").with_confidence(0.5),
/// ]);
///
/// assert_eq!(result.decision, FinalDecision::Approve);
/// assert!(!result.is_vetoed());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusEngine {
    weights: Vec<ReviewerWeight>,
    veto_reviewers: Vec<String>,
    veto_threshold: f64,
}

impl ConsensusEngine {
    /// Engine with the given weights, no veto reviewers, default threshold
    pub fn new(weights: Vec<ReviewerWeight>) -> Self {
        Self {
            weights,
            veto_reviewers: Vec::new(),
            veto_threshold: DEFAULT_VETO_THRESHOLD,
        }
    }

    pub fn with_veto_reviewers<I, S>(mut self, reviewers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.veto_reviewers = reviewers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_veto_threshold(mut self, threshold: f64) -> Self {
        self.veto_threshold = threshold;
        self
    }

    pub fn weights(&self) -> &[ReviewerWeight] {
        &self.weights
    }

    pub fn veto_threshold(&self) -> f64 {
        self.veto_threshold
    }

    /// Weight for a reviewer; 0 when not configured
    pub fn weight_of(&self, reviewer: &str) -> f64 {
        self.weights
            .iter()
            .find(|w| w.reviewer == reviewer)
            .map(|w| w.weight)
            .unwrap_or(0.0)
    }

    pub fn has_veto(&self, reviewer: &str) -> bool {
        self.veto_reviewers.iter().any(|r| r == reviewer)
    }

    pub fn decide_set(&self, verdicts: &VerdictSet) -> ConsensusResult {
        self.decide(verdicts.as_slice())
    }

    /// Compute the consensus for one completed verdict set.
    pub fn decide(&self, verdicts: &[ReviewVerdict]) -> ConsensusResult {
        let ordered = self.order(verdicts);
        let lines: Vec<String> = ordered.iter().map(|v| v.tagged_justification()).collect();

        let veto = ordered.iter().find(|v| {
            self.has_veto(&v.reviewer)
                && v.decision == Decision::Decline
                && v.confidence >= self.veto_threshold
        });

        if let Some(vetoing) = veto {
            let reviewer = vetoing.reviewer.clone();
            let justification = format!("Vetoed by {}.\n{}", reviewer, lines.join("\n"));
            return ConsensusResult {
                decision: FinalDecision::Decline,
                justification,
                vetoed_by: Some(reviewer),
                score: None,
                verdicts: ordered,
            };
        }

        let score: f64 = ordered
            .iter()
            .map(|v| v.decision.sign() * v.confidence * self.weight_of(&v.reviewer))
            .sum();

        let decision = if score >= 0.0 {
            FinalDecision::Approve
        } else {
            FinalDecision::Decline
        };

        ConsensusResult {
            decision,
            justification: lines.join("\n"),
            vetoed_by: None,
            score: Some(score),
            verdicts: ordered,
        }
    }

    /// Configured reviewers first (in configuration order), then any
    /// unconfigured ones in arrival order.
    fn order(&self, verdicts: &[ReviewVerdict]) -> Vec<ReviewVerdict> {
        let mut ordered: Vec<ReviewVerdict> = self
            .weights
            .iter()
            .filter_map(|w| verdicts.iter().find(|v| v.reviewer == w.reviewer))
            .cloned()
            .collect();

        ordered.extend(
            verdicts
                .iter()
                .filter(|v| !self.weights.iter().any(|w| w.reviewer == v.reviewer))
                .cloned(),
        );
        ordered
    }
}

impl Default for ConsensusEngine {
    /// cyber 0.4 (veto), infra 0.3, architecture 0.3
    fn default() -> Self {
        Self::new(vec![
            ReviewerWeight::new("cyber", 0.4),
            ReviewerWeight::new("infra", 0.3),
            ReviewerWeight::new("architecture", 0.3),
        ])
        .with_veto_reviewers(["cyber"])
    }
}
