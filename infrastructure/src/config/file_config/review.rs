//! Review configuration from TOML (`[review]` section)
//!
//! ```toml
//! [review]
//! timeout_secs = 15
//! veto_threshold = 0.8
//! veto_reviewers = ["cyber"]
//!
//! [[review.reviewers]]
//! id = "cyber"
//! weight = 0.4
//!
//! [[review.reviewers]]
//! id = "finance"
//! weight = 0.2
//! focus = "budget realism and cost controls"
//! ```
//!
//! Reviewers are consulted and reported in the order listed.

use permitflow_application::ReviewParams;
use permitflow_domain::review::DEFAULT_VETO_THRESHOLD;
use permitflow_domain::{ConfigIssue, ConfigIssueCode, ConsensusEngine, ReviewerWeight};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Tolerance when checking that weights sum to 1.0
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// One configured reviewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileReviewerConfig {
    pub id: String,
    pub weight: f64,
    /// Review brief for reviewers without a built-in one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<String>,
}

impl FileReviewerConfig {
    pub fn new(id: impl Into<String>, weight: f64) -> Self {
        Self {
            id: id.into(),
            weight,
            focus: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReviewConfig {
    pub timeout_secs: u64,
    pub veto_threshold: f64,
    pub veto_reviewers: Vec<String>,
    pub reviewers: Vec<FileReviewerConfig>,
}

impl Default for FileReviewConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            veto_threshold: DEFAULT_VETO_THRESHOLD,
            veto_reviewers: vec!["cyber".to_string()],
            reviewers: vec![
                FileReviewerConfig::new("cyber", 0.4),
                FileReviewerConfig::new("infra", 0.3),
                FileReviewerConfig::new("architecture", 0.3),
            ],
        }
    }
}

impl FileReviewConfig {
    pub fn to_review_params(&self) -> ReviewParams {
        ReviewParams::default().with_timeout(Duration::from_secs(self.timeout_secs))
    }

    pub fn to_consensus_engine(&self) -> ConsensusEngine {
        ConsensusEngine::new(
            self.reviewers
                .iter()
                .map(|r| ReviewerWeight::new(&r.id, r.weight))
                .collect(),
        )
        .with_veto_reviewers(self.veto_reviewers.iter().cloned())
        .with_veto_threshold(self.veto_threshold)
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.reviewers.is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::NoReviewers,
                "review.reviewers: at least one reviewer is required",
            ));
        }

        let mut seen = HashSet::new();
        for reviewer in &self.reviewers {
            if !seen.insert(reviewer.id.as_str()) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::DuplicateReviewer,
                    format!("review.reviewers: '{}' is listed twice", reviewer.id),
                ));
            }
            if !(0.0..=1.0).contains(&reviewer.weight) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::WeightOutOfRange,
                    format!(
                        "review.reviewers: weight of '{}' must be within [0, 1], got {}",
                        reviewer.id, reviewer.weight
                    ),
                ));
            }
        }

        if !(0.0..=1.0).contains(&self.veto_threshold) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::VetoThresholdOutOfRange,
                format!(
                    "review.veto_threshold must be within [0, 1], got {}",
                    self.veto_threshold
                ),
            ));
        }

        let total: f64 = self.reviewers.iter().map(|r| r.weight).sum();
        if !self.reviewers.is_empty() && (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::WeightsUnbalanced,
                format!("review.reviewers: weights sum to {total}, expected 1.0"),
            ));
        }

        for veto in &self.veto_reviewers {
            if !self.reviewers.iter().any(|r| &r.id == veto) {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::UnknownVetoReviewer,
                    format!("review.veto_reviewers: '{veto}' is not a configured reviewer"),
                ));
            }
        }

        issues
    }
}
