//! Review fan-out
//!
//! Dispatches a completed record to every configured reviewer concurrently.
//! Each call is isolated: a failure, timeout or panic in one reviewer becomes
//! a synthetic `error` verdict for that reviewer only. The coordinator returns
//! once every reviewer has answered or timed out.

use crate::config::ReviewParams;
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger};
use crate::ports::reviewer::{Reviewer, ReviewerError};
use permitflow_domain::{ApplicationRecord, ReviewVerdict, VerdictSet};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Runs one review cycle across all configured reviewers
pub struct ReviewCoordinator {
    reviewers: Vec<Arc<dyn Reviewer>>,
    params: ReviewParams,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl ReviewCoordinator {
    /// Reviewers are consulted, and their verdicts reported, in this order
    pub fn new(reviewers: Vec<Arc<dyn Reviewer>>, params: ReviewParams) -> Self {
        Self {
            reviewers,
            params,
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn reviewer_ids(&self) -> Vec<&str> {
        self.reviewers.iter().map(|r| r.id()).collect()
    }

    /// Review a record. Always yields exactly one verdict per reviewer.
    pub async fn review(&self, record: &ApplicationRecord) -> VerdictSet {
        let document = record.to_review_document();
        info!(
            "Dispatching application {} to {} reviewers",
            record.id(),
            self.reviewers.len()
        );

        let timeout = self.params.timeout;
        let mut join_set = JoinSet::new();

        for (index, reviewer) in self.reviewers.iter().enumerate() {
            let reviewer = Arc::clone(reviewer);
            let document = document.clone();

            join_set.spawn(async move {
                let result = match tokio::time::timeout(timeout, reviewer.review(&document)).await
                {
                    Ok(r) => r,
                    Err(_) => Err(ReviewerError::Timeout(timeout)),
                };
                (index, result)
            });
        }

        let mut slots: Vec<Option<ReviewVerdict>> = vec![None; self.reviewers.len()];

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, Ok(mut verdict))) => {
                    let id = self.reviewers[index].id();
                    if verdict.reviewer != id {
                        // Weights are keyed by the configured id
                        verdict.reviewer = id.to_string();
                    }
                    info!("Reviewer {} returned {}", id, verdict.decision);
                    slots[index] = Some(verdict);
                }
                Ok((index, Err(e))) => {
                    let id = self.reviewers[index].id();
                    warn!("Reviewer {} failed: {}", id, e);
                    slots[index] = Some(ReviewVerdict::error(id, e.to_string()));
                }
                Err(e) => {
                    warn!("Reviewer task join error: {}", e);
                }
            }
        }

        let verdicts: VerdictSet = slots
            .into_iter()
            .zip(&self.reviewers)
            .map(|(slot, reviewer)| {
                slot.unwrap_or_else(|| ReviewVerdict::error(reviewer.id(), "Reviewer task aborted"))
            })
            .collect();

        for verdict in verdicts.iter() {
            self.conversation_logger.log(ConversationEvent::new(
                "reviewer_verdict",
                serde_json::json!({
                    "application_id": record.id().to_string(),
                    "reviewer": verdict.reviewer,
                    "decision": verdict.decision,
                    "confidence": verdict.confidence,
                    "justification": verdict.justification,
                }),
            ));
        }

        info!(
            "Review of application {} complete {}",
            record.id(),
            verdicts.summary()
        );
        verdicts
    }
}
