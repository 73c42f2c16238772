//! Reviewer backed by the judgment service

use crate::config::FileReviewConfig;
use async_trait::async_trait;
use permitflow_application::{JudgmentService, Reviewer, ReviewerError};
use permitflow_domain::review::try_parse_verdict;
use permitflow_domain::{Message, PromptTemplate, ReviewVerdict};
use std::sync::Arc;
use tracing::debug;

/// Specialist reviewer that asks the judgment service for a JSON verdict
pub struct LlmReviewer {
    id: String,
    focus: Option<String>,
    service: Arc<dyn JudgmentService>,
}

impl LlmReviewer {
    pub fn new(id: impl Into<String>, service: Arc<dyn JudgmentService>) -> Self {
        Self {
            id: id.into(),
            focus: None,
            service,
        }
    }

    pub fn with_focus(mut self, focus: Option<String>) -> Self {
        self.focus = focus;
        self
    }

    fn messages(&self, application: &str) -> [Message; 2] {
        [
            Message::system(PromptTemplate::reviewer_system(&self.id, self.focus.as_deref())),
            Message::user(PromptTemplate::reviewer_request(application)),
        ]
    }
}

/// One reviewer per `[[review.reviewers]]` entry, in configuration order
pub fn reviewers_from_config(
    config: &FileReviewConfig,
    service: Arc<dyn JudgmentService>,
) -> Vec<Arc<dyn Reviewer>> {
    config
        .reviewers
        .iter()
        .map(|entry| {
            Arc::new(LlmReviewer::new(&entry.id, service.clone()).with_focus(entry.focus.clone()))
                as Arc<dyn Reviewer>
        })
        .collect()
}

#[async_trait]
impl Reviewer for LlmReviewer {
    fn id(&self) -> &str {
        &self.id
    }

    async fn review(&self, application: &str) -> Result<ReviewVerdict, ReviewerError> {
        let reply = self
            .service
            .complete(&self.messages(application))
            .await
            .map_err(|e| ReviewerError::Failed(e.to_string()))?;

        debug!("Reviewer {} replied with {} bytes", self.id, reply.len());
        try_parse_verdict(&self.id, &reply).map_err(ReviewerError::Malformed)
    }
}
