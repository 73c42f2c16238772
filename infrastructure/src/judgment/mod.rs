//! Judgment service adapters
//!
//! [`HttpJudgmentClient`] talks to an OpenAI-compatible endpoint;
//! [`LlmReviewer`] and [`LlmFieldExtractor`] build the reviewer and
//! extraction ports on top of any [`JudgmentService`](permitflow_application::JudgmentService).

mod client;
mod extractor;
mod reviewer;

pub use client::HttpJudgmentClient;
pub use extractor::LlmFieldExtractor;
pub use reviewer::{LlmReviewer, reviewers_from_config};

#[cfg(test)]
pub(crate) mod testing {
    use async_trait::async_trait;
    use permitflow_application::{JudgmentError, JudgmentService};
    use permitflow_domain::Message;
    use std::sync::Mutex;

    /// Judgment service returning a fixed reply and recording requests
    pub struct ScriptedJudgment {
        reply: Result<String, JudgmentError>,
        requests: Mutex<Vec<Vec<Message>>>,
    }

    impl ScriptedJudgment {
        pub fn reply(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn fail(error: JudgmentError) -> Self {
            Self {
                reply: Err(error),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn last_request(&self) -> Vec<Message> {
            self.requests.lock().unwrap().last().cloned().unwrap_or_default()
        }

        pub fn call_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl JudgmentService for ScriptedJudgment {
        async fn complete(&self, messages: &[Message]) -> Result<String, JudgmentError> {
            self.requests.lock().unwrap().push(messages.to_vec());
            self.reply.clone()
        }
    }
}
