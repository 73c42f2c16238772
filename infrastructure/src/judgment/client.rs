//! HTTP client for an OpenAI-compatible chat-completions endpoint

use crate::config::FileLlmConfig;
use async_trait::async_trait;
use permitflow_application::{JudgmentError, JudgmentService};
use permitflow_domain::Message;
use permitflow_domain::util::truncate_str;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Error bodies are cut to this many bytes before being reported
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Judgment service over HTTP
pub struct HttpJudgmentClient {
    client: reqwest::Client,
    url: String,
    model: String,
    api_key: Option<String>,
    temperature: f64,
}

impl HttpJudgmentClient {
    pub fn new(endpoint: &str, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: Self::completions_url(endpoint),
            model: model.into(),
            api_key: None,
            temperature: 0.0,
        }
    }

    /// Build a client from the `[llm]` section.
    ///
    /// Fails with [`JudgmentError::NotConfigured`] when no endpoint is set.
    pub fn from_config(config: &FileLlmConfig) -> Result<Self, JudgmentError> {
        let endpoint = config
            .endpoint
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .ok_or(JudgmentError::NotConfigured)?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| JudgmentError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            url: Self::completions_url(endpoint),
            model: config.model.clone(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            temperature: config.temperature,
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        if let Ok(client) = reqwest::Client::builder().timeout(timeout).build() {
            self.client = client;
        }
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn completions_url(endpoint: &str) -> String {
        let base = endpoint.trim().trim_end_matches('/');
        if base.ends_with("/chat/completions") {
            base.to_string()
        } else {
            format!("{base}/chat/completions")
        }
    }
}

/// Pull the assistant text out of a chat-completions response body
fn reply_text(body: ChatResponse) -> Result<String, JudgmentError> {
    body.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| JudgmentError::Malformed("response has no choices[0].message.content".into()))
}

#[async_trait]
impl JudgmentService for HttpJudgmentClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, JudgmentError> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
        };

        let mut builder = self.client.post(&self.url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        debug!("POST {} ({} messages)", self.url, messages.len());
        let response = builder
            .send()
            .await
            .map_err(|e| JudgmentError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(JudgmentError::Status {
                status: status.as_u16(),
                body: truncate_str(&body, MAX_ERROR_BODY).to_string(),
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| JudgmentError::Malformed(e.to_string()))?;
        reply_text(body)
    }
}
