//! Judgment service configuration from TOML (`[llm]` section)
//!
//! Any OpenAI-compatible chat-completions endpoint works:
//!
//! ```toml
//! [llm]
//! endpoint = "http://localhost:11434/v1"
//! model = "llama3.1"
//! api_key = "sk-..."        # or PERMITFLOW_LLM__API_KEY
//! timeout_secs = 15
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLlmConfig {
    /// Base URL; `/chat/completions` is appended
    pub endpoint: Option<String>,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub temperature: f64,
}

impl Default for FileLlmConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            timeout_secs: 15,
            temperature: 0.0,
        }
    }
}

impl FileLlmConfig {
    pub fn is_configured(&self) -> bool {
        self.endpoint
            .as_deref()
            .is_some_and(|endpoint| !endpoint.trim().is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_endpoint_is_not_configured() {
        let mut config = FileLlmConfig::default();
        assert!(!config.is_configured());
        config.endpoint = Some("  ".to_string());
        assert!(!config.is_configured());
        config.endpoint = Some("http://localhost:11434/v1".to_string());
        assert!(config.is_configured());
    }
}
