//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Every section is optional; omitted sections fall back to built-in defaults.

mod hub;
mod llm;
mod permits;
mod review;
mod server;

pub use hub::FileHubConfig;
pub use llm::FileLlmConfig;
pub use permits::{FilePermitConfig, FileRequiredField, default_permits};
pub use review::{FileReviewConfig, FileReviewerConfig};
pub use server::{DEFAULT_BIND, FileServerConfig};

use permitflow_domain::{ConfigIssue, PermitCatalog};
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// HTTP listener
    pub server: FileServerConfig,
    /// Session hub sizing
    pub hub: FileHubConfig,
    /// Reviewer panel and consensus rule
    pub review: FileReviewConfig,
    /// Judgment service endpoint
    pub llm: FileLlmConfig,
    /// Permit types offered to applicants
    pub permits: Vec<FilePermitConfig>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            server: FileServerConfig::default(),
            hub: FileHubConfig::default(),
            review: FileReviewConfig::default(),
            llm: FileLlmConfig::default(),
            permits: default_permits(),
        }
    }
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Errors make the configuration unusable; warnings are reported and
    /// the configuration is used as-is.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        issues.extend(permits::validate_permits(&self.permits));
        issues.extend(self.review.validate());
        issues.extend(self.hub.validate());
        issues
    }

    pub fn to_catalog(&self) -> PermitCatalog {
        permits::to_catalog(&self.permits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use permitflow_domain::ConfigIssueCode;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[server]
bind = "0.0.0.0:9000"

[hub]
history_capacity = 5

[review]
timeout_secs = 30
veto_reviewers = []

[[review.reviewers]]
id = "cyber"
weight = 0.5

[[review.reviewers]]
id = "finance"
weight = 0.5
focus = "budget realism"

[llm]
endpoint = "http://localhost:11434/v1"
model = "llama3.1"

[[permits]]
name = "Permit to Operate"
required_fields = ["runbook", "on_call"]
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:9000");
        assert_eq!(config.hub.history_capacity, 5);
        assert_eq!(config.hub.sink_queue_capacity, 64);
        assert_eq!(config.review.timeout_secs, 30);
        assert_eq!(config.review.reviewers.len(), 2);
        assert!(config.llm.is_configured());
        assert_eq!(config.permits.len(), 1);
        assert!(config.validate().is_empty());

        let catalog = config.to_catalog();
        assert_eq!(catalog.names(), vec!["Permit to Operate"]);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config, FileConfig::default());
        assert_eq!(config.server.bind, DEFAULT_BIND);
        assert_eq!(config.permits.len(), 2);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validate_aggregates_sections() {
        let mut config = FileConfig::default();
        config.permits.clear();
        config.hub.history_capacity = 0;

        let codes: Vec<_> = config.validate().into_iter().map(|i| i.code).collect();
        assert!(codes.contains(&ConfigIssueCode::NoPermitTypes));
        assert!(codes.contains(&ConfigIssueCode::ZeroHistoryCapacity));
    }
}
