//! Session hub configuration from TOML (`[hub]` section)
//!
//! ```toml
//! [hub]
//! history_capacity = 20      # messages replayed to new event-stream clients
//! sink_queue_capacity = 64   # per-connection outbound queue
//! ```

use permitflow_application::HubParams;
use permitflow_application::config::hub_params::{
    DEFAULT_HISTORY_CAPACITY, DEFAULT_SINK_QUEUE_CAPACITY,
};
use permitflow_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileHubConfig {
    pub history_capacity: usize,
    pub sink_queue_capacity: usize,
}

impl Default for FileHubConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            sink_queue_capacity: DEFAULT_SINK_QUEUE_CAPACITY,
        }
    }
}

impl FileHubConfig {
    pub fn to_hub_params(&self) -> HubParams {
        HubParams::default()
            .with_history_capacity(self.history_capacity)
            .with_sink_queue_capacity(self.sink_queue_capacity)
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.history_capacity == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroHistoryCapacity,
                "hub.history_capacity must be at least 1",
            ));
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hub_defaults() {
        let config = FileHubConfig::default();
        assert_eq!(config.history_capacity, 20);
        assert!(config.validate().is_empty());
        assert_eq!(config.to_hub_params().effective_sink_capacity(), 64);
    }

    #[test]
    fn test_zero_history_is_error() {
        let config = FileHubConfig {
            history_capacity: 0,
            ..Default::default()
        };
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].is_error());
    }
}
