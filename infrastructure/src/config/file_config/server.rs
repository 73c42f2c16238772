//! HTTP server configuration from TOML (`[server]` section)
//!
//! ```toml
//! [server]
//! bind = "0.0.0.0:8000"
//! ```

use serde::{Deserialize, Serialize};

/// Default listen address
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileServerConfig {
    /// Socket address the HTTP server listens on
    pub bind: String,
}

impl Default for FileServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
        }
    }
}
