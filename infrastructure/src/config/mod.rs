//! Configuration file loading for permitflow
//!
//! The priority order (highest to lowest):
//!
//! 1. `PERMITFLOW_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./permitflow.toml` or `./.permitflow.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/permitflow/config.toml`
//! 5. Default values

mod error;
mod file_config;
mod loader;

pub use error::ConfigError;
pub use file_config::{
    DEFAULT_BIND, FileConfig, FileHubConfig, FileLlmConfig, FilePermitConfig, FileRequiredField,
    FileReviewConfig, FileReviewerConfig, FileServerConfig, default_permits,
};
pub use loader::ConfigLoader;
