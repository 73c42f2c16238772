//! Infrastructure layer for permitflow
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod judgment;
pub mod logging;
pub mod repository;

// Re-export commonly used types
pub use config::{
    ConfigError, ConfigLoader, FileConfig, FileHubConfig, FileLlmConfig, FilePermitConfig,
    FileRequiredField, FileReviewConfig, FileReviewerConfig, FileServerConfig,
};
pub use judgment::{HttpJudgmentClient, LlmFieldExtractor, LlmReviewer, reviewers_from_config};
pub use logging::JsonlConversationLogger;
pub use repository::InMemoryApplicationRepository;
