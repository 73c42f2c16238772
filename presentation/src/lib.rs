//! Presentation layer for permitflow
//!
//! This crate contains the CLI definition and the HTTP surface that
//! connects transport clients to the session broadcast hub.

pub mod cli;
pub mod server;

// Re-export commonly used types
pub use cli::commands::Cli;
pub use server::{AppState, ConversationHub, create_router, serve};
