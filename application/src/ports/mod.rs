//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod application_repository;
pub mod conversation_logger;
pub mod field_extractor;
pub mod judgment_service;
pub mod reviewer;
