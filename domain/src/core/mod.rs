//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`]: Domain-level errors
//! - [`validation::ConfigIssue`]: Configuration validation results

pub mod error;
pub mod validation;
