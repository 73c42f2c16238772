//! Use cases (application services)

pub mod collect_fields;
pub mod conversation;
pub mod review_application;
pub mod tollgate;
