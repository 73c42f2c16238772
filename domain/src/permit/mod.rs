//! Permit applications and the catalog of permit types.

pub mod catalog;
pub mod record;

pub use catalog::{PermitCatalog, PermitDefinition, RequiredField, parse_permit_selection};
pub use record::{
    ApplicationEvent, ApplicationEventKind, ApplicationId, ApplicationRecord, ApplicationStatus,
};
