//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave:
//!
//! - [`ReviewParams`]: Reviewer fan-out (per-call timeout)
//! - [`HubParams`]: Session hub sizing (replay history, per-sink queues)

pub mod hub_params;
pub mod review_params;

pub use hub_params::HubParams;
pub use review_params::ReviewParams;
