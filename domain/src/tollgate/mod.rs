//! Tollgate phases.
//!
//! An application moves through three ordered tollgates:
//!
//! ```text
//! Intake(step) ──(all required fields)──▶ Reviewing(step) ──(review)──▶ Finalized
//! ```
//!
//! Each phase may carry scripted prompts; within a phase the step counter
//! tracks how many of them have been delivered.

pub mod phase;

pub use phase::{TollgatePhase, TollgateState};
