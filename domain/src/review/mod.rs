//! Review domain: reviewer verdicts and the consensus rules that combine them.

pub mod consensus;
pub mod parsing;
pub mod verdict;

pub use consensus::{
    ConsensusEngine, ConsensusResult, DEFAULT_VETO_THRESHOLD, FinalDecision, ReviewerWeight,
};
pub use parsing::{extract_json_object, try_parse_verdict};
pub use verdict::{Decision, ReviewVerdict, VerdictSet};
