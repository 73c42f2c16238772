//! Tollgate phase and step tracking

use serde::{Deserialize, Serialize};

/// A tollgate phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TollgatePhase {
    Intake,
    Reviewing,
    Finalized,
}

impl TollgatePhase {
    /// 1-based phase number used to look up scripted prompts
    pub fn number(&self) -> usize {
        match self {
            TollgatePhase::Intake => 1,
            TollgatePhase::Reviewing => 2,
            TollgatePhase::Finalized => 3,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TollgatePhase::Finalized)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TollgatePhase::Intake => "intake",
            TollgatePhase::Reviewing => "reviewing",
            TollgatePhase::Finalized => "finalized",
        }
    }
}

impl std::fmt::Display for TollgatePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current phase plus the 1-based step within it.
///
/// Entering a phase puts it at step 1, which corresponds to that phase's
/// first scripted prompt (if any). Prompts are consumed strictly in order.
///
/// ```
/// use permitflow_domain::tollgate::{TollgatePhase, TollgateState};
///
/// let mut state = TollgateState::initial();
/// assert_eq!(state, TollgateState::new(TollgatePhase::Intake, 1));
///
/// // Two scripted prompts: step 1 was shown on entry, step 2 is still unseen
/// assert!(state.has_unseen_prompt(2));
/// state.next_step();
/// assert!(!state.has_unseen_prompt(2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TollgateState {
    phase: TollgatePhase,
    step: usize,
}

impl TollgateState {
    pub fn new(phase: TollgatePhase, step: usize) -> Self {
        Self {
            phase,
            step: step.max(1),
        }
    }

    /// `Intake(1)`
    pub fn initial() -> Self {
        Self::new(TollgatePhase::Intake, 1)
    }

    pub fn phase(&self) -> TollgatePhase {
        self.phase
    }

    pub fn step(&self) -> usize {
        self.step
    }

    /// Whether a phase with `prompt_count` scripted prompts still has one
    /// that has not been delivered
    pub fn has_unseen_prompt(&self, prompt_count: usize) -> bool {
        self.step < prompt_count
    }

    /// Index of the next undelivered prompt
    pub fn next_prompt_index(&self) -> usize {
        self.step
    }

    pub fn next_step(&mut self) {
        self.step += 1;
    }

    /// Move to the first step of another phase
    pub fn enter(&mut self, phase: TollgatePhase) {
        self.phase = phase;
        self.step = 1;
    }
}

impl Default for TollgateState {
    fn default() -> Self {
        Self::initial()
    }
}

impl std::fmt::Display for TollgateState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.phase {
            TollgatePhase::Finalized => write!(f, "finalized"),
            phase => write!(f, "{}({})", phase, self.step),
        }
    }
}
