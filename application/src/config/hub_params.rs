//! Hub parameters: Session broadcast sizing.

use serde::{Deserialize, Serialize};

/// Default replay history length (K)
pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

/// Default per-sink outbound queue length
pub const DEFAULT_SINK_QUEUE_CAPACITY: usize = 64;

/// Sizing for [`SessionBroadcastHub`](crate::hub::SessionBroadcastHub).
///
/// The history capacity also bounds each session's transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubParams {
    /// Messages kept per session for replay to newly joined one-way sinks
    pub history_capacity: usize,
    /// Requested per-sink queue length
    pub sink_queue_capacity: usize,
}

impl Default for HubParams {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            sink_queue_capacity: DEFAULT_SINK_QUEUE_CAPACITY,
        }
    }
}

impl HubParams {
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    pub fn with_sink_queue_capacity(mut self, capacity: usize) -> Self {
        self.sink_queue_capacity = capacity;
        self
    }

    /// Queue length actually allocated per sink.
    ///
    /// Never below the history capacity, so a full replay always fits into
    /// a fresh sink, and never zero.
    pub fn effective_sink_capacity(&self) -> usize {
        self.sink_queue_capacity.max(self.history_capacity).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = HubParams::default();
        assert_eq!(params.history_capacity, 20);
        assert_eq!(params.effective_sink_capacity(), 64);
    }

    #[test]
    fn test_sink_capacity_covers_history() {
        let params = HubParams::default()
            .with_history_capacity(100)
            .with_sink_queue_capacity(8);
        assert_eq!(params.effective_sink_capacity(), 100);

        let params = HubParams::default()
            .with_history_capacity(0)
            .with_sink_queue_capacity(0);
        assert_eq!(params.effective_sink_capacity(), 1);
    }
}
