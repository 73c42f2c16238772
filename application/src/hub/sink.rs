//! Transport sinks and the messages they carry

use permitflow_domain::util::current_timestamp_ms;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

static NEXT_SINK_ID: AtomicU64 = AtomicU64::new(1);

/// One published message as delivered to every sink of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMessage {
    /// Per-session sequence number, starting at 1
    pub seq: u64,
    /// Who sent it: the bot, or the user's avatar tag
    pub sender: String,
    pub text: String,
    pub timestamp_ms: u64,
}

impl SessionMessage {
    pub fn new(seq: u64, sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            seq,
            sender: sender.into(),
            text: text.into(),
            timestamp_ms: current_timestamp_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkKind {
    /// Bidirectional connection (WebSocket)
    Duplex,
    /// Server-to-client only (event stream)
    OneWay,
}

impl std::fmt::Display for SinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkKind::Duplex => write!(f, "duplex"),
            SinkKind::OneWay => write!(f, "one-way"),
        }
    }
}

/// Process-unique sink identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SinkId(u64);

impl SinkId {
    fn generate() -> Self {
        Self(NEXT_SINK_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for SinkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sink-{}", self.0)
    }
}

/// Why a delivery failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryFailure {
    /// The sink's queue is full (slow consumer)
    Full,
    /// The consumer went away
    Closed,
}

/// Sending half of a bounded per-connection queue
///
/// The transport task owns the matching receiver and writes whatever arrives
/// to its connection. Delivery never waits: a full or closed queue fails
/// immediately.
#[derive(Debug, Clone)]
pub struct Sink {
    id: SinkId,
    kind: SinkKind,
    tx: mpsc::Sender<SessionMessage>,
}

impl Sink {
    /// Create a sink and the receiver its transport task drains
    pub fn channel(kind: SinkKind, capacity: usize) -> (Self, mpsc::Receiver<SessionMessage>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            Self {
                id: SinkId::generate(),
                kind,
                tx,
            },
            rx,
        )
    }

    pub fn id(&self) -> SinkId {
        self.id
    }

    pub fn kind(&self) -> SinkKind {
        self.kind
    }

    pub(crate) fn deliver(&self, message: SessionMessage) -> Result<(), DeliveryFailure> {
        self.tx.try_send(message).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryFailure::Full,
            TrySendError::Closed(_) => DeliveryFailure::Closed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_ids_are_unique() {
        let (a, _ra) = Sink::channel(SinkKind::Duplex, 1);
        let (b, _rb) = Sink::channel(SinkKind::OneWay, 1);
        assert_ne!(a.id(), b.id());
        assert_eq!(b.kind(), SinkKind::OneWay);
    }

    #[test]
    fn test_deliver_reports_full_and_closed() {
        let (sink, rx) = Sink::channel(SinkKind::Duplex, 1);
        assert!(sink.deliver(SessionMessage::new(1, "bot", "a")).is_ok());
        assert_eq!(
            sink.deliver(SessionMessage::new(2, "bot", "b")),
            Err(DeliveryFailure::Full)
        );

        drop(rx);
        assert_eq!(
            sink.deliver(SessionMessage::new(3, "bot", "c")),
            Err(DeliveryFailure::Closed)
        );
    }
}
