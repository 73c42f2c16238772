//! Session broadcast hub.
//!
//! Owns, per session id:
//!
//! - the connected duplex and one-way [`Sink`]s (disjoint sets),
//! - a bounded FIFO history of the last K published messages,
//! - the session's conversation state `S` (created by a factory on first join).
//!
//! # Locking
//!
//! The session map uses a `std::sync::RwLock` held only for lookup, insert
//! and removal. Each session has its own `std::sync::Mutex` around its sinks
//! and history, so unrelated sessions never contend. A publish appends to
//! history and delivers to every sink under that one lock, which makes it
//! atomic with respect to joins and other publishes of the same session.
//! Delivery uses `try_send` and never blocks while the lock is held.
//!
//! Lock order is always map, then session. Teardown holds both and marks the
//! session closed, so a join racing with teardown retries on a fresh session.

use super::sink::{DeliveryFailure, SessionMessage, Sink, SinkId, SinkKind};
use crate::config::HubParams;
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HubError {
    #[error("Unknown session: {0}")]
    UnknownSession(String),
}

/// Outcome of one publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub message: SessionMessage,
    /// Sinks that accepted the message
    pub delivered: usize,
    /// Sinks removed because delivery failed
    pub dropped: Vec<SinkId>,
}

struct Channels {
    duplex: Vec<Sink>,
    one_way: Vec<Sink>,
    history: VecDeque<SessionMessage>,
    next_seq: u64,
    closed: bool,
}

impl Channels {
    fn new(history_capacity: usize) -> Self {
        Self {
            duplex: Vec::new(),
            one_way: Vec::new(),
            history: VecDeque::with_capacity(history_capacity),
            next_seq: 1,
            closed: false,
        }
    }

    fn is_empty(&self) -> bool {
        self.duplex.is_empty() && self.one_way.is_empty()
    }

    fn remove(&mut self, sink_id: SinkId) -> bool {
        let before = self.duplex.len() + self.one_way.len();
        self.duplex.retain(|s| s.id() != sink_id);
        self.one_way.retain(|s| s.id() != sink_id);
        before != self.duplex.len() + self.one_way.len()
    }
}

struct SessionSlot<S> {
    channels: Mutex<Channels>,
    state: Arc<tokio::sync::Mutex<S>>,
}

impl<S> SessionSlot<S> {
    fn channels(&self) -> MutexGuard<'_, Channels> {
        self.channels.lock().unwrap_or_else(|e| e.into_inner())
    }
}

type StateFactory<S> = Box<dyn Fn(&str) -> S + Send + Sync>;

/// Per-session fan-out of outbound messages with bounded replay
///
/// # Example
///
/// ```
/// use permitflow_application::HubParams;
/// use permitflow_application::hub::{SessionBroadcastHub, SinkKind};
/// use std::sync::Arc;
///
/// let hub = Arc::new(SessionBroadcastHub::new(HubParams::default(), |_session| ()));
///
/// let (sink, mut rx) = hub.sink(SinkKind::OneWay);
/// let membership = hub.join("s1", sink);
///
/// hub.publish("s1", "bot", "hello").unwrap();
/// assert_eq!(rx.try_recv().unwrap().text, "hello");
///
/// drop(membership);
/// assert!(!hub.has_session("s1"));
/// ```
pub struct SessionBroadcastHub<S> {
    sessions: RwLock<HashMap<String, Arc<SessionSlot<S>>>>,
    params: HubParams,
    factory: StateFactory<S>,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl<S: Send + 'static> SessionBroadcastHub<S> {
    /// `factory` builds the conversation state of a session on first join
    pub fn new<F>(params: HubParams, factory: F) -> Self
    where
        F: Fn(&str) -> S + Send + Sync + 'static,
    {
        Self {
            sessions: RwLock::new(HashMap::new()),
            params,
            factory: Box::new(factory),
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn params(&self) -> HubParams {
        self.params
    }

    /// Create a sink sized for this hub
    pub fn sink(&self, kind: SinkKind) -> (Sink, tokio::sync::mpsc::Receiver<SessionMessage>) {
        Sink::channel(kind, self.params.effective_sink_capacity())
    }

    /// Register a sink under a session, creating the session if needed.
    ///
    /// A one-way sink first receives the session's history, oldest first,
    /// before any live message. Dropping the returned membership leaves the
    /// session.
    pub fn join(self: &Arc<Self>, session_id: &str, sink: Sink) -> SessionMembership<S> {
        let sink_id = sink.id();
        let kind = sink.kind();

        loop {
            let slot = self.slot_or_create(session_id);
            let mut channels = slot.channels();
            if channels.closed {
                // Torn down between lookup and lock; retry on a fresh session
                continue;
            }

            let mut replay_failed = None;
            if kind == SinkKind::OneWay {
                for message in channels.history.iter() {
                    if let Err(failure) = sink.deliver(message.clone()) {
                        replay_failed = Some(failure);
                        break;
                    }
                }
            }

            match replay_failed {
                None => {
                    debug!(
                        "Session {}: {} {} joined (replayed {})",
                        session_id,
                        kind,
                        sink_id,
                        if kind == SinkKind::OneWay {
                            channels.history.len()
                        } else {
                            0
                        }
                    );
                    match kind {
                        SinkKind::Duplex => channels.duplex.push(sink),
                        SinkKind::OneWay => channels.one_way.push(sink),
                    }
                }
                Some(failure) => {
                    warn!(
                        "Session {}: replay to {} failed ({:?}), not registering",
                        session_id, sink_id, failure
                    );
                }
            }

            return SessionMembership {
                hub: Arc::clone(self),
                session_id: session_id.to_string(),
                sink_id,
                state: Arc::clone(&slot.state),
            };
        }
    }

    /// Append a message to the session's history and deliver it to every sink.
    ///
    /// Sinks whose queue is full or closed are removed; the others still
    /// receive the message.
    pub fn publish(
        &self,
        session_id: &str,
        sender: &str,
        text: &str,
    ) -> Result<PublishReport, HubError> {
        let slot = self
            .slot(session_id)
            .ok_or_else(|| HubError::UnknownSession(session_id.to_string()))?;

        let mut channels = slot.channels();
        if channels.closed {
            return Err(HubError::UnknownSession(session_id.to_string()));
        }

        let message = SessionMessage::new(channels.next_seq, sender, text);
        channels.next_seq += 1;

        if self.params.history_capacity > 0 {
            while channels.history.len() >= self.params.history_capacity {
                channels.history.pop_front();
            }
            channels.history.push_back(message.clone());
        }

        let mut delivered = 0;
        let mut failed: Vec<(SinkId, SinkKind, DeliveryFailure)> = Vec::new();
        for sink in channels.duplex.iter().chain(channels.one_way.iter()) {
            match sink.deliver(message.clone()) {
                Ok(()) => delivered += 1,
                Err(failure) => failed.push((sink.id(), sink.kind(), failure)),
            }
        }

        let mut dropped = Vec::with_capacity(failed.len());
        for (sink_id, kind, failure) in failed {
            channels.remove(sink_id);
            dropped.push(sink_id);
            debug!(
                "Session {}: dropped {} {} ({:?})",
                session_id, kind, sink_id, failure
            );
            self.conversation_logger.log(ConversationEvent::new(
                "sink_dropped",
                serde_json::json!({
                    "session_id": session_id,
                    "sink": sink_id.to_string(),
                    "kind": kind.to_string(),
                    "reason": format!("{:?}", failure).to_lowercase(),
                }),
            ));
        }

        Ok(PublishReport {
            message,
            delivered,
            dropped,
        })
    }

    /// Remove a sink. Tears the session down when it was the last one.
    ///
    /// Idempotent; returns whether the session was torn down.
    pub fn leave(&self, session_id: &str, sink_id: SinkId) -> bool {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        let Some(slot) = sessions.get(session_id).cloned() else {
            return false;
        };

        let mut channels = slot.channels();
        if channels.remove(sink_id) {
            debug!("Session {}: {} left", session_id, sink_id);
        }

        if channels.is_empty() {
            channels.closed = true;
            drop(channels);
            sessions.remove(session_id);
            info!("Session {}: last sink left, session torn down", session_id);
            true
        } else {
            false
        }
    }

    /// Conversation state of a live session
    pub fn state(&self, session_id: &str) -> Option<Arc<tokio::sync::Mutex<S>>> {
        self.slot(session_id).map(|slot| Arc::clone(&slot.state))
    }

    pub fn has_session(&self, session_id: &str) -> bool {
        self.slot(session_id).is_some()
    }

    pub fn session_count(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// `(duplex, one_way)` sink counts of a live session
    pub fn sink_counts(&self, session_id: &str) -> Option<(usize, usize)> {
        self.slot(session_id).map(|slot| {
            let channels = slot.channels();
            (channels.duplex.len(), channels.one_way.len())
        })
    }

    /// Snapshot of a session's replay history, oldest first
    pub fn history(&self, session_id: &str) -> Vec<SessionMessage> {
        self.slot(session_id)
            .map(|slot| slot.channels().history.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn slot(&self, session_id: &str) -> Option<Arc<SessionSlot<S>>> {
        self.sessions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(session_id)
            .cloned()
    }

    fn slot_or_create(&self, session_id: &str) -> Arc<SessionSlot<S>> {
        if let Some(slot) = self.slot(session_id) {
            return slot;
        }

        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        Arc::clone(sessions.entry(session_id.to_string()).or_insert_with(|| {
            info!("Session {}: created", session_id);
            Arc::new(SessionSlot {
                channels: Mutex::new(Channels::new(self.params.history_capacity)),
                state: Arc::new(tokio::sync::Mutex::new((self.factory)(session_id))),
            })
        }))
    }
}

/// A sink's registration in a session; leaves the session when dropped
pub struct SessionMembership<S: Send + 'static> {
    hub: Arc<SessionBroadcastHub<S>>,
    session_id: String,
    sink_id: SinkId,
    state: Arc<tokio::sync::Mutex<S>>,
}

impl<S: Send + 'static> SessionMembership<S> {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn sink_id(&self) -> SinkId {
        self.sink_id
    }

    /// The session's conversation state
    pub fn state(&self) -> &Arc<tokio::sync::Mutex<S>> {
        &self.state
    }

    /// Publish into this membership's session
    pub fn publish(&self, sender: &str, text: &str) -> Result<PublishReport, HubError> {
        self.hub.publish(&self.session_id, sender, text)
    }
}

impl<S: Send + 'static> Drop for SessionMembership<S> {
    fn drop(&mut self) {
        self.hub.leave(&self.session_id, self.sink_id);
    }
}
