//! Session broadcast hub
//!
//! Multiplexes one logical conversation per session id across any number of
//! duplex and one-way transport sinks. See [`SessionBroadcastHub`].

pub mod broadcast;
pub mod sink;

pub use broadcast::{HubError, PublishReport, SessionBroadcastHub, SessionMembership};
pub use sink::{DeliveryFailure, SessionMessage, Sink, SinkId, SinkKind};
