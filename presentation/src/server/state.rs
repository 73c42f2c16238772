//! Shared state for HTTP handlers

use permitflow_application::{PermitConversation, SessionBroadcastHub};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// The hub every transport publishes into
pub type ConversationHub = SessionBroadcastHub<PermitConversation>;

#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<ConversationHub>,
    /// Cancelled on shutdown; long-lived streams end when it fires
    pub shutdown: CancellationToken,
    pub version: String,
    started_at: Instant,
}

impl AppState {
    pub fn new(hub: Arc<ConversationHub>, shutdown: CancellationToken) -> Self {
        Self {
            hub,
            shutdown,
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
