//! One conversational turn, shared by every inbound transport

use super::state::ConversationHub;
use permitflow_application::{HubError, PublishReport, SessionMessage};
use tracing::debug;

/// Sender tag of bot messages
pub const BOT_SENDER: &str = "bot";

/// Sender tag used when a client does not name an avatar
pub const DEFAULT_AVATAR: &str = "user";

/// Publish a user's message, let the session's conversation answer, and
/// publish the reply.
///
/// The conversation lock is held across both publishes, so turns of one
/// session never interleave on the wire. If the session is torn down while
/// the reply is being produced, the reply is returned undelivered.
pub async fn relay_turn(
    hub: &ConversationHub,
    session_id: &str,
    sender: &str,
    text: &str,
) -> Result<PublishReport, HubError> {
    let state = hub
        .state(session_id)
        .ok_or_else(|| HubError::UnknownSession(session_id.to_string()))?;
    let mut conversation = state.lock().await;

    let user = hub.publish(session_id, sender, text)?;
    let reply = conversation.handle(text).await;
    let report = match hub.publish(session_id, BOT_SENDER, &reply) {
        Ok(report) => report,
        // Every sink left while the turn was running; the turn itself stands
        Err(HubError::UnknownSession(_)) => {
            debug!("Session {}: torn down before the reply was published", session_id);
            PublishReport {
                message: SessionMessage::new(user.message.seq + 1, BOT_SENDER, reply),
                delivered: 0,
                dropped: Vec::new(),
            }
        }
    };

    debug!(
        "Session {}: turn {} delivered to {} sink(s)",
        session_id, report.message.seq, report.delivered
    );
    Ok(report)
}
