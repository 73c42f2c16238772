//! Duplex WebSocket endpoint

use super::SessionQuery;
use crate::server::state::AppState;
use crate::server::turn::{BOT_SENDER, relay_turn};
use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use permitflow_application::{SessionMessage, SinkKind};
use tracing::{debug, warn};

/// `GET /ws/flowbot?session=<id>&avatar=<name>`
pub async fn flowbot_ws(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, query))
}

async fn send_frame(
    tx: &mut SplitSink<WebSocket, Message>,
    message: &SessionMessage,
) -> Result<(), axum::Error> {
    match serde_json::to_string(message) {
        Ok(json) => tx.send(Message::Text(json)).await,
        Err(e) => {
            warn!("Could not encode frame {}: {}", message.seq, e);
            Ok(())
        }
    }
}

async fn handle_socket(socket: WebSocket, state: AppState, query: SessionQuery) {
    let (sink, mut rx) = state.hub.sink(SinkKind::Duplex);
    let membership = state.hub.join(&query.session, sink);
    let (mut tx, mut inbound) = socket.split();
    debug!(
        "Session {}: websocket {} connected as {}",
        membership.session_id(),
        membership.sink_id(),
        query.avatar
    );

    // The opening prompt goes to this client only; it is not session history.
    let opening = membership.state().lock().await.opening();
    if let Some(text) = opening
        && send_frame(&mut tx, &SessionMessage::new(0, BOT_SENDER, text))
            .await
            .is_err()
    {
        return;
    }

    let mut writer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if send_frame(&mut tx, &message).await.is_err() {
                break;
            }
        }
        let _ = tx.close().await;
    });

    loop {
        tokio::select! {
            _ = state.shutdown.cancelled() => break,
            _ = &mut writer => break,
            frame = inbound.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    let text = text.trim();
                    if text.is_empty() {
                        continue;
                    }
                    if let Err(e) =
                        relay_turn(&state.hub, membership.session_id(), &query.avatar, text).await
                    {
                        warn!("Session {}: {}", membership.session_id(), e);
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!("Session {}: websocket error: {}", membership.session_id(), e);
                    break;
                }
            }
        }
    }

    debug!(
        "Session {}: websocket {} disconnected",
        membership.session_id(),
        membership.sink_id()
    );
    drop(membership);
    writer.abort();
}
