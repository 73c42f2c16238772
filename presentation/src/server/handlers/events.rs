//! One-way event stream (Server-Sent Events)

use super::SessionQuery;
use crate::server::state::AppState;
use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{self, Stream};
use permitflow_application::SinkKind;
use std::convert::Infallible;
use std::time::Duration;
use tracing::debug;

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// `GET /events?session=<id>`
///
/// Replays the session's history, then streams live messages. The stream
/// owns the hub membership, so the client leaves when it disconnects.
pub async fn session_events(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (sink, rx) = state.hub.sink(SinkKind::OneWay);
    let membership = state.hub.join(&query.session, sink);
    debug!(
        "Session {}: event stream {} opened",
        membership.session_id(),
        membership.sink_id()
    );

    let shutdown = state.shutdown.clone();
    let stream = stream::unfold(
        (rx, membership, shutdown),
        |(mut rx, membership, shutdown)| async move {
            let next = tokio::select! {
                _ = shutdown.cancelled() => None,
                message = rx.recv() => message,
            };
            let message = next?;

            let event = Event::default()
                .event("message")
                .id(message.seq.to_string())
                .json_data(&message)
                .unwrap_or_else(|_| Event::default().comment("unserializable message"));
            Some((Ok(event), (rx, membership, shutdown)))
        },
    );

    Sse::new(stream).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL).text("ping"))
}
