//! Out-of-band message submission

use super::SessionQuery;
use crate::server::error::{ApiError, ApiResult};
use crate::server::state::AppState;
use crate::server::turn::relay_turn;
use axum::{
    Json,
    extract::{Query, State},
};
use permitflow_application::{HubError, SessionMessage};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct SendResponse {
    /// The bot's reply as published to the session
    pub reply: SessionMessage,
    pub delivered: usize,
}

/// `POST /send?session=<id>&avatar=<name>`
///
/// Only sessions with at least one connected sink accept messages.
pub async fn send_message(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
    Json(request): Json<SendRequest>,
) -> ApiResult<Json<SendResponse>> {
    let text = request.text.trim();
    if text.is_empty() {
        return Err(ApiError::BadRequest("text must not be empty".to_string()));
    }

    let connected = state
        .hub
        .sink_counts(&query.session)
        .is_some_and(|(duplex, one_way)| duplex + one_way > 0);
    if !connected {
        return Err(ApiError::NotFound(format!(
            "session '{}' has no connected clients",
            query.session
        )));
    }

    let report = relay_turn(&state.hub, &query.session, &query.avatar, text)
        .await
        .map_err(|e| match e {
            HubError::UnknownSession(session) => {
                ApiError::NotFound(format!("session '{session}' has no connected clients"))
            }
        })?;

    Ok(Json(SendResponse {
        reply: report.message,
        delivered: report.delivered,
    }))
}
