//! HTTP surface: duplex WebSocket, one-way event stream and out-of-band send
//!
//! | Route | Transport |
//! |-------|-----------|
//! | `GET /ws/flowbot?session&avatar` | duplex sink |
//! | `GET /events?session` | one-way sink (SSE) |
//! | `POST /send?session&avatar` | out-of-band user message |
//! | `GET /health`, `GET /version` | status |

pub mod error;
pub mod handlers;
pub mod state;
pub mod turn;

pub use error::{ApiError, ApiResult};
pub use state::{AppState, ConversationHub};
pub use turn::{BOT_SENDER, relay_turn};

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tracing::info;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/ws/flowbot", get(handlers::flowbot_ws))
        .route("/events", get(handlers::session_events))
        .route("/send", post(handlers::send_message))
        .route("/health", get(handlers::health_check))
        .route("/version", get(handlers::version))
        .with_state(state)
}

/// Serve until the state's shutdown token is cancelled, then drain.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    let shutdown = state.shutdown.clone();
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("Server stopped");
    Ok(())
}
