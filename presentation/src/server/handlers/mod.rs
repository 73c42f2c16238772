//! HTTP route handlers

mod events;
mod health;
mod send;
mod ws;

pub use events::session_events;
pub use health::{health_check, version};
pub use send::send_message;
pub use ws::flowbot_ws;

use crate::server::turn::DEFAULT_AVATAR;
use serde::Deserialize;

/// `?session=<id>&avatar=<name>`
#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    pub session: String,
    #[serde(default = "default_avatar")]
    pub avatar: String,
}

fn default_avatar() -> String {
    DEFAULT_AVATAR.to_string()
}
