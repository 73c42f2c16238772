//! Conversation session primitives: chat messages for the judgment service
//! and the bounded per-session transcript.

pub mod entities;
pub mod transcript;

pub use entities::{Message, Role};
pub use transcript::{Speaker, Transcript, TranscriptEntry};
