//! Session transcript.
//!
//! Every user and bot message of a session is appended in order. The
//! transcript is bounded: once `capacity` entries are held, the oldest is
//! evicted first.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Who said a transcript line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Bot,
}

impl Speaker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Speaker::User => "user",
            Speaker::Bot => "bot",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub text: String,
}

/// Bounded FIFO of conversation lines
///
/// # Example
///
/// ```
/// use permitflow_domain::session::Transcript;
///
/// let mut transcript = Transcript::with_capacity(2);
/// transcript.push_user("hello");
/// transcript.push_bot("hi");
/// transcript.push_user("permit to build");
///
/// assert_eq!(transcript.len(), 2);
/// assert_eq!(transcript.render(), "bot: hi\nuser: permit to build");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    entries: VecDeque<TranscriptEntry>,
    capacity: usize,
}

impl Transcript {
    /// A transcript holding at most `capacity` entries (minimum 1)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, speaker: Speaker, text: impl Into<String>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(TranscriptEntry {
            speaker,
            text: text.into(),
        });
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.push(Speaker::User, text);
    }

    pub fn push_bot(&mut self, text: impl Into<String>) {
        self.push(Speaker::Bot, text);
    }

    pub fn entries(&self) -> impl Iterator<Item = &TranscriptEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// `speaker: text` lines, oldest first
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{}: {}", e.speaker.as_str(), e.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evicts_oldest_first() {
        let mut t = Transcript::with_capacity(3);
        for i in 0..5 {
            t.push_user(format!("m{i}"));
        }
        let texts: Vec<&str> = t.entries().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["m2", "m3", "m4"]);
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        let mut t = Transcript::with_capacity(0);
        t.push_bot("a");
        t.push_bot("b");
        assert_eq!(t.capacity(), 1);
        assert_eq!(t.render(), "bot: b");
    }

    #[test]
    fn test_render_empty() {
        let t = Transcript::with_capacity(4);
        assert!(t.is_empty());
        assert_eq!(t.render(), "");
    }
}
