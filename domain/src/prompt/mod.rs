//! Prompt text: judgment-service templates and the bot's conversational replies.

pub mod conversation;
pub mod template;

pub use conversation::ConversationText;
pub use template::PromptTemplate;
