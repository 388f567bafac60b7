//! Conversation context module.
//!
//! - `message`: role-tagged messages (`MessageRole`, `ConversationMessage`)
//! - `conversation`: the message list and its JSON document
//!   (`ConversationContext`, `ContextDocument`)

mod conversation;
mod message;

pub use conversation::{ContextDocument, ConversationContext};
pub use message::{ConversationMessage, MessageRole};
