//! The message list sent to the completion service.

use super::message::{ConversationMessage, MessageRole};
use crate::error::Result;
use crate::viewpoint::Viewpoint;
use serde::{Deserialize, Serialize};

/// Ordered role-tagged messages plus raw user lines not yet folded in.
///
/// Lines typed into a buffer are queued as pending as each one is finished,
/// while a whole-buffer exchange appends full messages. `snapshot` presents
/// both as one list, so the two submission styles share a representation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationContext {
    messages: Vec<ConversationMessage>,
    pending: Vec<String>,
}

impl ConversationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context already seeded for `viewpoint`.
    pub fn for_viewpoint(viewpoint: &Viewpoint) -> Self {
        let mut context = Self::new();
        context.reset(viewpoint);
        context
    }

    /// Discards messages and pending lines, then seeds one system message
    /// per viewpoint instruction, in catalogue order.
    pub fn reset(&mut self, viewpoint: &Viewpoint) {
        self.messages.clear();
        self.pending.clear();
        self.messages.extend(
            viewpoint
                .instructions
                .iter()
                .map(|instruction| ConversationMessage::system(instruction.as_str())),
        );
    }

    pub fn append(&mut self, role: MessageRole, text: impl Into<String>) {
        self.messages.push(ConversationMessage::new(role, text));
    }

    pub fn append_system(&mut self, text: impl Into<String>) {
        self.append(MessageRole::System, text);
    }

    pub fn append_user(&mut self, text: impl Into<String>) {
        self.append(MessageRole::User, text);
    }

    pub fn append_assistant(&mut self, text: impl Into<String>) {
        self.append(MessageRole::Assistant, text);
    }

    /// Queues a raw user line.
    pub fn push_pending(&mut self, line: impl Into<String>) {
        self.pending.push(line.into());
    }

    /// Moves pending lines into the message list as user messages.
    pub fn fold_pending(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        self.messages
            .extend(pending.into_iter().map(ConversationMessage::user));
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    /// Messages followed by pending lines as user messages, in arrival order.
    pub fn snapshot(&self) -> Vec<ConversationMessage> {
        self.messages
            .iter()
            .cloned()
            .chain(self.pending.iter().map(|line| ConversationMessage::user(line.as_str())))
            .collect()
    }

    /// Builds the persisted/request document for `viewpoint`.
    pub fn to_document(&self, viewpoint: &Viewpoint) -> ContextDocument {
        ContextDocument {
            model: viewpoint.model.clone(),
            max_tokens: viewpoint.max_tokens,
            messages: self.snapshot(),
        }
    }

    /// Restores a context from a document. Everything lands in `messages`;
    /// the pending queue starts empty.
    pub fn from_document(document: ContextDocument) -> Self {
        Self {
            messages: document.messages,
            pending: Vec::new(),
        }
    }
}

/// The `{model, max_tokens, messages}` JSON document.
///
/// Used both as the completion request body and as the `.cog.json`
/// artifact, so a saved context can be replayed as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextDocument {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<ConversationMessage>,
}

impl ContextDocument {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
