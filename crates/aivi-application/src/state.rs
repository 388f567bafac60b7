//! Session-visible state: input mode, transient status and the snapshot
//! returned after every command.

use aivi_core::buffer::{BufferId, Position, TextBuffer};
use strum::Display;

/// What the editor is doing. Kept apart from [`StatusMessage`] so that a
/// status never overwrites the mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "lowercase")]
pub enum InputMode {
    #[default]
    Edit,
    /// Lines are being marked for a yank
    Mark,
    /// Showing an AI reply
    Reply,
    /// Showing the pre-exchange text after a toggle
    Undo,
}

/// A transient message. Taking it for display clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusMessage(Option<String>);

impl StatusMessage {
    pub fn set(&mut self, message: impl Into<String>) {
        self.0 = Some(message.into());
    }

    pub fn take(&mut self) -> Option<String> {
        self.0.take()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferView {
    pub lines: Vec<String>,
    pub cursor: Position,
}

impl From<&TextBuffer> for BufferView {
    fn from(buffer: &TextBuffer) -> Self {
        Self {
            lines: buffer.lines().to_vec(),
            cursor: buffer.cursor(),
        }
    }
}

/// Everything a front end needs to draw the session after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub active: BufferId,
    pub edit: BufferView,
    pub command: BufferView,
    pub mode: InputMode,
    pub viewpoint: String,
    pub rev: u32,
    /// Sub-revision pointer (0 is the original).
    pub subrevision: usize,
    /// The status taken for this snapshot, if any.
    pub status: Option<String>,
    /// Marked line numbers in ascending order.
    pub marked: Vec<usize>,
}

impl SessionSnapshot {
    /// Five-column gutter label: the status when there is one, else the mode.
    pub fn label(&self) -> String {
        let text = self.status.clone().unwrap_or_else(|| self.mode.to_string());
        format!("{text:<5.5}")
    }

    pub fn active_view(&self) -> &BufferView {
        match self.active {
            BufferId::Edit => &self.edit,
            BufferId::Command => &self.command,
        }
    }
}
