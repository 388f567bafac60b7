//! Text buffer domain module.
//!
//! # Module Structure
//!
//! - `position`: cursor coordinates and movement directions
//! - `text_buffer`: line-oriented buffer with a clamped cursor (`TextBuffer`)
//! - `clipboard`: line clipboard and the pre-exchange snapshot slot

mod clipboard;
mod position;
mod text_buffer;

pub use clipboard::{Clipboard, PreExchangeSnapshot};
pub use position::{Direction, Position};
pub use text_buffer::{TextBuffer, split_lines};

/// Identifies one of the two buffers owned by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferId {
    /// The document being edited.
    #[default]
    Edit,
    /// The instruction pad sent alongside the document.
    Command,
}

impl BufferId {
    /// Returns the other buffer.
    pub fn other(self) -> Self {
        match self {
            BufferId::Edit => BufferId::Command,
            BufferId::Command => BufferId::Edit,
        }
    }
}
