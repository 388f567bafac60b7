//! Line storage slots owned by a session.
//!
//! Yanked/deleted lines and the pre-exchange snapshot live in separate types
//! so that deleting a line can never overwrite the text a reply is compared
//! against.

use super::BufferId;

/// Lines captured by yank or delete-line, pasted back line-wise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clipboard {
    lines: Vec<String>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the content.
    pub fn yank(&mut self, lines: Vec<String>) {
        self.lines = lines;
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// The destination buffer's content from just before the last exchange.
///
/// Toggle-compare swaps this with the live buffer, so after one toggle it
/// holds the reply instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreExchangeSnapshot {
    slot: Option<(BufferId, Vec<String>)>,
}

impl PreExchangeSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&mut self, buffer: BufferId, lines: Vec<String>) {
        self.slot = Some((buffer, lines));
    }

    /// Which buffer the snapshot belongs to.
    pub fn buffer(&self) -> Option<BufferId> {
        self.slot.as_ref().map(|(id, _)| *id)
    }

    /// Swaps the stored lines with `current`, returning the stored ones.
    pub fn swap(&mut self, current: Vec<String>) -> Option<Vec<String>> {
        let (_, stored) = self.slot.as_mut()?;
        Some(std::mem::replace(stored, current))
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }
}
