//! Term search over the edit buffer.

use aivi_core::buffer::Position;

/// Every occurrence of `term` in `lines`, in reading order. Columns count
/// chars.
pub fn find_hits<S: AsRef<str>>(lines: &[S], term: &str) -> Vec<Position> {
    if term.is_empty() {
        return Vec::new();
    }
    lines
        .iter()
        .enumerate()
        .flat_map(|(line, text)| {
            let text = text.as_ref();
            text.match_indices(term)
                .map(move |(byte, _)| Position::new(line, text[..byte].chars().count()))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// The hits of the last search and which one the cursor is on.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    hits: Vec<Position>,
    index: usize,
}

impl SearchState {
    /// Starts a new search. Returns the first hit.
    pub fn start(&mut self, hits: Vec<Position>) -> Option<Position> {
        self.hits = hits;
        self.index = 0;
        self.hits.first().copied()
    }

    /// Next hit, wrapping to the first.
    pub fn next(&mut self) -> Option<Position> {
        if self.hits.is_empty() {
            return None;
        }
        self.index = (self.index + 1) % self.hits.len();
        Some(self.hits[self.index])
    }

    /// Previous hit, wrapping to the last.
    pub fn prev(&mut self) -> Option<Position> {
        if self.hits.is_empty() {
            return None;
        }
        self.index = self.index.checked_sub(1).unwrap_or(self.hits.len() - 1);
        Some(self.hits[self.index])
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}
