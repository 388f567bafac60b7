//! In-memory sub-revision history.
//!
//! Pointer 0 is the original (the buffer before the first exchange); entries
//! are numbered from 1 in the order they were stored.

/// One stored exchange result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subrevision {
    /// Merge strategy that produced the snapshot.
    pub kind: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Forward,
    Backward,
}

#[derive(Debug, Default, Clone)]
pub struct SubrevisionLog {
    original: Option<Vec<String>>,
    entries: Vec<Subrevision>,
    pointer: usize,
}

impl SubrevisionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps `lines` as the original. Only the first call has an effect.
    pub fn record_original(&mut self, lines: &[String]) {
        if self.original.is_none() {
            self.original = Some(lines.to_vec());
        }
    }

    pub fn has_original(&self) -> bool {
        self.original.is_some()
    }

    /// Appends an entry, points at it and returns its 1-based index.
    pub fn push(&mut self, kind: impl Into<String>, lines: Vec<String>) -> usize {
        self.entries.push(Subrevision {
            kind: kind.into(),
            lines,
        });
        self.pointer = self.entries.len();
        self.pointer
    }

    /// Moves the pointer one step, wrapping through 0, and returns the
    /// lines it now points at.
    pub fn step(&mut self, direction: StepDirection) -> Option<&[String]> {
        let last = self.entries.len();
        self.pointer = match direction {
            StepDirection::Forward if self.pointer >= last => 0,
            StepDirection::Forward => self.pointer + 1,
            StepDirection::Backward if self.pointer == 0 => last,
            StepDirection::Backward => self.pointer - 1,
        };
        self.current()
    }

    pub fn current(&self) -> Option<&[String]> {
        match self.pointer {
            0 => self.original.as_deref(),
            n => self.entries.get(n - 1).map(|entry| entry.lines.as_slice()),
        }
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Subrevision> {
        index.checked_sub(1).and_then(|i| self.entries.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        vec![text.to_string()]
    }

    fn log_with_three() -> SubrevisionLog {
        let mut log = SubrevisionLog::new();
        log.record_original(&lines("orig"));
        log.push("concatenate", lines("one"));
        log.push("refactor", lines("two"));
        log.push("replace", lines("three"));
        log
    }

    #[test]
    fn test_forward_from_last_wraps_to_original() {
        let mut log = log_with_three();
        assert_eq!(log.pointer(), 3);
        assert_eq!(log.step(StepDirection::Forward), Some(&lines("orig")[..]));
        assert_eq!(log.pointer(), 0);
        assert_eq!(log.step(StepDirection::Forward), Some(&lines("one")[..]));
    }

    #[test]
    fn test_backward_from_original_wraps_to_last() {
        let mut log = log_with_three();
        log.step(StepDirection::Forward);
        assert_eq!(log.step(StepDirection::Backward), Some(&lines("three")[..]));
        assert_eq!(log.pointer(), 3);
        assert_eq!(log.step(StepDirection::Backward), Some(&lines("two")[..]));
    }

    #[test]
    fn test_original_recorded_once() {
        let mut log = SubrevisionLog::new();
        log.record_original(&lines("first"));
        log.record_original(&lines("second"));
        assert_eq!(log.current(), Some(&lines("first")[..]));
    }

    #[test]
    fn test_empty_log_stays_at_zero() {
        let mut log = SubrevisionLog::new();
        assert_eq!(log.step(StepDirection::Forward), None);
        assert_eq!(log.pointer(), 0);
        assert_eq!(log.step(StepDirection::Backward), None);
        assert_eq!(log.pointer(), 0);
    }

    #[test]
    fn test_get_is_one_indexed() {
        let log = log_with_three();
        assert!(log.get(0).is_none());
        assert_eq!(log.get(2).unwrap().kind, "refactor");
    }
}
