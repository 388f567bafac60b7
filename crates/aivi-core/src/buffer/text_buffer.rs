//! Line-oriented text buffer.

use super::position::{Direction, Position};

/// An ordered sequence of lines with a cursor.
///
/// The buffer always holds at least one line, and the cursor is kept inside
/// it: `line < len()` and `col <= chars in the current line`. Every mutating
/// method re-establishes that invariant, so out-of-range requests are clamped
/// instead of reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBuffer {
    lines: Vec<String>,
    cursor: Position,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextBuffer {
    /// Creates a buffer holding one empty line.
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            cursor: Position::ZERO,
        }
    }

    /// Creates a buffer from lines, cursor at the origin.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut buffer = Self {
            lines: lines.into_iter().map(Into::into).collect(),
            cursor: Position::ZERO,
        };
        buffer.normalize();
        buffer
    }

    /// Creates a buffer by splitting `text` on newlines.
    ///
    /// A single trailing newline does not produce an extra empty line.
    pub fn from_text(text: &str) -> Self {
        Self::from_lines(split_lines(text))
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True when the buffer holds a single empty line.
    pub fn is_empty(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].is_empty()
    }

    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    pub fn cursor(&self) -> Position {
        self.cursor
    }

    pub fn current_line(&self) -> &str {
        &self.lines[self.cursor.line]
    }

    /// Joins the lines with `\n`.
    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }

    /// Non-blank lines, each terminated by `\n`, concatenated.
    pub fn non_blank_text(&self) -> String {
        self.lines
            .iter()
            .filter(|line| !line.trim().is_empty())
            .fold(String::new(), |mut acc, line| {
                acc.push_str(line);
                acc.push('\n');
                acc
            })
    }

    /// Moves the cursor, clamping to the buffer.
    pub fn set_cursor(&mut self, line: usize, col: usize) {
        self.cursor = Position::new(line, col);
        self.clamp_cursor();
    }

    /// Moves the cursor one step. Returns `false` when already at the edge.
    pub fn move_cursor(&mut self, direction: Direction) -> bool {
        let Position { line, col } = self.cursor;
        match direction {
            Direction::Up if line > 0 => self.cursor.line -= 1,
            Direction::Down if line + 1 < self.lines.len() => self.cursor.line += 1,
            Direction::Left if col > 0 => self.cursor.col -= 1,
            Direction::Right if col < char_len(&self.lines[line]) => self.cursor.col += 1,
            _ => return false,
        }
        self.clamp_cursor();
        true
    }

    /// Inserts a char at the cursor and advances it.
    pub fn insert_char(&mut self, ch: char) {
        let Position { line, col } = self.cursor;
        let at = byte_index(&self.lines[line], col);
        self.lines[line].insert(at, ch);
        self.cursor.col += 1;
    }

    /// Deletes the char before the cursor. At column 0 the current line is
    /// joined onto the previous one. Returns `false` at the buffer origin.
    pub fn backspace(&mut self) -> bool {
        let Position { line, col } = self.cursor;
        if col > 0 {
            let text = &mut self.lines[line];
            let start = byte_index(text, col - 1);
            let end = byte_index(text, col);
            text.replace_range(start..end, "");
            self.cursor.col -= 1;
            true
        } else if line > 0 {
            let tail = self.lines.remove(line);
            let prev = &mut self.lines[line - 1];
            let join_col = char_len(prev);
            prev.push_str(&tail);
            self.cursor = Position::new(line - 1, join_col);
            true
        } else {
            false
        }
    }

    /// Splits the current line at the cursor. The cursor moves to the start
    /// of the new line. Returns the text left on the original line.
    pub fn split_line(&mut self) -> String {
        let Position { line, col } = self.cursor;
        let at = byte_index(&self.lines[line], col);
        let tail = self.lines[line].split_off(at);
        self.lines.insert(line + 1, tail);
        self.cursor = Position::new(line + 1, 0);
        self.lines[line].clone()
    }

    /// Removes the line under the cursor and returns it. The last remaining
    /// line is cleared instead of removed.
    pub fn delete_line(&mut self) -> String {
        let line = self.cursor.line;
        let removed = if self.lines.len() > 1 {
            self.lines.remove(line)
        } else {
            std::mem::take(&mut self.lines[0])
        };
        self.cursor = Position::new(line.min(self.lines.len() - 1), 0);
        removed
    }

    /// Replaces one line. Out-of-range indices are ignored.
    pub fn replace_line(&mut self, index: usize, text: impl Into<String>) -> bool {
        match self.lines.get_mut(index) {
            Some(slot) => {
                *slot = text.into();
                self.clamp_cursor();
                true
            }
            None => false,
        }
    }

    /// Inserts lines before `index` (clamped to the end).
    pub fn insert_lines(&mut self, index: usize, lines: &[String]) {
        let at = index.min(self.lines.len());
        self.lines.splice(at..at, lines.iter().cloned());
        self.clamp_cursor();
    }

    /// Appends lines at the end.
    pub fn append_lines(&mut self, lines: &[String]) {
        self.lines.extend(lines.iter().cloned());
    }

    /// Replaces `range` with `lines`.
    pub fn splice_lines(&mut self, range: std::ops::Range<usize>, lines: Vec<String>) {
        let end = range.end.min(self.lines.len());
        let start = range.start.min(end);
        self.lines.splice(start..end, lines);
        self.normalize();
    }

    /// Installs new content, keeping the cursor where it can stay.
    pub fn set_lines(&mut self, lines: Vec<String>) {
        self.lines = lines;
        self.normalize();
    }

    /// Moves the cursor to the end of the last line.
    pub fn cursor_to_end(&mut self) {
        let line = self.lines.len() - 1;
        self.cursor = Position::new(line, char_len(&self.lines[line]));
    }

    fn normalize(&mut self) {
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
        self.clamp_cursor();
    }

    fn clamp_cursor(&mut self) {
        let last = self.lines.len() - 1;
        self.cursor.line = self.cursor.line.min(last);
        self.cursor.col = self.cursor.col.min(char_len(&self.lines[self.cursor.line]));
    }
}

/// Splits text into lines, dropping the terminator of the final line.
pub fn split_lines(text: &str) -> Vec<String> {
    let trimmed = text.strip_suffix('\n').unwrap_or(text);
    trimmed
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn byte_index(text: &str, col: usize) -> usize {
    text.char_indices()
        .nth(col)
        .map_or(text.len(), |(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_has_one_empty_line() {
        let buffer = TextBuffer::new();
        assert_eq!(buffer.len(), 1);
        assert!(buffer.is_empty());
        assert_eq!(buffer.cursor(), Position::ZERO);
    }

    #[test]
    fn test_from_text_drops_single_trailing_newline() {
        let buffer = TextBuffer::from_text("a\nb\n");
        assert_eq!(buffer.lines(), ["a", "b"]);
        let empty = TextBuffer::from_lines(Vec::<String>::new());
        assert_eq!(empty.lines(), [""]);
    }

    #[test]
    fn test_insert_and_backspace_multibyte() {
        let mut buffer = TextBuffer::from_lines(["caf"]);
        buffer.set_cursor(0, 3);
        buffer.insert_char('é');
        assert_eq!(buffer.current_line(), "café");
        assert_eq!(buffer.cursor().col, 4);
        assert!(buffer.backspace());
        assert_eq!(buffer.current_line(), "caf");
    }

    #[test]
    fn test_backspace_joins_lines() {
        let mut buffer = TextBuffer::from_lines(["ab", "cd"]);
        buffer.set_cursor(1, 0);
        assert!(buffer.backspace());
        assert_eq!(buffer.lines(), ["abcd"]);
        assert_eq!(buffer.cursor(), Position::new(0, 2));
        buffer.set_cursor(0, 0);
        assert!(!buffer.backspace());
    }

    #[test]
    fn test_split_line_returns_head() {
        let mut buffer = TextBuffer::from_lines(["hello world"]);
        buffer.set_cursor(0, 5);
        let head = buffer.split_line();
        assert_eq!(head, "hello");
        assert_eq!(buffer.lines(), ["hello", " world"]);
        assert_eq!(buffer.cursor(), Position::new(1, 0));
    }

    #[test]
    fn test_vertical_move_clamps_column() {
        let mut buffer = TextBuffer::from_lines(["long line", "ab"]);
        buffer.set_cursor(0, 9);
        assert!(buffer.move_cursor(Direction::Down));
        assert_eq!(buffer.cursor(), Position::new(1, 2));
        assert!(!buffer.move_cursor(Direction::Down));
        assert!(!buffer.move_cursor(Direction::Right));
    }

    #[test]
    fn test_delete_last_line_clears_it() {
        let mut buffer = TextBuffer::from_lines(["only"]);
        assert_eq!(buffer.delete_line(), "only");
        assert_eq!(buffer.lines(), [""]);

        let mut buffer = TextBuffer::from_lines(["a", "b"]);
        buffer.set_cursor(1, 1);
        assert_eq!(buffer.delete_line(), "b");
        assert_eq!(buffer.cursor(), Position::new(0, 0));
    }

    #[test]
    fn test_set_cursor_clamps() {
        let mut buffer = TextBuffer::from_lines(["abc"]);
        buffer.set_cursor(10, 10);
        assert_eq!(buffer.cursor(), Position::new(0, 3));
    }

    #[test]
    fn test_non_blank_text() {
        let buffer = TextBuffer::from_lines(["a", "  ", "b"]);
        assert_eq!(buffer.non_blank_text(), "a\nb\n");
    }
}
