//! Heuristic declaration recognition shared by the extractor and the span
//! finder.
//!
//! This is line segmentation, not parsing: a declaration is a line whose
//! first word (after optional modifiers) is a structural keyword followed by
//! a name in header position, and a block is everything indented deeper than
//! its header.

use once_cell::sync::Lazy;
use regex::Regex;

static DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<indent>[ \t]*)(?:(?:pub(?:\([^)]*\))?|export|async|unsafe|static|default)\s+)*(?P<keyword>class|struct|enum|trait|impl|interface|def|fn|function)(?:<[^>]*>)?\s+(?P<name>[A-Za-z_][A-Za-z0-9_]*)",
    )
    .expect("declaration pattern compiles")
});

const TAB_WIDTH: usize = 4;

/// Whether a declaration opens a container or a member of one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    /// `class`, `struct`, `enum`, `trait`, `impl`, `interface`
    Enclosing,
    /// `def`, `fn`, `function`
    Member,
}

/// A recognised declaration header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub kind: DeclarationKind,
    pub name: String,
    pub indent: usize,
}

/// Parses a declaration header, if the line is one.
///
/// A member name must be followed by its parameter list or generics. An
/// enclosing header must open a block: it ends in `{`, or in `:` directly
/// after the name or a base list. Sentences that merely start with a
/// keyword are rejected.
pub fn parse_declaration(line: &str) -> Option<Declaration> {
    let captures = DECLARATION.captures(line)?;
    let kind = match &captures["keyword"] {
        "def" | "fn" | "function" => DeclarationKind::Member,
        _ => DeclarationKind::Enclosing,
    };
    let tail = &line[captures.name("name")?.end()..];
    let shaped = match kind {
        DeclarationKind::Member => tail.trim_start().starts_with(['(', '<']),
        DeclarationKind::Enclosing => opens_block(tail),
    };
    if !shaped {
        return None;
    }
    Some(Declaration {
        kind,
        name: captures["name"].to_string(),
        indent: indent_width(line),
    })
}

fn opens_block(tail: &str) -> bool {
    let tail = tail.trim_end();
    if tail.ends_with('{') {
        return true;
    }
    match tail.strip_suffix(':').map(str::trim) {
        Some(bases) => bases.is_empty() || (bases.starts_with('(') && bases.ends_with(')')),
        None => false,
    }
}

/// Leading whitespace width, tabs counted as four columns.
pub fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { TAB_WIDTH } else { 1 })
        .sum()
}

pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// A Markdown code fence line.
pub fn is_fence(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

/// A line that closes a brace-delimited block (`}`, `};`, `})`).
pub fn is_closer(line: &str) -> bool {
    matches!(line.trim_start().chars().next(), Some('}' | ')' | ']'))
}

/// End (exclusive) of the block headed at `start`.
///
/// The block continues through blank lines and lines indented deeper than
/// the header. It stops at the first non-blank line at or left of the
/// header's indentation, or at a fence line. A closing brace at the
/// header's own indentation is kept as part of the block. Trailing blank
/// lines are not included.
pub fn block_end<S: AsRef<str>>(lines: &[S], start: usize) -> usize {
    let header_indent = indent_width(lines[start].as_ref());
    let mut end = start + 1;
    while end < lines.len() {
        let line = lines[end].as_ref();
        if is_fence(line) {
            break;
        }
        if !is_blank(line) && indent_width(line) <= header_indent {
            if indent_width(line) == header_indent && is_closer(line) {
                end += 1;
            }
            break;
        }
        end += 1;
    }
    while end > start + 1 && is_blank(lines[end - 1].as_ref()) {
        end -= 1;
    }
    end
}

/// Shifts `lines` so that their shallowest non-blank line sits at `target`
/// columns. Blank lines become empty.
pub fn reindent<S: AsRef<str>>(lines: &[S], target: usize) -> Vec<String> {
    let base = lines
        .iter()
        .map(AsRef::as_ref)
        .filter(|line| !is_blank(line))
        .map(indent_width)
        .min()
        .unwrap_or(0);
    let pad = " ".repeat(target);
    lines
        .iter()
        .map(AsRef::as_ref)
        .map(|line| {
            if is_blank(line) {
                String::new()
            } else {
                format!("{pad}{}", strip_indent(line, base))
            }
        })
        .collect()
}

/// Removes up to `width` columns of leading whitespace.
pub fn strip_indent(line: &str, width: usize) -> &str {
    let mut seen = 0;
    for (index, c) in line.char_indices() {
        if seen >= width || !c.is_whitespace() {
            return &line[index..];
        }
        seen += if c == '\t' { TAB_WIDTH } else { 1 };
    }
    ""
}
