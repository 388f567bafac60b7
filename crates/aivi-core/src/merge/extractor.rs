//! Object extractor: segments completion text into code objects.
//!
//! Best effort. One level of nesting is understood (an enclosing object and
//! its members); anything deeper is treated as part of the member's body.

use super::declaration::{DeclarationKind, block_end, indent_width, is_blank, parse_declaration};

/// A unit of code found in a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeObject {
    /// Name of the declaration.
    pub name: String,
    /// Name of the enclosing declaration, if the object was found inside one.
    pub enclosing: Option<String>,
    /// The declaration's text, header included, `\n`-separated.
    pub code: String,
}

impl CodeObject {
    pub fn lines(&self) -> Vec<&str> {
        self.code.split('\n').collect()
    }
}

#[derive(Debug)]
struct OpenEnclosing {
    name: String,
    indent: usize,
    start: usize,
    emitted_members: bool,
}

/// Lazy forward scanner over response lines.
///
/// Yields one `CodeObject` per member header, with the most recent
/// enclosing header as its context. An enclosing header that ends without
/// any member yields its whole block instead.
pub struct ObjectScanner<'a> {
    lines: Vec<&'a str>,
    pos: usize,
    enclosing: Option<OpenEnclosing>,
}

impl<'a> ObjectScanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().collect(),
            pos: 0,
            enclosing: None,
        }
    }

    /// Closes the open enclosing context, returning its whole block when it
    /// never produced a member.
    fn close_enclosing(&mut self) -> Option<CodeObject> {
        let open = self.enclosing.take()?;
        if open.emitted_members {
            return None;
        }
        let end = block_end(&self.lines, open.start);
        Some(CodeObject {
            name: open.name,
            enclosing: None,
            code: self.lines[open.start..end].join("\n"),
        })
    }
}

impl Iterator for ObjectScanner<'_> {
    type Item = CodeObject;

    fn next(&mut self) -> Option<CodeObject> {
        while self.pos < self.lines.len() {
            let line = self.lines[self.pos];
            let leaves_context = !is_blank(line)
                && self
                    .enclosing
                    .as_ref()
                    .is_some_and(|open| indent_width(line) <= open.indent);
            if leaves_context {
                // Re-examine this line on the next call once the context is closed.
                if let Some(object) = self.close_enclosing() {
                    return Some(object);
                }
            }

            let Some(declaration) = parse_declaration(line) else {
                self.pos += 1;
                continue;
            };

            match declaration.kind {
                DeclarationKind::Enclosing => {
                    self.enclosing = Some(OpenEnclosing {
                        name: declaration.name,
                        indent: declaration.indent,
                        start: self.pos,
                        emitted_members: false,
                    });
                    self.pos += 1;
                }
                DeclarationKind::Member => {
                    let start = self.pos;
                    let end = block_end(&self.lines, start);
                    self.pos = end;
                    let enclosing = self.enclosing.as_mut().map(|open| {
                        open.emitted_members = true;
                        open.name.clone()
                    });
                    return Some(CodeObject {
                        name: declaration.name,
                        enclosing,
                        code: self.lines[start..end].join("\n"),
                    });
                }
            }
        }
        self.close_enclosing()
    }
}

/// Extracts every code object from `text`. Prose yields an empty list.
pub fn extract(text: &str) -> Vec<CodeObject> {
    ObjectScanner::new(text).collect()
}
