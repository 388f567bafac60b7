//! Marker lines and commented-out blocks written by merges.

use super::declaration::{is_blank, strip_indent};

/// What a merge stamps onto its marker lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerContext {
    pub viewpoint: String,
    pub rev: u32,
    pub subrev: u32,
    /// Line-comment prefix, e.g. `"# "`.
    pub comment_prefix: String,
}

impl MarkerContext {
    pub fn new(viewpoint: impl Into<String>, rev: u32, subrev: u32) -> Self {
        Self {
            viewpoint: viewpoint.into(),
            rev,
            subrev,
            comment_prefix: DEFAULT_COMMENT_PREFIX.to_string(),
        }
    }

    pub fn with_comment_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.comment_prefix = prefix.into();
        self
    }

    fn stamp(&self) -> String {
        format!("{} r{}.{}", self.viewpoint, self.rev, self.subrev)
    }

    /// Opening line of a concatenated reply.
    pub fn reply_open(&self) -> String {
        format!("{}>>> {}", self.comment_prefix, self.stamp())
    }

    /// Closing line of a concatenated reply.
    pub fn reply_close(&self) -> String {
        format!("{}<<< {}", self.comment_prefix, self.stamp())
    }

    /// Wraps `lines` in a commented block at `indent` columns:
    ///
    /// ```text
    /// # >>> refactor foo [Python Coder r3.1]
    /// # def foo():
    /// #     return 1
    /// # <<< refactor foo
    /// ```
    pub fn commented_block<S: AsRef<str>>(
        &self,
        tag: &str,
        name: &str,
        lines: &[S],
        indent: usize,
    ) -> Vec<String> {
        let pad = " ".repeat(indent);
        let prefix = &self.comment_prefix;
        let mut block = Vec::with_capacity(lines.len() + 2);
        block.push(format!("{pad}{prefix}>>> {tag} {name} [{}]", self.stamp()));
        for line in lines.iter().map(AsRef::as_ref) {
            if is_blank(line) {
                block.push(format!("{pad}{}", prefix.trim_end()));
            } else {
                block.push(format!("{pad}{prefix}{}", strip_indent(line, indent)));
            }
        }
        block.push(format!("{pad}{prefix}<<< {tag} {name}"));
        block
    }
}

pub const DEFAULT_COMMENT_PREFIX: &str = "# ";
