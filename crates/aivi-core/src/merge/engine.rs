//! Response merge engine.
//!
//! Writes a completion response into a buffer under exactly one strategy,
//! picked from the viewpoint's text-ops by a fixed precedence:
//! inline > structural (refactor > deprecate > markup) > replace >
//! concatenate.

use super::declaration::{
    DeclarationKind, block_end, indent_width, is_blank, is_closer, parse_declaration, reindent,
};
use super::extractor::{CodeObject, extract};
use super::marker::MarkerContext;
use crate::buffer::{TextBuffer, split_lines};
use crate::viewpoint::TextOp;
use strum::Display;
use tracing::debug;

/// The merge policy that ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum MergeStrategy {
    Inline,
    Markup,
    Refactor,
    Deprecate,
    Replace,
    Concatenate,
}

impl MergeStrategy {
    /// Resolves a set of text-ops to the single strategy that applies.
    /// An empty set concatenates.
    pub fn for_ops(ops: &[TextOp]) -> Self {
        let has = |op| ops.contains(&op);
        if has(TextOp::Inline) {
            MergeStrategy::Inline
        } else if has(TextOp::Refactor) {
            MergeStrategy::Refactor
        } else if has(TextOp::Deprecate) {
            MergeStrategy::Deprecate
        } else if has(TextOp::Markup) {
            MergeStrategy::Markup
        } else if has(TextOp::Replace) {
            MergeStrategy::Replace
        } else {
            MergeStrategy::Concatenate
        }
    }
}

/// What a merge did, for the status line and the sub-revision tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOutcome {
    /// The strategy that actually ran.
    pub strategy: MergeStrategy,
    /// Code objects found in the response (structural merges only).
    pub objects: usize,
    /// Objects matched to a declaration already in the buffer.
    pub matched: usize,
    /// True when a structural merge found no code and concatenated instead.
    pub fell_back: bool,
}

impl MergeOutcome {
    fn plain(strategy: MergeStrategy) -> Self {
        Self {
            strategy,
            objects: 0,
            matched: 0,
            fell_back: false,
        }
    }
}

/// Merges `response` into `buffer` according to `ops`.
pub fn merge_response(
    response: &str,
    ops: &[TextOp],
    buffer: &mut TextBuffer,
    markers: &MarkerContext,
) -> MergeOutcome {
    let strategy = MergeStrategy::for_ops(ops);
    debug!(%strategy, viewpoint = %markers.viewpoint, "merging response");
    match strategy {
        MergeStrategy::Inline => merge_inline(response, buffer),
        MergeStrategy::Replace => merge_replace(response, buffer),
        MergeStrategy::Concatenate => merge_concatenate(response, buffer, markers),
        structural => merge_structural(structural, response, buffer, markers),
    }
}

fn merge_inline(response: &str, buffer: &mut TextBuffer) -> MergeOutcome {
    let first = response.lines().find(|line| !is_blank(line)).unwrap_or("");
    let line = buffer.cursor().line;
    buffer.replace_line(line, first);
    MergeOutcome::plain(MergeStrategy::Inline)
}

fn merge_replace(response: &str, buffer: &mut TextBuffer) -> MergeOutcome {
    buffer.set_lines(split_lines(response));
    buffer.cursor_to_end();
    MergeOutcome::plain(MergeStrategy::Replace)
}

fn merge_concatenate(
    response: &str,
    buffer: &mut TextBuffer,
    markers: &MarkerContext,
) -> MergeOutcome {
    let before = buffer.len();
    let mut block = vec![markers.reply_open()];
    block.extend(split_lines(response));
    block.push(markers.reply_close());
    buffer.append_lines(&block);
    // Resume where the user left off rather than at the new tail.
    buffer.set_cursor(before, 0);
    MergeOutcome::plain(MergeStrategy::Concatenate)
}

/// A declaration's lines in the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: usize,
    end: usize,
    indent: usize,
}

/// Where new members go inside an enclosing declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Host {
    insert_at: usize,
    body_indent: usize,
}

/// Finds the declaration named like `object` whose enclosing declaration
/// matches (any enclosing when the object names none).
fn find_span(lines: &[String], object: &CodeObject) -> Option<Span> {
    let mut context: Option<(String, usize)> = None;
    for (index, line) in lines.iter().enumerate() {
        if !is_blank(line)
            && context
                .as_ref()
                .is_some_and(|(_, indent)| indent_width(line) <= *indent)
        {
            context = None;
        }
        let Some(declaration) = parse_declaration(line) else {
            continue;
        };
        let enclosing_matches = match object.enclosing.as_deref() {
            None => true,
            Some(wanted) => context.as_ref().is_some_and(|(name, _)| name == wanted),
        };
        if declaration.name == object.name && enclosing_matches {
            return Some(Span {
                start: index,
                end: block_end(lines, index),
                indent: declaration.indent,
            });
        }
        if declaration.kind == DeclarationKind::Enclosing {
            context = Some((declaration.name, declaration.indent));
        }
    }
    None
}

fn find_host(lines: &[String], enclosing: &str) -> Option<Host> {
    lines.iter().enumerate().find_map(|(index, line)| {
        let declaration = parse_declaration(line)?;
        if declaration.kind != DeclarationKind::Enclosing || declaration.name != enclosing {
            return None;
        }
        let end = block_end(lines, index);
        let body_indent = lines[index + 1..end]
            .iter()
            .find(|l| !is_blank(l) && indent_width(l) > declaration.indent)
            .map_or(declaration.indent + 4, |l| indent_width(l));
        let last = &lines[end - 1];
        let closes_block =
            end > index + 1 && is_closer(last) && indent_width(last) == declaration.indent;
        let insert_at = if closes_block { end - 1 } else { end };
        Some(Host {
            insert_at,
            body_indent,
        })
    })
}

fn merge_structural(
    strategy: MergeStrategy,
    response: &str,
    buffer: &mut TextBuffer,
    markers: &MarkerContext,
) -> MergeOutcome {
    let objects = extract(response);
    if objects.is_empty() {
        debug!(%strategy, "no code objects in response, concatenating");
        let mut outcome = merge_concatenate(response, buffer, markers);
        outcome.fell_back = true;
        return outcome;
    }

    let tag = strategy.to_string();
    let mut matched = 0;
    let mut touched = None;
    for object in &objects {
        let code = object.lines();
        let span = find_span(buffer.lines(), object);
        if let Some(span) = span {
            matched += 1;
            let original = buffer.lines()[span.start..span.end].to_vec();
            let fresh = reindent(&code, span.indent);
            match strategy {
                MergeStrategy::Markup => {
                    let block = markers.commented_block(&tag, &object.name, &fresh, span.indent);
                    buffer.insert_lines(span.end, &block);
                    touched = Some(span.end);
                }
                MergeStrategy::Deprecate => {
                    let mut replacement = markers.commented_block(
                        "deprecated",
                        &object.name,
                        &original,
                        span.indent,
                    );
                    replacement.extend(markers.commented_block(
                        "proposed",
                        &object.name,
                        &fresh,
                        span.indent,
                    ));
                    buffer.splice_lines(span.start..span.end, replacement);
                    touched = Some(span.start);
                }
                _ => {
                    let mut replacement = fresh;
                    replacement.extend(markers.commented_block(
                        "archived",
                        &object.name,
                        &original,
                        span.indent,
                    ));
                    buffer.splice_lines(span.start..span.end, replacement);
                    touched = Some(span.start);
                }
            }
            continue;
        }

        let host = object
            .enclosing
            .as_deref()
            .and_then(|name| find_host(buffer.lines(), name));
        if let Some(host) = host {
            let fresh = reindent(&code, host.body_indent);
            let insert = if strategy == MergeStrategy::Refactor {
                fresh
            } else {
                markers.commented_block(&tag, &object.name, &fresh, host.body_indent)
            };
            buffer.insert_lines(host.insert_at, &insert);
            touched = Some(host.insert_at);
        } else {
            let at = buffer.len();
            let block = markers.commented_block(&tag, &object.name, &reindent(&code, 0), 0);
            buffer.append_lines(&block);
            touched = touched.or(Some(at));
        }
    }

    if let Some(line) = touched {
        buffer.set_cursor(line, 0);
    }
    debug!(%strategy, objects = objects.len(), matched, "structural merge done");
    MergeOutcome {
        strategy,
        objects: objects.len(),
        matched,
        fell_back: false,
    }
}
