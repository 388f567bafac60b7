//! Viewpoint domain model.
//!
//! A viewpoint is a named persona: the system instructions sent ahead of the
//! user's text, the model and token budget to ask with, and the text
//! operations that decide how the reply lands in the buffer.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How a completion response is merged into a buffer.
#[derive(
    Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TextOp {
    /// Replace the cursor line with the reply's first line
    Inline,
    /// Replace the whole buffer with the reply
    Replace,
    /// Append the reply at the end between marker lines
    Concatenate,
    /// Append extracted code next to its match as a commented block
    Markup,
    /// Swap extracted code in for its match, archiving the original
    Refactor,
    /// Comment out both the original and the extracted code
    Deprecate,
}

/// A named persona bundling instructions, model choice, token budget and
/// response-merge policy.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Viewpoint {
    /// Display name, also used in transcripts and markers
    pub name: String,
    /// System instructions, sent in order
    #[serde(default)]
    pub instructions: Vec<String>,
    /// Model identifier passed to the completion service
    pub model: String,
    /// Maximum number of tokens the reply may use
    pub max_tokens: u32,
    /// Merge policy flags
    #[serde(default)]
    pub text_ops: Vec<TextOp>,
    /// Hidden viewpoints are skipped by `advance`
    #[serde(default)]
    pub hidden: bool,
}
