//! Response merging.
//!
//! # Module Structure
//!
//! - `declaration`: header recognition and block boundaries shared by the
//!   scanner and the span finder
//! - `extractor`: lazy segmentation of responses into `CodeObject`s
//! - `marker`: reply markers and commented blocks (`MarkerContext`)
//! - `engine`: strategy selection and the merge itself

mod declaration;
pub mod extractor;
mod engine;
mod marker;

pub use engine::{MergeOutcome, MergeStrategy, merge_response};
pub use extractor::{CodeObject, ObjectScanner, extract};
pub use marker::{DEFAULT_COMMENT_PREFIX, MarkerContext};
