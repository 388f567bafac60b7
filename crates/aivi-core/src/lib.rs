pub mod buffer;
pub mod config;
pub mod context;
pub mod error;
pub mod merge;
pub mod viewpoint;

pub use error::{AiviError, Result};
