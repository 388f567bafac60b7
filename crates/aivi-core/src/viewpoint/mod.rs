//! Viewpoint domain module.
//!
//! # Module Structure
//!
//! - `model`: `Viewpoint` and the `TextOp` merge flags
//! - `preset`: the built-in catalogue
//! - `registry`: the catalogue with a cycling selection (`ViewpointRegistry`)

mod model;
mod preset;
mod registry;

pub use model::{TextOp, Viewpoint};
pub use preset::get_default_presets;
pub use registry::ViewpointRegistry;
