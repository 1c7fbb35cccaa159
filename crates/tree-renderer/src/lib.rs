//! # Tree Renderer
//!
//! Draws the four instance batches of the tree with a single instanced
//! pipeline: foliage sparkles, ornament spheres and photo cards.

pub mod camera;
pub mod palette;
pub mod renderer;
pub mod staging;

pub use camera::*;
pub use palette::*;
pub use renderer::*;
pub use staging::*;
