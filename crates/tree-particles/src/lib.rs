//! # Tree Particles
//!
//! Particle records, scene configuration and the procedural samplers that
//! place every particle in its scattered and formed configurations.

pub mod builder;
pub mod config;
pub mod constants;
pub mod particle;
pub mod sampler;

pub use builder::*;
pub use config::*;
pub use constants::*;
pub use particle::*;
pub use sampler::*;
