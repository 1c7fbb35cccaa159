//! # Tree Simulation
//!
//! Per-frame convergence of the particle set toward whichever configuration
//! the shared state signal currently selects.

pub mod engine;
pub mod frame;
pub mod params;
pub mod signal;

pub use engine::*;
pub use frame::*;
pub use params::*;
pub use signal::*;
