//! # Tree Control
//!
//! Producers of the scene state: the gesture pipeline, manual commands and
//! the greeting service that reacts to the tree forming.
//!
//! ## Gesture → state mapping
//!
//! | Gesture | State |
//! |---|---|
//! | Open palm | CHAOS |
//! | Closed fist | FORMED |
//! | Anything else | unchanged |
//!
//! Producers only ever write the [`StateSignal`](tree_simulation::StateSignal);
//! they never touch particle data.

pub mod controls;
pub mod gesture;
pub mod greeting;
pub mod poller;
pub mod sim;

pub use controls::*;
pub use gesture::*;
pub use greeting::*;
pub use poller::*;
pub use sim::*;
