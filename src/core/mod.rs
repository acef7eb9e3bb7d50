//! The building blocks shared by all samplers.
//!
//! - Float type and constants
//! - 2D points
//! - random number generation
//! - sample sinks
//! - errors

pub mod error;
pub mod float;
pub mod geometry;
pub mod rng;
pub mod sink;
