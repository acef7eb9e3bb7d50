//! Errors reported by samplers.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SamplingError {
    /// The number of strata per dimension has to be zero or positive.
    #[error("number of strata must not be negative, got {n}")]
    NegativeStrata { n: i32 },
}
