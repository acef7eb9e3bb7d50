//! Samplers place pseudo-random sample positions in the bi-unit
//! square `[-1, 1]^2`.
//!
//! - StratifiedSampler
//!
//! ## Stratified Sampler
//!
//! The Stratified Sampler subdivides the square into `n x n`
//! rectangular regions (strata) and generates a single sample inside
//! each of them. Within its stratum the sample is either distributed
//! uniformly or confined to a smaller region around the stratum
//! center, controlled by a *centering* coefficient in `[0, 1]`.

pub mod stratified;
