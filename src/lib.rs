//! # rs_strata
//!
//! [Rust][rust] crate generating deterministic, seedable **stratified**
//! (jittered) sample positions. The unit square is split into an `n x
//! n` grid of strata and exactly one pseudo-random sample is placed in
//! each of them, optionally pulled towards the stratum center. The
//! samples are reported in the bi-unit square `[-1, 1]^2`.
//!
//! The sampler itself can be found [here]. Samples are either pushed
//! into a [sink] or pulled through an iterator.
//!
//! ```
//! use rs_strata::samplers::stratified::StratifiedSampler;
//!
//! let mut sampler = StratifiedSampler::new(42_u64);
//! let mut count: usize = 0;
//! sampler
//!     .generate_uniform(4, &mut |_x: f32, _y: f32| count += 1)
//!     .unwrap();
//! assert_eq!(count, 16);
//! ```
//!
//! [rust]: https://www.rust-lang.org
//! [here]: samplers/stratified/struct.StratifiedSampler.html
//! [sink]: core/sink/trait.SampleSink.html

pub mod core;
pub mod samplers;
