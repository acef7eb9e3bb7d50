//! Stratified sampling on an `n x n` grid.
//!
//! The unit square is subdivided into `n * n` strata of equal size and
//! exactly one sample is placed inside each stratum. Compared to `n *
//! n` independent uniform samples this guarantees that no region of
//! the square is left empty, which reduces the variance of Monte Carlo
//! estimates built on top of the samples.
//!
//! Strata are visited in row-major order (`y` outer, `x` inner, both
//! ascending). For every stratum exactly two values are drawn from the
//! random source, first the one for `x`, then the one for `y`. This
//! ordering is part of the contract: two samplers seeded alike produce
//! bit-identical samples no matter whether they are pushed into a sink
//! or pulled through an iterator.

use std::convert::TryFrom;
use std::iter::FusedIterator;

use tracing::{debug, trace};

use crate::core::error::SamplingError;
use crate::core::float::Float;
use crate::core::geometry::Point2f;
use crate::core::rng::{RandomSource, Rng};
use crate::core::sink::SampleSink;

/// Sub-interval of a stratum (in stratum-local `[0, 1)` coordinates)
/// the jittered sample is confined to.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Jitter {
    pub start: Float,
    pub span: Float,
}

impl Jitter {
    /// The whole stratum.
    pub fn uniform() -> Self {
        Jitter {
            start: 0.0 as Float,
            span: 1.0 as Float,
        }
    }
    /// Confine the sample to `[centering / 2, 1 - centering / 2)` of
    /// the stratum. Values outside of `[0, 1]` are not rejected, they
    /// extrapolate the formula and may leave the stratum.
    pub fn centered(centering: Float) -> Self {
        Jitter {
            start: centering * 0.5 as Float,
            span: 1.0 as Float - centering,
        }
    }
    /// Map one draw `u` in `[0, 1)` for stratum `s` of `n` into `[-1, 1)`.
    ///
    /// The mapping is monotonic in `u` for a non-negative span. Float
    /// rounding may still land a draw just below one exactly on the
    /// upper bound of its stratum, e.g. `u = FLOAT_ONE_MINUS_EPSILON`
    /// with `n = 2` maps to `1.0` in the last stratum.
    pub fn map(&self, u: Float, s: i32, n: Float) -> Float {
        ((self.start + u * self.span) / n + s as Float / n) * 2.0 as Float - 1.0 as Float
    }
    /// Draw the sample for stratum `(sx, sy)`; `x` is drawn before `y`.
    pub fn sample<R: RandomSource + ?Sized>(
        &self,
        rng: &mut R,
        sx: i32,
        sy: i32,
        n: Float,
    ) -> Point2f {
        let ux: Float = rng.uniform_float();
        let uy: Float = rng.uniform_float();
        Point2f::new(self.map(ux, sx, n), self.map(uy, sy, n))
    }
}

fn check_strata(n: i32) -> Result<i32, SamplingError> {
    if n < 0 {
        debug!(n, "rejecting negative number of strata");
        return Err(SamplingError::NegativeStrata { n });
    }
    Ok(n)
}

/// Creates samples on `n x n` strata.
///
/// The sampler owns its random source; every generation call keeps
/// consuming fresh values from it, the seed is never replayed.
#[derive(Debug, Clone)]
pub struct StratifiedSampler<R: RandomSource = Rng> {
    rng: R,
}

impl StratifiedSampler<Rng> {
    /// Sampler driven by a PCG32 generator on the stream selected by
    /// `seed`.
    pub fn new(seed: u64) -> Self {
        StratifiedSampler {
            rng: Rng::with_sequence(seed),
        }
    }
}

impl<R: RandomSource> StratifiedSampler<R> {
    pub fn from_source(rng: R) -> Self {
        StratifiedSampler { rng }
    }
    pub fn source(&self) -> &R {
        &self.rng
    }
    pub fn into_source(self) -> R {
        self.rng
    }
    /// Push `n * n` samples, each distributed uniformly within its
    /// stratum, into `sink`.
    ///
    /// Stratum bounds are half-open in exact arithmetic only. With
    /// `f32` rounding a draw close to one can produce a coordinate equal
    /// to the upper bound of its stratum (`1.0` for the last one), see
    /// [Jitter::map].
    pub fn generate_uniform<S>(&mut self, n: i32, sink: &mut S) -> Result<(), SamplingError>
    where
        S: SampleSink + ?Sized,
    {
        self.generate(n, Jitter::uniform(), sink)
    }
    /// Push `n * n` samples into `sink`, each confined to the part of
    /// its stratum described by [Jitter::centered]. A `centering` of
    /// `0` is the uniform case, `1` places every sample at the exact
    /// center of its stratum.
    pub fn generate_centered<S>(
        &mut self,
        n: i32,
        centering: Float,
        sink: &mut S,
    ) -> Result<(), SamplingError>
    where
        S: SampleSink + ?Sized,
    {
        self.generate(n, Jitter::centered(centering), sink)
    }
    /// Like [generate_uniform](Self::generate_uniform) with a sink
    /// which may fail. The first error stops the generation and is
    /// returned as is.
    pub fn try_generate_uniform<F, E>(&mut self, n: i32, sink: F) -> Result<(), E>
    where
        F: FnMut(Float, Float) -> Result<(), E>,
        E: From<SamplingError>,
    {
        self.try_generate(n, Jitter::uniform(), sink)
    }
    /// Like [generate_centered](Self::generate_centered) with a sink
    /// which may fail.
    pub fn try_generate_centered<F, E>(
        &mut self,
        n: i32,
        centering: Float,
        sink: F,
    ) -> Result<(), E>
    where
        F: FnMut(Float, Float) -> Result<(), E>,
        E: From<SamplingError>,
    {
        self.try_generate(n, Jitter::centered(centering), sink)
    }
    /// Pull the samples of [generate_uniform](Self::generate_uniform)
    /// one at a time.
    pub fn uniform_samples(&mut self, n: i32) -> Result<StratifiedSamples<'_, R>, SamplingError> {
        StratifiedSamples::new(&mut self.rng, n, Jitter::uniform())
    }
    /// Pull the samples of [generate_centered](Self::generate_centered)
    /// one at a time.
    pub fn centered_samples(
        &mut self,
        n: i32,
        centering: Float,
    ) -> Result<StratifiedSamples<'_, R>, SamplingError> {
        StratifiedSamples::new(&mut self.rng, n, Jitter::centered(centering))
    }
    pub fn generate<S>(&mut self, n: i32, jitter: Jitter, sink: &mut S) -> Result<(), SamplingError>
    where
        S: SampleSink + ?Sized,
    {
        self.try_generate(n, jitter, |x, y| {
            sink.on_new_sample(x, y);
            Ok::<(), SamplingError>(())
        })
    }
    pub fn try_generate<F, E>(&mut self, n: i32, jitter: Jitter, mut sink: F) -> Result<(), E>
    where
        F: FnMut(Float, Float) -> Result<(), E>,
        E: From<SamplingError>,
    {
        let n: i32 = check_strata(n)?;
        trace!(n, jitter = ?jitter, "generating stratified samples");
        let n_f: Float = n as Float;
        for sy in 0..n {
            for sx in 0..n {
                let p: Point2f = jitter.sample(&mut self.rng, sx, sy, n_f);
                sink(p.x, p.y)?;
            }
        }
        Ok(())
    }
}

/// Lazily generated samples of one `n x n` grid, in row-major stratum
/// order.
#[derive(Debug)]
pub struct StratifiedSamples<'a, R: RandomSource> {
    rng: &'a mut R,
    jitter: Jitter,
    n: i32,
    index: u64,
    total: u64,
}

impl<'a, R: RandomSource> StratifiedSamples<'a, R> {
    fn new(rng: &'a mut R, n: i32, jitter: Jitter) -> Result<Self, SamplingError> {
        let n: i32 = check_strata(n)?;
        trace!(n, jitter = ?jitter, "streaming stratified samples");
        Ok(StratifiedSamples {
            rng,
            jitter,
            n,
            index: 0_u64,
            total: n as u64 * n as u64,
        })
    }
    /// Stratum `(sx, sy)` the next sample will be placed in.
    pub fn next_stratum(&self) -> Option<(i32, i32)> {
        if self.index >= self.total {
            None
        } else {
            let n: u64 = self.n as u64;
            Some(((self.index % n) as i32, (self.index / n) as i32))
        }
    }
}

impl<'a, R: RandomSource> Iterator for StratifiedSamples<'a, R> {
    type Item = Point2f;

    fn next(&mut self) -> Option<Point2f> {
        let (sx, sy) = self.next_stratum()?;
        self.index += 1;
        Some(self.jitter.sample(&mut *self.rng, sx, sy, self.n as Float))
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining: u64 = self.total - self.index;
        match usize::try_from(remaining) {
            Ok(remaining) => (remaining, Some(remaining)),
            Err(_) => (usize::MAX, None),
        }
    }
}

// n * n always fits a 64-bit usize
#[cfg(target_pointer_width = "64")]
impl<'a, R: RandomSource> ExactSizeIterator for StratifiedSamples<'a, R> {}

impl<'a, R: RandomSource> FusedIterator for StratifiedSamples<'a, R> {}
