//! Receivers of generated samples.
//!
//! A sampler pushes every sample it generates into a [SampleSink]
//! right away, on the calling thread, instead of collecting them.
//! Closures taking the two coordinates are sinks:
//!
//! ```
//! use rs_strata::core::float::Float;
//! use rs_strata::core::sink::SampleSink;
//!
//! let mut sum: Float = 0.0;
//! let mut sink = |x: Float, y: Float| sum += x + y;
//! sink.on_new_sample(0.25, 0.5);
//! assert_eq!(sum, 0.75);
//! ```

use crate::core::float::Float;

pub trait SampleSink {
    /// Called once per generated sample with its position in `[-1, 1]^2`.
    fn on_new_sample(&mut self, x: Float, y: Float);
}

impl<F> SampleSink for F
where
    F: FnMut(Float, Float),
{
    fn on_new_sample(&mut self, x: Float, y: Float) {
        self(x, y)
    }
}
