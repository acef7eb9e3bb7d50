//! Random Number Generation
//!
//! Samplers only ever ask for the next uniformly distributed Float in
//! `[0, 1)`. That capability is the [RandomSource] trait. Identical
//! seeds and identical call sequences have to produce identical
//! output, which both implementations here guarantee:
//!
//! - [Rng], a PCG32 generator (O'Neill: *PCG: A Family of Simple Fast
//!   Space-Efficient Statistically Good Algorithms for Random Number
//!   Generation*)
//! - [RandSource], an adapter for generators of the `rand` crate

use rand::Rng as _;
use rand::{RngCore, SeedableRng};

use crate::core::float::{Float, FLOAT_ONE_MINUS_EPSILON, FLOAT_U32_SCALE};

pub const PCG32_DEFAULT_STATE: u64 = 0x853c_49e6_748f_ea9b;
pub const PCG32_DEFAULT_STREAM: u64 = 0xda3e_39cb_94b9_5bdb;
pub const PCG32_MULT: u64 = 0x5851_f42d_4c95_7f2d;

/// A seeded source of uniformly distributed Floats in `[0, 1)`.
pub trait RandomSource {
    fn uniform_float(&mut self) -> Float;
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn uniform_float(&mut self) -> Float {
        (**self).uniform_float()
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn uniform_float(&mut self) -> Float {
        (**self).uniform_float()
    }
}

/// Random number generator
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Rng {
    state: u64,
    inc: u64,
}

impl Default for Rng {
    fn default() -> Self {
        Rng::new()
    }
}

impl Rng {
    pub fn new() -> Self {
        Rng {
            state: PCG32_DEFAULT_STATE,
            inc: PCG32_DEFAULT_STREAM,
        }
    }
    /// Generator positioned at the start of the stream selected by
    /// `seed`.
    pub fn with_sequence(seed: u64) -> Self {
        let mut rng = Rng::new();
        rng.set_sequence(seed);
        rng
    }
    pub fn set_sequence(&mut self, initseq: u64) {
        self.state = 0_u64;
        self.inc = initseq.wrapping_shl(1) | 1;
        self.uniform_uint32();
        self.state = self.state.wrapping_add(PCG32_DEFAULT_STATE);
        self.uniform_uint32();
    }
    pub fn uniform_uint32(&mut self) -> u32 {
        let oldstate: u64 = self.state;
        self.state = oldstate.wrapping_mul(PCG32_MULT).wrapping_add(self.inc);
        let xorshifted: u32 = (oldstate.wrapping_shr(18) ^ oldstate).wrapping_shr(27) as u32;
        let rot: u32 = oldstate.wrapping_shr(59) as u32;
        xorshifted.rotate_right(rot)
    }
    pub fn uniform_float(&mut self) -> Float {
        (self.uniform_uint32() as Float * FLOAT_U32_SCALE).min(FLOAT_ONE_MINUS_EPSILON)
    }
}

impl RandomSource for Rng {
    fn uniform_float(&mut self) -> Float {
        Rng::uniform_float(self)
    }
}

/// Drives a sampler with any generator from the `rand` ecosystem.
#[derive(Debug, Clone)]
pub struct RandSource<R> {
    rng: R,
}

impl<R: RngCore> RandSource<R> {
    pub fn new(rng: R) -> Self {
        RandSource { rng }
    }
    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl<R: RngCore + SeedableRng> RandSource<R> {
    pub fn seed_from_u64(seed: u64) -> Self {
        RandSource {
            rng: R::seed_from_u64(seed),
        }
    }
}

impl<R: RngCore> RandomSource for RandSource<R> {
    fn uniform_float(&mut self) -> Float {
        self.rng.gen::<Float>()
    }
}

#[cfg(test)]
mod test {
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn same_sequence_same_output() {
        let mut a = Rng::with_sequence(7_u64);
        let mut b = Rng::with_sequence(7_u64);
        for _ in 0..1000 {
            assert_eq!(a.uniform_uint32(), b.uniform_uint32());
        }
    }

    #[test]
    fn different_sequences_diverge() {
        let mut a = Rng::with_sequence(1_u64);
        let mut b = Rng::with_sequence(2_u64);
        let a: Vec<u32> = (0..16).map(|_| a.uniform_uint32()).collect();
        let b: Vec<u32> = (0..16).map(|_| b.uniform_uint32()).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn set_sequence_rewinds() {
        let mut rng = Rng::with_sequence(3_u64);
        let first: Vec<Float> = (0..8).map(|_| rng.uniform_float()).collect();
        rng.set_sequence(3_u64);
        let again: Vec<Float> = (0..8).map(|_| rng.uniform_float()).collect();
        assert_eq!(first, again);
    }

    #[test]
    fn uniform_float_in_unit_interval() {
        let mut rng = Rng::with_sequence(0_u64);
        for _ in 0..10_000 {
            let u = rng.uniform_float();
            assert!((0.0..1.0).contains(&u), "{} out of [0, 1)", u);
        }
    }

    #[test]
    fn default_is_new() {
        assert_eq!(Rng::default(), Rng::new());
    }

    #[test]
    fn rand_source_is_deterministic() {
        let mut a: RandSource<StdRng> = RandSource::seed_from_u64(42_u64);
        let mut b: RandSource<StdRng> = RandSource::seed_from_u64(42_u64);
        for _ in 0..256 {
            let u = a.uniform_float();
            assert!((0.0..1.0).contains(&u));
            assert_eq!(u, b.uniform_float());
        }
    }

    #[test]
    fn rand_source_wraps_existing_generator() {
        let mut wrapped = RandSource::new(StdRng::seed_from_u64(9_u64));
        let mut seeded: RandSource<StdRng> = RandSource::seed_from_u64(9_u64);
        for _ in 0..16 {
            assert_eq!(wrapped.uniform_float(), seeded.uniform_float());
        }
        let mut wrapped_rng: StdRng = wrapped.into_inner();
        let mut seeded_rng: StdRng = seeded.into_inner();
        assert_eq!(wrapped_rng.next_u64(), seeded_rng.next_u64());
    }

    #[test]
    fn borrowed_source_advances_owner() {
        let mut owner = Rng::with_sequence(5_u64);
        let mut reference = owner;
        {
            let mut borrowed: &mut Rng = &mut owner;
            RandomSource::uniform_float(&mut borrowed);
        }
        reference.uniform_float();
        assert_eq!(owner, reference);
    }
}
