//! Type definition of Float, and constants which can be used almost
//! everywhere else in the code.

use hexf::*;

pub type Float = f32;

/// Largest representable Float strictly below one.
pub const FLOAT_ONE_MINUS_EPSILON: Float = hexf32!("0x1.fffffep-1");

/// Scale factor turning a 32-bit word into a Float in `[0, 1)`.
pub const FLOAT_U32_SCALE: Float = hexf32!("0x1.0p-32");
