//! Default datapath geometry
//!
//! These mirror the register sizes of the reference hardware design so that
//! software runs and synthesized runs can be compared without extra setup.

/// Integer bits of the Mandelbrot registers, sign bit included.
pub const MANDELBROT_INTEGER_BITS: usize = 3;

/// Fractional bits of the Mandelbrot registers.
pub const MANDELBROT_FRAC_BITS: usize = 15;

/// Iteration cap used when none is configured.
pub const DEFAULT_MAX_ITER: u32 = 100;

/// Escape radius used when none is configured.
pub const DEFAULT_ESCAPE_RADIUS: f64 = 2.0;

/// Coefficient normalization of the MAC block, as a power of two.
/// The hardware coefficients are stored pre-multiplied by 2^11.
pub const MAC_SCALE_SHIFT: u32 = 11;

/// Separator placed between nibbles when printing bit vectors.
pub const NIBBLE_SEPARATOR: char = '\'';

/// Bandwidth edges are clamped to this normalized range before filter design.
pub const MIN_NORMALIZED_FREQ: f64 = 0.001;
pub const MAX_NORMALIZED_FREQ: f64 = 0.499;
