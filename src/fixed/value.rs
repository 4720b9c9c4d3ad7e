use std::fmt;
use std::ops::{Mul, Neg};

use num_rational::Ratio;

use super::bits::{
    binary_multiply, bits_to_f64, bits_to_hex, bits_to_integer, bits_to_unsigned, extend,
    float_to_bits, integer_to_bits, scale_integer, twos_complement,
};
use super::format::{FixedFormat, group_nibbles};
use crate::error::{Result, SimError};

/// Anything a `FixedPoint` register can be loaded from
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    /// Decimal integer, scaled by 2^F
    Integer(i128),
    /// Decimal value, scaled by 2^F and rounded half to even
    Float(f64),
    /// Raw MSB-first bits, extended or truncated to the register width
    Bits(&'a [u8]),
    /// Bits of another register
    Fixed(&'a FixedPoint),
}

impl From<i128> for Source<'_> {
    fn from(value: i128) -> Self {
        Source::Integer(value)
    }
}

impl From<i64> for Source<'_> {
    fn from(value: i64) -> Self {
        Source::Integer(value.into())
    }
}

impl From<i32> for Source<'_> {
    fn from(value: i32) -> Self {
        Source::Integer(value.into())
    }
}

impl From<f64> for Source<'_> {
    fn from(value: f64) -> Self {
        Source::Float(value)
    }
}

impl<'a> From<&'a [u8]> for Source<'a> {
    fn from(bits: &'a [u8]) -> Self {
        Source::Bits(bits)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Source<'a> {
    fn from(bits: &'a [u8; N]) -> Self {
        Source::Bits(bits)
    }
}

impl<'a> From<&'a Vec<u8>> for Source<'a> {
    fn from(bits: &'a Vec<u8>) -> Self {
        Source::Bits(bits)
    }
}

impl<'a> From<&'a FixedPoint> for Source<'a> {
    fn from(value: &'a FixedPoint) -> Self {
        Source::Fixed(value)
    }
}

/// How a `set` fitted its input into the register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// Input matched the register width (always the case for decimal input)
    Exact,
    /// Input was narrower and got zero- or sign-extended
    Extended { from: usize, to: usize },
    /// Input was wider; only the `to` least significant bits were kept
    Truncated { from: usize, to: usize },
}

impl SetOutcome {
    pub fn is_truncated(&self) -> bool {
        matches!(self, SetOutcome::Truncated { .. })
    }
}

/// Fixed-width two's-complement register with an implicit binary point
///
/// Arithmetic follows the growth rules of combinational hardware: `add`
/// and `sub` widen by one bit, `mul` produces the sum of operand widths and
/// fractional bits. Nothing is rounded or wrapped implicitly; `to`, `left`
/// and `right` are the explicit register boundaries.
///
/// # Example
/// ```
/// use mandelfpga::fixed::{FixedFormat, FixedPoint};
///
/// let format = FixedFormat::new(4, true, 0).unwrap();
/// let a = FixedPoint::from_int(format, 3).unwrap();
/// let b = FixedPoint::from_int(format, -1).unwrap();
/// let sum = a.add(&b).unwrap();
/// assert_eq!(sum.width(), 5);
/// assert_eq!(sum.to_integer().unwrap(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FixedPoint {
    format: FixedFormat,
    bits: Vec<u8>,
}

impl FixedPoint {
    /// All-zero register of the given format
    pub fn zero(format: FixedFormat) -> Self {
        Self {
            bits: vec![0; format.bits()],
            format,
        }
    }

    /// Register of the given format loaded with `value`
    ///
    /// Truncation of an oversized bit source is logged, not returned; use
    /// `set` to observe it.
    pub fn with_value<'a>(format: FixedFormat, value: impl Into<Source<'a>>) -> Result<Self> {
        let mut out = Self::zero(format);
        out.set(value)?;
        Ok(out)
    }

    pub fn from_f64(format: FixedFormat, value: f64) -> Result<Self> {
        Self::with_value(format, value)
    }

    pub fn from_int(format: FixedFormat, value: i128) -> Result<Self> {
        Self::with_value(format, value)
    }

    pub fn from_bits(format: FixedFormat, bits: &[u8]) -> Result<Self> {
        Self::with_value(format, bits)
    }

    /// Build directly from bits already known to match the format
    fn from_raw(format: FixedFormat, bits: Vec<u8>) -> Self {
        debug_assert_eq!(bits.len(), format.bits());
        Self { format, bits }
    }

    /// Load a new value into the register
    ///
    /// Decimal input is scaled by 2^F and must fit without wrapping. Bit
    /// input is extended (sign-extended for signed registers) or truncated
    /// to the least significant bits. Nothing changes on error.
    ///
    /// # Errors
    /// - `SimError::UnsignedNegative` for negative input to an unsigned register
    /// - `SimError::Capacity` if the scaled magnitude needs more than `N - signed` bits
    /// - `SimError::NonFinite` for NaN or infinite input
    /// - `SimError::InvalidBit` for bit entries other than 0 or 1
    pub fn set<'a>(&mut self, value: impl Into<Source<'a>>) -> Result<SetOutcome> {
        let width = self.format.bits();
        let signed = self.format.is_signed();
        let frac_bits = self.format.frac_bits();

        match value.into() {
            Source::Integer(value) => {
                let scaled = scale_integer(value, frac_bits, width)?;
                self.bits = integer_to_bits(scaled, width, signed)?;
                Ok(SetOutcome::Exact)
            }
            Source::Float(value) => {
                self.bits = float_to_bits(value, width, signed, frac_bits)?;
                Ok(SetOutcome::Exact)
            }
            Source::Bits(bits) => self.load_bits(bits),
            Source::Fixed(other) => self.load_bits(&other.bits),
        }
    }

    fn load_bits(&mut self, bits: &[u8]) -> Result<SetOutcome> {
        if let Some(index) = bits.iter().position(|&b| b > 1) {
            return Err(SimError::InvalidBit {
                index,
                value: bits[index],
            });
        }

        let width = self.format.bits();
        let outcome = match bits.len() {
            n if n == width => SetOutcome::Exact,
            n if n > width => {
                log::warn!("Truncated number {} -> {} bits", n, width);
                SetOutcome::Truncated { from: n, to: width }
            }
            n => SetOutcome::Extended { from: n, to: width },
        };
        self.bits = extend(bits, width, self.format.is_signed());
        Ok(outcome)
    }

    pub fn format(&self) -> FixedFormat {
        self.format
    }

    pub fn width(&self) -> usize {
        self.format.bits()
    }

    pub fn frac_bits(&self) -> usize {
        self.format.frac_bits()
    }

    pub fn is_signed(&self) -> bool {
        self.format.is_signed()
    }

    /// MSB-first bits
    pub fn bits(&self) -> &[u8] {
        &self.bits
    }

    /// Bit at LSB-relative position `n`, zero beyond the MSB
    pub fn bit(&self, n: usize) -> u8 {
        if n < self.bits.len() {
            self.bits[self.bits.len() - 1 - n]
        } else {
            0
        }
    }

    /// True when the register holds a negative value
    pub fn is_negative(&self) -> bool {
        self.is_signed() && self.bits[0] == 1
    }

    /// Full-width sum: N + 1 bits, signed if either operand is
    ///
    /// # Errors
    /// - `SimError::FormatMismatch` if the fractional bits differ
    /// - `SimError::WidthMismatch` if the widths differ
    pub fn add(&self, other: &FixedPoint) -> Result<FixedPoint> {
        let (a, b, format) = self.widened_operands(other)?;
        let (sum, _) = super::bits::binary_add(&a, &b)?;
        Ok(Self::from_raw(format, sum))
    }

    /// Full-width difference `self + twos_complement(other)`, N + 1 bits
    ///
    /// # Errors
    /// Same as `add`
    pub fn sub(&self, other: &FixedPoint) -> Result<FixedPoint> {
        let (a, b, format) = self.widened_operands(other)?;
        let (difference, _) = super::bits::binary_add(&a, &twos_complement(&b))?;
        Ok(Self::from_raw(format, difference))
    }

    /// Check adder preconditions and extend both operands by one bit
    fn widened_operands(&self, other: &FixedPoint) -> Result<(Vec<u8>, Vec<u8>, FixedFormat)> {
        if self.frac_bits() != other.frac_bits() {
            return Err(SimError::FormatMismatch {
                lhs: self.frac_bits(),
                rhs: other.frac_bits(),
            });
        }
        if self.width() != other.width() {
            return Err(SimError::WidthMismatch {
                lhs: self.width(),
                rhs: other.width(),
            });
        }

        let format = self
            .format
            .widened(self.is_signed() || other.is_signed());
        let width = format.bits();
        Ok((
            extend(&self.bits, width, self.is_signed()),
            extend(&other.bits, width, other.is_signed()),
            format,
        ))
    }

    /// Full-width product: Na + Nb bits, Fa + Fb fractional bits
    pub fn mul(&self, other: &FixedPoint) -> FixedPoint {
        let product = binary_multiply(&self.bits, self.is_signed(), &other.bits, other.is_signed());
        Self::from_raw(self.format.product(other.format), product)
    }

    /// Two's complement at the same format
    pub fn negate(&self) -> FixedPoint {
        Self::from_raw(self.format, twos_complement(&self.bits))
    }

    /// Keep the `n` most significant bits
    ///
    /// Fractional bits shrink by the number of bits removed, floored at 0.
    pub fn left(&self, n: usize) -> Result<FixedPoint> {
        self.check_slice(n)?;
        let removed = self.width() - n;
        let format = FixedFormat::new(
            n,
            self.is_signed(),
            self.frac_bits().saturating_sub(removed),
        )?;
        Ok(Self::from_raw(format, self.bits[..n].to_vec()))
    }

    /// Keep the `n` least significant bits
    ///
    /// Fractional bits are capped at `n`.
    pub fn right(&self, n: usize) -> Result<FixedPoint> {
        self.check_slice(n)?;
        let format = FixedFormat::new(n, self.is_signed(), self.frac_bits().min(n))?;
        Ok(Self::from_raw(format, self.bits[self.width() - n..].to_vec()))
    }

    fn check_slice(&self, n: usize) -> Result<()> {
        if n == 0 || n > self.width() {
            return Err(SimError::SliceOutOfRange {
                requested: n,
                width: self.width(),
            });
        }
        Ok(())
    }

    /// Explicit register resize
    ///
    /// Aligns the binary point first: `F - frac_bits` low bits are dropped
    /// (truncation toward negative infinity), or zeros are appended when the
    /// target has more fractional bits. The result is then cut to its `bits`
    /// least significant bits, wrapping any integer overflow, or extended
    /// when narrower. Signedness is kept.
    ///
    /// # Errors
    /// Returns `SimError::InvalidFormat` if `frac_bits > bits` or `bits == 0`
    pub fn to(&self, bits: usize, frac_bits: usize) -> Result<FixedPoint> {
        let format = FixedFormat::new(bits, self.is_signed(), frac_bits)?;
        Ok(self.resize(format))
    }

    /// `to` with the target taken from a format; the format's signedness is
    /// ignored in favour of the source's
    pub fn resize(&self, format: FixedFormat) -> FixedPoint {
        let format = format.with_signed(self.is_signed());
        let current = self.frac_bits();
        let target = format.frac_bits();

        let aligned: Vec<u8> = if target <= current {
            let keep = self.width() - (current - target);
            if keep == 0 {
                // Every bit sat below the new binary point; floor is 0 or -1
                vec![if self.is_signed() { self.bits[0] } else { 0 }]
            } else {
                self.bits[..keep].to_vec()
            }
        } else {
            let mut padded = self.bits.clone();
            padded.resize(self.width() + (target - current), 0);
            padded
        };

        Self::from_raw(format, extend(&aligned, format.bits(), self.is_signed()))
    }

    /// Two's-complement decoded integer (the value times 2^F)
    ///
    /// # Errors
    /// Returns `SimError::TooWide` when the register exceeds 128 bits
    pub fn to_integer(&self) -> Result<i128> {
        bits_to_integer(&self.bits, self.is_signed())
    }

    /// Raw bit pattern read as unsigned
    pub fn to_unsigned(&self) -> Result<u128> {
        bits_to_unsigned(&self.bits)
    }

    /// Exact value as a fraction
    pub fn to_fraction(&self) -> Result<Ratio<i128>> {
        let numer = self.to_integer()?;
        let denom = scale_integer(1, self.frac_bits(), self.width())
            .map_err(|_| SimError::TooWide { bits: self.width() })?;
        Ok(Ratio::new(numer, denom))
    }

    /// Approximate value
    pub fn to_f64(&self) -> f64 {
        bits_to_f64(&self.bits, self.is_signed(), self.frac_bits())
    }

    /// `0x` followed by one upper-case digit per nibble of the raw pattern
    pub fn to_hex(&self) -> String {
        format!("0x{}", bits_to_hex(&self.bits))
    }

    /// Bits grouped in nibbles, e.g. `1'0110`
    pub fn to_bit_string(&self) -> String {
        let raw: String = self.bits.iter().map(|&b| (b'0' + b) as char).collect();
        group_nibbles(&raw)
    }

    /// Decimal readout: the integer when F = 0, `value (fraction)` otherwise
    pub fn to_decimal_string(&self) -> String {
        if self.frac_bits() == 0 {
            match self.to_integer() {
                Ok(value) => value.to_string(),
                Err(_) => format!("{:.0}", self.to_f64()),
            }
        } else {
            match self.to_fraction() {
                Ok(fraction) => format!("{} ({})", self.to_f64(), fraction),
                Err(_) => self.to_f64().to_string(),
            }
        }
    }
}

impl fmt::Display for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.to_bit_string(),
            self.to_hex(),
            self.to_decimal_string()
        )
    }
}

impl Neg for &FixedPoint {
    type Output = FixedPoint;

    fn neg(self) -> FixedPoint {
        self.negate()
    }
}

impl Neg for FixedPoint {
    type Output = FixedPoint;

    fn neg(self) -> FixedPoint {
        self.negate()
    }
}

impl Mul for &FixedPoint {
    type Output = FixedPoint;

    fn mul(self, rhs: &FixedPoint) -> FixedPoint {
        FixedPoint::mul(self, rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(bits: usize, signed: bool, frac_bits: usize) -> FixedFormat {
        FixedFormat::new(bits, signed, frac_bits).unwrap()
    }

    #[test]
    fn test_encode_unsigned_five() {
        let value = FixedPoint::from_int(fmt(4, false, 0), 5).unwrap();
        assert_eq!(value.bits(), &[0, 1, 0, 1]);
        assert_eq!(value.to_integer().unwrap(), 5);
    }

    #[test]
    fn test_encode_signed_minus_three() {
        let value = FixedPoint::from_int(fmt(4, true, 0), -3).unwrap();
        assert_eq!(value.bits(), &[1, 1, 0, 1]);
        assert_eq!(value.to_integer().unwrap(), -3);
        assert!(value.is_negative());
    }

    #[test]
    fn test_integer_input_is_scaled() {
        let value = FixedPoint::from_int(fmt(8, true, 2), 3).unwrap();
        assert_eq!(value.to_integer().unwrap(), 12);
        assert_eq!(value.to_f64(), 3.0);
    }

    #[test]
    fn test_set_from_bits_outcomes() {
        let mut value = FixedPoint::zero(fmt(4, true, 0));

        assert_eq!(value.set(&[1, 0, 1, 0]).unwrap(), SetOutcome::Exact);

        let outcome = value.set(&[1, 0]).unwrap();
        assert_eq!(outcome, SetOutcome::Extended { from: 2, to: 4 });
        assert_eq!(value.bits(), &[1, 1, 1, 0]);

        let outcome = value.set(&[1, 0, 0, 1, 1, 0]).unwrap();
        assert!(outcome.is_truncated());
        assert_eq!(value.bits(), &[0, 1, 1, 0]);
    }

    #[test]
    fn test_set_unsigned_zero_extends() {
        let mut value = FixedPoint::zero(fmt(4, false, 0));
        value.set(&[1, 0]).unwrap();
        assert_eq!(value.bits(), &[0, 0, 1, 0]);
    }

    #[test]
    fn test_failed_set_leaves_value() {
        let mut value = FixedPoint::from_int(fmt(4, false, 0), 5).unwrap();
        assert!(value.set(-1).is_err());
        assert!(value.set(&[0, 2, 1, 0]).is_err());
        assert!(value.set(16).is_err());
        assert_eq!(value.to_integer().unwrap(), 5);
    }

    #[test]
    fn test_set_from_other_value() {
        let source = FixedPoint::from_int(fmt(4, true, 0), -2).unwrap();
        let mut target = FixedPoint::zero(fmt(8, true, 0));
        target.set(&source).unwrap();
        assert_eq!(target.to_integer().unwrap(), -2);
    }

    #[test]
    fn test_add_grows_by_one_bit() {
        let a = FixedPoint::from_int(fmt(4, true, 0), 3).unwrap();
        let b = FixedPoint::from_int(fmt(4, true, 0), -1).unwrap();
        let sum = a.add(&b).unwrap();
        assert_eq!(sum.width(), 5);
        assert_eq!(sum.to_integer().unwrap(), 2);
    }

    #[test]
    fn test_add_keeps_carry() {
        let a = FixedPoint::from_int(fmt(4, false, 0), 15).unwrap();
        let b = FixedPoint::from_int(fmt(4, false, 0), 15).unwrap();
        let sum = a.add(&b).unwrap();
        assert_eq!(sum.to_integer().unwrap(), 30);
        assert!(!sum.is_signed());
    }

    #[test]
    fn test_add_rejects_mismatched_formats() {
        let a = FixedPoint::zero(fmt(8, true, 4));
        let b = FixedPoint::zero(fmt(8, true, 3));
        assert_eq!(
            a.add(&b).unwrap_err(),
            SimError::FormatMismatch { lhs: 4, rhs: 3 }
        );

        let c = FixedPoint::zero(fmt(6, true, 4));
        assert_eq!(
            a.sub(&c).unwrap_err(),
            SimError::WidthMismatch { lhs: 8, rhs: 6 }
        );
    }

    #[test]
    fn test_sub() {
        let a = FixedPoint::from_f64(fmt(8, true, 4), 1.25).unwrap();
        let b = FixedPoint::from_f64(fmt(8, true, 4), 3.5).unwrap();
        let diff = a.sub(&b).unwrap();
        assert_eq!(diff.width(), 9);
        assert_eq!(diff.to_f64(), -2.25);
    }

    #[test]
    fn test_mul_format() {
        let a = FixedPoint::from_f64(fmt(8, true, 4), -1.5).unwrap();
        let b = FixedPoint::from_f64(fmt(6, true, 2), 2.25).unwrap();
        let product = &a * &b;
        assert_eq!(product.width(), 14);
        assert_eq!(product.frac_bits(), 6);
        assert!(product.is_signed());
        assert_eq!(product.to_f64(), -3.375);
    }

    #[test]
    fn test_negate() {
        let value = FixedPoint::from_f64(fmt(8, true, 3), 2.625).unwrap();
        assert_eq!((-&value).to_f64(), -2.625);
        assert_eq!(-(-value.clone()), value);
    }

    #[test]
    fn test_left_and_right() {
        let value = FixedPoint::from_bits(fmt(8, true, 4), &[1, 0, 1, 1, 0, 1, 1, 0]).unwrap();

        let left = value.left(6).unwrap();
        assert_eq!(left.bits(), &[1, 0, 1, 1, 0, 1]);
        assert_eq!(left.frac_bits(), 2);

        let left = value.left(2).unwrap();
        assert_eq!(left.frac_bits(), 0);

        let right = value.right(3).unwrap();
        assert_eq!(right.bits(), &[1, 1, 0]);
        assert_eq!(right.frac_bits(), 3);

        assert!(value.left(0).is_err());
        assert!(value.right(9).is_err());
    }

    #[test]
    fn test_resize_truncates_fraction_and_wraps_integer() {
        // 36-bit product with 30 fractional bits back to s18.15
        let a = FixedPoint::from_f64(fmt(18, true, 15), 1.5).unwrap();
        let b = FixedPoint::from_f64(fmt(18, true, 15), -1.25).unwrap();
        let product = a.mul(&b);
        let resized = product.to(18, 15).unwrap();
        assert_eq!(resized.format(), fmt(18, true, 15));
        assert_eq!(resized.to_f64(), -1.875);

        // 3.5 * 3.5 = 12.25 overflows 3 integer bits and wraps to -3.75
        let c = FixedPoint::from_f64(fmt(18, true, 15), 3.5).unwrap();
        let wrapped = c.mul(&c).to(18, 15).unwrap();
        assert_eq!(wrapped.to_f64(), -3.75);
    }

    #[test]
    fn test_resize_floors_negative_values() {
        let value = FixedPoint::from_f64(fmt(8, true, 4), -0.0625).unwrap();
        let resized = value.to(6, 2).unwrap();
        assert_eq!(resized.to_f64(), -0.25);
    }

    #[test]
    fn test_resize_adds_fraction_bits() {
        let value = FixedPoint::from_f64(fmt(6, true, 2), -1.75).unwrap();
        let resized = value.to(10, 5).unwrap();
        assert_eq!(resized.to_f64(), -1.75);
        assert_eq!(resized.width(), 10);
    }

    #[test]
    fn test_fraction_readout() {
        let value = FixedPoint::from_f64(fmt(8, true, 4), -2.75).unwrap();
        assert_eq!(value.to_fraction().unwrap(), Ratio::new(-11, 4));
    }

    #[test]
    fn test_display() {
        let value = FixedPoint::from_int(fmt(4, false, 0), 5).unwrap();
        assert_eq!(value.to_string(), "0101 0x5 5");

        let value = FixedPoint::from_f64(fmt(5, true, 2), -0.75).unwrap();
        assert_eq!(value.to_string(), "1'1101 0x1D -0.75 (-3/4)");
    }

    #[test]
    fn test_bit_accessor() {
        let value = FixedPoint::from_int(fmt(4, false, 0), 5).unwrap();
        assert_eq!(value.bit(0), 1);
        assert_eq!(value.bit(1), 0);
        assert_eq!(value.bit(2), 1);
        assert_eq!(value.bit(7), 0);
    }
}
