use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::NIBBLE_SEPARATOR;
use crate::error::{Result, SimError};

/// Register geometry of a fixed-point value
///
/// The triple every `FixedPoint` is built from: total width, signedness and
/// the number of bits below the binary point.
///
/// # Parsing formats
/// - `s18.15` - signed, 18 bits wide, 15 fractional bits
/// - `u8.0` or `u8` - unsigned, 8 bits wide, integer only
///
/// # Example
/// ```
/// use mandelfpga::fixed::FixedFormat;
///
/// let format: FixedFormat = "s18.15".parse().unwrap();
/// assert_eq!(format.bits(), 18);
/// assert_eq!(format.integer_bits(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawFormat", into = "RawFormat")]
pub struct FixedFormat {
    bits: usize,
    signed: bool,
    frac_bits: usize,
}

impl FixedFormat {
    /// Create a format, rejecting zero widths and fractional counts wider
    /// than the register
    pub fn new(bits: usize, signed: bool, frac_bits: usize) -> Result<Self> {
        if bits == 0 {
            return Err(SimError::InvalidFormat(
                "width must be at least 1 bit".to_string(),
            ));
        }
        if frac_bits > bits {
            return Err(SimError::InvalidFormat(format!(
                "{} fractional bits exceed {}-bit width",
                frac_bits, bits
            )));
        }
        Ok(Self {
            bits,
            signed,
            frac_bits,
        })
    }

    /// Signed format from integer bits (sign included) and fractional bits
    pub fn signed_q(integer_bits: usize, frac_bits: usize) -> Result<Self> {
        Self::new(integer_bits + frac_bits, true, frac_bits)
    }

    pub fn bits(&self) -> usize {
        self.bits
    }

    pub fn is_signed(&self) -> bool {
        self.signed
    }

    pub fn frac_bits(&self) -> usize {
        self.frac_bits
    }

    /// Bits above the binary point, sign bit included
    pub fn integer_bits(&self) -> usize {
        self.bits - self.frac_bits
    }

    /// Bits available for the magnitude of a decimal input
    pub fn magnitude_bits(&self) -> usize {
        self.bits - usize::from(self.signed)
    }

    /// Format of the full-width product of two registers
    pub fn product(self, other: FixedFormat) -> Self {
        Self {
            bits: self.bits + other.bits,
            signed: self.signed || other.signed,
            frac_bits: self.frac_bits + other.frac_bits,
        }
    }

    /// Format of a full-width sum: one carry bit wider
    pub fn widened(self, signed: bool) -> Self {
        Self {
            bits: self.bits + 1,
            signed,
            frac_bits: self.frac_bits,
        }
    }

    /// Same width and fractional bits with a different signedness
    pub fn with_signed(self, signed: bool) -> Self {
        Self { signed, ..self }
    }
}

impl fmt::Display for FixedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.signed { 's' } else { 'u' };
        write!(f, "{}{}.{}", prefix, self.bits, self.frac_bits)
    }
}

impl FromStr for FixedFormat {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = || SimError::InvalidFormat(format!("cannot parse '{}'", s));

        let (signed, rest) = if let Some(rest) = s.strip_prefix(['s', 'S']) {
            (true, rest)
        } else if let Some(rest) = s.strip_prefix(['u', 'U']) {
            (false, rest)
        } else {
            return Err(invalid());
        };

        let (bits, frac_bits) = match rest.split_once('.') {
            Some((bits, frac)) => (bits, frac),
            None => (rest, "0"),
        };
        let bits: usize = bits.parse().map_err(|_| invalid())?;
        let frac_bits: usize = frac_bits.parse().map_err(|_| invalid())?;

        Self::new(bits, signed, frac_bits)
    }
}

#[derive(Serialize, Deserialize)]
struct RawFormat {
    bits: usize,
    #[serde(default)]
    signed: bool,
    #[serde(default)]
    frac_bits: usize,
}

impl TryFrom<RawFormat> for FixedFormat {
    type Error = SimError;

    fn try_from(raw: RawFormat) -> Result<Self> {
        Self::new(raw.bits, raw.signed, raw.frac_bits)
    }
}

impl From<FixedFormat> for RawFormat {
    fn from(format: FixedFormat) -> Self {
        Self {
            bits: format.bits,
            signed: format.signed,
            frac_bits: format.frac_bits,
        }
    }
}

/// Group an MSB-first bit string into nibbles
///
/// The leftover high bits (width modulo 4) form the first group, so the
/// nibbles line up with the hexadecimal digits: `10110` -> `1'0110`.
pub fn group_nibbles(bits: &str) -> String {
    let head = bits.len() % 4;
    let mut grouped = String::with_capacity(bits.len() + bits.len() / 4);
    grouped.push_str(&bits[..head]);
    for (i, chunk) in bits.as_bytes()[head..].chunks(4).enumerate() {
        if head > 0 || i > 0 {
            grouped.push(NIBBLE_SEPARATOR);
        }
        grouped.extend(chunk.iter().map(|&b| b as char));
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_signed_format() {
        let format: FixedFormat = "s18.15".parse().unwrap();
        assert_eq!(format.bits(), 18);
        assert!(format.is_signed());
        assert_eq!(format.frac_bits(), 15);
        assert_eq!(format.integer_bits(), 3);
        assert_eq!(format.magnitude_bits(), 17);
    }

    #[test]
    fn test_parse_integer_format() {
        let format: FixedFormat = "u8".parse().unwrap();
        assert_eq!(format, FixedFormat::new(8, false, 0).unwrap());
        assert_eq!(format.to_string(), "u8.0");
    }

    #[test]
    fn test_parse_invalid_format() {
        assert!("x8.2".parse::<FixedFormat>().is_err());
        assert!("s0.0".parse::<FixedFormat>().is_err());
        assert!("s4.5".parse::<FixedFormat>().is_err());
        assert!("s4.x".parse::<FixedFormat>().is_err());
    }

    #[test]
    fn test_format_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            format: FixedFormat,
        }

        let wrapper: Wrapper =
            toml::from_str("format = { bits = 16, signed = true, frac_bits = 12 }").unwrap();
        assert_eq!(wrapper.format, FixedFormat::new(16, true, 12).unwrap());

        let bad = toml::from_str::<Wrapper>("format = { bits = 4, frac_bits = 9 }");
        assert!(bad.is_err());
    }

    #[test]
    fn test_group_nibbles() {
        assert_eq!(group_nibbles("0101"), "0101");
        assert_eq!(group_nibbles("10110"), "1'0110");
        assert_eq!(group_nibbles("110100101"), "1'1010'0101");
        assert_eq!(group_nibbles("11"), "11");
    }
}
