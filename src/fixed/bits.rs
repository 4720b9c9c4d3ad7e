//! Bit-vector primitives
//!
//! Every routine here works on MSB-first slices of 0/1 bytes, the same
//! layout a hardware description uses for `std_logic_vector`. Sums and
//! products are formed one bit at a time so that carries, sign extension and
//! wraparound behave exactly as in the synthesized adders and multipliers.

use crate::error::{Result, SimError};

/// Ripple-carry addition of two equal-width vectors
///
/// Returns the sum at the operand width and the carry out of the MSB.
///
/// # Errors
/// Returns `SimError::WidthMismatch` if the operands differ in width
pub fn binary_add(a: &[u8], b: &[u8]) -> Result<(Vec<u8>, u8)> {
    if a.len() != b.len() {
        return Err(SimError::WidthMismatch {
            lhs: a.len(),
            rhs: b.len(),
        });
    }
    Ok(ripple_add(a, b, 0))
}

/// LSB-to-MSB full-adder chain; callers guarantee equal widths
fn ripple_add(a: &[u8], b: &[u8], carry_in: u8) -> (Vec<u8>, u8) {
    debug_assert_eq!(a.len(), b.len());
    let mut sum = vec![0u8; a.len()];
    let mut carry = carry_in;
    for i in (0..a.len()).rev() {
        let total = a[i] + b[i] + carry;
        sum[i] = total & 1;
        carry = total >> 1;
    }
    (sum, carry)
}

/// Invert every bit and add one, keeping the width
pub fn twos_complement(bits: &[u8]) -> Vec<u8> {
    let inverted: Vec<u8> = bits.iter().map(|&b| 1 - b).collect();
    let zero = vec![0u8; bits.len()];
    ripple_add(&inverted, &zero, 1).0
}

/// Resize a vector to `width` bits
///
/// Widening pads the MSB side with copies of the sign bit when `signed`,
/// with zeros otherwise. Narrowing keeps the `width` least significant bits.
pub fn extend(bits: &[u8], width: usize, signed: bool) -> Vec<u8> {
    if width <= bits.len() {
        return bits[bits.len() - width..].to_vec();
    }
    let pad = if signed {
        bits.first().copied().unwrap_or(0)
    } else {
        0
    };
    let mut out = vec![pad; width - bits.len()];
    out.extend_from_slice(bits);
    out
}

/// Logical left shift at constant width
fn shift_left(bits: &[u8], amount: usize) -> Vec<u8> {
    let mut out = vec![0u8; bits.len()];
    if amount < bits.len() {
        out[..bits.len() - amount].copy_from_slice(&bits[amount..]);
    }
    out
}

/// Shift-and-add multiplication
///
/// Produces an `a.len() + b.len()` bit product. For each set bit of `a`,
/// from the LSB upward, `b` (sign-extended to the product width when
/// `b_signed`) is shifted to that position and accumulated. When the bit is
/// the sign bit of a signed `a`, its weight is negative and the partial
/// product is two's-complemented before accumulation.
pub fn binary_multiply(a: &[u8], a_signed: bool, b: &[u8], b_signed: bool) -> Vec<u8> {
    let width = a.len() + b.len();
    let b_wide = extend(b, width, b_signed);
    let mut product = vec![0u8; width];

    for (position, &bit) in a.iter().rev().enumerate() {
        if bit == 0 {
            continue;
        }
        let mut partial = shift_left(&b_wide, position);
        if a_signed && position == a.len() - 1 {
            partial = twos_complement(&partial);
        }
        product = ripple_add(&product, &partial, 0).0;
    }

    product
}

/// Encode an integer in `width` bits
///
/// # Errors
/// - `SimError::UnsignedNegative` for a negative value with `signed == false`
/// - `SimError::Capacity` if the magnitude needs more than `width - signed` bits
pub fn integer_to_bits(value: i128, width: usize, signed: bool) -> Result<Vec<u8>> {
    if value < 0 && !signed {
        return Err(SimError::UnsignedNegative(value));
    }

    let magnitude = value.unsigned_abs();
    let required = (u128::BITS - magnitude.leading_zeros()) as usize;
    let available = width.checked_sub(usize::from(signed));
    if available.is_none_or(|available| required > available) {
        return Err(SimError::Capacity { value, bits: width });
    }

    let mut bits = vec![0u8; width];
    for (i, bit) in bits.iter_mut().enumerate() {
        let position = width - 1 - i;
        if position < u128::BITS as usize {
            *bit = ((magnitude >> position) & 1) as u8;
        }
    }

    if value < 0 {
        bits = twos_complement(&bits);
    }
    Ok(bits)
}

/// Scale a decimal value by 2^frac_bits, round half to even and encode it
///
/// # Errors
/// As `integer_to_bits`, plus `SimError::NonFinite` for NaN or infinities
pub fn float_to_bits(value: f64, width: usize, signed: bool, frac_bits: usize) -> Result<Vec<u8>> {
    if !value.is_finite() {
        return Err(SimError::NonFinite(value));
    }
    let scaled = (value * 2f64.powi(frac_bits as i32)).round_ties_even();
    // `as` saturates; anything that large cannot fit a register we model
    let integer = scaled as i128;
    if scaled.abs() >= 2f64.powi(127) {
        return Err(SimError::Capacity {
            value: integer,
            bits: width,
        });
    }
    integer_to_bits(integer, width, signed)
}

/// Scale an integer by 2^frac_bits without going through floating point
pub(crate) fn scale_integer(value: i128, frac_bits: usize, width: usize) -> Result<i128> {
    if value == 0 {
        return Ok(0);
    }
    let overflow = SimError::Capacity { value, bits: width };
    if frac_bits >= (i128::BITS - 1) as usize {
        return Err(overflow);
    }
    value.checked_mul(1i128 << frac_bits).ok_or(overflow)
}

/// Raw unsigned pattern of the bits
///
/// # Errors
/// Returns `SimError::TooWide` above 128 bits
pub fn bits_to_unsigned(bits: &[u8]) -> Result<u128> {
    if bits.len() > u128::BITS as usize {
        return Err(SimError::TooWide { bits: bits.len() });
    }
    Ok(bits
        .iter()
        .fold(0u128, |acc, &bit| (acc << 1) | u128::from(bit)))
}

/// Integer value of the bits, two's-complement decoded when `signed`
///
/// # Errors
/// Returns `SimError::TooWide` when the value cannot be held in an `i128`
pub fn bits_to_integer(bits: &[u8], signed: bool) -> Result<i128> {
    let raw = bits_to_unsigned(bits)?;
    if !signed {
        return i128::try_from(raw).map_err(|_| SimError::TooWide { bits: bits.len() });
    }
    if bits.is_empty() {
        return Ok(0);
    }
    // Move the sign bit to bit 127, then shift back arithmetically
    let unused = u128::BITS as usize - bits.len();
    Ok(((raw << unused) as i128) >> unused)
}

/// Approximate value of the bits scaled by 2^-frac_bits, for any width
pub fn bits_to_f64(bits: &[u8], signed: bool, frac_bits: usize) -> f64 {
    let width = bits.len();
    bits.iter()
        .enumerate()
        .filter(|&(_, &bit)| bit == 1)
        .map(|(i, _)| {
            let position = (width - 1 - i) as i32;
            let weight = 2f64.powi(position - frac_bits as i32);
            if signed && i == 0 { -weight } else { weight }
        })
        .sum()
}

/// Upper-case hexadecimal digits of the raw pattern, one per nibble
pub fn bits_to_hex(bits: &[u8]) -> String {
    let padded = extend(bits, bits.len().div_ceil(4) * 4, false);
    padded
        .chunks(4)
        .map(|nibble| {
            let digit = nibble.iter().fold(0u32, |acc, &b| (acc << 1) | u32::from(b));
            char::from_digit(digit, 16)
                .unwrap_or('0')
                .to_ascii_uppercase()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_add_with_carry() {
        let (sum, carry) = binary_add(&[1, 1, 0, 1], &[0, 0, 1, 1]).unwrap();
        assert_eq!(sum, vec![0, 0, 0, 0]);
        assert_eq!(carry, 1);

        let (sum, carry) = binary_add(&[0, 0, 1, 1], &[0, 1, 0, 1]).unwrap();
        assert_eq!(sum, vec![1, 0, 0, 0]);
        assert_eq!(carry, 0);
    }

    #[test]
    fn test_binary_add_width_mismatch() {
        let err = binary_add(&[1, 0], &[1, 0, 0]).unwrap_err();
        assert_eq!(err, SimError::WidthMismatch { lhs: 2, rhs: 3 });
    }

    #[test]
    fn test_twos_complement() {
        assert_eq!(twos_complement(&[0, 0, 1, 1]), vec![1, 1, 0, 1]);
        assert_eq!(twos_complement(&[1, 1, 0, 1]), vec![0, 0, 1, 1]);
        assert_eq!(twos_complement(&[0, 0, 0, 0]), vec![0, 0, 0, 0]);
        // Most negative value maps onto itself
        assert_eq!(twos_complement(&[1, 0, 0, 0]), vec![1, 0, 0, 0]);
    }

    #[test]
    fn test_extend() {
        assert_eq!(extend(&[1, 0, 1], 5, true), vec![1, 1, 1, 0, 1]);
        assert_eq!(extend(&[1, 0, 1], 5, false), vec![0, 0, 1, 0, 1]);
        assert_eq!(extend(&[1, 1, 0, 1, 0], 3, true), vec![0, 1, 0]);
    }

    #[test]
    fn test_integer_encoding() {
        assert_eq!(integer_to_bits(5, 4, false).unwrap(), vec![0, 1, 0, 1]);
        assert_eq!(integer_to_bits(-3, 4, true).unwrap(), vec![1, 1, 0, 1]);
        assert_eq!(integer_to_bits(0, 1, true).unwrap(), vec![0]);
        assert_eq!(
            integer_to_bits(-1, 4, false).unwrap_err(),
            SimError::UnsignedNegative(-1)
        );
        assert_eq!(
            integer_to_bits(8, 4, true).unwrap_err(),
            SimError::Capacity { value: 8, bits: 4 }
        );
    }

    #[test]
    fn test_integer_decoding() {
        assert_eq!(bits_to_integer(&[1, 1, 0, 1], true).unwrap(), -3);
        assert_eq!(bits_to_integer(&[1, 1, 0, 1], false).unwrap(), 13);
        assert_eq!(bits_to_integer(&[1, 0, 0, 0], true).unwrap(), -8);

        let wide = vec![1u8; 129];
        assert_eq!(
            bits_to_integer(&wide, true).unwrap_err(),
            SimError::TooWide { bits: 129 }
        );
        let full = vec![1u8; 128];
        assert_eq!(bits_to_integer(&full, true).unwrap(), -1);
    }

    #[test]
    fn test_float_rounding_ties_to_even() {
        // 0.375 * 4 = 1.5 -> 2, 0.625 * 4 = 2.5 -> 2
        assert_eq!(float_to_bits(0.375, 4, false, 2).unwrap(), vec![0, 0, 1, 0]);
        assert_eq!(float_to_bits(0.625, 4, false, 2).unwrap(), vec![0, 0, 1, 0]);
        assert!(matches!(
            float_to_bits(f64::NAN, 4, true, 2),
            Err(SimError::NonFinite(_))
        ));
    }

    #[test]
    fn test_multiply_signed() {
        // -3 * 3 = -9 in 8 bits
        let product = binary_multiply(&[1, 1, 0, 1], true, &[0, 0, 1, 1], true);
        assert_eq!(bits_to_integer(&product, true).unwrap(), -9);

        // -8 * -8 = 64, needs the full 8-bit product
        let product = binary_multiply(&[1, 0, 0, 0], true, &[1, 0, 0, 0], true);
        assert_eq!(bits_to_integer(&product, true).unwrap(), 64);
    }

    #[test]
    fn test_multiply_mixed_signedness() {
        // unsigned 15 * signed -2
        let product = binary_multiply(&[1, 1, 1, 1], false, &[1, 1, 1, 0], true);
        assert_eq!(bits_to_integer(&product, true).unwrap(), -30);
    }

    #[test]
    fn test_bits_to_f64() {
        assert_eq!(bits_to_f64(&[1, 1, 1, 0], true, 2), -0.5);
        assert_eq!(bits_to_f64(&[0, 1, 1, 0], false, 2), 1.5);
    }

    #[test]
    fn test_bits_to_hex() {
        assert_eq!(bits_to_hex(&[0, 1, 0, 1]), "5");
        assert_eq!(bits_to_hex(&[1, 1, 1, 0, 1]), "1D");
        assert_eq!(bits_to_hex(&[1, 0, 1, 0, 1, 1, 1, 1]), "AF");
    }

    #[test]
    fn test_integer_to_bits_zero_width() {
        assert_eq!(
            integer_to_bits(0, 0, true),
            Err(SimError::Capacity { value: 0, bits: 0 })
        );
        assert_eq!(integer_to_bits(0, 0, false), Ok(vec![]));
        assert!(integer_to_bits(1, 0, false).is_err());
    }
}
