//! Bit-pattern helpers shared by the oracle and outcome tables.
//!
//! A register value is read most-significant bit first: qubit 0 holds the
//! leftmost character of the bitstring, qubit `n - 1` the rightmost.

use crate::error::{IrError, IrResult};

/// Per-qubit bits of `value` for an `num_qubits`-wide register.
///
/// Entry `i` is the bit assigned to qubit `i`.
pub fn target_bits(value: u64, num_qubits: u32) -> IrResult<Vec<bool>> {
    if num_qubits == 0 || num_qubits > crate::MAX_QUBITS {
        return Err(IrError::TargetOutOfRange {
            target: value,
            num_qubits,
        });
    }
    if value >> num_qubits != 0 {
        return Err(IrError::TargetOutOfRange {
            target: value,
            num_qubits,
        });
    }
    Ok((0..num_qubits)
        .map(|i| (value >> (num_qubits - 1 - i)) & 1 == 1)
        .collect())
}

/// Parse an MSB-first bitstring such as `"10"` into `(value, width)`.
pub fn parse_bitstring(s: &str) -> IrResult<(u64, u32)> {
    let s = s.trim();
    if s.is_empty() || s.len() > crate::MAX_QUBITS as usize {
        return Err(IrError::InvalidBitstring(s.to_string()));
    }
    let mut value = 0u64;
    for c in s.chars() {
        let bit = match c {
            '0' => 0,
            '1' => 1,
            _ => return Err(IrError::InvalidBitstring(s.to_string())),
        };
        value = (value << 1) | bit;
    }
    Ok((value, s.len() as u32))
}

/// Render `value` as a zero-padded MSB-first bitstring of `width` bits.
pub fn format_bitstring(value: u64, width: u32) -> String {
    format!("{:0width$b}", value, width = width as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_bits_msb_first() {
        assert_eq!(target_bits(0b10, 2).unwrap(), vec![true, false]);
        assert_eq!(target_bits(0b01, 2).unwrap(), vec![false, true]);
        assert_eq!(target_bits(0b110, 3).unwrap(), vec![true, true, false]);
    }

    #[test]
    fn test_target_bits_out_of_range() {
        assert!(matches!(
            target_bits(4, 2),
            Err(IrError::TargetOutOfRange { target: 4, num_qubits: 2 })
        ));
    }

    #[test]
    fn test_parse_bitstring() {
        assert_eq!(parse_bitstring("00").unwrap(), (0, 2));
        assert_eq!(parse_bitstring("11").unwrap(), (3, 2));
        assert_eq!(parse_bitstring("10").unwrap(), (2, 2));
        assert!(parse_bitstring("").is_err());
        assert!(parse_bitstring("1a").is_err());
    }

    #[test]
    fn test_format_bitstring() {
        assert_eq!(format_bitstring(2, 2), "10");
        assert_eq!(format_bitstring(1, 3), "001");
    }
}
