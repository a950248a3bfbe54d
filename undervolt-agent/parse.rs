//! ASCII millivolt parser
//!
//! Accepts the narrow grammar `[-]digits[.digits]`: an optional leading `-`
//! at position 0, digits, at most one `.`. Anything else is rejected. The
//! integer part accumulates with checked arithmetic so malformed or
//! oversized input can never silently produce a wrong voltage. Fractional
//! digits accumulate as `d / 10^(pos+1)` in `f32`; the resulting precision
//! bound is intentional, two decimal places is all the register resolution
//! can hold anyway.

use crate::common::FpSession;
use crate::error::{Result, UndervoltError};

/// A parsed signed fractional value, `sign * (integer + fraction)`
///
/// Produced only by [`parse`] and consumed within the same call chain by
/// the offset codec; it has no independent lifecycle.
#[derive(Debug, Clone, Copy)]
pub struct FractionalValue {
    pub sign: i32,
    pub integer: i32,
    /// Fractional remainder in [0, 1)
    pub fraction: f32,
}

impl FractionalValue {
    /// Reconstruct the signed millivolt value
    pub fn millivolts(&self, _fp: &FpSession) -> f32 {
        self.sign as f32 * (self.integer as f32 + self.fraction)
    }
}

fn digit(b: u8) -> Option<i32> {
    b.is_ascii_digit().then(|| i32::from(b - b'0'))
}

/// Parse an ASCII byte sequence into a [`FractionalValue`]
///
/// Consumes exactly the given slice; there is no terminator scanning and no
/// trailing-content tolerance. Empty input and a bare sign or point parse
/// to zero.
pub fn parse(input: &[u8], _fp: &FpSession) -> Result<FractionalValue> {
    let mut sign = 1;
    let mut integer: i32 = 0;
    let mut fraction: f32 = 0.0;
    let mut integer_finished = false;
    let mut divisor: f32 = 10.0;

    for (position, &byte) in input.iter().enumerate() {
        if position == 0 && byte == b'-' {
            sign = -1;
            continue;
        }

        if !integer_finished && byte == b'.' {
            integer_finished = true;
            continue;
        }

        let Some(d) = digit(byte) else {
            tracing::error!("Invalid character 0x{:02x} at position {}", byte, position);
            return Err(UndervoltError::InvalidCharacter { byte, position });
        };

        if !integer_finished {
            integer = integer
                .checked_mul(10)
                .and_then(|v| v.checked_add(d))
                .ok_or(UndervoltError::Overflow)?;
        } else {
            fraction += d as f32 / divisor;
            divisor *= 10.0;
        }
    }

    Ok(FractionalValue {
        sign,
        integer,
        fraction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_mv(s: &str) -> Result<f32> {
        let fp = FpSession::acquire();
        parse(s.as_bytes(), &fp).map(|v| v.millivolts(&fp))
    }

    #[test]
    fn test_parse_zero() {
        assert_eq!(parse_mv("0.0").unwrap(), 0.0);
    }

    #[test]
    fn test_parse_bare_fraction() {
        assert_eq!(parse_mv(".5").unwrap(), 0.5);
    }

    #[test]
    fn test_parse_negative_fractional() {
        assert_eq!(parse_mv("-50.25").unwrap(), -50.25);
    }

    #[test]
    fn test_parse_positive_fractional() {
        assert_eq!(parse_mv("196.75").unwrap(), 196.75);
    }

    #[test]
    fn test_parse_negative_integer() {
        assert_eq!(parse_mv("-999").unwrap(), -999.0);
    }

    #[test]
    fn test_parse_rejects_second_point() {
        assert!(matches!(
            parse_mv("1.0.4"),
            Err(UndervoltError::InvalidCharacter { byte: b'.', .. })
        ));
    }

    #[test]
    fn test_parse_rejects_trailing_garbage() {
        assert!(matches!(
            parse_mv("11.55asd"),
            Err(UndervoltError::InvalidCharacter { byte: b'a', .. })
        ));
    }

    #[test]
    fn test_parse_rejects_second_sign() {
        assert!(matches!(
            parse_mv("--1"),
            Err(UndervoltError::InvalidCharacter { byte: b'-', position: 1 })
        ));
    }

    #[test]
    fn test_parse_rejects_integer_overflow() {
        assert!(matches!(
            parse_mv("99999999999"),
            Err(UndervoltError::Overflow)
        ));
        assert!(matches!(
            parse_mv("-99999999999"),
            Err(UndervoltError::Overflow)
        ));
    }

    #[test]
    fn test_parse_empty_and_bare_sign() {
        // No digits at all parses to zero.
        assert_eq!(parse_mv("").unwrap(), 0.0);
        assert_eq!(parse_mv("-").unwrap(), -0.0);
        assert_eq!(parse_mv(".").unwrap(), 0.0);
    }

    #[test]
    fn test_parse_max_integer() {
        assert_eq!(parse_mv("2147483647").unwrap(), 2147483647.0);
    }
}
