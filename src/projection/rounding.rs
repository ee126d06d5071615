//! Rounding helpers used by the projection
//!
//! Three rules are in play:
//! - `round_to`: half-to-even on the exact binary value, for the cent and
//!   rate columns
//! - `bank_round`: decimal-exact half-to-even, for the balance tracks
//! - `floor_round`: truncation toward negative infinity, for the IRR display value

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Highest scale a `Decimal` can hold
const MAX_DECIMAL_SCALE: u32 = 28;

/// Round to `decimals` places, ties to even, on the exact binary value.
///
/// `5325.585` is stored as `5325.58500000000003637...` and rounds up to
/// `5325.59`; only values that are exact ties in binary go to even.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    // None when the float is not finite or beyond Decimal's range
    let Some(decimal) = Decimal::from_f64_retain(value) else {
        return value;
    };
    to_f64(
        decimal.round_dp_with_strategy(decimals.min(MAX_DECIMAL_SCALE), RoundingStrategy::MidpointNearestEven),
        value,
    )
}

/// Round half to even on the decimal value the float prints as.
///
/// `2.345` rounds to `2.34` and `2.355` to `2.36`, regardless of which side
/// of the tie the nearest binary float falls on.
pub fn bank_round(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    // f64 Display is the shortest string that round-trips
    let Ok(decimal) = Decimal::from_str(&value.to_string()) else {
        // Outside Decimal's range the requested precision is below f64 resolution
        return value;
    };
    to_f64(
        decimal.round_dp_with_strategy(decimals.min(MAX_DECIMAL_SCALE), RoundingStrategy::MidpointNearestEven),
        value,
    )
}

/// Nearest float to a decimal, through its exact string form
fn to_f64(decimal: Decimal, fallback: f64) -> f64 {
    decimal.to_string().parse().unwrap_or(fallback)
}

/// Truncate toward negative infinity at `decimals` places
pub fn floor_round(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).floor() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bank_round_ties_to_even() {
        assert_eq!(bank_round(2.345, 2), 2.34);
        assert_eq!(bank_round(2.355, 2), 2.36);
        assert_eq!(bank_round(0.5, 0), 0.0);
        assert_eq!(bank_round(1.5, 0), 2.0);
        assert_eq!(bank_round(-2.345, 2), -2.34);
    }

    #[test]
    fn test_bank_round_non_ties() {
        assert_eq!(bank_round(2.3451, 2), 2.35);
        assert_eq!(bank_round(1234.567891234567, 12), 1234.567891234567);
        assert_eq!(bank_round(0.0, 16), 0.0);
    }

    #[test]
    fn test_floor_round() {
        assert_eq!(floor_round(-0.001, 2), -0.01);
        assert_eq!(floor_round(12.34567, 4), 12.3456);
        assert_eq!(floor_round(-12.34561, 4), -12.3457);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.123456, 4), 0.1235);
        assert_eq!(round_to(-7885.9, 2), -7885.9);
        assert_eq!(round_to(1e300, 2), 1e300);
        assert!(round_to(f64::NAN, 2).is_nan());
    }

    #[test]
    fn test_round_to_uses_exact_binary_value() {
        // Stored slightly above the tie
        assert_eq!(round_to(5325.585, 2), 5325.59);
        assert_eq!(round_to(2.345, 2), 2.35);
        // Stored slightly below the tie
        assert_eq!(round_to(2.675, 2), 2.67);
        assert_eq!(round_to(1.005, 2), 1.0);
        // Exact binary ties go to even
        assert_eq!(round_to(15.625, 2), 15.62);
        assert_eq!(round_to(0.125, 2), 0.12);
        assert_eq!(round_to(-15.625, 2), -15.62);
    }
}
