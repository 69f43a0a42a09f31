//! # Rounding Policy
//!
//! The single source of truth for currency rounding.
//!
//! ## Rule
//! Round half away from zero, 2 decimal places:
//! ```text
//!   40.125  →  40.13
//!  -40.125  → -40.13
//!   10.504  →  10.50
//! ```
//!
//! Two entry points share the rule:
//! - [`round2`] for decimal amounts arriving from the operator or the wire
//! - [`round_half_away`] for integer cent arithmetic (`cents × bps / 10000`)
//!
//! Rate products (VAT, express surcharge) are rounded on their exact decimal
//! value, not on a binary float approximation:
//! ```text
//!   VAT on 1.50      1.50 × 15% = 0.225   →  0.23
//!   surcharge 0.29   0.29 × 50% = 0.145   →  0.15
//! ```
//! `round2(1.5 * 0.15)` gives 0.22 because the `f64` product lands just
//! below 0.225, so renderers must take VAT and surcharge from the engine
//! output instead of recomputing them with `round2`.

use crate::error::{CoreError, CoreResult};

/// Largest cent magnitude that survives a round trip through `f64`
/// (2^53, the last exactly representable integer).
pub const MAX_SAFE_CENTS: i64 = 9_007_199_254_740_992;

/// Rounds a decimal amount to 2 places, half away from zero.
///
/// ## Example
/// ```rust
/// use linen_core::rounding::round2;
///
/// assert_eq!(round2(10.125).unwrap(), 10.13);
/// assert_eq!(round2(-2.5).unwrap(), -2.5);
/// assert!(round2(f64::NAN).is_err());
/// ```
///
/// ## Errors
/// `InvalidAmount` when the input (or its scaled value) is not finite.
///
/// ## Rate products
/// Not for `amount * rate`: use [`Money::apply_rate`](crate::money::Money::apply_rate),
/// which rounds the exact product.
pub fn round2(amount: f64) -> CoreResult<f64> {
    if !amount.is_finite() {
        return Err(CoreError::InvalidAmount { value: amount });
    }

    let scaled = amount * 100.0;
    if !scaled.is_finite() {
        return Err(CoreError::InvalidAmount { value: amount });
    }

    // f64::round is half away from zero
    Ok(scaled.round() / 100.0)
}

/// Converts a decimal amount to whole cents using [`round2`].
pub(crate) fn to_cents(amount: f64) -> CoreResult<i64> {
    let rounded = round2(amount)?;
    let cents = (rounded * 100.0).round();

    if cents.abs() > MAX_SAFE_CENTS as f64 {
        return Err(CoreError::InvalidAmount { value: amount });
    }

    Ok(cents as i64)
}

/// Integer division rounding half away from zero.
///
/// ## Example
/// ```rust
/// use linen_core::rounding::round_half_away;
///
/// assert_eq!(round_half_away(25, 10), 3);
/// assert_eq!(round_half_away(-25, 10), -3);
/// assert_eq!(round_half_away(24, 10), 2);
/// ```
///
/// ## Panics
/// Never for a non-zero `denominator`; callers only pass constants or
/// checked non-zero totals.
pub fn round_half_away(numerator: i128, denominator: i128) -> i128 {
    debug_assert!(denominator != 0, "denominator must be non-zero");

    let quotient = numerator / denominator;
    let remainder = numerator % denominator;

    if remainder.abs() * 2 >= denominator.abs() {
        if (numerator < 0) == (denominator < 0) {
            quotient + 1
        } else {
            quotient - 1
        }
    } else {
        quotient
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_round2_half_away_from_zero() {
        assert_eq!(round2(0.125).unwrap(), 0.13);
        assert_eq!(round2(-0.125).unwrap(), -0.13);
        assert_eq!(round2(40.0).unwrap(), 40.0);
        assert_eq!(round2(10.504).unwrap(), 10.5);
    }

    #[test]
    fn test_round2_rejects_non_finite() {
        assert!(matches!(
            round2(f64::INFINITY),
            Err(CoreError::InvalidAmount { .. })
        ));
        assert!(matches!(
            round2(f64::NEG_INFINITY),
            Err(CoreError::InvalidAmount { .. })
        ));
        assert!(round2(f64::NAN).is_err());
        // Finite, but overflows once scaled
        assert!(round2(f64::MAX).is_err());
    }

    #[test]
    fn test_to_cents() {
        assert_eq!(to_cents(5.0).unwrap(), 500);
        assert_eq!(to_cents(12.125).unwrap(), 1213);
        assert_eq!(to_cents(-0.125).unwrap(), -13);
        assert!(to_cents(1e300).is_err());
    }

    #[test]
    fn test_round_half_away() {
        assert_eq!(round_half_away(5, 10), 1);
        assert_eq!(round_half_away(4, 10), 0);
        assert_eq!(round_half_away(-5, 10), -1);
        assert_eq!(round_half_away(5, -10), -1);
        assert_eq!(round_half_away(-15, -10), 2);
        assert_eq!(round_half_away(0, 7), 0);
    }

    #[test]
    fn test_rate_products_round_exact_decimal() {
        use crate::money::Money;
        use crate::types::Rate;

        // exact 22.5 cents
        assert_eq!(round_half_away(150 * 1500, 10_000), 23);
        assert_eq!(Money::from_cents(150).apply_rate(Rate::from_bps(1500)).cents(), 23);
        // exact 14.5 cents
        assert_eq!(Money::from_cents(29).apply_rate(Rate::from_bps(5000)).cents(), 15);

        // the float product sits below the half
        assert_eq!(round2(1.5 * 0.15).unwrap(), 0.22);
    }

    proptest! {
        #[test]
        fn prop_round2_is_idempotent(x in -1.0e9f64..1.0e9f64) {
            let once = round2(x).unwrap();
            prop_assert_eq!(round2(once).unwrap(), once);
        }

        #[test]
        fn prop_round_half_away_stays_within_half(n in -1_000_000i128..1_000_000i128, d in 1i128..10_000i128) {
            let q = round_half_away(n, d);
            // |n - q*d| <= d/2
            prop_assert!((n - q * d).abs() * 2 <= d);
        }
    }
}
