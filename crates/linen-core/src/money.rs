//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004                                      │
//! │                                                                         │
//! │  A batch total summed in floats can differ by a cent between the       │
//! │  dashboard and the printed invoice.                                    │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Operator input (5.00) is rounded once by `round2` → 500 cents       │
//! │    Everything after that is exact integer arithmetic, except rate      │
//! │    products, which go through `round_half_away`                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use linen_core::money::Money;
//! use linen_core::types::Rate;
//!
//! let price = Money::from_decimal(5.00).unwrap();
//! let line_total = price.multiply_quantity(8);      // 40.00
//! let surcharge = line_total.apply_rate(Rate::from_bps(5000)); // 20.00
//! assert_eq!((line_total + surcharge).cents(), 6000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::rounding::{round_half_away, to_cents};
use crate::types::Rate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents.
///
/// ## Design Decisions
/// - **i64 (signed)**: discrepancy adjustments can be negative when more
///   items come back than were sent
/// - **Single field tuple struct**: zero-cost abstraction over i64
///
/// ## Where Money is Used
/// ```text
/// BatchItem.price_per_item ──► line_total ──► subtotal_received ─┐
///                          ├──► sent_value ─► value_impact ──────┼─► adjusted_subtotal
///                          └──► surcharge ───────────────────────┘        │
///                                                           VAT ◄─────────┤
///                                                   grand_total ◄─────────┘
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from a decimal amount, rounding to 2 places.
    ///
    /// ## Example
    /// ```rust
    /// use linen_core::money::Money;
    ///
    /// assert_eq!(Money::from_decimal(12.5).unwrap().cents(), 1250);
    /// assert!(Money::from_decimal(f64::NAN).is_err());
    /// ```
    pub fn from_decimal(amount: f64) -> CoreResult<Self> {
        Ok(Money(to_cents(amount)?))
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the value as a 2-decimal number for display and wire output.
    #[inline]
    pub fn to_decimal(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies money by a (possibly negative) quantity. Exact.
    ///
    /// ## Example
    /// ```rust
    /// use linen_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(500);
    /// assert_eq!(unit_price.multiply_quantity(-2).cents(), -1000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Applies a rate and rounds half away from zero to the cent.
    ///
    /// Used for the express surcharge and VAT.
    ///
    /// ## Example
    /// ```rust
    /// use linen_core::money::Money;
    /// use linen_core::types::Rate;
    ///
    /// // 70.00 × 15% = 10.50
    /// let vat = Money::from_cents(7000).apply_rate(Rate::from_bps(1500));
    /// assert_eq!(vat.cents(), 1050);
    ///
    /// // 0.05 × 50% = 0.025 → 0.03
    /// let surcharge = Money::from_cents(5).apply_rate(Rate::from_bps(5000));
    /// assert_eq!(surcharge.cents(), 3);
    /// ```
    pub fn apply_rate(&self, rate: Rate) -> Money {
        let cents = round_half_away(self.0 as i128 * rate.bps() as i128, 10_000);
        Money(cents as i64)
    }

    /// Divides money by a count, rounding half away from zero.
    ///
    /// Returns zero when `count` is zero.
    pub fn divide_by(&self, count: i64) -> Money {
        if count == 0 {
            return Money::zero();
        }
        Money(round_half_away(self.0 as i128, count as i128) as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain 2-decimal rendering ("80.50", "-5.00"); currency symbols are the
/// renderer's job.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Wire Format
// =============================================================================

/// Serializes `Money` as a 2-decimal JSON number (`80.5`) instead of cents.
///
/// Used on records handed to renderers and the form UI:
/// ```rust,ignore
/// #[serde(with = "crate::money::decimal")]
/// #[ts(type = "number")]
/// pub grand_total: Money,
/// ```
pub mod decimal {
    use super::Money;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(money: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(money.to_decimal())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        Money::from_decimal(amount).map_err(de::Error::custom)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_decimal() {
        assert_eq!(Money::from_decimal(5.0).unwrap().cents(), 500);
        assert_eq!(Money::from_decimal(0.125).unwrap().cents(), 13);
        assert_eq!(Money::from_decimal(-0.125).unwrap().cents(), -13);
        assert!(Money::from_decimal(f64::INFINITY).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(8050).to_string(), "80.50");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::from_cents(-5).to_string(), "-0.05");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((b - a).abs().cents(), 500);
        assert_eq!((-a).cents(), -1000);
        let result: Money = a * 3;
        assert_eq!(result.cents(), 3000);

        let total: Money = [a, b, b].iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_apply_rate_rounds_half_away_from_zero() {
        // 40.00 × 50% = 20.00
        assert_eq!(Money::from_cents(4000).apply_rate(Rate::from_bps(5000)).cents(), 2000);
        // 0.01 × 50% = 0.005 → 0.01
        assert_eq!(Money::from_cents(1).apply_rate(Rate::from_bps(5000)).cents(), 1);
        // -0.01 × 50% = -0.005 → -0.01
        assert_eq!(Money::from_cents(-1).apply_rate(Rate::from_bps(5000)).cents(), -1);
        // 10.10 × 15% = 1.515 → 1.52
        assert_eq!(Money::from_cents(1010).apply_rate(Rate::from_bps(1500)).cents(), 152);
    }

    #[test]
    fn test_divide_by() {
        assert_eq!(Money::from_cents(1000).divide_by(3).cents(), 333);
        assert_eq!(Money::from_cents(1000).divide_by(6).cents(), 167);
        assert_eq!(Money::from_cents(1000).divide_by(0).cents(), 0);
    }

    #[test]
    fn test_decimal_wire_format() {
        #[derive(Serialize, Deserialize)]
        struct Wire {
            #[serde(with = "decimal")]
            total: Money,
        }

        let json = serde_json::to_string(&Wire {
            total: Money::from_cents(8050),
        })
        .unwrap();
        assert_eq!(json, r#"{"total":80.5}"#);

        let back: Wire = serde_json::from_str(r#"{"total":12.125}"#).unwrap();
        assert_eq!(back.total.cents(), 1213);
    }
}
