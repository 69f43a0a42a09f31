//! # Engine Configuration
//!
//! Every rate and ceiling the engine applies, in one struct.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`LINEN_*`) via [`EngineConfig::from_env`]
//! 2. Defaults (this file)
//!
//! Parsed values are range-checked so no ceiling can push cent arithmetic
//! past `i64`.
//!
//! | Variable                       | Default | Meaning                        |
//! |--------------------------------|---------|--------------------------------|
//! | `LINEN_VAT_RATE_BPS`           | 1500    | VAT, 15%                       |
//! | `LINEN_EXPRESS_SURCHARGE_BPS`  | 5000    | Express surcharge, 50%         |
//! | `LINEN_MAX_QUANTITY`           | 10000   | Per-item quantity ceiling      |
//! | `LINEN_MAX_UNIT_PRICE_CENTS`   | 100000  | Batch-item price ceiling (1,000.00) |

use serde::{Deserialize, Serialize};
use std::env;

use crate::money::Money;
use crate::types::Rate;

/// Rates and limits used by validation and the calculators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// VAT applied to the adjusted subtotal.
    pub vat_rate: Rate,

    /// Premium on an item's received-quantity value when express is flagged.
    pub express_surcharge_rate: Rate,

    /// Upper bound for quantity sent/received.
    pub max_quantity: i64,

    /// Operator-facing ceiling for a batch item's unit price.
    pub max_unit_price: Money,

    /// Ceiling for a category's catalogue price.
    pub max_category_price: Money,

    /// Maximum length of an item's discrepancy note.
    pub max_discrepancy_details_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            vat_rate: Rate::from_bps(1500),
            express_surcharge_rate: Rate::from_bps(5000),
            max_quantity: 10_000,
            max_unit_price: Money::from_cents(100_000),
            max_category_price: Money::from_cents(1_000_000),
            max_discrepancy_details_len: 500,
        }
    }
}

/// Largest accepted rate: 100%.
pub const MAX_RATE_BPS: u32 = 10_000;

/// Largest accepted quantity ceiling. Together with [`MAX_PRICE_CEILING_CENTS`]
/// this keeps every line total and batch sum far inside `i64` cents.
pub const MAX_QUANTITY_CEILING: i64 = 1_000_000;

/// Largest accepted unit price ceiling (1,000,000.00).
pub const MAX_PRICE_CEILING_CENTS: i64 = 100_000_000;

impl EngineConfig {
    /// Loads the defaults, overridden by any `LINEN_*` variables that are set.
    ///
    /// The only place the crate reads process state.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable lookup.
    ///
    /// ## Errors
    /// - `InvalidValue` when a variable does not parse
    /// - `OutOfRange` when a rate exceeds 100%, the quantity ceiling is outside
    ///   `[1, 1,000,000]` or the price ceiling is outside `[0, 1,000,000.00]`
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = EngineConfig::default();

        let vat_bps = read_var(&lookup, "LINEN_VAT_RATE_BPS", defaults.vat_rate.bps())?;
        let surcharge_bps = read_var(
            &lookup,
            "LINEN_EXPRESS_SURCHARGE_BPS",
            defaults.express_surcharge_rate.bps(),
        )?;
        let max_quantity = read_var(&lookup, "LINEN_MAX_QUANTITY", defaults.max_quantity)?;
        let max_unit_price_cents = read_var(
            &lookup,
            "LINEN_MAX_UNIT_PRICE_CENTS",
            defaults.max_unit_price.cents(),
        )?;

        check_range("LINEN_VAT_RATE_BPS", vat_bps, 0, MAX_RATE_BPS)?;
        check_range("LINEN_EXPRESS_SURCHARGE_BPS", surcharge_bps, 0, MAX_RATE_BPS)?;
        check_range("LINEN_MAX_QUANTITY", max_quantity, 1, MAX_QUANTITY_CEILING)?;
        check_range(
            "LINEN_MAX_UNIT_PRICE_CENTS",
            max_unit_price_cents,
            0,
            MAX_PRICE_CEILING_CENTS,
        )?;

        Ok(EngineConfig {
            vat_rate: Rate::from_bps(vat_bps),
            express_surcharge_rate: Rate::from_bps(surcharge_bps),
            max_quantity,
            max_unit_price: Money::from_cents(max_unit_price_cents),
            ..defaults
        })
    }
}

fn read_var<T, F>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        None => Ok(default),
    }
}

fn check_range<T>(name: &str, value: T, min: T, max: T) -> Result<(), ConfigError>
where
    T: PartialOrd + std::fmt::Display,
{
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            name: name.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("{name} out of range: {value}")]
    OutOfRange { name: String, value: String },
}
