//! # Validation Module
//!
//! Input validation for batch items, categories and clients.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Batch form (UI)                                              │
//! │  ├── Immediate feedback (empty fields, obvious ranges)                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Quantities in [0, 10000], integer                                 │
//! │  ├── Unit price in [0.00, 1000.00], finite                             │
//! │  └── Discrepancy note ≤ 500 chars                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite CHECK / FK constraints)                     │
//! │                                                                         │
//! │  Nothing is clamped: an out-of-range value is an error.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use linen_core::config::EngineConfig;
//! use linen_core::types::ItemRecord;
//! use linen_core::validation::validate_item;
//!
//! let record = ItemRecord {
//!     linen_category_id: "towels".to_string(),
//!     quantity_sent: 10,
//!     quantity_received: 8,
//!     price_per_item: 5.0,
//!     express_delivery: false,
//!     discrepancy_details: None,
//! };
//! let priced = validate_item(&record, &EngineConfig::default()).unwrap();
//! assert_eq!(priced.unit_price.cents(), 500);
//! ```

use crate::config::EngineConfig;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{ItemRecord, PricedItem};

/// Result type for text-field validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of a category or client name.
pub const MAX_NAME_LEN: usize = 100;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity sent or received.
///
/// ## Rules
/// - `0 <= qty <= max` (zero is allowed: nothing came back)
pub fn validate_quantity(field: &str, qty: i64, max: i64) -> CoreResult<()> {
    if !(0..=max).contains(&qty) {
        return Err(CoreError::InvalidQuantity {
            field: field.to_string(),
            value: qty,
            max,
        });
    }

    Ok(())
}

/// Validates a batch item's unit price against the operator ceiling.
///
/// ## Example
/// ```rust
/// use linen_core::money::Money;
/// use linen_core::validation::validate_unit_price;
///
/// let max = Money::from_cents(100_000);
/// assert!(validate_unit_price(Money::from_cents(0), max).is_ok());
/// assert!(validate_unit_price(Money::from_cents(100_000), max).is_ok());
/// assert!(validate_unit_price(Money::from_cents(100_001), max).is_err());
/// assert!(validate_unit_price(Money::from_cents(-1), max).is_err());
/// ```
pub fn validate_unit_price(price: Money, max: Money) -> CoreResult<()> {
    if price.is_negative() || price > max {
        return Err(CoreError::InvalidPrice {
            value: price.to_string(),
            max: max.to_string(),
        });
    }

    Ok(())
}

/// Range-checks an operator-entered decimal price, then converts it to cents.
///
/// The check runs on the raw value, so `-0.004` and `1000.004` are rejected
/// rather than rounded into range.
///
/// ## Errors
/// - `InvalidAmount` when the value is not finite
/// - `InvalidPrice` when it is below zero or above `max`
pub fn validate_decimal_price(price: f64, max: Money) -> CoreResult<Money> {
    if !price.is_finite() {
        return Err(CoreError::InvalidAmount { value: price });
    }

    if price < 0.0 || price > max.to_decimal() {
        return Err(CoreError::InvalidPrice {
            value: price.to_string(),
            max: max.to_string(),
        });
    }

    let cents = Money::from_decimal(price)?;
    validate_unit_price(cents, max)?;
    Ok(cents)
}

/// Validates a category's catalogue price (higher ceiling than batch items).
pub fn validate_category_price(price: Money, config: &EngineConfig) -> CoreResult<()> {
    validate_unit_price(price, config.max_category_price)
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates an optional discrepancy note.
pub fn validate_discrepancy_details(details: Option<&str>, max: usize) -> ValidationResult<()> {
    match details {
        Some(text) if text.chars().count() > max => Err(ValidationError::TooLong {
            field: "discrepancy_details".to_string(),
            max,
        }),
        _ => Ok(()),
    }
}

/// Validates a display name (category or client).
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 100 characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a UUID string.
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Item Validators
// =============================================================================

/// Validates a submitted item and converts it to engine input.
///
/// ## Checks (in order)
/// 1. `linen_category_id` present
/// 2. `quantity_sent`, `quantity_received` in `[0, max_quantity]`
/// 3. `price_per_item` finite (`InvalidAmount`), then in range (`InvalidPrice`)
/// 4. discrepancy note length
pub fn validate_item(record: &ItemRecord, config: &EngineConfig) -> CoreResult<PricedItem> {
    if record.linen_category_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "linen_category_id".to_string(),
        }
        .into());
    }

    validate_quantity("quantity_sent", record.quantity_sent, config.max_quantity)?;
    validate_quantity(
        "quantity_received",
        record.quantity_received,
        config.max_quantity,
    )?;

    let unit_price = validate_decimal_price(record.price_per_item, config.max_unit_price)?;

    validate_discrepancy_details(
        record.discrepancy_details.as_deref(),
        config.max_discrepancy_details_len,
    )?;

    Ok(PricedItem {
        linen_category_id: record.linen_category_id.clone(),
        quantity_sent: record.quantity_sent,
        quantity_received: record.quantity_received,
        unit_price,
        express_delivery: record.express_delivery,
        discrepancy_details: record.discrepancy_details.clone(),
    })
}

/// Validates every item; the first failure aborts with its error.
pub fn validate_items(records: &[ItemRecord], config: &EngineConfig) -> CoreResult<Vec<PricedItem>> {
    records
        .iter()
        .map(|record| validate_item(record, config))
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
