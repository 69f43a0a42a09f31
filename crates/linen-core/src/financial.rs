//! # Financial Calculator
//!
//! Per-item line totals and batch aggregates.
//!
//! ## Per Item
//! ```text
//! sent_value  = quantity_sent     × unit_price
//! line_total  = quantity_received × unit_price
//! surcharge   = express ? line_total.apply_rate(50%) : 0
//! ```
//! Products of an integer quantity and a cent price are exact. Only the
//! surcharge rate can produce a half cent, and `apply_rate` rounds the exact
//! product half away from zero (0.29 × 50% = 0.145 → 0.15).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::config::EngineConfig;
use crate::error::CoreResult;
use crate::money::{self, Money};
use crate::types::{ItemRecord, PricedItem};
use crate::validation::validate_items;

/// Money figures for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineFinancials {
    #[serde(with = "money::decimal")]
    #[ts(type = "number")]
    pub sent_value: Money,
    /// Received quantity × unit price; what the client is billed for.
    #[serde(with = "money::decimal")]
    #[ts(type = "number")]
    pub line_total: Money,
    #[serde(with = "money::decimal")]
    #[ts(type = "number")]
    pub surcharge: Money,
}

/// Batch aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FinancialTotals {
    #[serde(with = "money::decimal")]
    #[ts(type = "number")]
    pub total_sent_value: Money,
    #[serde(with = "money::decimal")]
    #[ts(type = "number")]
    pub total_received_value: Money,
    /// Σ |sent_value - line_total|.
    #[serde(with = "money::decimal")]
    #[ts(type = "number")]
    pub total_discrepancy_value: Money,
    #[serde(with = "money::decimal")]
    #[ts(type = "number")]
    pub surcharge_total: Money,
    /// total_sent_value / Σ quantity_sent; 0 when nothing was sent.
    #[serde(with = "money::decimal")]
    #[ts(type = "number")]
    pub average_item_price: Money,
    pub total_items_sent: i64,
    pub total_items_received: i64,
}

/// Computes one item's money figures.
pub fn line_financials(item: &PricedItem, config: &EngineConfig) -> LineFinancials {
    let line_total = item.unit_price.multiply_quantity(item.quantity_received);
    let surcharge = if item.express_delivery {
        line_total.apply_rate(config.express_surcharge_rate)
    } else {
        Money::zero()
    };

    LineFinancials {
        sent_value: item.unit_price.multiply_quantity(item.quantity_sent),
        line_total,
        surcharge,
    }
}

/// Aggregates validated items.
///
/// ## Example
/// ```rust
/// use linen_core::config::EngineConfig;
/// use linen_core::financial::financial_totals;
///
/// let totals = financial_totals(&[], &EngineConfig::default());
/// assert!(totals.average_item_price.is_zero());
/// ```
pub fn financial_totals(items: &[PricedItem], config: &EngineConfig) -> FinancialTotals {
    let lines: Vec<LineFinancials> = items.iter().map(|i| line_financials(i, config)).collect();

    let total_sent_value: Money = lines.iter().map(|l| l.sent_value).sum();
    let total_items_sent: i64 = items.iter().map(|i| i.quantity_sent).sum();

    FinancialTotals {
        total_sent_value,
        total_received_value: lines.iter().map(|l| l.line_total).sum(),
        total_discrepancy_value: lines
            .iter()
            .map(|l| (l.sent_value - l.line_total).abs())
            .sum(),
        surcharge_total: lines.iter().map(|l| l.surcharge).sum(),
        average_item_price: total_sent_value.divide_by(total_items_sent),
        total_items_sent,
        total_items_received: items.iter().map(|i| i.quantity_received).sum(),
    }
}

/// Validates submitted items, then aggregates them.
pub fn calculate_financials(
    records: &[ItemRecord],
    config: &EngineConfig,
) -> CoreResult<FinancialTotals> {
    let items = validate_items(records, config)?;
    Ok(financial_totals(&items, config))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(sent: i64, received: i64, price_cents: i64, express: bool) -> PricedItem {
        PricedItem {
            linen_category_id: "bath-towels".to_string(),
            quantity_sent: sent,
            quantity_received: received,
            unit_price: Money::from_cents(price_cents),
            express_delivery: express,
            discrepancy_details: None,
        }
    }

    #[test]
    fn test_line_without_express() {
        let line = line_financials(&item(10, 8, 500, false), &EngineConfig::default());
        assert_eq!(line.line_total.cents(), 4000);
        assert_eq!(line.sent_value.cents(), 5000);
        assert!(line.surcharge.is_zero());
    }

    #[test]
    fn test_line_with_express() {
        let line = line_financials(&item(10, 8, 500, true), &EngineConfig::default());
        assert_eq!(line.surcharge.cents(), 2000);
    }

    #[test]
    fn test_surcharge_rounds_half_cent_up() {
        // 3 × 0.33 = 0.99, × 50% = 0.495 → 0.50
        let line = line_financials(&item(3, 3, 33, true), &EngineConfig::default());
        assert_eq!(line.line_total.cents(), 99);
        assert_eq!(line.surcharge.cents(), 50);
    }

    #[test]
    fn test_surcharge_rate_comes_from_config() {
        let config = EngineConfig {
            express_surcharge_rate: crate::types::Rate::from_bps(2500),
            ..EngineConfig::default()
        };
        let line = line_financials(&item(4, 4, 1000, true), &config);
        assert_eq!(line.surcharge.cents(), 1000);
    }

    #[test]
    fn test_totals() {
        let items = vec![item(10, 8, 500, true), item(4, 6, 250, false)];
        let totals = financial_totals(&items, &EngineConfig::default());

        assert_eq!(totals.total_sent_value.cents(), 5000 + 1000);
        assert_eq!(totals.total_received_value.cents(), 4000 + 1500);
        // |50.00 - 40.00| + |10.00 - 15.00|
        assert_eq!(totals.total_discrepancy_value.cents(), 1000 + 500);
        assert_eq!(totals.surcharge_total.cents(), 2000);
        assert_eq!(totals.total_items_sent, 14);
        assert_eq!(totals.total_items_received, 14);
        // 60.00 / 14 = 4.2857 → 4.29
        assert_eq!(totals.average_item_price.cents(), 429);
    }

    #[test]
    fn test_empty_batch() {
        let totals = financial_totals(&[], &EngineConfig::default());
        assert!(totals.total_sent_value.is_zero());
        assert!(totals.average_item_price.is_zero());
        assert_eq!(totals.total_items_sent, 0);
    }

    #[test]
    fn test_nothing_sent_average_is_zero() {
        let totals = financial_totals(&[item(0, 5, 500, false)], &EngineConfig::default());
        assert!(totals.average_item_price.is_zero());
        assert_eq!(totals.total_received_value.cents(), 2500);
    }

    #[test]
    fn test_calculate_financials_from_records() {
        let record = ItemRecord {
            linen_category_id: "bath-towels".to_string(),
            quantity_sent: 2,
            quantity_received: 2,
            price_per_item: 3.5,
            express_delivery: true,
            discrepancy_details: None,
        };
        let totals = calculate_financials(&[record], &EngineConfig::default()).unwrap();
        assert_eq!(totals.total_received_value.cents(), 700);
        assert_eq!(totals.surcharge_total.cents(), 350);
    }
}
