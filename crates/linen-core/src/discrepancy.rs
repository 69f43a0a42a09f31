//! # Discrepancy Detection
//!
//! Compares what a client sent with what came back and values the gap.
//!
//! ## Sign Convention
//! ```text
//! discrepancy = quantity_sent - quantity_received
//!
//!   sent 10, received 8  →  +2  (two items short)
//!   sent 10, received 12 →  -2  (two extra items came back)
//! ```
//! The same sign flows into `value_impact` and from there into the batch
//! summary's discrepancy adjustment. Invoices, exports and the dashboard all
//! read it from here.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::config::EngineConfig;
use crate::error::CoreResult;
use crate::money::{self, Money};
use crate::rounding::round_half_away;
use crate::types::{ItemRecord, PricedItem};
use crate::validation::validate_items;

/// Discrepancy figures for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ItemDiscrepancy {
    /// Position of the item in the submitted list.
    pub index: usize,
    pub linen_category_id: String,
    /// `sent - received`, signed.
    pub discrepancy: i64,
    /// `|discrepancy| / sent × 100`, 2 decimals; 0 when nothing was sent.
    pub discrepancy_percentage: f64,
    /// `discrepancy × unit_price`, signed.
    #[serde(with = "money::decimal")]
    #[ts(type = "number")]
    pub value_impact: Money,
}

/// Batch-level discrepancy figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscrepancyReport {
    pub items: Vec<ItemDiscrepancy>,
    pub item_count: usize,
    /// Items where sent ≠ received.
    pub items_with_discrepancy: usize,
    /// Σ |discrepancy|.
    pub total_discrepancy: i64,
    /// `items_with_discrepancy / item_count × 100`, 2 decimals.
    pub discrepancy_percentage: f64,
    /// Σ |value_impact|.
    #[serde(with = "money::decimal")]
    #[ts(type = "number")]
    pub value_impact: Money,
    /// Σ value_impact (signed); this is the summary's adjustment term.
    #[serde(with = "money::decimal")]
    #[ts(type = "number")]
    pub net_value_impact: Money,
}

impl DiscrepancyReport {
    /// `true` iff at least one item has sent ≠ received.
    #[inline]
    pub fn has_discrepancy(&self) -> bool {
        self.items_with_discrepancy > 0
    }
}

/// Computes one item's discrepancy.
pub fn item_discrepancy(index: usize, item: &PricedItem) -> ItemDiscrepancy {
    let discrepancy = item.quantity_sent - item.quantity_received;

    ItemDiscrepancy {
        index,
        linen_category_id: item.linen_category_id.clone(),
        discrepancy,
        discrepancy_percentage: percentage(discrepancy.abs(), item.quantity_sent),
        value_impact: item.unit_price.multiply_quantity(discrepancy),
    }
}

/// Builds the report for validated items.
///
/// ## Example
/// ```rust
/// use linen_core::discrepancy::discrepancy_report;
/// use linen_core::money::Money;
/// use linen_core::types::PricedItem;
///
/// let item = PricedItem {
///     linen_category_id: "towels".to_string(),
///     quantity_sent: 10,
///     quantity_received: 8,
///     unit_price: Money::from_cents(500),
///     express_delivery: false,
///     discrepancy_details: None,
/// };
/// let report = discrepancy_report(&[item]);
/// assert_eq!(report.items[0].discrepancy, 2);
/// assert_eq!(report.items[0].value_impact.cents(), 1000);
/// assert_eq!(report.discrepancy_percentage, 100.0);
/// ```
pub fn discrepancy_report(items: &[PricedItem]) -> DiscrepancyReport {
    let lines: Vec<ItemDiscrepancy> = items
        .iter()
        .enumerate()
        .map(|(index, item)| item_discrepancy(index, item))
        .collect();

    let items_with_discrepancy = lines.iter().filter(|l| l.discrepancy != 0).count();

    DiscrepancyReport {
        item_count: lines.len(),
        items_with_discrepancy,
        total_discrepancy: lines.iter().map(|l| l.discrepancy.abs()).sum(),
        discrepancy_percentage: percentage(items_with_discrepancy as i64, lines.len() as i64),
        value_impact: lines.iter().map(|l| l.value_impact.abs()).sum(),
        net_value_impact: lines.iter().map(|l| l.value_impact).sum(),
        items: lines,
    }
}

/// Validates submitted items, then builds the report.
pub fn detect_discrepancies(
    records: &[ItemRecord],
    config: &EngineConfig,
) -> CoreResult<DiscrepancyReport> {
    let items = validate_items(records, config)?;
    Ok(discrepancy_report(&items))
}

/// `part / whole × 100` to 2 decimals, rounded half away from zero.
/// Zero when `whole` is zero.
pub(crate) fn percentage(part: i64, whole: i64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    // hundredths of a percent
    let hundredths = round_half_away(part as i128 * 10_000, whole as i128);
    hundredths as f64 / 100.0
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn item(sent: i64, received: i64, price_cents: i64) -> PricedItem {
        PricedItem {
            linen_category_id: "pillow-cases".to_string(),
            quantity_sent: sent,
            quantity_received: received,
            unit_price: Money::from_cents(price_cents),
            express_delivery: false,
            discrepancy_details: None,
        }
    }

    #[test]
    fn test_shortfall_is_positive() {
        let line = item_discrepancy(0, &item(10, 8, 500));
        assert_eq!(line.discrepancy, 2);
        assert_eq!(line.discrepancy_percentage, 20.0);
        assert_eq!(line.value_impact.cents(), 1000);
    }

    #[test]
    fn test_surplus_is_negative() {
        let line = item_discrepancy(3, &item(10, 12, 250));
        assert_eq!(line.index, 3);
        assert_eq!(line.discrepancy, -2);
        assert_eq!(line.discrepancy_percentage, 20.0);
        assert_eq!(line.value_impact.cents(), -500);
    }

    #[test]
    fn test_nothing_sent_has_zero_percentage() {
        let line = item_discrepancy(0, &item(0, 4, 100));
        assert_eq!(line.discrepancy, -4);
        assert_eq!(line.discrepancy_percentage, 0.0);
    }

    #[test]
    fn test_percentage_rounding() {
        // 1/3 = 33.333...%
        assert_eq!(percentage(1, 3), 33.33);
        // 2/3 = 66.666...%
        assert_eq!(percentage(2, 3), 66.67);
        assert_eq!(percentage(5, 0), 0.0);
    }

    #[test]
    fn test_report_aggregates() {
        let items = vec![item(10, 8, 500), item(10, 12, 250), item(5, 5, 1000)];
        let report = discrepancy_report(&items);

        assert_eq!(report.item_count, 3);
        assert_eq!(report.items_with_discrepancy, 2);
        assert_eq!(report.total_discrepancy, 4);
        assert_eq!(report.discrepancy_percentage, 66.67);
        // |10.00| + |-5.00|
        assert_eq!(report.value_impact.cents(), 1500);
        // 10.00 - 5.00
        assert_eq!(report.net_value_impact.cents(), 500);
        assert!(report.has_discrepancy());
    }

    #[test]
    fn test_empty_report() {
        let report = discrepancy_report(&[]);
        assert_eq!(report.item_count, 0);
        assert_eq!(report.discrepancy_percentage, 0.0);
        assert!(report.value_impact.is_zero());
        assert!(!report.has_discrepancy());
    }

    #[test]
    fn test_no_discrepancy_when_all_match() {
        let report = discrepancy_report(&[item(3, 3, 100), item(0, 0, 100)]);
        assert!(!report.has_discrepancy());
        assert_eq!(report.total_discrepancy, 0);
    }

    #[test]
    fn test_detect_validates_first() {
        let record = ItemRecord {
            linen_category_id: "towels".to_string(),
            quantity_sent: 10,
            quantity_received: 8,
            price_per_item: 1500.0,
            express_delivery: false,
            discrepancy_details: None,
        };
        let err = detect_discrepancies(&[record], &EngineConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPrice);
    }
}
