//! # Batch Summary
//!
//! The invoice-grade total. Invoices, PDF/Excel exports, the dashboard and
//! the persisted `total_amount` all read this one value.
//!
//! ## Composition
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  items ──► validate_items ──► PricedItem[]                              │
//! │                                   │                                     │
//! │                 ┌─────────────────┴─────────────────┐                   │
//! │                 ▼                                   ▼                   │
//! │        financial_totals                    discrepancy_report           │
//! │        Σ line_total, Σ surcharge           Σ value_impact (signed)      │
//! │                 │                                   │                   │
//! │                 └─────────────────┬─────────────────┘                   │
//! │                                   ▼                                     │
//! │  adjusted_subtotal = subtotal_received                                  │
//! │                    + discrepancy_adjustment                             │
//! │                    + surcharge_total                                    │
//! │  vat_amount        = adjusted_subtotal.apply_rate(15%)                  │
//! │  grand_total       = adjusted_subtotal + vat_amount                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `subtotal_received + discrepancy_adjustment` equals the value of what was
//! sent, so the adjusted subtotal is never negative.
//!
//! ## Example
//! ```rust
//! use linen_core::config::EngineConfig;
//! use linen_core::summary::{parse_items, summarize};
//!
//! let items = parse_items(
//!     r#"[{"linen_category_id": "towels", "quantity_sent": 10,
//!          "quantity_received": 8, "price_per_item": 5.0,
//!          "express_delivery": true}]"#,
//! ).unwrap();
//!
//! let summary = summarize(&items, &EngineConfig::default()).unwrap();
//! assert_eq!(summary.adjusted_subtotal.to_string(), "70.00");
//! assert_eq!(summary.vat_amount.to_string(), "10.50");
//! assert_eq!(summary.grand_total.to_string(), "80.50");
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::config::EngineConfig;
use crate::discrepancy::{discrepancy_report, DiscrepancyReport};
use crate::error::{CoreError, CoreResult};
use crate::financial::{financial_totals, line_financials};
use crate::money::{self, Money};
use crate::types::{ItemRecord, PricedItem};
use crate::validation::validate_items;

// =============================================================================
// Output Records
// =============================================================================

/// One finalized invoice line. Renderers print these as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceLine {
    pub linen_category_id: String,
    pub quantity_sent: i64,
    pub quantity_received: i64,
    /// `sent - received`.
    pub discrepancy: i64,
    #[serde(with = "money::decimal")]
    #[ts(type = "number")]
    pub unit_price: Money,
    #[serde(with = "money::decimal")]
    #[ts(type = "number")]
    pub line_total: Money,
    #[serde(with = "money::decimal")]
    #[ts(type = "number")]
    pub surcharge: Money,
    #[serde(with = "money::decimal")]
    #[ts(type = "number")]
    pub value_impact: Money,
    pub express_delivery: bool,
    #[ts(optional)]
    pub discrepancy_details: Option<String>,
}

/// The batch total and its parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BatchSummary {
    /// Σ line_total (received quantity × unit price).
    #[serde(with = "money::decimal")]
    #[ts(type = "number")]
    pub subtotal_received: Money,

    /// Σ value_impact, signed.
    #[serde(with = "money::decimal")]
    #[ts(type = "number")]
    pub discrepancy_adjustment: Money,

    #[serde(with = "money::decimal")]
    #[ts(type = "number")]
    pub surcharge_total: Money,

    #[serde(with = "money::decimal")]
    #[ts(type = "number")]
    pub adjusted_subtotal: Money,

    /// VAT rate applied, as a percentage (15.0).
    pub vat_rate: f64,

    #[serde(with = "money::decimal")]
    #[ts(type = "number")]
    pub vat_amount: Money,

    #[serde(with = "money::decimal")]
    #[ts(type = "number")]
    pub grand_total: Money,

    pub total_items_sent: i64,
    pub total_items_received: i64,
    pub items_with_discrepancy: usize,
    pub discrepancy_percentage: f64,
    pub has_discrepancy: bool,

    #[serde(with = "money::decimal")]
    #[ts(type = "number")]
    pub average_item_price: Money,

    pub line_items: Vec<InvoiceLine>,
}

impl BatchSummary {
    /// The authoritative batch total, stored as `Batch.total_amount`.
    #[inline]
    pub fn total_amount(&self) -> Money {
        self.grand_total
    }
}

// =============================================================================
// Orchestration
// =============================================================================

/// Builds the summary for validated items.
pub fn summarize_priced(items: &[PricedItem], config: &EngineConfig) -> BatchSummary {
    let totals = financial_totals(items, config);
    let report: DiscrepancyReport = discrepancy_report(items);

    let line_items = items
        .iter()
        .zip(&report.items)
        .map(|(item, gap)| {
            let line = line_financials(item, config);
            InvoiceLine {
                linen_category_id: item.linen_category_id.clone(),
                quantity_sent: item.quantity_sent,
                quantity_received: item.quantity_received,
                discrepancy: gap.discrepancy,
                unit_price: item.unit_price,
                line_total: line.line_total,
                surcharge: line.surcharge,
                value_impact: gap.value_impact,
                express_delivery: item.express_delivery,
                discrepancy_details: item.discrepancy_details.clone(),
            }
        })
        .collect();

    let adjusted_subtotal =
        totals.total_received_value + report.net_value_impact + totals.surcharge_total;
    let vat_amount = adjusted_subtotal.apply_rate(config.vat_rate);

    BatchSummary {
        subtotal_received: totals.total_received_value,
        discrepancy_adjustment: report.net_value_impact,
        surcharge_total: totals.surcharge_total,
        adjusted_subtotal,
        vat_rate: config.vat_rate.percentage(),
        vat_amount,
        grand_total: adjusted_subtotal + vat_amount,
        total_items_sent: totals.total_items_sent,
        total_items_received: totals.total_items_received,
        items_with_discrepancy: report.items_with_discrepancy,
        discrepancy_percentage: report.discrepancy_percentage,
        has_discrepancy: report.has_discrepancy(),
        average_item_price: totals.average_item_price,
        line_items,
    }
}

/// Validates submitted items, then builds the summary.
///
/// ## Errors
/// The first failing item's `InvalidQuantity`, `InvalidPrice`,
/// `InvalidAmount` or `Validation` error. Nothing is clamped.
pub fn summarize(records: &[ItemRecord], config: &EngineConfig) -> CoreResult<BatchSummary> {
    let items = validate_items(records, config)?;
    Ok(summarize_priced(&items, config))
}

// =============================================================================
// Payload Parsing
// =============================================================================

/// Parses a raw JSON item payload.
///
/// ## Errors
/// `InvalidItems` when the payload is not a JSON array, or an entry is not a
/// well-formed item (missing field, unknown field, wrong type, fractional
/// quantity). Range checks happen later in validation.
pub fn parse_items(json: &str) -> CoreResult<Vec<ItemRecord>> {
    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| CoreError::invalid_items(format!("payload is not valid JSON: {e}")))?;

    let entries = match value {
        serde_json::Value::Array(entries) => entries,
        other => {
            return Err(CoreError::invalid_items(format!(
                "expected an array of items, got {}",
                json_type(&other)
            )))
        }
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            serde_json::from_value(entry)
                .map_err(|e| CoreError::invalid_items(format!("item {index}: {e}")))
        })
        .collect()
}

fn json_type(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::rounding::{round2, round_half_away};
    use crate::types::Rate;
    use proptest::prelude::*;

    fn record(sent: i64, received: i64, price: f64, express: bool) -> ItemRecord {
        ItemRecord {
            linen_category_id: "bath-towels".to_string(),
            quantity_sent: sent,
            quantity_received: received,
            price_per_item: price,
            express_delivery: express,
            discrepancy_details: None,
        }
    }

    #[test]
    fn test_short_item_without_express() {
        let summary = summarize(&[record(10, 8, 5.0, false)], &EngineConfig::default()).unwrap();
        let line = &summary.line_items[0];

        assert_eq!(line.line_total.cents(), 4000);
        assert_eq!(line.discrepancy, 2);
        assert_eq!(line.value_impact.cents(), 1000);
        assert!(line.surcharge.is_zero());
    }

    #[test]
    fn test_short_item_with_express() {
        let summary = summarize(&[record(10, 8, 5.0, true)], &EngineConfig::default()).unwrap();

        assert_eq!(summary.line_items[0].surcharge.cents(), 2000);
        assert_eq!(summary.subtotal_received.cents(), 4000);
        assert_eq!(summary.discrepancy_adjustment.cents(), 1000);
        assert_eq!(summary.surcharge_total.cents(), 2000);
        assert_eq!(summary.adjusted_subtotal.cents(), 7000);
        assert_eq!(summary.vat_amount.cents(), 1050);
        assert_eq!(summary.grand_total.cents(), 8050);
        assert_eq!(summary.total_amount().to_string(), "80.50");
        assert!(summary.has_discrepancy);
        assert_eq!(summary.items_with_discrepancy, 1);
        assert_eq!(summary.discrepancy_percentage, 100.0);
    }

    #[test]
    fn test_empty_batch() {
        let summary = summarize(&[], &EngineConfig::default()).unwrap();

        assert!(summary.adjusted_subtotal.is_zero());
        assert!(summary.vat_amount.is_zero());
        assert!(summary.grand_total.is_zero());
        assert!(summary.average_item_price.is_zero());
        assert_eq!(summary.discrepancy_percentage, 0.0);
        assert!(!summary.has_discrepancy);
        assert!(summary.line_items.is_empty());
    }

    #[test]
    fn test_surplus_reduces_adjustment() {
        // sent 4, received 6 at 2.50 → received 15.00, impact -5.00
        let summary = summarize(&[record(4, 6, 2.5, false)], &EngineConfig::default()).unwrap();
        assert_eq!(summary.discrepancy_adjustment.cents(), -500);
        assert_eq!(summary.adjusted_subtotal.cents(), 1000);
        assert_eq!(summary.vat_amount.cents(), 150);
    }

    #[test]
    fn test_vat_rate_comes_from_config() {
        let config = EngineConfig {
            vat_rate: Rate::from_bps(2000),
            ..EngineConfig::default()
        };
        let summary = summarize(&[record(1, 1, 10.0, false)], &config).unwrap();
        assert_eq!(summary.vat_rate, 20.0);
        assert_eq!(summary.vat_amount.cents(), 200);
    }

    #[test]
    fn test_summarize_rejects_out_of_range() {
        let err = summarize(&[record(10_001, 1, 1.0, false)], &EngineConfig::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidQuantity);

        for price in [-0.004, 1000.004] {
            let err = summarize(&[record(1, 1, price, false)], &EngineConfig::default())
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidPrice, "price {price}");
        }
    }

    #[test]
    fn test_vat_and_surcharge_round_exact_half_cents() {
        // 1.50 × 15% = 0.225
        let summary = summarize(&[record(1, 1, 1.5, false)], &EngineConfig::default()).unwrap();
        assert_eq!(summary.vat_amount.to_string(), "0.23");
        assert_eq!(summary.grand_total.to_string(), "1.73");

        // 0.29 × 50% = 0.145
        let summary = summarize(&[record(1, 1, 0.29, true)], &EngineConfig::default()).unwrap();
        assert_eq!(summary.surcharge_total.to_string(), "0.15");
        assert_eq!(summary.adjusted_subtotal.cents(), 44);
    }

    #[test]
    fn test_summary_serializes_money_as_decimals() {
        let summary = summarize(&[record(10, 8, 5.0, true)], &EngineConfig::default()).unwrap();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["grand_total"], serde_json::json!(80.5));
        assert_eq!(json["line_items"][0]["unit_price"], serde_json::json!(5.0));
    }

    #[test]
    fn test_parse_items() {
        let items = parse_items(
            r#"[{"linen_category_id": "sheets", "quantity_sent": 3,
                 "quantity_received": 3, "price_per_item": 1.25}]"#,
        )
        .unwrap();
        assert_eq!(items.len(), 1);
        assert!(!items[0].express_delivery);
        assert_eq!(items[0].discrepancy_details, None);

        assert!(parse_items("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_items_rejects_malformed_payloads() {
        let cases = [
            "not json",
            r#"{"linen_category_id": "sheets"}"#,
            "null",
            r#"[{"linen_category_id": "sheets"}]"#,
            r#"[{"linen_category_id": "sheets", "quantity_sent": 2.5,
                 "quantity_received": 2, "price_per_item": 1.0}]"#,
            r#"[{"linen_category_id": "sheets", "quantity_sent": 2,
                 "quantity_received": 2, "price_per_item": "1.00"}]"#,
            r#"[{"linen_category_id": "sheets", "quantity_sent": 2,
                 "quantity_received": 2, "price_per_item": 1.0, "colour": "red"}]"#,
        ];

        for payload in cases {
            let err = parse_items(payload).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidItems, "payload: {payload}");
        }
    }

    fn arb_item() -> impl Strategy<Value = PricedItem> {
        (0i64..=10_000, 0i64..=10_000, 0i64..=100_000, any::<bool>()).prop_map(
            |(sent, received, cents, express)| PricedItem {
                linen_category_id: "prop".to_string(),
                quantity_sent: sent,
                quantity_received: received,
                unit_price: Money::from_cents(cents),
                express_delivery: express,
                discrepancy_details: None,
            },
        )
    }

    proptest! {
        #[test]
        fn prop_composition_identities(items in prop::collection::vec(arb_item(), 0..20)) {
            let s = summarize_priced(&items, &EngineConfig::default());

            let adjusted = round2(
                s.subtotal_received.to_decimal()
                    + s.discrepancy_adjustment.to_decimal()
                    + s.surcharge_total.to_decimal(),
            ).unwrap();
            prop_assert_eq!(Money::from_decimal(adjusted).unwrap(), s.adjusted_subtotal);

            // VAT is the exact decimal product adjusted_subtotal × 15%,
            // rounded half away from zero (not round2 of an f64 product)
            let vat = round_half_away(s.adjusted_subtotal.cents() as i128 * 15, 100);
            prop_assert_eq!(vat as i64, s.vat_amount.cents());

            prop_assert_eq!(s.grand_total, s.adjusted_subtotal + s.vat_amount);
            prop_assert!(!s.adjusted_subtotal.is_negative());
        }

        #[test]
        fn prop_has_discrepancy_iff_any_item_differs(items in prop::collection::vec(arb_item(), 0..20)) {
            let s = summarize_priced(&items, &EngineConfig::default());
            prop_assert_eq!(s.has_discrepancy, items.iter().any(|i| i.has_discrepancy()));
        }
    }
}
