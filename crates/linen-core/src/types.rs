//! # Domain Types
//!
//! Core domain types used throughout Linen Ops.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Client      │   │      Batch      │   │   BatchItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  client_id      │◄──│  batch_id       │       │
//! │  │  name           │   │  paper_batch_id │   │  qty sent/recv  │       │
//! │  └─────────────────┘   │  status         │   │  price snapshot │──┐    │
//! │                        │  total_amount   │   │  express flag   │  │    │
//! │                        └─────────────────┘   └─────────────────┘  │    │
//! │  ┌─────────────────┐   ┌─────────────────┐                        │    │
//! │  │  LinenCategory  │   │   BatchStatus   │                        │    │
//! │  │  ─────────────  │   │  ─────────────  │   display/lookup only  │    │
//! │  │  name, section  │◄──┼─────────────────┼────────────────────────┘    │
//! │  │  price (ref.)   │   │  Pickup ... Del │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Price Snapshot
//! A batch item's `price_per_item_cents` is frozen when the item is created.
//! Recalculation always uses the snapshot, never the category's current price.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Rate
// =============================================================================

/// A rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1500 bps = 15% VAT, 5000 bps = 50% express surcharge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

// =============================================================================
// Batch Status
// =============================================================================

/// Lifecycle status of a batch.
///
/// Moves strictly forward, one step at a time; see [`crate::workflow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    /// Linen collected from the client.
    Pickup,
    /// In the wash.
    Washing,
    /// Washed, counted and ready to go back.
    Completed,
    /// Returned to the client. Terminal.
    Delivered,
}

impl BatchStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [BatchStatus; 4] = [
        BatchStatus::Pickup,
        BatchStatus::Washing,
        BatchStatus::Completed,
        BatchStatus::Delivered,
    ];

    /// Wire value.
    pub const fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Pickup => "pickup",
            BatchStatus::Washing => "washing",
            BatchStatus::Completed => "completed",
            BatchStatus::Delivered => "delivered",
        }
    }

    /// The single status this one may advance to, if any.
    pub const fn next(&self) -> Option<BatchStatus> {
        match self {
            BatchStatus::Pickup => Some(BatchStatus::Washing),
            BatchStatus::Washing => Some(BatchStatus::Completed),
            BatchStatus::Completed => Some(BatchStatus::Delivered),
            BatchStatus::Delivered => None,
        }
    }

    /// Position in the lifecycle (pickup = 0).
    pub const fn ordinal(&self) -> u8 {
        match self {
            BatchStatus::Pickup => 0,
            BatchStatus::Washing => 1,
            BatchStatus::Completed => 2,
            BatchStatus::Delivered => 3,
        }
    }

    /// `true` for `Delivered`.
    pub const fn is_terminal(&self) -> bool {
        self.next().is_none()
    }
}

impl Default for BatchStatus {
    fn default() -> Self {
        BatchStatus::Pickup
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a wire value.
///
/// Only the four lifecycle states are accepted; legacy values such as
/// `processing`, `delivery` or `cancelled` are rejected.
impl FromStr for BatchStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pickup" => Ok(BatchStatus::Pickup),
            "washing" => Ok(BatchStatus::Washing),
            "completed" => Ok(BatchStatus::Completed),
            "delivered" => Ok(BatchStatus::Delivered),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

/// Returned when a status string is not one of the four wire values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown batch status '{0}' (expected pickup, washing, completed or delivered)")]
pub struct UnknownStatus(pub String);

// =============================================================================
// Linen Category
// =============================================================================

/// A kind of linen the laundry handles (bed sheets, towels, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct LinenCategory {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown on forms and invoices.
    pub name: String,

    /// Current reference price in cents. New batch items copy it.
    pub price_per_item_cents: i64,

    /// Inactive categories stay on old batches but are hidden from new ones.
    pub is_active: bool,

    /// Optional grouping label ("Bedding", "Bath", ...).
    pub section: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl LinenCategory {
    /// Returns the reference price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_per_item_cents)
    }
}

// =============================================================================
// Client
// =============================================================================

/// A customer whose linen is collected in batches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Batch
// =============================================================================

/// One pickup/processing cycle of linen for a client.
///
/// `total_amount_cents` and `has_discrepancy` are cached values derived from
/// the items; they are rewritten every time the items change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Batch {
    pub id: String,
    /// Human-facing id, `PB-YYYY-MM-NNN`.
    pub paper_batch_id: String,
    /// Opaque generated id.
    pub system_batch_id: String,
    pub client_id: String,
    #[ts(as = "String")]
    pub pickup_date: NaiveDate,
    pub status: BatchStatus,
    /// Grand total (incl. VAT) at the last recompute.
    pub total_amount_cents: i64,
    pub has_discrepancy: bool,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency counter, bumped on every write.
    pub version: i64,
}

impl Batch {
    /// Returns the cached grand total as Money.
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }
}

// =============================================================================
// Batch Item
// =============================================================================

/// One linen category's quantities and pricing within a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct BatchItem {
    pub id: String,
    pub batch_id: String,
    pub linen_category_id: String,
    pub quantity_sent: i64,
    pub quantity_received: i64,
    /// Unit price in cents at the time the item was created (frozen).
    pub price_per_item_cents: i64,
    pub express_delivery: bool,
    pub discrepancy_details: Option<String>,
}

impl BatchItem {
    /// Returns the snapshot unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.price_per_item_cents)
    }

    /// Converts the stored row back into engine input.
    pub fn to_priced(&self) -> PricedItem {
        PricedItem {
            linen_category_id: self.linen_category_id.clone(),
            quantity_sent: self.quantity_sent,
            quantity_received: self.quantity_received,
            unit_price: self.unit_price(),
            express_delivery: self.express_delivery,
            discrepancy_details: self.discrepancy_details.clone(),
        }
    }
}

// =============================================================================
// Item Record (wire input)
// =============================================================================

/// An item as submitted by the batch form.
///
/// ```json
/// {
///   "linen_category_id": "…",
///   "quantity_sent": 10,
///   "quantity_received": 8,
///   "price_per_item": 5.0,
///   "express_delivery": false,
///   "discrepancy_details": "2 towels missing"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(deny_unknown_fields)]
pub struct ItemRecord {
    pub linen_category_id: String,
    pub quantity_sent: i64,
    pub quantity_received: i64,
    /// Decimal unit price, 0.00 to 1,000.00.
    pub price_per_item: f64,
    #[serde(default)]
    pub express_delivery: bool,
    #[serde(default)]
    #[ts(optional)]
    pub discrepancy_details: Option<String>,
}

// =============================================================================
// Priced Item (validated engine input)
// =============================================================================

/// A validated item: quantities in range, unit price converted to cents.
///
/// Built by [`crate::validation::validate_item`] or
/// [`BatchItem::to_priced`]; the calculators only accept this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedItem {
    pub linen_category_id: String,
    pub quantity_sent: i64,
    pub quantity_received: i64,
    pub unit_price: Money,
    pub express_delivery: bool,
    pub discrepancy_details: Option<String>,
}

impl PricedItem {
    /// `true` when sent and received quantities differ.
    #[inline]
    pub fn has_discrepancy(&self) -> bool {
        self.quantity_sent != self.quantity_received
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_from_bps() {
        let rate = Rate::from_bps(1500);
        assert_eq!(rate.bps(), 1500);
        assert!((rate.percentage() - 15.0).abs() < 0.001);
    }

    #[test]
    fn test_status_wire_values() {
        for status in BatchStatus::ALL {
            assert_eq!(status.as_str().parse::<BatchStatus>().unwrap(), status);
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
        assert_eq!(" Washing ".parse::<BatchStatus>().unwrap(), BatchStatus::Washing);
    }

    #[test]
    fn test_status_rejects_legacy_values() {
        for legacy in ["processing", "delivery", "cancelled", ""] {
            assert!(legacy.parse::<BatchStatus>().is_err());
        }
    }

    #[test]
    fn test_status_order() {
        assert_eq!(BatchStatus::default(), BatchStatus::Pickup);
        assert_eq!(BatchStatus::Pickup.next(), Some(BatchStatus::Washing));
        assert!(BatchStatus::Delivered.is_terminal());
        assert!(BatchStatus::Pickup.ordinal() < BatchStatus::Delivered.ordinal());
    }

    #[test]
    fn test_item_record_defaults() {
        let record: ItemRecord = serde_json::from_str(
            r#"{"linen_category_id":"c1","quantity_sent":10,"quantity_received":8,"price_per_item":5.0}"#,
        )
        .unwrap();
        assert!(!record.express_delivery);
        assert!(record.discrepancy_details.is_none());
    }

    #[test]
    fn test_batch_item_to_priced_keeps_snapshot_price() {
        let item = BatchItem {
            id: "i1".to_string(),
            batch_id: "b1".to_string(),
            linen_category_id: "c1".to_string(),
            quantity_sent: 10,
            quantity_received: 8,
            price_per_item_cents: 500,
            express_delivery: true,
            discrepancy_details: None,
        };
        let priced = item.to_priced();
        assert_eq!(priced.unit_price.cents(), 500);
        assert!(priced.has_discrepancy());
    }
}
