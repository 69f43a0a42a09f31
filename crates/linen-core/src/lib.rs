//! # linen-core: Batch Reconciliation Engine for Linen Ops
//!
//! Pure business logic for laundry batches: what a batch is worth, where the
//! counts disagree, and which status it may move to next. No database or network access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Linen Ops Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │   Batch form ──► Dashboard ──► Invoice / PDF / Excel export     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON item records                      │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ linen-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────┐  ┌────────────┐  ┌────────────┐               │   │
//! │  │   │ validation │─►│ financial  │  │ discrepancy│               │   │
//! │  │   │ ItemRecord │  │ line totals│  │ sent - recv│               │   │
//! │  │   └────────────┘  └─────┬──────┘  └─────┬──────┘               │   │
//! │  │                         └──► summary ◄──┘                       │   │
//! │  │   ┌────────────┐  ┌────────────┐  ┌────────────┐               │   │
//! │  │   │  batch_id  │  │  workflow  │  │  rounding  │               │   │
//! │  │   │ PB-YYYY-.. │  │ pickup →.. │  │  money     │               │   │
//! │  │   └────────────┘  └────────────┘  └────────────┘               │   │
//! │  │                                                                 │   │
//! │  │   NO DATABASE • NO NETWORK • PURE FUNCTIONS                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    linen-db (Database Layer)                    │   │
//! │  │        SQLite, migrations, batch create/amend/status            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`rounding`] - `round2`, half away from zero
//! - [`money`] - Money type in integer cents
//! - [`types`] - Domain records (Client, LinenCategory, Batch, BatchItem)
//! - [`config`] - Rates and ceilings
//! - [`validation`] - Input range checks
//! - [`batch_id`] - Paper and system batch ids
//! - [`discrepancy`] - Sent vs received
//! - [`financial`] - Line totals, surcharges, aggregates
//! - [`summary`] - The invoice-grade batch total
//! - [`workflow`] - Status transitions
//! - [`error`] - Error kinds
//!
//! ## Example Usage
//!
//! ```rust
//! use linen_core::{summarize, EngineConfig, ItemRecord};
//!
//! let items = vec![ItemRecord {
//!     linen_category_id: "towels".to_string(),
//!     quantity_sent: 10,
//!     quantity_received: 8,
//!     price_per_item: 5.00,
//!     express_delivery: true,
//!     discrepancy_details: Some("2 towels missing".to_string()),
//! }];
//!
//! let summary = summarize(&items, &EngineConfig::default()).unwrap();
//!
//! // 40.00 received + 10.00 shortfall + 20.00 express = 70.00, +15% VAT
//! assert_eq!(summary.grand_total.cents(), 8050);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod batch_id;
pub mod config;
pub mod discrepancy;
pub mod error;
pub mod financial;
pub mod money;
pub mod rounding;
pub mod summary;
pub mod types;
pub mod validation;
pub mod workflow;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use config::EngineConfig;
pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use money::Money;
pub use summary::{parse_items, summarize, BatchSummary, InvoiceLine};
pub use types::*;
pub use workflow::{validate_transition, TransitionCheck};
