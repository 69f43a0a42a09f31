//! # linen-db: Database Layer for Linen Ops
//!
//! SQLite storage for clients, linen categories, batches and batch items.
//! Every batch write goes through `linen-core`, so stored totals are the
//! same numbers the invoice shows.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Linen Ops Data Flow                              │
//! │                                                                         │
//! │  Batch form submit (items JSON)                                        │
//! │       │  linen_core::parse_items                                       │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     linen-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │  │   │
//! │  │   │               │    │ ClientRepo     │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ CategoryRepo   │    │ 001_initial_ │  │   │
//! │  │   │ EngineConfig  │    │ BatchRepo      │    │   schema.sql │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use linen_db::{Database, DbConfig, NewBatch};
//!
//! let db = Database::new(DbConfig::new("./linen.db")).await?;
//!
//! let items = linen_core::parse_items(&payload)?;
//! let batch = db.batches().create(NewBatch { items, ..form }).await?;
//! let batch = db.batches().update_status(&batch.id, BatchStatus::Washing).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::batch::{BatchRepository, DashboardTotals, NewBatch, StatusTotals};
pub use repository::category::{CategoryRepository, NewCategory};
pub use repository::client::{ClientRepository, NewClient};
