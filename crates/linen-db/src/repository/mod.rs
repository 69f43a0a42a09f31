//! # Repository Module
//!
//! Database repository implementations for Linen Ops.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Caller (HTTP handler, seed bin)                                       │
//! │       │                                                                 │
//! │       │  db.batches().amend_items(id, version, items)                  │
//! │       ▼                                                                 │
//! │  BatchRepository                                                       │
//! │  ├── linen-core: validate_items, summarize_priced, require_transition  │
//! │  └── SQL: one transaction per write                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ClientRepository`](client::ClientRepository) - Clients
//! - [`CategoryRepository`](category::CategoryRepository) - Linen categories and reference prices
//! - [`BatchRepository`](batch::BatchRepository) - Batches, items, status, summaries

pub mod batch;
pub mod category;
pub mod client;
