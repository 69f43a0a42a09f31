//! # Database Migrations
//!
//! Embedded SQL migrations for Linen Ops.
//!
//! ## Schema
//! ```text
//! ┌──────────────┐        ┌──────────────────┐        ┌──────────────────┐
//! │   clients    │◄───────│     batches      │◄───────│   batch_items    │
//! │──────────────│  1   * │──────────────────│  1   * │──────────────────│
//! │ id           │        │ paper_batch_id U │ CASCADE│ position         │
//! │ name         │        │ system_batch_id U│        │ qty sent / recv  │
//! │ is_active    │        │ status  (CHECK)  │        │ price snapshot   │
//! └──────────────┘        │ total_amount     │        │ express_delivery │
//!                         │ has_discrepancy  │        └────────┬─────────┘
//!                         │ version          │                 │ *
//!                         └──────────────────┘                 ▼ 1
//!                                                     ┌──────────────────┐
//!                                                     │ linen_categories │
//!                                                     └──────────────────┘
//! ```
//!
//! ## Adding New Migrations
//!
//! 1. Create a new file in `migrations/sqlite/` with the next sequence number
//! 2. Name format: `NNN_description.sql` (e.g., `002_add_invoice_numbers.sql`)
//! 3. **NEVER** modify existing migrations - always add new ones

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

/// Embedded migrations from the `migrations/sqlite` directory.
///
/// The `sqlx::migrate!()` macro embeds all SQL files into the binary at
/// compile time.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Runs all pending database migrations.
///
/// Idempotent; each migration runs in its own transaction, in filename order.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!(
        available = MIGRATOR.migrations.len(),
        "Checking for pending migrations"
    );

    MIGRATOR.run(pool).await?;

    info!("All migrations applied successfully");
    Ok(())
}

/// Returns `(total_migrations, applied_migrations)` for diagnostics.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    // _sqlx_migrations does not exist before the first run
    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    Ok((total, applied as usize))
}
