//! # Batch Repository
//!
//! Database operations for batches and their items.
//!
//! ## Batch Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Batch Lifecycle                                   │
//! │                                                                         │
//! │  1. CREATE                                                             │
//! │     └── create() → validate items, summarize, assign ids               │
//! │         batch + items inserted in ONE transaction                      │
//! │         total_amount / has_discrepancy cached on the batch row         │
//! │                                                                         │
//! │  2. AMEND (counts corrected after washing)                             │
//! │     └── amend_items(id, expected_version, items)                       │
//! │         UPDATE ... WHERE version = expected_version                    │
//! │         0 rows → StaleBatch (someone else amended first)               │
//! │         items replaced wholesale, totals recomputed                    │
//! │                                                                         │
//! │  3. ADVANCE STATUS                                                     │
//! │     └── update_status(id, to)                                          │
//! │         current status read INSIDE the transaction                     │
//! │         require_transition(current, to)                                │
//! │         UPDATE ... WHERE status = current                              │
//! │                                                                         │
//! │  4. REPORT                                                             │
//! │     └── summary(id) → BatchSummary for invoice / PDF / Excel           │
//! │     └── dashboard_totals() → per-status counts and totals              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use linen_core::batch_id::{generate_system_batch_id, next_paper_batch_id, validate_paper_batch_id};
use linen_core::money::{self, Money};
use linen_core::summary::summarize_priced;
use linen_core::validation::{validate_items, validate_uuid};
use linen_core::workflow::require_transition;
use linen_core::{
    Batch, BatchItem, BatchStatus, BatchSummary, CoreError, EngineConfig, ItemRecord, PricedItem,
    ValidationError,
};

const BATCH_COLUMNS: &str = "id, paper_batch_id, system_batch_id, client_id, pickup_date, \
     status, total_amount_cents, has_discrepancy, notes, created_at, updated_at, version";

const ITEM_COLUMNS: &str = "id, batch_id, linen_category_id, quantity_sent, quantity_received, \
     price_per_item_cents, express_delivery, discrepancy_details";

// =============================================================================
// Inputs & Outputs
// =============================================================================

/// Fields supplied by the batch form.
#[derive(Debug, Clone)]
pub struct NewBatch {
    pub client_id: String,
    /// Left blank, the next free `PB-YYYY-MM-NNN` for the pickup month is used.
    pub paper_batch_id: Option<String>,
    pub pickup_date: NaiveDate,
    pub notes: Option<String>,
    pub items: Vec<ItemRecord>,
}

/// Batch count and summed cached totals for one status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusTotals {
    pub status: BatchStatus,
    pub batch_count: i64,
    #[serde(with = "money::decimal")]
    pub total_amount: Money,
    pub batches_with_discrepancy: i64,
}

/// Dashboard figures across all batches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardTotals {
    /// One entry per status, in lifecycle order (zeros included).
    pub by_status: Vec<StatusTotals>,
    pub batch_count: i64,
    #[serde(with = "money::decimal")]
    pub total_amount: Money,
    pub batches_with_discrepancy: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for batch database operations.
#[derive(Debug, Clone)]
pub struct BatchRepository {
    pool: SqlitePool,
    engine: EngineConfig,
}

impl BatchRepository {
    /// Creates a new BatchRepository.
    pub fn new(pool: SqlitePool, engine: EngineConfig) -> Self {
        BatchRepository { pool, engine }
    }

    /// Creates a batch with its items.
    ///
    /// ## What This Does
    /// 1. Validates every item (nothing is stored if one fails)
    /// 2. Computes the summary; its grand total is cached as `total_amount`
    /// 3. Assigns the paper batch id when blank, and a system batch id
    /// 4. Inserts the batch and its items in one transaction
    ///
    /// ## Returns
    /// * `Err(DbError::Core)` - Invalid item, client id or paper batch id
    /// * `Err(DbError::UniqueViolation)` - Paper batch id already used
    /// * `Err(DbError::ForeignKeyViolation)` - Unknown client or category
    pub async fn create(&self, new: NewBatch) -> DbResult<Batch> {
        validate_uuid("client_id", &new.client_id).map_err(CoreError::from)?;

        let items = validate_items(&new.items, &self.engine)?;
        let summary = summarize_priced(&items, &self.engine);

        let mut tx = self.pool.begin().await?;

        let paper_batch_id = match new.paper_batch_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => {
                if !validate_paper_batch_id(id) {
                    return Err(CoreError::from(ValidationError::InvalidFormat {
                        field: "paper_batch_id".to_string(),
                        reason: "expected PB-YYYY-MM-NNN".to_string(),
                    })
                    .into());
                }
                id.to_string()
            }
            _ => next_paper_id_for(&mut tx, new.pickup_date).await?,
        };

        let now = Utc::now();
        let batch = Batch {
            id: Uuid::new_v4().to_string(),
            paper_batch_id,
            system_batch_id: generate_system_batch_id(),
            client_id: new.client_id,
            pickup_date: new.pickup_date,
            status: BatchStatus::Pickup,
            total_amount_cents: summary.total_amount().cents(),
            has_discrepancy: summary.has_discrepancy,
            notes: new.notes,
            created_at: now,
            updated_at: now,
            version: 1,
        };

        debug!(
            batch_id = %batch.id,
            paper_batch_id = %batch.paper_batch_id,
            items = items.len(),
            "Creating batch"
        );

        sqlx::query(
            r#"
            INSERT INTO batches (
                id, paper_batch_id, system_batch_id, client_id, pickup_date,
                status, total_amount_cents, has_discrepancy, notes,
                created_at, updated_at, version
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&batch.id)
        .bind(&batch.paper_batch_id)
        .bind(&batch.system_batch_id)
        .bind(&batch.client_id)
        .bind(batch.pickup_date)
        .bind(batch.status)
        .bind(batch.total_amount_cents)
        .bind(batch.has_discrepancy)
        .bind(&batch.notes)
        .bind(batch.created_at)
        .bind(batch.updated_at)
        .bind(batch.version)
        .execute(&mut *tx)
        .await?;

        insert_items(&mut tx, &batch.id, &items).await?;

        tx.commit().await?;

        info!(
            batch_id = %batch.id,
            paper_batch_id = %batch.paper_batch_id,
            total_cents = batch.total_amount_cents,
            has_discrepancy = batch.has_discrepancy,
            "Batch created"
        );

        Ok(batch)
    }

    /// Gets a batch by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Batch>> {
        let batch = sqlx::query_as::<_, Batch>(&format!(
            "SELECT {BATCH_COLUMNS} FROM batches WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(batch)
    }

    /// Gets a batch by its paper batch id (`PB-2024-01-006`).
    pub async fn get_by_paper_id(&self, paper_batch_id: &str) -> DbResult<Option<Batch>> {
        let batch = sqlx::query_as::<_, Batch>(&format!(
            "SELECT {BATCH_COLUMNS} FROM batches WHERE paper_batch_id = ?1"
        ))
        .bind(paper_batch_id.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(batch)
    }

    /// Gets a batch's items in form order.
    pub async fn get_items(&self, batch_id: &str) -> DbResult<Vec<BatchItem>> {
        let items = sqlx::query_as::<_, BatchItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM batch_items WHERE batch_id = ?1 ORDER BY position"
        ))
        .bind(batch_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists a client's batches, most recent pickup first.
    pub async fn list_by_client(&self, client_id: &str) -> DbResult<Vec<Batch>> {
        let batches = sqlx::query_as::<_, Batch>(&format!(
            "SELECT {BATCH_COLUMNS} FROM batches WHERE client_id = ?1 \
             ORDER BY pickup_date DESC, paper_batch_id DESC"
        ))
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(batches)
    }

    /// Lists batches in a status, oldest pickup first.
    pub async fn list_by_status(&self, status: BatchStatus) -> DbResult<Vec<Batch>> {
        let batches = sqlx::query_as::<_, Batch>(&format!(
            "SELECT {BATCH_COLUMNS} FROM batches WHERE status = ?1 \
             ORDER BY pickup_date, paper_batch_id"
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(batches)
    }

    /// Replaces a batch's items and recomputes its cached totals.
    ///
    /// ## Optimistic Concurrency
    /// ```text
    /// Operator A reads batch (version 3) ─┐
    /// Operator B reads batch (version 3) ─┼─► both edit counts
    /// A: amend_items(id, 3, ..) ──────────┤   UPDATE ... WHERE version = 3 → ok, now 4
    /// B: amend_items(id, 3, ..) ──────────┘   UPDATE ... WHERE version = 3 → 0 rows
    ///                                          → DbError::StaleBatch
    /// ```
    ///
    /// ## Returns
    /// * `Ok(Batch)` - The updated batch (version bumped)
    /// * `Err(DbError::StaleBatch)` - `expected_version` is not current
    /// * `Err(DbError::NotFound)` - No such batch
    pub async fn amend_items(
        &self,
        batch_id: &str,
        expected_version: i64,
        records: &[ItemRecord],
    ) -> DbResult<Batch> {
        let items = validate_items(records, &self.engine)?;
        let summary = summarize_priced(&items, &self.engine);

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE batches SET
                total_amount_cents = ?3,
                has_discrepancy = ?4,
                updated_at = ?5,
                version = version + 1
            WHERE id = ?1 AND version = ?2
            "#,
        )
        .bind(batch_id)
        .bind(expected_version)
        .bind(summary.total_amount().cents())
        .bind(summary.has_discrepancy)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            let current: Option<i64> =
                sqlx::query_scalar("SELECT version FROM batches WHERE id = ?1")
                    .bind(batch_id)
                    .fetch_optional(&mut *tx)
                    .await?;

            return match current {
                None => Err(DbError::not_found("Batch", batch_id)),
                Some(version) => {
                    warn!(
                        batch_id = %batch_id,
                        expected_version,
                        current_version = version,
                        "Stale batch amendment rejected"
                    );
                    Err(DbError::StaleBatch {
                        id: batch_id.to_string(),
                    })
                }
            };
        }

        sqlx::query("DELETE FROM batch_items WHERE batch_id = ?1")
            .bind(batch_id)
            .execute(&mut *tx)
            .await?;

        insert_items(&mut tx, batch_id, &items).await?;

        let batch = sqlx::query_as::<_, Batch>(&format!(
            "SELECT {BATCH_COLUMNS} FROM batches WHERE id = ?1"
        ))
        .bind(batch_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            batch_id = %batch.id,
            version = batch.version,
            total_cents = batch.total_amount_cents,
            "Batch items amended"
        );

        Ok(batch)
    }

    /// Moves a batch to a new status.
    ///
    /// The current status is read from the database inside the transaction;
    /// a status held by the caller is never trusted.
    ///
    /// ## Returns
    /// * `Ok(Batch)` - The updated batch
    /// * `Err(DbError::Core)` - `InvalidTransition` (backwards, skip, self, from delivered)
    /// * `Err(DbError::StaleBatch)` - Status changed between read and write
    /// * `Err(DbError::NotFound)` - No such batch
    pub async fn update_status(&self, batch_id: &str, to: BatchStatus) -> DbResult<Batch> {
        let mut tx = self.pool.begin().await?;

        let current: BatchStatus = sqlx::query_scalar("SELECT status FROM batches WHERE id = ?1")
            .bind(batch_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Batch", batch_id))?;

        require_transition(current, to)?;

        let result = sqlx::query(
            r#"
            UPDATE batches SET
                status = ?3,
                updated_at = ?4,
                version = version + 1
            WHERE id = ?1 AND status = ?2
            "#,
        )
        .bind(batch_id)
        .bind(current)
        .bind(to)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::StaleBatch {
                id: batch_id.to_string(),
            });
        }

        let batch = sqlx::query_as::<_, Batch>(&format!(
            "SELECT {BATCH_COLUMNS} FROM batches WHERE id = ?1"
        ))
        .bind(batch_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(batch_id = %batch_id, from = %current, status = %to, "Batch status changed");
        Ok(batch)
    }

    /// Recomputes the authoritative summary from the stored items.
    ///
    /// Uses each item's snapshot price. Invoice, PDF and Excel output read
    /// this instead of computing their own totals.
    pub async fn summary(&self, batch_id: &str) -> DbResult<BatchSummary> {
        let batch = self
            .get_by_id(batch_id)
            .await?
            .ok_or_else(|| DbError::not_found("Batch", batch_id))?;

        let items: Vec<PricedItem> = self
            .get_items(batch_id)
            .await?
            .iter()
            .map(BatchItem::to_priced)
            .collect();

        let summary = summarize_priced(&items, &self.engine);

        if summary.total_amount() != batch.total_amount() {
            // e.g. the VAT rate changed since the batch was last written
            warn!(
                batch_id = %batch_id,
                cached_cents = batch.total_amount_cents,
                total_cents = summary.total_amount().cents(),
                "Cached batch total differs from recomputed total"
            );
        }

        Ok(summary)
    }

    /// Per-status batch counts and summed cached totals.
    pub async fn dashboard_totals(&self) -> DbResult<DashboardTotals> {
        let rows: Vec<(BatchStatus, i64, i64, i64)> = sqlx::query_as(
            r#"
            SELECT
                status,
                COUNT(*),
                COALESCE(SUM(total_amount_cents), 0),
                COALESCE(SUM(has_discrepancy), 0)
            FROM batches
            GROUP BY status
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let by_status: Vec<StatusTotals> = BatchStatus::ALL
            .into_iter()
            .map(|status| {
                let (batch_count, total_cents, with_discrepancy) = rows
                    .iter()
                    .find(|row| row.0 == status)
                    .map(|row| (row.1, row.2, row.3))
                    .unwrap_or((0, 0, 0));

                StatusTotals {
                    status,
                    batch_count,
                    total_amount: Money::from_cents(total_cents),
                    batches_with_discrepancy: with_discrepancy,
                }
            })
            .collect();

        Ok(DashboardTotals {
            batch_count: by_status.iter().map(|s| s.batch_count).sum(),
            total_amount: by_status.iter().map(|s| s.total_amount).sum(),
            batches_with_discrepancy: by_status.iter().map(|s| s.batches_with_discrepancy).sum(),
            by_status,
        })
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Next free paper batch id for the pickup month.
async fn next_paper_id_for(conn: &mut SqliteConnection, pickup_date: NaiveDate) -> DbResult<String> {
    let (year, month) = (pickup_date.year(), pickup_date.month());

    let existing: Vec<String> =
        sqlx::query_scalar("SELECT paper_batch_id FROM batches WHERE paper_batch_id LIKE ?1")
            .bind(format!("PB-{year:04}-{month:02}-%"))
            .fetch_all(&mut *conn)
            .await?;

    Ok(next_paper_batch_id(
        year,
        month,
        existing.iter().map(String::as_str),
    )?)
}

async fn insert_items(
    conn: &mut SqliteConnection,
    batch_id: &str,
    items: &[PricedItem],
) -> DbResult<()> {
    for (position, item) in items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO batch_items (
                id, batch_id, position, linen_category_id,
                quantity_sent, quantity_received, price_per_item_cents,
                express_delivery, discrepancy_details
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(batch_id)
        .bind(position as i64)
        .bind(&item.linen_category_id)
        .bind(item.quantity_sent)
        .bind(item.quantity_received)
        .bind(item.unit_price.cents())
        .bind(item.express_delivery)
        .bind(&item.discrepancy_details)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
