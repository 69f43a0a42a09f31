//! # Linen Category Repository
//!
//! Database operations for linen categories.
//!
//! ## Price Snapshot
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  linen_categories.price_per_item_cents   (reference price, editable)    │
//! │             │                                                           │
//! │             │  copied once, when the form fills in a new item           │
//! │             ▼                                                           │
//! │  batch_items.price_per_item_cents        (snapshot, frozen)             │
//! │                                                                         │
//! │  update_price() never touches existing batch items, so old invoices     │
//! │  keep totalling to what was billed.                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use linen_core::validation::{validate_category_price, validate_name};
use linen_core::{CoreError, EngineConfig, LinenCategory, Money};

const CATEGORY_COLUMNS: &str =
    "id, name, price_per_item_cents, is_active, section, created_at, updated_at";

/// Fields supplied when adding a category.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub price: Money,
    pub section: Option<String>,
}

/// Repository for linen category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
    engine: EngineConfig,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool, engine: EngineConfig) -> Self {
        CategoryRepository { pool, engine }
    }

    /// Inserts a new, active category.
    ///
    /// ## Returns
    /// * `Err(DbError::Core)` - Blank name, or price outside `[0, 10,000.00]`
    /// * `Err(DbError::UniqueViolation)` - Name already taken
    pub async fn insert(&self, new: NewCategory) -> DbResult<LinenCategory> {
        validate_name("name", &new.name).map_err(CoreError::from)?;
        validate_category_price(new.price, &self.engine)?;

        let now = Utc::now();
        let category = LinenCategory {
            id: Uuid::new_v4().to_string(),
            name: new.name.trim().to_string(),
            price_per_item_cents: new.price.cents(),
            is_active: true,
            section: new.section,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %category.id, name = %category.name, "Inserting linen category");

        sqlx::query(
            r#"
            INSERT INTO linen_categories (
                id, name, price_per_item_cents, is_active, section, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(category.price_per_item_cents)
        .bind(category.is_active)
        .bind(&category.section)
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(category)
    }

    /// Gets a category by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<LinenCategory>> {
        let category = sqlx::query_as::<_, LinenCategory>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM linen_categories WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Lists active categories grouped by section, then name.
    pub async fn list_active(&self) -> DbResult<Vec<LinenCategory>> {
        let categories = sqlx::query_as::<_, LinenCategory>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM linen_categories \
             WHERE is_active = 1 \
             ORDER BY COALESCE(section, ''), name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Changes a category's reference price.
    ///
    /// Existing batch items keep their snapshot price.
    pub async fn update_price(&self, id: &str, price: Money) -> DbResult<()> {
        validate_category_price(price, &self.engine)?;

        let result = sqlx::query(
            r#"
            UPDATE linen_categories
            SET price_per_item_cents = ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(price.cents())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("LinenCategory", id));
        }

        info!(id = %id, price = %price, "Category price updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use linen_core::ErrorKind;

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn towels(cents: i64) -> NewCategory {
        NewCategory {
            name: "Bath Towels".to_string(),
            price: Money::from_cents(cents),
            section: Some("Bath".to_string()),
        }
    }

    #[tokio::test]
    async fn test_insert_get_and_list() {
        let db = db().await;
        let category = db.categories().insert(towels(450)).await.unwrap();

        let loaded = db.categories().get_by_id(&category.id).await.unwrap().unwrap();
        assert_eq!(loaded.price().cents(), 450);
        assert_eq!(loaded.section.as_deref(), Some("Bath"));

        let active = db.categories().list_active().await.unwrap();
        assert_eq!(active.len(), 1);
    }

    #[tokio::test]
    async fn test_category_ceiling_is_higher_than_item_ceiling() {
        let db = db().await;

        // 5,000.00 is above the batch-item ceiling but fine for a category
        assert!(db.categories().insert(towels(500_000)).await.is_ok());

        let err = db
            .categories()
            .insert(NewCategory {
                name: "Gold Thread Sheets".to_string(),
                ..towels(1_000_001)
            })
            .await
            .unwrap_err();
        assert_eq!(err.core_kind(), Some(ErrorKind::InvalidPrice));
    }

    #[tokio::test]
    async fn test_duplicate_name() {
        let db = db().await;
        db.categories().insert(towels(450)).await.unwrap();

        let err = db.categories().insert(towels(500)).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_update_price() {
        let db = db().await;
        let category = db.categories().insert(towels(450)).await.unwrap();

        db.categories()
            .update_price(&category.id, Money::from_cents(475))
            .await
            .unwrap();
        let loaded = db.categories().get_by_id(&category.id).await.unwrap().unwrap();
        assert_eq!(loaded.price_per_item_cents, 475);

        let err = db
            .categories()
            .update_price(&category.id, Money::from_cents(-1))
            .await
            .unwrap_err();
        assert_eq!(err.core_kind(), Some(ErrorKind::InvalidPrice));

        let err = db
            .categories()
            .update_price("missing", Money::from_cents(100))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
