//! # Client Repository
//!
//! Database operations for clients (the hotels, clinics and restaurants
//! whose linen is collected).

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use linen_core::validation::validate_name;
use linen_core::{Client, CoreError};

const CLIENT_COLUMNS: &str = "id, name, email, phone, address, is_active, created_at";

/// Fields supplied when registering a client.
#[derive(Debug, Clone, Default)]
pub struct NewClient {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Repository for client database operations.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: SqlitePool,
}

impl ClientRepository {
    /// Creates a new ClientRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ClientRepository { pool }
    }

    /// Inserts a new, active client.
    ///
    /// ## Returns
    /// * `Ok(Client)` - The stored client with generated id
    /// * `Err(DbError::Core)` - Name empty or longer than 100 characters
    pub async fn insert(&self, new: NewClient) -> DbResult<Client> {
        validate_name("name", &new.name).map_err(CoreError::from)?;

        let client = Client {
            id: Uuid::new_v4().to_string(),
            name: new.name.trim().to_string(),
            email: new.email,
            phone: new.phone,
            address: new.address,
            is_active: true,
            created_at: Utc::now(),
        };

        debug!(id = %client.id, name = %client.name, "Inserting client");

        sqlx::query(
            r#"
            INSERT INTO clients (id, name, email, phone, address, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&client.id)
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.address)
        .bind(client.is_active)
        .bind(client.created_at)
        .execute(&self.pool)
        .await?;

        Ok(client)
    }

    /// Gets a client by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(client)
    }

    /// Lists active clients by name.
    pub async fn list_active(&self) -> DbResult<Vec<Client>> {
        let clients = sqlx::query_as::<_, Client>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE is_active = 1 ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(clients)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig, DbError};
    use linen_core::ErrorKind;

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = db().await;
        let client = db
            .clients()
            .insert(NewClient {
                name: "  Harbour Hotel ".to_string(),
                email: Some("linen@harbour.example".to_string()),
                ..NewClient::default()
            })
            .await
            .unwrap();

        assert_eq!(client.name, "Harbour Hotel");

        let loaded = db.clients().get_by_id(&client.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, client.id);
        assert_eq!(loaded.email.as_deref(), Some("linen@harbour.example"));
        assert!(loaded.is_active);

        assert!(db.clients().get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejects_blank_name() {
        let err = db()
            .await
            .clients()
            .insert(NewClient::default())
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Core(_)));
        assert_eq!(err.core_kind(), Some(ErrorKind::ValidationError));
    }

    #[tokio::test]
    async fn test_list_active_sorted_by_name() {
        let db = db().await;
        for name in ["Zebra Spa", "Alpine Lodge"] {
            db.clients()
                .insert(NewClient {
                    name: name.to_string(),
                    ..NewClient::default()
                })
                .await
                .unwrap();
        }

        let names: Vec<String> = db
            .clients()
            .list_active()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Alpine Lodge", "Zebra Spa"]);
    }
}
