//! PostgreSQL document store with connection pooling

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, Row, Transaction};

use crate::domain::actor::{Actor, ActorId};
use crate::domain::member::{Member, MemberId};
use crate::domain::storage::{LinkOutcome, LinkStore, Storage, StorageEntity, StorageKey};
use crate::domain::DomainError;

/// PostgreSQL storage configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to maintain
    pub min_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// Idle timeout in seconds
    pub idle_timeout_secs: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/member_link".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
        }
    }
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

}

/// Document store backed by one JSONB table per collection
///
/// Each table is named after the entity's collection and holds
/// `(key, data, created_at, updated_at)` rows.
#[derive(Debug, Clone)]
pub struct PostgresDocumentStore {
    pool: PgPool,
}

impl PostgresDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pooled connection and makes sure both collection tables exist
    pub async fn connect(config: &PostgresConfig) -> Result<Self, DomainError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

        let store = Self::new(pool);
        store.ensure_tables().await?;
        Ok(store)
    }

    pub async fn ensure_tables(&self) -> Result<(), DomainError> {
        for table in [Actor::COLLECTION, Member::COLLECTION] {
            let query = format!(
                r#"
                CREATE TABLE IF NOT EXISTS {} (
                    key VARCHAR(255) PRIMARY KEY,
                    data JSONB NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )
                "#,
                table
            );

            sqlx::query(&query)
                .execute(&self.pool)
                .await
                .map_err(|e| DomainError::storage(format!("Failed to create table {}: {}", table, e)))?;
        }

        Ok(())
    }
}

fn decode<E: StorageEntity>(row: &PgRow) -> Result<E, DomainError> {
    let data: serde_json::Value = row
        .try_get("data")
        .map_err(|e| DomainError::storage(format!("Failed to read document: {}", e)))?;

    serde_json::from_value(data)
        .map_err(|e| DomainError::storage(format!("Failed to deserialize {}: {}", E::COLLECTION, e)))
}

fn encode<E: StorageEntity>(entity: &E) -> Result<serde_json::Value, DomainError> {
    serde_json::to_value(entity)
        .map_err(|e| DomainError::storage(format!("Failed to serialize {}: {}", E::COLLECTION, e)))
}

#[async_trait]
impl<E> Storage<E> for PostgresDocumentStore
where
    E: StorageEntity + 'static,
{
    async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError> {
        let query = format!("SELECT data FROM {} WHERE key = $1", E::COLLECTION);

        let row = sqlx::query(&query)
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get document: {}", e)))?;

        row.as_ref().map(decode::<E>).transpose()
    }

    async fn create(&self, entity: E) -> Result<E, DomainError> {
        let key = entity.key().as_str().to_string();
        let data = encode(&entity)?;
        let query = format!("INSERT INTO {} (key, data) VALUES ($1, $2)", E::COLLECTION);

        sqlx::query(&query)
            .bind(&key)
            .bind(&data)
            .execute(&self.pool)
            .await
            .map_err(|e| match e.as_database_error() {
                Some(db) if db.is_unique_violation() => DomainError::conflict(format!(
                    "Document '{}/{}' already exists",
                    E::COLLECTION,
                    key
                )),
                _ => DomainError::storage(format!("Failed to create document: {}", e)),
            })?;

        Ok(entity)
    }

    async fn delete(&self, key: &E::Key) -> Result<bool, DomainError> {
        let query = format!("DELETE FROM {} WHERE key = $1", E::COLLECTION);

        let result = sqlx::query(&query)
            .bind(key.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete document: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let query = format!("SELECT COUNT(*) AS count FROM {}", E::COLLECTION);

        let row = sqlx::query(&query)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count documents: {}", e)))?;

        let count: i64 = row
            .try_get("count")
            .map_err(|e| DomainError::storage(format!("Failed to count documents: {}", e)))?;
        document_count(count)
    }
}

fn document_count(count: i64) -> Result<usize, DomainError> {
    usize::try_from(count)
        .map_err(|_| DomainError::storage(format!("Invalid document count: {}", count)))
}

async fn lock_row<E: StorageEntity>(
    tx: &mut Transaction<'_, Postgres>,
    key: &str,
) -> Result<Option<E>, DomainError> {
    let query = format!("SELECT data FROM {} WHERE key = $1 FOR UPDATE", E::COLLECTION);

    let row = sqlx::query(&query)
        .bind(key)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to lock {}: {}", E::COLLECTION, e)))?;

    row.as_ref().map(decode::<E>).transpose()
}

async fn write_row<E: StorageEntity>(
    tx: &mut Transaction<'_, Postgres>,
    entity: &E,
) -> Result<(), DomainError> {
    let query = format!(
        "UPDATE {} SET data = $2, updated_at = NOW() WHERE key = $1",
        E::COLLECTION
    );

    sqlx::query(&query)
        .bind(entity.key().as_str())
        .bind(encode(entity)?)
        .execute(&mut **tx)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to write {}: {}", E::COLLECTION, e)))?;

    Ok(())
}

#[async_trait]
impl LinkStore for PostgresDocumentStore {
    async fn link(
        &self,
        actor_id: &ActorId,
        member_id: &MemberId,
    ) -> Result<LinkOutcome, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        // Rows are always locked member first, then actor. Returning early drops
        // the transaction, which rolls it back.
        let Some(mut member) = lock_row::<Member>(&mut tx, member_id.as_str()).await? else {
            return Ok(LinkOutcome::MemberNotFound);
        };
        let Some(mut actor) = lock_row::<Actor>(&mut tx, actor_id.as_str()).await? else {
            return Ok(LinkOutcome::ActorNotFound);
        };

        if member.is_assigned() {
            return Ok(LinkOutcome::MemberAlreadyLinked);
        }

        if actor.is_linked() {
            return Ok(LinkOutcome::ActorAlreadyLinked);
        }

        member.link_actor(actor_id.clone())?;
        actor.link_member(member_id.clone())?;

        write_row(&mut tx, &member).await?;
        write_row(&mut tx, &actor).await?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit link: {}", e)))?;

        Ok(LinkOutcome::Linked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_config_default() {
        let config = PostgresConfig::default();

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.connect_timeout_secs, 30);
        assert_eq!(config.idle_timeout_secs, 600);
    }

    #[test]
    fn test_postgres_config_builder() {
        let config = PostgresConfig::new("postgres://localhost/test")
            .with_max_connections(20);

        assert_eq!(config.url, "postgres://localhost/test");
        assert_eq!(config.max_connections, 20);
        assert_eq!(config.min_connections, 1);
    }

    #[test]
    fn test_document_count_conversion() {
        assert_eq!(document_count(0).unwrap(), 0);
        assert_eq!(document_count(42).unwrap(), 42);
        assert!(matches!(document_count(-1), Err(DomainError::Storage { .. })));
    }

    #[tokio::test]
    async fn test_connect_lazy_pool_is_debuggable() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/member_link")
            .unwrap();
        let store = PostgresDocumentStore::new(pool);

        assert!(format!("{:?}", store).contains("PostgresDocumentStore"));
    }
}
