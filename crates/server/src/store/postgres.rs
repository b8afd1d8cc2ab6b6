//! `PostgreSQL` store adapter.
//!
//! One `orders` table keyed by `order_uid`, holding the serialized order
//! document as `JSONB`. The document is stored as an opaque blob and never
//! queried by internal fields.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};

use orderdesk_core::{Order, OrderUid};

use super::{OrderStore, StoreError, StoredOrder};

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Durable order store backed by `PostgreSQL`.
///
/// The pool provides internal concurrency safety; this adapter adds a
/// per-call deadline so a stalled database cannot hang a caller.
#[derive(Clone)]
pub struct PgOrderStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgOrderStore {
    /// Create a new store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    /// Run a store operation under the configured deadline.
    async fn bounded<T, F>(&self, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, sqlx::Error>> + Send,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(StoreError::Timeout),
        }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn upsert(&self, order: &Order) -> Result<(), StoreError> {
        let data = serde_json::to_value(order)
            .map_err(|e| StoreError::DataCorruption(format!("failed to encode order: {e}")))?;

        self.bounded(
            sqlx::query(
                "INSERT INTO orders (order_uid, data) VALUES ($1, $2) \
                 ON CONFLICT (order_uid) DO UPDATE SET data = EXCLUDED.data",
            )
            .bind(&order.order_uid)
            .bind(&data)
            .execute(&self.pool),
        )
        .await?;

        Ok(())
    }

    async fn get(&self, uid: &OrderUid) -> Result<Option<Order>, StoreError> {
        let row = self
            .bounded(
                sqlx::query("SELECT data FROM orders WHERE order_uid = $1")
                    .bind(uid.as_str())
                    .fetch_optional(&self.pool),
            )
            .await?;

        match row {
            Some(row) => {
                let data: serde_json::Value = row.try_get("data").map_err(StoreError::from)?;
                let order = serde_json::from_value(data).map_err(|e| {
                    StoreError::DataCorruption(format!("order {uid}: {e}"))
                })?;
                Ok(Some(order))
            }
            None => Ok(None),
        }
    }

    fn load_all(&self) -> BoxStream<'_, Result<StoredOrder, StoreError>> {
        sqlx::query("SELECT order_uid, data FROM orders")
            .fetch(&self.pool)
            .map(|row| -> Result<StoredOrder, StoreError> {
                let row = row?;
                let uid_str: String = row.try_get("order_uid").map_err(StoreError::from)?;
                let uid = OrderUid::parse(&uid_str).map_err(|e| {
                    StoreError::DataCorruption(format!("order_uid {uid_str:?}: {e}"))
                })?;
                let data: serde_json::Value = row.try_get("data").map_err(StoreError::from)?;
                let order: Order = serde_json::from_value(data).map_err(|e| {
                    StoreError::DataCorruption(format!("order {uid_str}: {e}"))
                })?;
                Ok((uid, order))
            })
            .boxed()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.bounded(sqlx::query("SELECT 1").execute(&self.pool))
            .await?;
        Ok(())
    }
}
