//! Durable order storage.
//!
//! The store is the system of record: an order is only considered ingested
//! once it is durably written here, and the in-memory cache holds nothing
//! that cannot be recovered from this layer. [`OrderStore`] is the seam
//! between the pipeline/read path and the concrete backend, which keeps
//! both unit-testable against an in-memory double.

mod postgres;

pub use postgres::{PgOrderStore, create_pool};

use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

use orderdesk_core::{Order, OrderUid};

/// Errors from the durable store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying database failure (connectivity, SQL, pool exhaustion).
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored document could not be decoded back into an order.
    #[error("corrupt stored document: {0}")]
    DataCorruption(String),

    /// The store did not answer within the configured deadline.
    #[error("store operation timed out")]
    Timeout,
}

/// A `(uid, order)` pair yielded during bulk load.
pub type StoredOrder = (OrderUid, Order);

/// Durable key-to-document storage for orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Atomically insert or fully replace the document keyed by its
    /// `order_uid`. Last write wins; a reader never observes a partial
    /// document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] or [`StoreError::Timeout`] when the
    /// write did not durably complete.
    async fn upsert(&self, order: &Order) -> Result<(), StoreError>;

    /// Point lookup by UID.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DataCorruption`] if the stored document no
    /// longer decodes, or a database/timeout error.
    async fn get(&self, uid: &OrderUid) -> Result<Option<Order>, StoreError>;

    /// Stream every stored order. Used only at bootstrap.
    ///
    /// The stream is lazy so hydration never materializes the full table
    /// in memory. A row whose stored document fails to decode yields
    /// [`StoreError::DataCorruption`] for that row and the stream
    /// continues; connection-level failures yield [`StoreError::Database`].
    fn load_all(&self) -> BoxStream<'_, Result<StoredOrder, StoreError>>;

    /// Cheap connectivity probe for readiness checks.
    ///
    /// # Errors
    ///
    /// Returns a database/timeout error when the store is unreachable.
    async fn ping(&self) -> Result<(), StoreError>;
}
