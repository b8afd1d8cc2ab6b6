//! The write path: validate, persist, cache.
//!
//! Every consumed message moves through a fixed per-message state machine:
//!
//! ```text
//! Received -> Validated -> Persisted -> Cached -> Acknowledged
//!     \            \
//!      `-> Rejected `-> Rejected
//! ```
//!
//! The ordering is the load-bearing invariant: the store write always
//! precedes the cache write, and acknowledgment (the offset commit in
//! [`consumer`]) always follows the store write. After an acknowledgment
//! the document is durable; the cache can only be stale-behind the store,
//! never ahead of it.

pub mod consumer;

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, instrument};

use orderdesk_core::{Order, OrderUid, OrderUidError};

use crate::cache::OrderCache;
use crate::store::{OrderStore, StoreError};

/// Why a message was permanently rejected.
///
/// A rejected message can never succeed, so its offset is committed and it
/// is skipped for good.
#[derive(Debug, Error)]
pub enum RejectReason {
    /// The payload is not a valid order document.
    #[error("malformed order document: {0}")]
    Deserialize(#[from] serde_json::Error),

    /// The document carries a missing or invalid `order_uid`.
    #[error("invalid order_uid: {0}")]
    InvalidUid(#[from] OrderUidError),
}

/// Failure modes of a single ingestion attempt.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Permanent: the message must be acknowledged and skipped.
    #[error("rejected: {0}")]
    Rejected(#[from] RejectReason),

    /// Transient: the durable write failed; the message may be retried
    /// and must not be acknowledged.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The write path for order documents.
#[derive(Clone)]
pub struct IngestionPipeline {
    store: Arc<dyn OrderStore>,
    cache: OrderCache,
}

impl IngestionPipeline {
    /// Create a new pipeline over the store and cache.
    #[must_use]
    pub fn new(store: Arc<dyn OrderStore>, cache: OrderCache) -> Self {
        Self { store, cache }
    }

    /// Ingest one message payload.
    ///
    /// On success the order is durably stored and cached, and the caller
    /// may acknowledge the message.
    ///
    /// # Errors
    ///
    /// [`IngestError::Rejected`] is permanent — acknowledge and skip.
    /// [`IngestError::Store`] is transient — do not acknowledge; the
    /// message is eligible for retry.
    #[instrument(skip(self, payload), fields(payload_len = payload.len()))]
    pub async fn ingest(&self, payload: &[u8]) -> Result<OrderUid, IngestError> {
        // Received -> Validated. Failures here have no side effects.
        let order: Order = serde_json::from_slice(payload).map_err(RejectReason::Deserialize)?;
        let uid = OrderUid::parse(&order.order_uid).map_err(RejectReason::InvalidUid)?;

        // Validated -> Persisted. The store write must come first.
        self.store.upsert(&order).await?;

        // Persisted -> Cached. Never fails the ingestion outcome: a missed
        // cache write self-heals on the next read via store fallback.
        self.cache.insert(uid.clone(), Arc::new(order)).await;

        debug!(order_uid = %uid, "Order persisted and cached");
        Ok(uid)
    }
}
