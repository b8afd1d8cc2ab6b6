//! Read path: cache-first order lookups.

use std::sync::Arc;

use tracing::{debug, instrument};

use orderdesk_core::{Order, OrderUid};

use crate::cache::OrderCache;
use crate::store::{OrderStore, StoreError};

/// Read-through query service over the cache and the durable store.
///
/// The cache is strictly a latency optimization: a miss falls back to the
/// store, and a store hit repopulates the cache so the next lookup is
/// served from memory. The store remains the only source of truth.
#[derive(Clone)]
pub struct OrderQueryService {
    store: Arc<dyn OrderStore>,
    cache: OrderCache,
}

impl OrderQueryService {
    /// Create a new query service.
    #[must_use]
    pub fn new(store: Arc<dyn OrderStore>, cache: OrderCache) -> Self {
        Self { store, cache }
    }

    /// Look up an order by UID.
    ///
    /// Returns `None` when the order exists in neither the cache nor the
    /// store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the cache misses and the store fallback
    /// fails.
    #[instrument(skip(self), fields(order_uid = %uid))]
    pub async fn get_order(&self, uid: &OrderUid) -> Result<Option<Arc<Order>>, StoreError> {
        if let Some(order) = self.cache.get(uid).await {
            debug!("cache hit");
            return Ok(Some(order));
        }

        let Some(order) = self.store.get(uid).await? else {
            debug!("order not found");
            return Ok(None);
        };

        debug!("cache miss, repopulating from store");
        let order = Arc::new(order);
        self.cache.insert(uid.clone(), Arc::clone(&order)).await;
        Ok(Some(order))
    }
}
