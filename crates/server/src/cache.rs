//! In-memory read cache for orders.
//!
//! A pure latency accelerator over the durable store. Every entry is a
//! derived, disposable copy: losing the cache (restart, missed write) is
//! always recoverable because the read path falls back to the store and
//! repopulates. The cache is therefore allowed to be stale-behind the
//! store, never ahead of it.
//!
//! The cache is unbounded and entries never expire — the store is the
//! source of truth and the working set is assumed to fit in memory. This
//! is a known scaling limit, not an invariant.

use std::sync::Arc;

use moka::future::Cache;

use orderdesk_core::{Order, OrderUid};

/// Concurrency-safe mapping from order UID to order document.
///
/// Safe under many concurrent readers and concurrent writers; a reader
/// never observes a half-updated entry. Cheap to clone — clones share the
/// same underlying cache. Constructed once at startup and owned by the
/// application state; there is no global instance.
#[derive(Clone)]
pub struct OrderCache {
    inner: Cache<OrderUid, Arc<Order>>,
}

impl OrderCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Cache::builder().build(),
        }
    }

    /// Look up an order by UID.
    pub async fn get(&self, uid: &OrderUid) -> Option<Arc<Order>> {
        self.inner.get(uid).await
    }

    /// Insert or replace the entry for `uid`.
    ///
    /// Bulk hydration at startup is performed by
    /// [`bootstrap::hydrate`](crate::bootstrap::hydrate), which streams the
    /// store through this method one document at a time.
    pub async fn insert(&self, uid: OrderUid, order: Arc<Order>) {
        self.inner.insert(uid, order).await;
    }

    /// Number of cached entries.
    #[cfg(test)]
    pub async fn entry_count(&self) -> u64 {
        // moka's count is eventually consistent; flush pending work first
        // so tests can assert exact counts.
        self.inner.run_pending_tasks().await;
        self.inner.entry_count()
    }
}

impl Default for OrderCache {
    fn default() -> Self {
        Self::new()
    }
}
