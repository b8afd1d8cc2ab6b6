//! Startup cache hydration.
//!
//! Runs once at process start, before the HTTP listener binds: the whole
//! durable store is streamed into the cache so the first reads after a
//! restart are already warm.

use std::sync::Arc;

use futures::StreamExt;
use tracing::warn;

use crate::cache::OrderCache;
use crate::store::{OrderStore, StoreError};

/// Counters from a hydration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HydrateStats {
    /// Orders loaded into the cache.
    pub loaded: u64,
    /// Corrupt stored records skipped.
    pub skipped: u64,
}

/// Drain the store into the cache.
///
/// A single corrupt stored record is logged and skipped — one bad row must
/// not keep the service from starting. Connectivity failures are returned
/// as errors and abort startup: the system cannot safely serve without a
/// baseline.
///
/// # Errors
///
/// Returns [`StoreError::Database`] or [`StoreError::Timeout`] when the
/// store cannot be read.
pub async fn hydrate(
    store: &dyn OrderStore,
    cache: &OrderCache,
) -> Result<HydrateStats, StoreError> {
    let mut stats = HydrateStats {
        loaded: 0,
        skipped: 0,
    };

    let mut orders = store.load_all();
    while let Some(row) = orders.next().await {
        match row {
            Ok((uid, order)) => {
                cache.insert(uid, Arc::new(order)).await;
                stats.loaded += 1;
            }
            Err(StoreError::DataCorruption(detail)) => {
                warn!(%detail, "Skipping corrupt stored order during hydration");
                stats.skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }

    Ok(stats)
}
