//! Application state shared across handlers.

use std::sync::Arc;

use crate::cache::OrderCache;
use crate::config::ServerConfig;
use crate::query::OrderQueryService;
use crate::store::OrderStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// query service, the durable store, and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    store: Arc<dyn OrderStore>,
    orders: OrderQueryService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The cache is owned by the state for the lifetime of the process and
    /// dropped with it at shutdown.
    #[must_use]
    pub fn new(config: ServerConfig, store: Arc<dyn OrderStore>, cache: OrderCache) -> Self {
        let orders = OrderQueryService::new(Arc::clone(&store), cache);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                orders,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the durable store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn OrderStore> {
        &self.inner.store
    }

    /// Get a reference to the order query service.
    #[must_use]
    pub fn orders(&self) -> &OrderQueryService {
        &self.inner.orders
    }
}
