//! Orderdesk Server - Order lookup and ingestion service.
//!
//! This binary serves point lookups for order documents on port 8081 while
//! ingesting new and updated orders from a Kafka topic.
//!
//! # Architecture
//!
//! - Axum web framework for the read API
//! - `PostgreSQL` as the durable system of record (`orders` table, JSONB)
//! - In-memory read cache hydrated from the store at startup
//! - Kafka consumer feeding the ingestion pipeline, one message at a time
//!
//! # Consistency
//!
//! Every ingested message follows the fixed ordering
//! store write -> cache write -> offset commit, so an acknowledged order is
//! always durable and the cache can only lag behind the store. The read
//! path falls back to the store on a cache miss and repopulates the cache.
//!
//! # Startup
//!
//! The store must be reachable and migrated (see `orderdesk-cli migrate`)
//! before the server starts; cache hydration failure aborts the process.
//! The consumer escalating a fatal error (store down past the retry
//! budget) also tears the process down rather than looping silently.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

mod bootstrap;
mod cache;
mod config;
mod error;
mod ingest;
mod query;
mod routes;
mod state;
mod store;
#[cfg(test)]
mod testkit;

use axum::Router;
use sentry::integrations::tracing as sentry_tracing;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cache::OrderCache;
use config::ServerConfig;
use ingest::IngestionPipeline;
use ingest::consumer::{OrderConsumer, RetryPolicy};
use state::AppState;
use store::{OrderStore, PgOrderStore};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ServerConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            traces_sample_rate: config.sentry_traces_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = ServerConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Initialize tracing with EnvFilter and Sentry integration
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "orderdesk_server=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    // Initialize database connection pool
    let pool = store::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");
    tracing::info!("Database pool created");

    // NOTE: Migrations are NOT run automatically on startup.
    // Run them explicitly via: cargo run -p orderdesk-cli -- migrate

    let store: Arc<dyn OrderStore> =
        Arc::new(PgOrderStore::new(pool, config.store_timeout()));
    let cache = OrderCache::new();

    // Hydrate the cache before the read path is exposed. Connectivity
    // failure here is fatal; a corrupt row is skipped inside hydrate.
    let stats = bootstrap::hydrate(store.as_ref(), &cache)
        .await
        .expect("Failed to hydrate cache from store");
    tracing::info!(
        loaded = stats.loaded,
        skipped = stats.skipped,
        "Cache hydrated from store"
    );

    // Start the ingestion consumer
    let pipeline = IngestionPipeline::new(Arc::clone(&store), cache.clone());
    let consumer = OrderConsumer::new(&config.kafka, pipeline, RetryPolicy::new(config.ingest))
        .expect("Failed to create Kafka consumer");
    let mut consumer_task = tokio::spawn(consumer.run());

    // Build application state and router
    let state = AppState::new(config.clone(), store, cache);

    let app = Router::new()
        .merge(routes::routes())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(config.store_timeout()))
        .with_state(state.clone())
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    // Start server
    let addr = state.config().socket_addr();
    tracing::info!("orderdesk listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    let server = async {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
    };

    tokio::select! {
        result = server => {
            result.expect("Server error");
        }
        result = &mut consumer_task => {
            match result {
                Ok(Ok(())) => tracing::info!("Consumer stopped"),
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "Consumer failed, shutting down");
                    std::process::exit(1);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Consumer task panicked");
                    std::process::exit(1);
                }
            }
        }
    }

    consumer_task.abort();
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
