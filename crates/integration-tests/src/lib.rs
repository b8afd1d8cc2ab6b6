//! Integration tests for Orderdesk.
//!
//! # Running Tests
//!
//! ```bash
//! # Start PostgreSQL and Kafka, run migrations
//! docker compose up -d
//! cargo run -p orderdesk-cli -- migrate
//!
//! # Start the server
//! cargo run -p orderdesk-server
//!
//! # Run integration tests (ignored by default)
//! cargo test -p orderdesk-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `ORDERDESK_BASE_URL` - Server base URL (default: <http://localhost:8081>)
//! - `ORDERDESK_DATABASE_URL` - `PostgreSQL` connection string
//! - `KAFKA_BROKERS` - Broker list (default: localhost:9092)
//! - `KAFKA_TOPIC` - Ingest topic (default: orders)
//!
//! # Test Categories
//!
//! - `order_lookup` - Read path: cache/store lookups over HTTP
//! - `ingestion` - Write path: Kafka to store to HTTP, end to end
