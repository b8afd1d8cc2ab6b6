//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ORDERDESK_DATABASE_URL` - `PostgreSQL` connection string (falls back
//!   to the generic `DATABASE_URL`)
//!
//! ## Optional
//! - `ORDERDESK_HOST` - Bind address (default: 127.0.0.1)
//! - `ORDERDESK_PORT` - Listen port (default: 8081)
//! - `ORDERDESK_STORE_TIMEOUT_SECS` - Per-call store deadline (default: 5)
//! - `KAFKA_BROKERS` - Broker list (default: localhost:9092)
//! - `KAFKA_TOPIC` - Ingest topic (default: orders)
//! - `KAFKA_GROUP_ID` - Consumer group (default: orderdesk)
//! - `ORDERDESK_INGEST_MAX_ATTEMPTS` - Store retry budget per message (default: 5)
//! - `ORDERDESK_INGEST_BACKOFF_MS` - Initial retry backoff (default: 200)
//! - `ORDERDESK_INGEST_MAX_BACKOFF_MS` - Backoff ceiling (default: 10000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Per-call deadline for durable store operations, in seconds
    pub store_timeout_secs: u64,
    /// Message stream configuration
    pub kafka: KafkaConfig,
    /// Retry policy for transient store failures during ingestion
    pub ingest: IngestRetryConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry transaction sample rate
    pub sentry_traces_sample_rate: f32,
}

/// Kafka subscription configuration: one topic, one consumer group.
#[derive(Debug, Clone)]
pub struct KafkaConfig {
    /// Comma-separated broker list (e.g., localhost:9092)
    pub brokers: String,
    /// Topic carrying order documents
    pub topic: String,
    /// Named consumer group for resumable offsets
    pub group_id: String,
}

/// Bounded-backoff retry configuration for the ingestion pipeline.
#[derive(Debug, Clone, Copy)]
pub struct IngestRetryConfig {
    /// Maximum store attempts per message before escalating
    pub max_attempts: u32,
    /// Initial backoff delay in milliseconds
    pub initial_backoff_ms: u64,
    /// Backoff ceiling in milliseconds
    pub max_backoff_ms: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("ORDERDESK_DATABASE_URL")?;
        let host = parse_env_or_default("ORDERDESK_HOST", "127.0.0.1")?;
        let port = parse_env_or_default("ORDERDESK_PORT", "8081")?;
        let store_timeout_secs = parse_env_or_default("ORDERDESK_STORE_TIMEOUT_SECS", "5")?;

        let kafka = KafkaConfig::from_env();
        let ingest = IngestRetryConfig::from_env()?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = parse_env_or_default("SENTRY_SAMPLE_RATE", "1.0")?;
        let sentry_traces_sample_rate = parse_env_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.0")?;

        Ok(Self {
            database_url,
            host,
            port,
            store_timeout_secs,
            kafka,
            ingest,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Returns the per-call deadline for durable store operations.
    #[must_use]
    pub const fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }
}

impl KafkaConfig {
    fn from_env() -> Self {
        Self {
            brokers: get_env_or_default("KAFKA_BROKERS", "localhost:9092"),
            topic: get_env_or_default("KAFKA_TOPIC", "orders"),
            group_id: get_env_or_default("KAFKA_GROUP_ID", "orderdesk"),
        }
    }
}

impl IngestRetryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            max_attempts: parse_env_or_default("ORDERDESK_INGEST_MAX_ATTEMPTS", "5")?,
            initial_backoff_ms: parse_env_or_default("ORDERDESK_INGEST_BACKOFF_MS", "200")?,
            max_backoff_ms: parse_env_or_default("ORDERDESK_INGEST_MAX_BACKOFF_MS", "10000")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get an environment variable with a default, parsed into `T`.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testkit::test_config;

    #[test]
    fn test_socket_addr() {
        let config = test_config();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 8081);
    }

    #[test]
    fn test_store_timeout() {
        let config = test_config();
        assert_eq!(config.store_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingEnvVar("ORDERDESK_DATABASE_URL".to_string());
        assert_eq!(
            err.to_string(),
            "Missing environment variable: ORDERDESK_DATABASE_URL"
        );

        let err = ConfigError::InvalidEnvVar("ORDERDESK_PORT".to_string(), "bad".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid environment variable ORDERDESK_PORT: bad"
        );
    }
}
