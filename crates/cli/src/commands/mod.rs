//! CLI command implementations.

pub mod migrate;
pub mod publish;
pub mod seed;

use chrono::Utc;
use secrecy::SecretString;
use thiserror::Error;
use uuid::Uuid;

use orderdesk_core::{Delivery, Order, OrderItem, Payment};

/// Errors shared across CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    #[error("Invalid order document: {0}")]
    InvalidDocument(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read the database URL from `ORDERDESK_DATABASE_URL`, falling back to
/// the generic `DATABASE_URL`.
pub fn database_url() -> Result<SecretString, CliError> {
    if let Ok(value) = std::env::var("ORDERDESK_DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(CliError::MissingEnvVar("ORDERDESK_DATABASE_URL"))
}

/// Build a fully populated test order.
///
/// The transaction id is freshly generated so repeated seeds stay
/// distinguishable in the stored documents.
pub fn test_order(order_uid: String) -> Order {
    Order {
        order_uid,
        track_number: "TRACK123456".to_owned(),
        entry: "WEB".to_owned(),
        delivery: Delivery {
            name: "Test User".to_owned(),
            phone: "+31612345678".to_owned(),
            zip: "1012AB".to_owned(),
            city: "Amsterdam".to_owned(),
            address: "Damrak 1".to_owned(),
            region: "Noord-Holland".to_owned(),
            email: "test@example.com".to_owned(),
        },
        payment: Payment {
            transaction: Uuid::new_v4().to_string(),
            currency: "EUR".to_owned(),
            provider: "adyen".to_owned(),
            amount: 1817,
            payment_dt: Utc::now().timestamp(),
            bank: "bunq".to_owned(),
            delivery_cost: 500,
            goods_total: 1317,
        },
        items: vec![OrderItem {
            chrt_id: 9_934_930,
            track_number: "TRACK123456".to_owned(),
            price: 453,
            name: "Test Item".to_owned(),
            size: "L".to_owned(),
            total_price: 317,
            nm_id: 2_389_212,
            brand: "Test Brand".to_owned(),
        }],
        locale: "en".to_owned(),
        customer_id: "test".to_owned(),
        delivery_service: "meest".to_owned(),
        date_created: Utc::now(),
    }
}
