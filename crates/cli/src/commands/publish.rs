//! Publish an order document to the ingest topic.
//!
//! The document is validated against the order model before it is
//! produced, so a typo in a hand-written file fails here instead of being
//! rejected downstream by the consumer.

use std::path::Path;
use std::time::Duration;

use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use tracing::info;

use orderdesk_core::Order;

use super::{CliError, test_order};

/// Publish one order document.
///
/// Reads the document from `file` when given; otherwise a generated test
/// order with a random UID is published.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the document does not
/// parse as an order, or the broker rejects the produce.
pub async fn run(file: Option<&Path>, brokers: &str, topic: &str) -> Result<(), CliError> {
    let payload = match file {
        Some(path) => tokio::fs::read_to_string(path).await?,
        None => {
            let uid = format!("order-{}", uuid::Uuid::new_v4());
            serde_json::to_string(&test_order(uid))?
        }
    };

    // Validate before producing.
    let order: Order = serde_json::from_str(&payload)?;

    let producer: FutureProducer = ClientConfig::new()
        .set("bootstrap.servers", brokers)
        .set("message.timeout.ms", "5000")
        .create()?;

    producer
        .send(
            FutureRecord::to(topic)
                .key(order.order_uid.as_str())
                .payload(&payload),
            Duration::from_secs(5),
        )
        .await
        .map_err(|(e, _)| CliError::Kafka(e))?;

    info!(order_uid = %order.order_uid, topic, "Order document published");
    Ok(())
}
