//! Kafka consumer: the offset-safe ingestion loop.
//!
//! Subscribes to one topic under a named consumer group with auto-commit
//! disabled. Messages are processed strictly one at a time in delivery
//! order per partition, and an offset is committed only once the pipeline
//! has either persisted the order or rejected the message permanently.
//! Until then the message stays uncommitted and is redelivered after a
//! crash — the store write can be repeated safely because upserts are
//! idempotent.
//!
//! Transient store failures are retried with bounded exponential backoff;
//! exhausting the budget stops the consumer with an error so the process
//! fails visibly instead of looping forever. Backpressure falls out of the
//! sequential loop: the next message is not read until the current one is
//! resolved.

use std::time::Duration;

use rand::Rng;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::Message;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{error, info, warn};

use orderdesk_core::OrderUid;

use super::{IngestError, IngestionPipeline, RejectReason};
use crate::config::{IngestRetryConfig, KafkaConfig};
use crate::store::StoreError;

/// Errors that stop the consumer.
#[derive(Debug, Error)]
pub enum ConsumerError {
    /// Broker/client failure (subscription, offset commit).
    #[error("kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    /// The store stayed unavailable through the whole retry budget.
    #[error("storage unavailable after {attempts} attempts: {source}")]
    RetriesExhausted {
        /// Attempts made before giving up.
        attempts: u32,
        /// The last store failure observed.
        #[source]
        source: StoreError,
    },
}

/// Bounded exponential backoff schedule for transient store failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl RetryPolicy {
    /// Build a policy from configuration. `max_attempts` is clamped to at
    /// least 1 so a misconfigured zero cannot drop messages unretried.
    #[must_use]
    pub fn new(config: IngestRetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
        }
    }

    /// Delay before retry number `attempt` (1-based): exponential doubling
    /// capped at the ceiling, plus up to 20% jitter to avoid synchronized
    /// retry storms.
    fn delay(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(32);
        let base = self
            .initial_backoff
            .saturating_mul(2u32.saturating_pow(exp))
            .min(self.max_backoff);

        let jitter_range = base.as_millis() as u64 / 5;
        let jitter = if jitter_range == 0 {
            0
        } else {
            rand::rng().random_range(0..=jitter_range)
        };
        base + Duration::from_millis(jitter)
    }
}

/// Outcome of driving one message to completion.
///
/// Either way the message's offset may be committed.
#[derive(Debug)]
pub enum ProcessOutcome {
    /// The order was durably persisted and cached.
    Ingested(OrderUid),
    /// The message can never succeed and is permanently skipped.
    Rejected(RejectReason),
}

/// Run one payload through the pipeline with bounded retry.
///
/// Returns only when the message may be acknowledged, or with a fatal
/// error once the retry budget is exhausted.
///
/// # Errors
///
/// Returns [`ConsumerError::RetriesExhausted`] when every attempt hit a
/// transient store failure.
pub async fn process_with_retry(
    pipeline: &IngestionPipeline,
    policy: &RetryPolicy,
    payload: &[u8],
) -> Result<ProcessOutcome, ConsumerError> {
    let mut attempt = 0;
    loop {
        match pipeline.ingest(payload).await {
            Ok(uid) => return Ok(ProcessOutcome::Ingested(uid)),
            Err(IngestError::Rejected(reason)) => return Ok(ProcessOutcome::Rejected(reason)),
            Err(IngestError::Store(err)) => {
                attempt += 1;
                if attempt >= policy.max_attempts {
                    return Err(ConsumerError::RetriesExhausted {
                        attempts: attempt,
                        source: err,
                    });
                }
                let delay = policy.delay(attempt);
                warn!(
                    error = %err,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Store write failed, backing off before retry"
                );
                sleep(delay).await;
            }
        }
    }
}

/// The stream consumer owning subscription and offset semantics.
pub struct OrderConsumer {
    consumer: StreamConsumer,
    pipeline: IngestionPipeline,
    policy: RetryPolicy,
    topic: String,
}

impl OrderConsumer {
    /// Create the Kafka client and subscribe to the configured topic.
    ///
    /// Auto-commit is disabled: offsets are committed manually, strictly
    /// after the store write.
    ///
    /// # Errors
    ///
    /// Returns [`ConsumerError::Kafka`] if the client cannot be created or
    /// the subscription fails.
    pub fn new(
        config: &KafkaConfig,
        pipeline: IngestionPipeline,
        policy: RetryPolicy,
    ) -> Result<Self, ConsumerError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", &config.group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .create()?;

        consumer.subscribe(&[config.topic.as_str()])?;

        Ok(Self {
            consumer,
            pipeline,
            policy,
            topic: config.topic.clone(),
        })
    }

    /// Run the consumption loop until a fatal error.
    ///
    /// # Errors
    ///
    /// Returns [`ConsumerError::RetriesExhausted`] when the store stays
    /// down past the retry budget, or [`ConsumerError::Kafka`] when an
    /// offset commit fails.
    pub async fn run(self) -> Result<(), ConsumerError> {
        info!(topic = %self.topic, "Consumer loop started");

        loop {
            let message = match self.consumer.recv().await {
                Ok(message) => message,
                Err(err) => {
                    // librdkafka recovers broker-level hiccups itself;
                    // surface the error and keep consuming.
                    warn!(error = %err, "Kafka receive error");
                    continue;
                }
            };

            let payload = message.payload().unwrap_or_default();
            match process_with_retry(&self.pipeline, &self.policy, payload).await {
                Ok(ProcessOutcome::Ingested(uid)) => {
                    info!(
                        order_uid = %uid,
                        partition = message.partition(),
                        offset = message.offset(),
                        "Order ingested"
                    );
                }
                Ok(ProcessOutcome::Rejected(reason)) => {
                    warn!(
                        error = %reason,
                        partition = message.partition(),
                        offset = message.offset(),
                        "Message rejected, skipping permanently"
                    );
                }
                Err(err) => {
                    error!(error = %err, "Ingestion failed permanently, stopping consumer");
                    return Err(err);
                }
            }

            // Acknowledged: the store write is durable (or the message is
            // unprocessable), so the offset may move forward.
            self.consumer.commit_message(&message, CommitMode::Async)?;
        }
    }
}
