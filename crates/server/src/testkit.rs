//! Test doubles and fixtures shared across unit tests.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use futures::stream::{self, BoxStream, StreamExt};

use orderdesk_core::{Delivery, Order, OrderItem, OrderUid, Payment};

use crate::config::{IngestRetryConfig, KafkaConfig, ServerConfig};
use crate::store::{OrderStore, StoreError, StoredOrder};

/// In-memory [`OrderStore`] with fault injection.
///
/// Documents are kept as raw JSON values so tests can plant records that
/// no longer decode (the "corrupt stored row" case). Injected failures
/// surface as [`StoreError::Timeout`], the transient class.
pub struct MemoryOrderStore {
    orders: Mutex<BTreeMap<String, serde_json::Value>>,
    fail_upserts: AtomicU32,
    fail_gets: AtomicU32,
    fail_load_all: AtomicBool,
    fail_pings: AtomicBool,
    upsert_calls: AtomicU32,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self {
            orders: Mutex::new(BTreeMap::new()),
            fail_upserts: AtomicU32::new(0),
            fail_gets: AtomicU32::new(0),
            fail_load_all: AtomicBool::new(false),
            fail_pings: AtomicBool::new(false),
            upsert_calls: AtomicU32::new(0),
        }
    }

    /// Plant a raw document, bypassing the order model (for corrupt rows).
    pub fn insert_raw(&self, uid: &str, value: serde_json::Value) {
        self.orders
            .lock()
            .expect("store mutex poisoned")
            .insert(uid.to_owned(), value);
    }

    /// Make the next `n` upserts fail with a transient error.
    pub fn fail_next_upserts(&self, n: u32) {
        self.fail_upserts.store(n, Ordering::SeqCst);
    }

    /// Make the next `n` gets fail with a transient error.
    pub fn fail_next_gets(&self, n: u32) {
        self.fail_gets.store(n, Ordering::SeqCst);
    }

    /// Make `load_all` end with a connectivity error.
    pub fn fail_load_all(&self) {
        self.fail_load_all.store(true, Ordering::SeqCst);
    }

    /// Make `ping` fail.
    pub fn fail_pings(&self) {
        self.fail_pings.store(true, Ordering::SeqCst);
    }

    /// Total upsert attempts observed, including failed ones.
    pub fn upsert_calls(&self) -> u32 {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.orders.lock().expect("store mutex poisoned").len()
    }

    fn take_failure(counter: &AtomicU32) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn upsert(&self, order: &Order) -> Result<(), StoreError> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        if Self::take_failure(&self.fail_upserts) {
            return Err(StoreError::Timeout);
        }

        let data = serde_json::to_value(order)
            .map_err(|e| StoreError::DataCorruption(e.to_string()))?;
        self.orders
            .lock()
            .expect("store mutex poisoned")
            .insert(order.order_uid.clone(), data);
        Ok(())
    }

    async fn get(&self, uid: &OrderUid) -> Result<Option<Order>, StoreError> {
        if Self::take_failure(&self.fail_gets) {
            return Err(StoreError::Timeout);
        }

        let data = self
            .orders
            .lock()
            .expect("store mutex poisoned")
            .get(uid.as_str())
            .cloned();
        match data {
            Some(value) => {
                let order = serde_json::from_value(value)
                    .map_err(|e| StoreError::DataCorruption(format!("order {uid}: {e}")))?;
                Ok(Some(order))
            }
            None => Ok(None),
        }
    }

    fn load_all(&self) -> BoxStream<'_, Result<StoredOrder, StoreError>> {
        let rows: Vec<Result<StoredOrder, StoreError>> = self
            .orders
            .lock()
            .expect("store mutex poisoned")
            .iter()
            .map(|(uid_str, value)| {
                let uid = OrderUid::parse(uid_str)
                    .map_err(|e| StoreError::DataCorruption(format!("order_uid: {e}")))?;
                let order: Order = serde_json::from_value(value.clone())
                    .map_err(|e| StoreError::DataCorruption(format!("order {uid_str}: {e}")))?;
                Ok((uid, order))
            })
            .collect();

        let tail = if self.fail_load_all.load(Ordering::SeqCst) {
            vec![Err(StoreError::Timeout)]
        } else {
            Vec::new()
        };

        stream::iter(rows.into_iter().chain(tail)).boxed()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if self.fail_pings.load(Ordering::SeqCst) {
            return Err(StoreError::Timeout);
        }
        Ok(())
    }
}

/// A small but fully populated order document.
pub fn sample_order(order_uid: &str) -> Order {
    Order {
        order_uid: order_uid.to_owned(),
        track_number: "TRACK123456".to_owned(),
        entry: "WEB".to_owned(),
        delivery: Delivery {
            name: "Jane Doe".to_owned(),
            phone: "+31612345678".to_owned(),
            zip: "1012AB".to_owned(),
            city: "Amsterdam".to_owned(),
            address: "Damrak 1".to_owned(),
            region: "Noord-Holland".to_owned(),
            email: "jane@example.com".to_owned(),
        },
        payment: Payment {
            transaction: format!("txn-{order_uid}"),
            currency: "EUR".to_owned(),
            provider: "adyen".to_owned(),
            amount: 1817,
            payment_dt: 1_637_907_727,
            bank: "bunq".to_owned(),
            delivery_cost: 500,
            goods_total: 1317,
        },
        items: vec![OrderItem {
            chrt_id: 9_934_930,
            track_number: "TRACK123456".to_owned(),
            price: 453,
            name: "Mascara".to_owned(),
            size: "0".to_owned(),
            total_price: 317,
            nm_id: 2_389_212,
            brand: "Vivienne Sabo".to_owned(),
        }],
        locale: "en".to_owned(),
        customer_id: "cust-77".to_owned(),
        delivery_service: "meest".to_owned(),
        date_created: Utc.with_ymd_and_hms(2021, 11, 26, 6, 22, 19).unwrap(),
    }
}

/// A configuration that never touches the environment.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        database_url: secrecy::SecretString::from("postgres://localhost/orderdesk_test"),
        host: std::net::IpAddr::from([127, 0, 0, 1]),
        port: 8081,
        store_timeout_secs: 5,
        kafka: KafkaConfig {
            brokers: "localhost:9092".to_owned(),
            topic: "orders".to_owned(),
            group_id: "orderdesk".to_owned(),
        },
        ingest: IngestRetryConfig {
            max_attempts: 5,
            initial_backoff_ms: 200,
            max_backoff_ms: 10_000,
        },
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}
