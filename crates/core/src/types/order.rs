//! The order document model.
//!
//! An [`Order`] is a self-contained, independently serializable snapshot of
//! one customer order. The struct layout is wire-compatible with the JSON
//! documents carried on the ingest topic and stored in the `orders` table,
//! so a document survives a deserialize/serialize round trip field for
//! field.
//!
//! Orders hold no references to other orders. A re-ingested document with
//! the same `order_uid` replaces the previous one wholesale; there is no
//! field-level merge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A customer order, keyed by `order_uid`.
///
/// The `order_uid` field is kept as a plain string here because `Order` is
/// a wire document: validation happens at the ingestion boundary via
/// [`OrderUid::parse`](crate::OrderUid::parse), and a rejected document
/// never makes it past that boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Globally unique order identifier. Immutable once assigned.
    pub order_uid: String,
    /// Carrier tracking number shared by the order and its items.
    pub track_number: String,
    /// Sales channel code the order entered through.
    pub entry: String,
    /// Shipping destination and recipient contact details.
    pub delivery: Delivery,
    /// Payment transaction details.
    pub payment: Payment,
    /// Ordered line items. Order within the sequence is preserved.
    pub items: Vec<OrderItem>,
    /// BCP-47-ish locale code of the customer session.
    pub locale: String,
    /// Identifier of the customer who placed the order.
    pub customer_id: String,
    /// Name of the delivery service handling the order.
    pub delivery_service: String,
    /// Creation timestamp of the order document.
    pub date_created: DateTime<Utc>,
}

/// Shipping destination and recipient contact details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub name: String,
    pub phone: String,
    pub zip: String,
    pub city: String,
    pub address: String,
    pub region: String,
    pub email: String,
}

/// Payment transaction details.
///
/// Monetary amounts are plain integers in the smallest currency unit, as
/// produced by the upstream system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Payment transaction identifier.
    pub transaction: String,
    pub currency: String,
    pub provider: String,
    /// Total charged amount.
    pub amount: i64,
    /// Payment timestamp as a Unix epoch second count.
    pub payment_dt: i64,
    pub bank: String,
    pub delivery_cost: i64,
    pub goods_total: i64,
}

/// One line item of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Product variant identifier.
    pub chrt_id: i64,
    pub track_number: String,
    pub price: i64,
    pub name: String,
    pub size: String,
    /// Per-item total after discounts.
    pub total_price: i64,
    /// Opaque numeric product attribute. Serialized under the historical
    /// wire tag `nm_dt`; carries no business meaning here.
    #[serde(rename = "nm_dt")]
    pub nm_id: i64,
    pub brand: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_document() -> serde_json::Value {
        json!({
            "order_uid": "abc-1",
            "track_number": "TRACK123456",
            "entry": "WEB",
            "delivery": {
                "name": "Jane Doe",
                "phone": "+31612345678",
                "zip": "1012AB",
                "city": "Amsterdam",
                "address": "Damrak 1",
                "region": "Noord-Holland",
                "email": "jane@example.com"
            },
            "payment": {
                "transaction": "3f8d2c1e-54a7-4c0e-9a27-8b1f4f6f2d10",
                "currency": "EUR",
                "provider": "adyen",
                "amount": 1817,
                "payment_dt": 1637907727,
                "bank": "bunq",
                "delivery_cost": 500,
                "goods_total": 1317,
            },
            "items": [
                {
                    "chrt_id": 9934930,
                    "track_number": "TRACK123456",
                    "price": 453,
                    "name": "Mascara",
                    "size": "0",
                    "total_price": 317,
                    "nm_dt": 2389212,
                    "brand": "Vivienne Sabo"
                }
            ],
            "locale": "en",
            "customer_id": "cust-77",
            "delivery_service": "meest",
            "date_created": "2021-11-26T06:22:19Z"
        })
    }

    #[test]
    fn test_deserialize_full_document() {
        let order: Order = serde_json::from_value(sample_document()).unwrap();

        assert_eq!(order.order_uid, "abc-1");
        assert_eq!(order.delivery.city, "Amsterdam");
        assert_eq!(order.payment.amount, 1817);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].nm_id, 2389212);
        assert_eq!(
            order.date_created.to_rfc3339(),
            "2021-11-26T06:22:19+00:00"
        );
    }

    #[test]
    fn test_round_trip_is_lossless() {
        let original = sample_document();
        let order: Order = serde_json::from_value(original.clone()).unwrap();
        let reserialized = serde_json::to_value(&order).unwrap();

        assert_eq!(reserialized, original);
    }

    #[test]
    fn test_round_trip_preserves_equality() {
        let order: Order = serde_json::from_value(sample_document()).unwrap();
        let json = serde_json::to_string(&order).unwrap();
        let back: Order = serde_json::from_str(&json).unwrap();

        assert_eq!(back, order);
    }

    #[test]
    fn test_nm_id_uses_historical_wire_tag() {
        let order: Order = serde_json::from_value(sample_document()).unwrap();
        let value = serde_json::to_value(&order).unwrap();

        let item = &value["items"][0];
        assert_eq!(item["nm_dt"], 2389212);
        assert!(item.get("nm_id").is_none());
    }

    #[test]
    fn test_missing_order_uid_is_an_error() {
        let mut doc = sample_document();
        doc.as_object_mut().unwrap().remove("order_uid");

        assert!(serde_json::from_value::<Order>(doc).is_err());
    }

    #[test]
    fn test_item_order_is_preserved() {
        let mut doc = sample_document();
        let second = json!({
            "chrt_id": 1,
            "track_number": "TRACK123456",
            "price": 100,
            "name": "Lipstick",
            "size": "1",
            "total_price": 100,
            "nm_dt": 42,
            "brand": "Vivienne Sabo"
        });
        doc["items"].as_array_mut().unwrap().push(second);

        let order: Order = serde_json::from_value(doc).unwrap();
        assert_eq!(order.items[0].name, "Mascara");
        assert_eq!(order.items[1].name, "Lipstick");
    }
}
