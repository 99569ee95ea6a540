//! Orders, order tracking and promo codes.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tsmarket_core::{OrderId, OrderStatus, ProductId, PromoId, UserId};

use super::timestamp;

/// Window after order creation in which a return can be requested.
pub const RETURN_WINDOW_HOURS: i64 = 24;

/// A line of a placed order, priced by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    #[serde(default)]
    pub product_name: String,
    /// Unit price charged, after the product's own discount.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub xp_reward: u32,
}

/// One entry of an order's status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: OrderStatus,
    #[serde(default, with = "timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub note: Option<String>,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    /// Amount charged, after every discount.
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    #[serde(default)]
    pub total_xp: u64,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub delivery_address: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub discount_applied: Decimal,
    #[serde(default)]
    pub promo_code: Option<String>,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub status_history: Vec<StatusChange>,
    #[serde(default)]
    pub admin_note: Option<String>,
    #[serde(default)]
    pub delivery_user_id: Option<UserId>,
    #[serde(default, with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Whether a return may be requested at `now`.
    ///
    /// Mirrors the server's rule: the status must allow it and the order must
    /// be at most 24 hours old. Orders without a creation time are left for
    /// the server to decide.
    #[must_use]
    pub fn return_allowed_at(&self, now: DateTime<Utc>) -> bool {
        if !self.status.accepts_return_request() {
            return false;
        }
        self.created_at
            .is_none_or(|created| now - created <= Duration::hours(RETURN_WINDOW_HOURS))
    }
}

/// A line of an order submission. Prices are looked up by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
    pub size: Option<String>,
    pub color: Option<String>,
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItemRequest>,
    pub delivery_address: String,
    pub phone_number: String,
    pub promo_code: Option<String>,
}

/// Answer to `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedOrder {
    pub order: Order,
    #[serde(default)]
    pub xp_gained: u64,
    #[serde(default)]
    pub new_level: u32,
    #[serde(default)]
    pub level_up: bool,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub discount_applied: Decimal,
}

/// Answer to `GET /orders/{id}/track`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTracking {
    pub order_id: OrderId,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub status_history: Vec<StatusChange>,
    #[serde(default, with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

/// Answer to a return request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnRequested {
    #[serde(default)]
    pub message: Option<String>,
    pub new_status: OrderStatus,
}

/// Body of the staff order status update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
    pub note: Option<String>,
    pub tracking_number: Option<String>,
}

/// Answer to `POST /promo/validate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoValidation {
    #[serde(default)]
    pub valid: bool,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub discount_percent: Decimal,
    #[serde(default)]
    pub code: String,
}

/// A promo code as listed in the back-office.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoCode {
    pub promo_id: PromoId,
    pub code: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_percent: Decimal,
    #[serde(default)]
    pub is_active: bool,
    /// Zero means unlimited.
    #[serde(default)]
    pub usage_limit: u32,
    #[serde(default)]
    pub times_used: u32,
    #[serde(default, with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /admin/promo-codes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromoCodeInput {
    pub code: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_percent: Decimal,
    pub usage_limit: u32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn order(status: &str, created_at: &str) -> Order {
        serde_json::from_value(json!({
            "order_id": "ord_1",
            "user_id": "user_1",
            "items": [{
                "product_id": "prod_1", "product_name": "Hoodie",
                "price": 200.0, "quantity": 2, "size": "M", "xp_reward": 10
            }],
            "total": 380.0,
            "total_xp": 20,
            "status": status,
            "status_history": [
                {"status": "pending", "timestamp": "2025-05-01T10:00:00+00:00", "note": "created"}
            ],
            "created_at": created_at
        }))
        .unwrap()
    }

    #[test]
    fn test_order_decodes() {
        let o = order("shipped", "2025-05-01T10:00:00+00:00");
        assert_eq!(o.status, OrderStatus::Shipped);
        assert_eq!(o.items[0].quantity, 2);
        assert_eq!(o.items[0].color, None);
        assert_eq!(o.total, Decimal::from(380));
        assert_eq!(o.status_history[0].status, OrderStatus::Pending);
    }

    #[test]
    fn test_return_window() {
        let created = Utc.with_ymd_and_hms(2025, 5, 1, 10, 0, 0).unwrap();
        let o = order("delivered", "2025-05-01T10:00:00+00:00");
        assert!(o.return_allowed_at(created + Duration::hours(23)));
        assert!(!o.return_allowed_at(created + Duration::hours(25)));

        let o = order("return_pending", "2025-05-01T10:00:00+00:00");
        assert!(!o.return_allowed_at(created));
    }

    #[test]
    fn test_order_request_shape() {
        let body = CreateOrderRequest {
            items: vec![OrderItemRequest {
                product_id: ProductId::new("prod_1"),
                quantity: 1,
                size: Some("L".to_string()),
                color: None,
            }],
            delivery_address: "Rudaki 10".to_string(),
            phone_number: "+992900000000".to_string(),
            promo_code: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "items": [{"product_id": "prod_1", "quantity": 1, "size": "L", "color": null}],
                "delivery_address": "Rudaki 10",
                "phone_number": "+992900000000",
                "promo_code": null
            })
        );
    }
}
