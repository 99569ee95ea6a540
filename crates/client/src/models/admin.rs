//! Back-office models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tsmarket_core::OrderStatus;

/// Dashboard counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminStats {
    #[serde(default)]
    pub users_count: u64,
    #[serde(default)]
    pub orders_count: u64,
    #[serde(default)]
    pub products_count: u64,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub total_revenue: Decimal,
    /// Revenue was overridden by an admin instead of summed from orders.
    #[serde(default)]
    pub is_custom_revenue: bool,
}

/// Shop-wide settings edited in the back-office.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSettings {
    #[serde(default)]
    pub card_number: String,
    #[serde(default)]
    pub card_holder: String,
    #[serde(default)]
    pub additional_info: String,
    #[serde(default)]
    pub support_telegram: String,
    #[serde(default)]
    pub support_whatsapp: String,
    #[serde(default)]
    pub support_email: String,
    #[serde(default)]
    pub support_phone: String,
    #[serde(default)]
    pub ai_auto_approve_enabled: bool,
    #[serde(default = "default_theme")]
    pub active_theme: String,
}

fn default_theme() -> String {
    "default".to_string()
}

/// Body of `PUT /admin/profile`. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Body of `POST /admin/upload-image`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageUpload {
    /// A `data:image/...;base64,` URL.
    pub image: String,
}

/// Answer to an image upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    pub image_url: String,
}

/// Answer to toggle endpoints (promo codes, missions, bank cards).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toggled {
    #[serde(default)]
    pub message: Option<String>,
    pub is_active: bool,
}

/// Answer to an admin XP edit; the server recomputes the level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpUpdated {
    #[serde(default)]
    pub message: Option<String>,
    pub new_level: u32,
}

/// Answer to an approved return. 90% of the order total is refunded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnApproved {
    #[serde(default)]
    pub message: Option<String>,
    pub new_status: OrderStatus,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub refund_amount: Decimal,
}

/// Answer to `POST /delivery/orders/{id}/take`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TakenOrder {
    #[serde(default)]
    pub message: Option<String>,
    pub status: OrderStatus,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_stats_decode() {
        let stats: AdminStats = serde_json::from_value(json!({
            "users_count": 12, "orders_count": 40, "products_count": 7,
            "total_revenue": 15320.5, "is_custom_revenue": false
        }))
        .unwrap();
        assert_eq!(stats.total_revenue, Decimal::new(153_205, 1));
    }

    #[test]
    fn test_profile_update_skips_unset_fields() {
        let update = ProfileUpdate {
            name: Some("Boss".to_string()),
            ..ProfileUpdate::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({"name": "Boss"}));
    }
}
