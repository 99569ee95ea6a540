//! Wallet models: top-up codes and requests, withdrawals, bank cards.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tsmarket_core::{BankCardId, RequestStatus, TopupCodeId, TopupRequestId, UserId, WithdrawalRequestId};

use super::timestamp;

/// A card-transfer top-up awaiting or past staff review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopupRequest {
    pub request_id: TopupRequestId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub user_email: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(default)]
    pub receipt_url: String,
    #[serde(default)]
    pub status: RequestStatus,
    #[serde(default)]
    pub admin_note: Option<String>,
    #[serde(default, with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp")]
    pub processed_at: Option<DateTime<Utc>>,
}

/// Body of `POST /topup/request`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopupRequestInput {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub receipt_url: String,
}

/// Proof of a card transfer attached to a top-up request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Receipt {
    /// An already uploaded image.
    Url(String),
    /// Raw image bytes, sent inline as a data URL.
    Image { mime: String, bytes: Vec<u8> },
}

impl Receipt {
    /// Returns `true` if there is nothing to send.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Url(url) => url.trim().is_empty(),
            Self::Image { bytes, .. } => bytes.is_empty(),
        }
    }

    /// The value sent as `receipt_url`.
    #[must_use]
    pub fn to_receipt_url(&self) -> String {
        match self {
            Self::Url(url) => url.trim().to_string(),
            Self::Image { mime, bytes } => to_data_url(mime, bytes),
        }
    }
}

/// Encode bytes as a base64 `data:` URL.
#[must_use]
pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Card details users transfer top-ups to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopupSettings {
    #[serde(default)]
    pub card_number: String,
    #[serde(default)]
    pub card_holder: String,
    #[serde(default)]
    pub additional_info: String,
}

/// A balance change recorded in the top-up history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopupHistoryEntry {
    #[serde(default)]
    pub history_id: String,
    /// Redeemed code, for code top-ups.
    #[serde(default)]
    pub code: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Answer to `POST /topup/redeem`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedeemResult {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub new_balance: Decimal,
}

/// A prepaid top-up code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopupCode {
    pub code_id: TopupCodeId,
    pub code: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(default)]
    pub is_used: bool,
    #[serde(default)]
    pub used_by: Option<UserId>,
    #[serde(default, with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /admin/topup-codes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopupCodeInput {
    pub code: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// A payout request to the user's bank card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    pub request_id: WithdrawalRequestId,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(default)]
    pub card_number: String,
    #[serde(default)]
    pub card_type: String,
    #[serde(default)]
    pub status: RequestStatus,
    #[serde(default)]
    pub admin_note: Option<String>,
    #[serde(default, with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /withdrawals/request`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WithdrawalInput {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub card_number: String,
    pub card_type: String,
}

/// A shop bank card users may transfer to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankCard {
    pub card_id: BankCardId,
    pub card_number: String,
    #[serde(default)]
    pub card_holder: String,
    #[serde(default)]
    pub bank_name: String,
    #[serde(default)]
    pub is_active: bool,
}

/// Body of `POST /admin/bank-cards`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BankCardInput {
    pub card_number: String,
    pub card_holder: String,
    pub bank_name: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_receipt_data_url() {
        let receipt = Receipt::Image {
            mime: "image/png".to_string(),
            bytes: b"hi".to_vec(),
        };
        assert_eq!(receipt.to_receipt_url(), "data:image/png;base64,aGk=");
        assert!(!receipt.is_empty());
        assert!(Receipt::Url("  ".to_string()).is_empty());
    }

    #[test]
    fn test_topup_request_decodes_unknown_status() {
        let req: TopupRequest = serde_json::from_value(json!({
            "request_id": "req_1",
            "amount": 500,
            "receipt_url": "https://cdn/receipt.jpg",
            "status": "under_ai_review",
            "created_at": "2025-06-01T09:00:00.123456+00:00"
        }))
        .unwrap();
        assert_eq!(req.status, RequestStatus::Unknown);
        assert_eq!(req.amount, Decimal::from(500));
        assert!(req.created_at.is_some());
    }

    #[test]
    fn test_history_entry_type_field() {
        let entry: TopupHistoryEntry = serde_json::from_value(json!({
            "history_id": "hist_1", "amount": 100.0, "type": "ai_approved"
        }))
        .unwrap();
        assert_eq!(entry.kind.as_deref(), Some("ai_approved"));
        assert_eq!(entry.code, None);
    }
}
