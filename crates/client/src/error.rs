//! Client error types.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::config::ConfigError;
use crate::storage::StorageError;

/// Errors returned by client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure: connection, timeout, TLS.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("API error ({status}): {}", detail.as_deref().unwrap_or("no detail"))]
    Api {
        status: u16,
        detail: Option<String>,
    },

    /// Missing, expired or rejected session token.
    #[error("Not authenticated: {}", detail.as_deref().unwrap_or("login required"))]
    Unauthorized { detail: Option<String> },

    #[error("Not found: {}", detail.as_deref().unwrap_or("resource does not exist"))]
    NotFound { detail: Option<String> },

    /// The response body did not match the expected shape.
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A client-side precondition failed; nothing was sent.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ClientError {
    /// Server-provided detail text, if the server sent one.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Api { detail, .. }
            | Self::Unauthorized { detail }
            | Self::NotFound { detail } => detail.as_deref(),
            _ => None,
        }
    }

    /// Message to show the user.
    ///
    /// Prefers the server's `detail`, then the text of a client-side
    /// validation failure, then `fallback`.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        if let Some(detail) = self.detail() {
            return detail.to_string();
        }
        match self {
            Self::Validation(e) => e.to_string(),
            _ => fallback.to_string(),
        }
    }

    /// HTTP status code for server-side failures.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Unauthorized { .. } => Some(401),
            Self::NotFound { .. } => Some(404),
            _ => None,
        }
    }

    /// Returns `true` if the session is missing or no longer accepted.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized { .. } | Self::Validation(ValidationError::NotAuthenticated)
        )
    }
}

/// Client-side precondition failures, checked before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("login required")]
    NotAuthenticated,

    #[error("cart is empty")]
    EmptyCart,

    #[error("delivery address must be at least {min} characters")]
    AddressTooShort { min: usize },

    #[error("phone number must be at least {min} characters")]
    PhoneTooShort { min: usize },

    #[error("insufficient balance: {required} required, {available} available")]
    InsufficientBalance {
        required: Decimal,
        available: Decimal,
    },

    #[error("promo code is not valid")]
    InvalidPromo,

    #[error("amount must be greater than zero")]
    InvalidAmount,

    #[error("amount exceeds balance of {available}")]
    AmountExceedsBalance { available: Decimal },

    #[error("a payment receipt is required")]
    MissingReceipt,

    #[error("card number must be at least {min} digits")]
    CardNumberTooShort { min: usize },

    #[error("card type is required")]
    MissingCardType,

    #[error("password must be between {min} and {max} characters")]
    PasswordLength { min: usize, max: usize },

    #[error("name must be at least {min} characters")]
    NameTooShort { min: usize },

    #[error("invalid email: {0}")]
    InvalidEmail(#[from] tsmarket_core::EmailError),

    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("status {0} cannot be set by staff")]
    StatusNotSettable(tsmarket_core::OrderStatus),

    #[error("{0} is not an image type")]
    NotAnImage(String),
}

/// Extract the `detail` of an error body.
///
/// Accepts `{"detail": "text"}` and the validation-error shape
/// `{"detail": [{"msg": "..."}, ...]}`, whose messages are joined.
pub(crate) fn parse_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        serde_json::Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(serde_json::Value::as_str))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_detail_string() {
        assert_eq!(
            parse_detail(r#"{"detail": "Insufficient balance"}"#).as_deref(),
            Some("Insufficient balance")
        );
    }

    #[test]
    fn test_parse_detail_validation_list() {
        let body = r#"{"detail": [
            {"loc": ["body", "email"], "msg": "value is not a valid email address", "type": "value_error"},
            {"loc": ["body", "password"], "msg": "field required", "type": "missing"}
        ]}"#;
        assert_eq!(
            parse_detail(body).as_deref(),
            Some("value is not a valid email address; field required")
        );
    }

    #[test]
    fn test_parse_detail_missing_or_garbage() {
        assert_eq!(parse_detail("Internal Server Error"), None);
        assert_eq!(parse_detail(r#"{"message": "x"}"#), None);
        assert_eq!(parse_detail(r#"{"detail": ""}"#), None);
        assert_eq!(parse_detail(r#"{"detail": []}"#), None);
    }

    #[test]
    fn test_user_message_prefers_detail() {
        let err = ClientError::Api {
            status: 400,
            detail: Some("Promo code expired".to_string()),
        };
        assert_eq!(err.user_message("Something went wrong"), "Promo code expired");

        let err = ClientError::Api {
            status: 502,
            detail: None,
        };
        assert_eq!(err.user_message("Something went wrong"), "Something went wrong");
    }

    #[test]
    fn test_user_message_for_validation() {
        let err = ClientError::from(ValidationError::EmptyCart);
        assert_eq!(err.user_message("fallback"), "cart is empty");
        assert!(ClientError::from(ValidationError::NotAuthenticated).is_unauthorized());
    }

    #[test]
    fn test_status() {
        assert_eq!(ClientError::NotFound { detail: None }.status(), Some(404));
        assert_eq!(ClientError::from(ValidationError::EmptyCart).status(), None);
    }
}
