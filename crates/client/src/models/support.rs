//! Support tickets and contact channels.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tsmarket_core::{Email, TicketId, TicketStatus, UserId};

/// A support ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportTicket {
    pub ticket_id: TicketId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub subject: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: TicketStatus,
    #[serde(default)]
    pub admin_response: Option<String>,
    #[serde(default, with = "super::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /support/ticket`.
///
/// The server requires a name of at least 2, a subject of at least 3 and a
/// message of at least 10 characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketInput {
    pub name: String,
    pub email: Email,
    pub subject: String,
    pub message: String,
}

/// Answer to a ticket submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketCreated {
    #[serde(default)]
    pub message: Option<String>,
    pub ticket_id: TicketId,
}

/// Public support channels. Empty strings mean "not configured".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportContacts {
    #[serde(default)]
    pub telegram: String,
    #[serde(default)]
    pub whatsapp: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl SupportContacts {
    /// Configured channels as `(label, value)` pairs.
    #[must_use]
    pub fn channels(&self) -> Vec<(&'static str, &str)> {
        [
            ("telegram", self.telegram.as_str()),
            ("whatsapp", self.whatsapp.as_str()),
            ("email", self.email.as_str()),
            ("phone", self.phone.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_contacts_skip_empty_channels() {
        let contacts: SupportContacts =
            serde_json::from_value(json!({"telegram": "@tsmarket", "email": ""})).unwrap();
        assert_eq!(contacts.channels(), vec![("telegram", "@tsmarket")]);
    }

    #[test]
    fn test_ticket_status_decodes() {
        let ticket: SupportTicket = serde_json::from_value(json!({
            "ticket_id": "ticket_1",
            "subject": "Late order",
            "status": "in_progress"
        }))
        .unwrap();
        assert_eq!(ticket.status, TicketStatus::InProgress);
        assert_eq!(ticket.admin_response, None);
    }
}
