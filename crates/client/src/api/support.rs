//! Support endpoints.

use tracing::instrument;
use tsmarket_core::Email;

use super::ApiClient;
use crate::error::{ClientError, ValidationError};
use crate::models::{SupportContacts, SupportTicket, TicketCreated, TicketInput};

const TICKET_NAME_MIN: usize = 2;
const TICKET_SUBJECT_MIN: usize = 3;
const TICKET_MESSAGE_MIN: usize = 10;

impl ApiClient {
    /// Open a support ticket. Works without a session.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad email or a too short name,
    /// subject or message, or an error if the API request fails.
    #[instrument(skip(self, message))]
    pub async fn create_ticket(
        &self,
        name: &str,
        email: &str,
        subject: &str,
        message: &str,
    ) -> Result<TicketCreated, ClientError> {
        let (name, subject, message) = (name.trim(), subject.trim(), message.trim());
        if name.chars().count() < TICKET_NAME_MIN {
            return Err(ValidationError::NameTooShort {
                min: TICKET_NAME_MIN,
            }
            .into());
        }
        if subject.chars().count() < TICKET_SUBJECT_MIN {
            return Err(ValidationError::Required { field: "subject" }.into());
        }
        if message.chars().count() < TICKET_MESSAGE_MIN {
            return Err(ValidationError::Required { field: "message" }.into());
        }

        let body = TicketInput {
            name: name.to_string(),
            email: Email::parse(email).map_err(ValidationError::from)?,
            subject: subject.to_string(),
            message: message.to_string(),
        };
        self.post_json(&["support", "ticket"], &body).await
    }

    /// The user's tickets with staff responses.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn my_tickets(&self) -> Result<Vec<SupportTicket>, ClientError> {
        self.get(&["support", "tickets"]).await
    }

    /// Public support channels.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn support_contacts(&self) -> Result<SupportContacts, ClientError> {
        self.get(&["support", "contacts"]).await
    }
}
