//! Authentication endpoints and session lifecycle.

use tracing::{info, instrument, warn};
use tsmarket_core::Email;

use super::ApiClient;
use crate::error::{ClientError, ValidationError};
use crate::models::{
    Ack, AuthResponse, LoginRequest, RegisterRequest, RegisterResponse, SessionExchange, User,
    VerifyRequest,
};

/// Password length accepted by the server.
pub const PASSWORD_MIN_LEN: usize = 6;
pub const PASSWORD_MAX_LEN: usize = 128;

/// Shortest display name accepted by the server.
pub const NAME_MIN_LEN: usize = 2;

fn validate_password(password: &str) -> Result<(), ValidationError> {
    let len = password.chars().count();
    if (PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&len) {
        Ok(())
    } else {
        Err(ValidationError::PasswordLength {
            min: PASSWORD_MIN_LEN,
            max: PASSWORD_MAX_LEN,
        })
    }
}

impl ApiClient {
    /// Create an account. The server emails a verification code; finish with
    /// [`ApiClient::verify`].
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad email, password or name, or an
    /// error if the API request fails.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<RegisterResponse, ClientError> {
        let email = Email::parse(email).map_err(ValidationError::from)?;
        validate_password(password)?;
        let name = name.trim();
        if name.chars().count() < NAME_MIN_LEN {
            return Err(ValidationError::NameTooShort { min: NAME_MIN_LEN }.into());
        }

        let body = RegisterRequest {
            email,
            password: password.to_string(),
            name: name.to_string(),
        };
        self.post_json(&["auth", "register"], &body).await
    }

    /// Confirm a registration code and start a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is rejected or the token cannot be stored.
    #[instrument(skip(self, code))]
    pub async fn verify(&self, email: &str, code: &str) -> Result<User, ClientError> {
        let body = VerifyRequest {
            email: Email::parse(email).map_err(ValidationError::from)?,
            code: code.trim().to_string(),
        };
        let auth: AuthResponse = self.post_json(&["auth", "verify"], &body).await?;
        self.start_session(auth)
    }

    /// Sign in with email and password and store the session token.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the token cannot
    /// be stored.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ClientError> {
        let body = LoginRequest {
            email: Email::parse(email).map_err(ValidationError::from)?,
            password: password.to_string(),
        };
        let auth: AuthResponse = self.post_json(&["auth", "login"], &body).await?;
        self.start_session(auth)
    }

    /// Exchange a Google sign-in session id for a session token.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange is rejected or the token cannot be
    /// stored.
    #[instrument(skip(self, session_id))]
    pub async fn exchange_google_session(&self, session_id: &str) -> Result<User, ClientError> {
        let body = SessionExchange {
            session_id: session_id.to_string(),
        };
        let auth: AuthResponse = self.post_json(&["auth", "session"], &body).await?;
        self.start_session(auth)
    }

    /// The signed-in user.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Unauthorized`] without a valid session, or an
    /// error if the API request fails.
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<User, ClientError> {
        self.get(&["auth", "me"]).await
    }

    /// Refetch the user after a balance or XP change.
    ///
    /// Returns `None` when there is no session. A rejected token is cleared
    /// so the client falls back to the logged-out state.
    ///
    /// # Errors
    ///
    /// Returns an error for failures other than a rejected session.
    #[instrument(skip(self))]
    pub async fn refresh_user(&self) -> Result<Option<User>, ClientError> {
        if !self.session().is_authenticated() {
            return Ok(None);
        }
        match self.me().await {
            Ok(user) => Ok(Some(user)),
            Err(ClientError::Unauthorized { .. }) => {
                warn!("Stored session was rejected, clearing token");
                self.session().clear()?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// End the session.
    ///
    /// The server is told first; the local token is removed even if that
    /// call fails.
    ///
    /// # Errors
    ///
    /// Returns an error only if the local token cannot be removed.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ClientError> {
        if self.session().is_authenticated()
            && let Err(e) = self.post_empty::<Ack>(&["auth", "logout"]).await
        {
            warn!(error = %e, "Server logout failed, clearing local session anyway");
        }
        self.session().clear()?;
        info!("Logged out");
        Ok(())
    }

    fn start_session(&self, auth: AuthResponse) -> Result<User, ClientError> {
        self.session().set_token(&auth.token)?;
        info!(user_id = %auth.user.user_id, "Session started");
        Ok(auth.user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_bounds() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
        assert!(validate_password(&"x".repeat(128)).is_ok());
        assert!(validate_password(&"x".repeat(129)).is_err());
    }
}
