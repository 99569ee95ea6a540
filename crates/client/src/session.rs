//! Bearer session token persistence.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

use crate::storage::{KeyValueStore, SESSION_TOKEN_KEY, StorageError};

/// Reads and writes the session token under [`SESSION_TOKEN_KEY`].
///
/// The token is read from storage on every request rather than cached, so a
/// logout in one handle is seen by every clone.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// The stored token, if any. Blank values count as absent.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn token(&self) -> Result<Option<SecretString>, StorageError> {
        Ok(self
            .storage
            .get(SESSION_TOKEN_KEY)?
            .filter(|token| !token.trim().is_empty())
            .map(SecretString::from))
    }

    /// Store a new token.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn set_token(&self, token: &SecretString) -> Result<(), StorageError> {
        self.storage.set(SESSION_TOKEN_KEY, token.expose_secret())
    }

    /// Forget the token.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(SESSION_TOKEN_KEY)
    }

    /// Returns `true` if a token is stored. Storage failures count as
    /// logged out.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self.token(), Ok(Some(_)))
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_token_lifecycle() {
        let storage = Arc::new(MemoryStore::new());
        let session = SessionStore::new(storage.clone());
        assert!(!session.is_authenticated());

        session.set_token(&SecretString::from("jwt.abc".to_string())).unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.token().unwrap().unwrap().expose_secret(), "jwt.abc");
        assert_eq!(
            storage.get(SESSION_TOKEN_KEY).unwrap().as_deref(),
            Some("jwt.abc")
        );

        session.clear().unwrap();
        assert!(session.token().unwrap().is_none());
    }

    #[test]
    fn test_blank_token_is_absent() {
        let storage = Arc::new(MemoryStore::new());
        storage.set(SESSION_TOKEN_KEY, "  ").unwrap();
        assert!(!SessionStore::new(storage).is_authenticated());
    }

    #[test]
    fn test_debug_redacts_token() {
        let session = SessionStore::new(Arc::new(MemoryStore::new()));
        session.set_token(&SecretString::from("super-secret".to_string())).unwrap();
        let debug = format!("{session:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
