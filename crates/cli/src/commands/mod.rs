//! CLI command implementations.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod delivery;
pub mod loyalty;
pub mod orders;
pub mod support;
pub mod wallet;

use std::io::Write;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tsmarket_client::models::User;
use tsmarket_client::{
    ApiClient, CartStore, ClientConfig, ClientError, ConfigError, FileStore, KeyValueStore,
    StorageError, ValidationError,
};

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("{0}")]
    Usage(String),
}

impl CliError {
    /// Message for the terminal: the server's detail when there is one.
    pub fn user_message(&self) -> String {
        match self {
            Self::Client(e) => e.user_message(&e.to_string()),
            other => other.to_string(),
        }
    }
}

impl From<ValidationError> for CliError {
    fn from(e: ValidationError) -> Self {
        Self::Client(e.into())
    }
}

/// Everything a command needs: config, API client and the local cart.
pub struct Context {
    pub config: ClientConfig,
    pub client: ApiClient,
    pub cart: Arc<CartStore>,
}

impl Context {
    pub fn new(api_url: Option<&str>) -> Result<Self, CliError> {
        let mut config = ClientConfig::from_env()?;
        if let Some(url) = api_url {
            config = config.with_api_url(url)?;
        }

        let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&config.storage_path));
        let client = ApiClient::new(&config, Arc::clone(&storage))?;
        let cart = Arc::new(CartStore::load(storage));

        tracing::debug!(api = %client.api_base(), storage = %config.storage_path.display(), "CLI context ready");
        Ok(Self {
            config,
            client,
            cart,
        })
    }

    /// The signed-in user, or an error if there is no valid session.
    pub async fn current_user(&self) -> Result<User, CliError> {
        self.client
            .refresh_user()
            .await?
            .ok_or_else(|| ValidationError::NotAuthenticated.into())
    }
}

/// Print a value as pretty JSON on stdout.
pub fn emit<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}
