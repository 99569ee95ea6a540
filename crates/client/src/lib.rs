//! TSMarket storefront client.
//!
//! State orchestration for the gamified storefront: a typed REST client with
//! bearer-token sessions, a locally persisted cart, a TTL catalog cache,
//! checkout with client-side discount preview and a top-up status watcher.
//! All business authority (pricing, balances, stock, order state) lives on the
//! server; everything here is a non-authoritative read copy or a local
//! preview.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use tsmarket_client::{ApiClient, CartStore, ClientConfig, MemoryStore};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::from_env()?;
//! let storage = Arc::new(MemoryStore::new());
//! let client = ApiClient::new(&config, storage.clone())?;
//! let cart = CartStore::load(storage);
//!
//! let catalog = client.catalog_snapshot().await?;
//! if let Some(product) = catalog.products.first() {
//!     cart.add_item(product, 1, Default::default())?;
//! }
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod storage;
pub mod topup_watch;

pub use api::{ApiClient, CatalogSnapshot, ProductQuery};
pub use cart::{CartLine, CartStore, LineKey, LineOptions};
pub use checkout::{AppliedPromo, Checkout, CheckoutOutcome, CheckoutSummary, DeliveryDetails};
pub use config::{ClientConfig, ConfigError};
pub use error::{ClientError, ValidationError};
pub use session::SessionStore;
pub use storage::{CART_KEY, FileStore, KeyValueStore, MemoryStore, SESSION_TOKEN_KEY, StorageError};
pub use topup_watch::{PollVerdict, TopupWatch, WatchConfig, WatchOutcome};
