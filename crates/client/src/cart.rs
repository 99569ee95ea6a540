//! Locally persisted shopping cart.
//!
//! The cart is owned by the device, not the server: it lives under
//! [`CART_KEY`] as a JSON array and is only sent to the API as order items at
//! checkout. Lines are identified by product plus options, so the same
//! product in two sizes is two lines.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use tsmarket_core::ProductId;

use crate::models::{OrderItemRequest, Product};
use crate::storage::{CART_KEY, KeyValueStore, StorageError};

/// Options that distinguish lines of the same product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LineOptions {
    pub size: Option<String>,
    pub color: Option<String>,
    /// Free-text customization requested by the buyer.
    pub custom_request: Option<String>,
}

/// Identity of a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineKey {
    pub product_id: ProductId,
    pub options: LineOptions,
}

impl LineKey {
    #[must_use]
    pub const fn new(product_id: ProductId, options: LineOptions) -> Self {
        Self {
            product_id,
            options,
        }
    }
}

/// One cart entry with a snapshot of the product taken when it was added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub product: Product,
    pub quantity: u32,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, rename = "customRequest")]
    pub custom_request: Option<String>,
}

impl CartLine {
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey::new(
            self.product_id.clone(),
            LineOptions {
                size: self.size.clone(),
                color: self.color.clone(),
                custom_request: self.custom_request.clone(),
            },
        )
    }

    fn matches(&self, key: &LineKey) -> bool {
        self.product_id == key.product_id
            && self.size == key.options.size
            && self.color == key.options.color
            && self.custom_request == key.options.custom_request
    }

    /// Effective unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.effective_price() * Decimal::from(self.quantity)
    }

    #[must_use]
    pub fn line_xp(&self) -> u64 {
        u64::from(self.product.xp_reward) * u64::from(self.quantity)
    }
}

/// The cart, persisted after every mutation.
pub struct CartStore {
    storage: Arc<dyn KeyValueStore>,
    lines: Mutex<Vec<CartLine>>,
}

impl CartStore {
    /// Load the cart from storage.
    ///
    /// Unreadable or corrupt data is discarded and the cart starts empty.
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let lines = match storage.get(CART_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<CartLine>>(&raw) {
                Ok(lines) => lines.into_iter().filter(|line| line.quantity > 0).collect(),
                Err(e) => {
                    warn!(error = %e, "Discarding corrupt stored cart");
                    if let Err(e) = storage.remove(CART_KEY) {
                        warn!(error = %e, "Failed to remove corrupt cart");
                    }
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read stored cart");
                Vec::new()
            }
        };
        debug!(lines = lines.len(), "Cart loaded");

        Self {
            storage,
            lines: Mutex::new(lines),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CartLine>> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, lines: &[CartLine]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(lines)?;
        self.storage.set(CART_KEY, &raw)
    }

    /// Apply `change` to a copy of the lines and keep it only once the copy
    /// is stored, so a failed write leaves the cart as it was.
    fn commit(&self, change: impl FnOnce(&mut Vec<CartLine>)) -> Result<(), StorageError> {
        let mut lines = self.lock();
        let mut next = lines.clone();
        change(&mut next);
        self.persist(&next)?;
        *lines = next;
        Ok(())
    }

    /// Add `quantity` of a product. An existing line with the same key has
    /// its quantity increased instead. Adding zero does nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted; the cart is then
    /// unchanged.
    pub fn add_item(
        &self,
        product: &Product,
        quantity: u32,
        options: LineOptions,
    ) -> Result<(), StorageError> {
        if quantity == 0 {
            return Ok(());
        }
        let key = LineKey::new(product.product_id.clone(), options);

        self.commit(|lines| {
            if let Some(line) = lines.iter_mut().find(|line| line.matches(&key)) {
                line.quantity = line.quantity.saturating_add(quantity);
            } else {
                lines.push(CartLine {
                    product_id: key.product_id,
                    product: product.clone(),
                    quantity,
                    size: key.options.size,
                    color: key.options.color,
                    custom_request: key.options.custom_request,
                });
            }
        })
    }

    /// Set a line's quantity. Zero or less removes the line; an unknown key
    /// is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted; the cart is then
    /// unchanged.
    pub fn update_quantity(&self, key: &LineKey, quantity: i64) -> Result<(), StorageError> {
        self.commit(|lines| {
            if quantity <= 0 {
                lines.retain(|line| !line.matches(key));
            } else if let Some(line) = lines.iter_mut().find(|line| line.matches(key)) {
                line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
            }
        })
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted; the cart is then
    /// unchanged.
    pub fn remove_item(&self, key: &LineKey) -> Result<(), StorageError> {
        self.commit(|lines| lines.retain(|line| !line.matches(key)))
    }

    /// Empty the cart and delete its stored copy.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored cart cannot be deleted; the cart is
    /// then unchanged.
    pub fn clear(&self) -> Result<(), StorageError> {
        let mut lines = self.lock();
        self.storage.remove(CART_KEY)?;
        lines.clear();
        Ok(())
    }

    /// A copy of the current lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.lock().clone()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Sum of effective unit price times quantity.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lock().iter().map(CartLine::line_total).sum()
    }

    /// XP the order would award.
    #[must_use]
    pub fn total_xp(&self) -> u64 {
        self.lock().iter().map(CartLine::line_xp).sum()
    }

    /// Number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lock().iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// The lines as order items for `POST /orders`.
    #[must_use]
    pub fn order_items(&self) -> Vec<OrderItemRequest> {
        self.lock()
            .iter()
            .map(|line| OrderItemRequest {
                product_id: line.product_id.clone(),
                quantity: line.quantity,
                size: line.size.clone(),
                color: line.color.clone(),
            })
            .collect()
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("lines", &self.lock().len())
            .finish_non_exhaustive()
    }
}
