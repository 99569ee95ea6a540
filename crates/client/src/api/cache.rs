//! Cache types for catalog responses.

use tsmarket_core::ProductId;

use crate::models::Product;

use super::CatalogSnapshot;

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    /// The landing snapshot: first page of products plus categories.
    Catalog,
    Product(ProductId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Catalog(Box<CatalogSnapshot>),
    Product(Box<Product>),
}
