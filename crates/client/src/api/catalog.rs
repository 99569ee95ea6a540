//! Catalog endpoints: products, categories, reviews, tags and themes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, instrument, warn};
use tsmarket_core::{CategoryId, ProductId};

use super::cache::{CacheKey, CacheValue};
use super::{ApiClient, CATALOG_SNAPSHOT_LIMIT};
use crate::error::ClientError;
use crate::models::{Category, Product, Review, ReviewInput, Tag, Theme};

/// Filters for `GET /products`. Unset fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProductQuery {
    #[serde(rename = "category", skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_xp: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl ProductQuery {
    /// Free-text search.
    #[must_use]
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            search: Some(text.into()),
            ..Self::default()
        }
    }

    /// Products of one category.
    #[must_use]
    pub fn in_category(category_id: CategoryId) -> Self {
        Self {
            category_id: Some(category_id),
            ..Self::default()
        }
    }
}

/// The catalog landing view: the first page of products and all categories.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogSnapshot {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    /// When the snapshot was fetched from the server.
    pub fetched_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct CategoryParams {
    hierarchical: bool,
}

impl ApiClient {
    /// List products matching `query`. Never cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products(&self, query: &ProductQuery) -> Result<Vec<Product>, ClientError> {
        self.get_query(&["products"], query).await
    }

    /// Get a single product, cached by id.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] for unknown ids, or an error if the
    /// API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn product(&self, product_id: &ProductId) -> Result<Product, ClientError> {
        let cache_key = CacheKey::Product(product_id.clone());

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product: Product = self.get(&["products", product_id.as_str()]).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// List categories, flat or as a tree of `subcategories`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self, hierarchical: bool) -> Result<Vec<Category>, ClientError> {
        self.get_query(&["categories"], &CategoryParams { hierarchical })
            .await
    }

    /// The catalog landing snapshot, served from cache while fresh.
    ///
    /// Products and categories are fetched concurrently and independently:
    /// if one of them fails the other is still returned (with the failed part
    /// empty), but such a partial snapshot is not cached.
    ///
    /// # Errors
    ///
    /// Returns an error only if both requests fail.
    #[instrument(skip(self))]
    pub async fn catalog_snapshot(&self) -> Result<CatalogSnapshot, ClientError> {
        if let Some(CacheValue::Catalog(snapshot)) = self.inner.cache.get(&CacheKey::Catalog).await {
            debug!(fetched_at = %snapshot.fetched_at, "Cache hit for catalog");
            return Ok(*snapshot);
        }

        let query = ProductQuery {
            limit: Some(CATALOG_SNAPSHOT_LIMIT),
            ..ProductQuery::default()
        };
        let (products, categories) = tokio::join!(self.products(&query), self.categories(false));

        let complete = products.is_ok() && categories.is_ok();
        let (products, categories) = match (products, categories) {
            (Err(products_err), Err(categories_err)) => {
                warn!(error = %categories_err, "Failed to load categories");
                return Err(products_err);
            }
            (products, categories) => (
                products.unwrap_or_else(|e| {
                    warn!(error = %e, "Failed to load products, showing empty list");
                    Vec::new()
                }),
                categories.unwrap_or_else(|e| {
                    warn!(error = %e, "Failed to load categories, showing empty list");
                    Vec::new()
                }),
            ),
        };

        let snapshot = CatalogSnapshot {
            products,
            categories,
            fetched_at: Utc::now(),
        };

        if complete {
            self.inner
                .cache
                .insert(CacheKey::Catalog, CacheValue::Catalog(Box::new(snapshot.clone())))
                .await;
        }

        Ok(snapshot)
    }

    /// Drop every cached catalog entry.
    pub fn invalidate_catalog(&self) {
        debug!("Invalidating catalog cache");
        self.inner.cache.invalidate_all();
    }

    /// Reviews of a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn reviews(&self, product_id: &ProductId) -> Result<Vec<Review>, ClientError> {
        self.get(&["reviews", product_id.as_str()]).await
    }

    /// Post a review. Requires a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, review), fields(product_id = %review.product_id))]
    pub async fn create_review(&self, review: &ReviewInput) -> Result<Review, ClientError> {
        self.post_json(&["reviews"], review).await
    }

    /// All product tags.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn tags(&self) -> Result<Vec<Tag>, ClientError> {
        self.get(&["tags"]).await
    }

    /// Available storefront themes.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn themes(&self) -> Result<Vec<Theme>, ClientError> {
        self.get(&["themes"]).await
    }
}
