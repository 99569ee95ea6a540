//! Catalog models: products, categories, reviews, tags and shop themes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tsmarket_core::{
    CategoryId, Percent, ProductId, ReviewId, TagId, ThemeId, UserId, apply_percent_off,
};

const fn default_xp_reward() -> u32 {
    10
}

const fn default_stock() -> u32 {
    100
}

const fn default_true() -> bool {
    true
}

fn default_tag_color() -> String {
    "#0D9488".to_string()
}

/// A catalog product.
///
/// `name`, `description` are the default-language texts; the `_ru` and `_tj`
/// variants are optional translations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: ProductId,
    pub name: String,
    #[serde(default)]
    pub name_ru: Option<String>,
    #[serde(default)]
    pub name_tj: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub description_ru: Option<String>,
    #[serde(default)]
    pub description_tj: Option<String>,
    /// List price, before the product's own discount.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default = "default_xp_reward")]
    pub xp_reward: u32,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default = "default_stock")]
    pub stock: u32,
    #[serde(default = "default_true")]
    pub in_stock: bool,
    #[serde(default)]
    pub arrival_date: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Discount set by an admin on this product, in percent.
    #[serde(default, with = "rust_decimal::serde::float")]
    pub discount_percent: Decimal,
    #[serde(default)]
    pub tags: Vec<TagId>,
    #[serde(default, with = "super::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    /// The product's own discount, clamped to `0..=100`.
    #[must_use]
    pub fn discount(&self) -> Percent {
        Percent::new(self.discount_percent)
    }

    /// Unit price after the product's own discount, before level and promo
    /// discounts.
    ///
    /// Not rounded: the server sums unrounded unit prices and rounds only
    /// the order total.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        apply_percent_off(self.price, self.discount())
    }

    /// Returns `true` if the product can be ordered.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.is_active && self.in_stock && self.stock > 0
    }

    /// Image to show first: the main image, else the first gallery image.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        if self.image_url.is_empty() {
            self.images.first().map(String::as_str)
        } else {
            Some(&self.image_url)
        }
    }
}

/// Body of admin product create and update calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_ru: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_tj: Option<String>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_ru: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_tj: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default = "default_xp_reward")]
    pub xp_reward: u32,
    pub category_id: CategoryId,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default = "default_stock")]
    pub stock: u32,
    #[serde(default = "default_true")]
    pub in_stock: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_date: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub discount_percent: Decimal,
    #[serde(default)]
    pub tags: Vec<TagId>,
}

/// A product category. Hierarchical listings nest children in
/// `subcategories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub category_id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub name_ru: Option<String>,
    #[serde(default)]
    pub name_tj: Option<String>,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
    #[serde(default)]
    pub is_parent: bool,
    #[serde(default)]
    pub subcategories: Vec<Self>,
}

impl Category {
    /// This category and all nested subcategories, depth first.
    #[must_use]
    pub fn flatten(&self) -> Vec<&Self> {
        let mut out = vec![self];
        for child in &self.subcategories {
            out.extend(child.flatten());
        }
        out
    }
}

/// Body of `POST /categories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_ru: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_tj: Option<String>,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CategoryId>,
}

/// A product review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub review_id: ReviewId,
    pub product_id: ProductId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub user_name: String,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(default, with = "super::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /reviews`. Ratings run from 1 to 5.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewInput {
    pub product_id: ProductId,
    pub rating: u8,
    pub comment: String,
}

/// A product tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub tag_id: TagId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default = "default_tag_color")]
    pub color: String,
}

/// Body of `POST /admin/tags`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagInput {
    pub name: String,
    pub slug: String,
    pub color: String,
}

/// A storefront visual theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub theme_id: ThemeId,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub hero_image: String,
    #[serde(default)]
    pub gradient: String,
    #[serde(default)]
    pub title_color: String,
    #[serde(default)]
    pub tagline: String,
    /// Built-in themes cannot be deleted.
    #[serde(default)]
    pub is_system: bool,
}

/// Body of `POST /admin/themes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeInput {
    pub name: String,
    pub icon: String,
    pub hero_image: String,
    pub gradient: String,
    pub title_color: String,
    pub tagline: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn product(price: f64, discount: f64) -> Product {
        serde_json::from_value(json!({
            "product_id": "prod_1",
            "name": "Hoodie",
            "price": price,
            "discount_percent": discount,
        }))
        .unwrap()
    }

    #[test]
    fn test_product_defaults() {
        let p = product(250.0, 0.0);
        assert_eq!(p.xp_reward, 10);
        assert_eq!(p.stock, 100);
        assert!(p.is_available());
        assert!(p.colors.is_empty());
        assert_eq!(p.primary_image(), None);
    }

    #[test]
    fn test_effective_price_applies_product_discount() {
        assert_eq!(product(250.0, 0.0).effective_price(), Decimal::from(250));
        assert_eq!(product(250.0, 20.0).effective_price(), Decimal::from(200));
        assert_eq!(product(99.99, 15.0).effective_price(), Decimal::new(849_915, 4));
    }

    #[test]
    fn test_category_tree_flattens() {
        let tree: Category = serde_json::from_value(json!({
            "category_id": "cat_root",
            "name": "Clothing",
            "slug": "clothing",
            "is_parent": true,
            "subcategories": [
                {"category_id": "cat_a", "name": "Hoodies", "slug": "hoodies", "parent_id": "cat_root"},
                {"category_id": "cat_b", "name": "Caps", "slug": "caps", "parent_id": "cat_root"}
            ]
        }))
        .unwrap();
        let ids: Vec<&str> = tree.flatten().iter().map(|c| c.category_id.as_str()).collect();
        assert_eq!(ids, ["cat_root", "cat_a", "cat_b"]);
    }
}
