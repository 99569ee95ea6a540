//! Order and promo endpoints.

use serde::Serialize;
use tracing::instrument;
use tsmarket_core::OrderId;

use super::ApiClient;
use crate::error::ClientError;
use crate::models::{
    CreateOrderRequest, Order, OrderTracking, PlacedOrder, PromoValidation, ReturnRequested,
};

#[derive(Serialize)]
struct CodeParam<'a> {
    code: &'a str,
}

impl ApiClient {
    /// Place an order. The server prices it and charges the balance.
    ///
    /// Prefer [`crate::Checkout::submit`], which validates first and updates
    /// the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is rejected or the API request fails.
    #[instrument(skip(self, order), fields(items = order.items.len()))]
    pub async fn place_order(&self, order: &CreateOrderRequest) -> Result<PlacedOrder, ClientError> {
        self.post_json(&["orders"], order).await
    }

    /// The signed-in user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn orders(&self) -> Result<Vec<Order>, ClientError> {
        self.get(&["orders"]).await
    }

    /// Status and history of one of the user's orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is unknown or the API request fails.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn track_order(&self, order_id: &OrderId) -> Result<OrderTracking, ClientError> {
        self.get(&["orders", order_id.as_str(), "track"]).await
    }

    /// Ask for a return. Allowed within 24 hours of ordering.
    ///
    /// # Errors
    ///
    /// Returns an error if the return is refused or the API request fails.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn request_return(&self, order_id: &OrderId) -> Result<ReturnRequested, ClientError> {
        self.post_empty(&["orders", order_id.as_str(), "return-request"])
            .await
    }

    /// Check a promo code.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is unknown, inactive or used up.
    #[instrument(skip(self))]
    pub async fn validate_promo(&self, code: &str) -> Result<PromoValidation, ClientError> {
        self.post_query(&["promo", "validate"], &CodeParam { code })
            .await
    }
}
