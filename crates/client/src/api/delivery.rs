//! Courier endpoints.

use tracing::{info, instrument};
use tsmarket_core::OrderId;

use super::ApiClient;
use crate::error::ClientError;
use crate::models::{Order, TakenOrder};

impl ApiClient {
    /// Orders waiting for a courier, plus the ones this courier has taken.
    ///
    /// # Errors
    ///
    /// Returns an error without the delivery or admin role, or if the API
    /// request fails.
    #[instrument(skip(self))]
    pub async fn delivery_queue(&self) -> Result<Vec<Order>, ClientError> {
        self.get(&["delivery", "orders"]).await
    }

    /// Assign an order to the signed-in courier.
    ///
    /// # Errors
    ///
    /// Returns an error if the order was already taken or the API request
    /// fails.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn take_delivery(&self, order_id: &OrderId) -> Result<TakenOrder, ClientError> {
        let taken: TakenOrder = self
            .post_empty(&["delivery", "orders", order_id.as_str(), "take"])
            .await?;
        info!(status = %taken.status, "Delivery taken");
        Ok(taken)
    }
}
