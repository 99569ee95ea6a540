//! Order history commands.

use chrono::Utc;
use clap::Subcommand;
use serde_json::json;
use tsmarket_core::OrderId;

use super::{CliError, Context, emit};

#[derive(Subcommand)]
pub enum OrdersAction {
    /// The signed-in user's orders
    List,
    /// Status history of one order
    Track { order_id: String },
    /// Ask to return an order (within 24 hours)
    Return { order_id: String },
}

pub async fn run(ctx: &Context, action: OrdersAction) -> Result<(), CliError> {
    match action {
        OrdersAction::List => {
            let now = Utc::now();
            let rows: Vec<_> = ctx
                .client
                .orders()
                .await?
                .into_iter()
                .map(|order| {
                    let returnable = order.return_allowed_at(now);
                    json!({ "order": order, "returnable": returnable })
                })
                .collect();
            emit(&rows)
        }
        OrdersAction::Track { order_id } => {
            emit(&ctx.client.track_order(&OrderId::new(order_id)).await?)
        }
        OrdersAction::Return { order_id } => {
            emit(&ctx.client.request_return(&OrderId::new(order_id)).await?)
        }
    }
}
