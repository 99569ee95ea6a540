//! Courier commands.

use clap::Subcommand;
use tsmarket_core::OrderId;

use super::{CliError, Context, emit};

#[derive(Subcommand)]
pub enum DeliveryAction {
    /// Orders waiting for a courier
    Queue,
    /// Take an order for delivery
    Take { order_id: String },
}

pub async fn run(ctx: &Context, action: DeliveryAction) -> Result<(), CliError> {
    let user = ctx.current_user().await?;
    if !user.effective_role().can_deliver() {
        return Err(CliError::Usage(format!(
            "role {} cannot access the delivery queue",
            user.effective_role()
        )));
    }

    match action {
        DeliveryAction::Queue => emit(&ctx.client.delivery_queue().await?),
        DeliveryAction::Take { order_id } => {
            emit(&ctx.client.take_delivery(&OrderId::new(order_id)).await?)
        }
    }
}
