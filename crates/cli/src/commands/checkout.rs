//! Checkout and promo commands.

use std::sync::Arc;

use clap::Subcommand;
use tracing::info;
use tsmarket_client::{Checkout, DeliveryDetails};

use super::{CliError, Context, emit};

#[derive(Subcommand)]
pub enum CheckoutAction {
    /// Preview level, top-10 and promo discounts for the cart
    Quote {
        #[arg(long)]
        promo: Option<String>,
    },
    /// Place the order and pay from the balance
    Submit {
        #[arg(short, long)]
        address: String,
        #[arg(short, long)]
        phone: String,
        #[arg(long)]
        promo: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum PromoAction {
    /// Ask the server whether a code is valid
    Validate { code: String },
}

pub async fn run(ctx: &Context, action: CheckoutAction) -> Result<(), CliError> {
    let checkout = Checkout::new(ctx.client.clone(), Arc::clone(&ctx.cart));

    match action {
        CheckoutAction::Quote { promo } => {
            let user = ctx.current_user().await?;
            if let Some(code) = promo {
                checkout.apply_promo(&code).await?;
            }
            emit(&checkout.summary(&user).await)
        }
        CheckoutAction::Submit {
            address,
            phone,
            promo,
        } => {
            let user = ctx.client.refresh_user().await?;
            if let Some(code) = promo {
                checkout.apply_promo(&code).await?;
            }
            let outcome = checkout
                .submit(user.as_ref(), &DeliveryDetails { address, phone })
                .await?;
            if outcome.placed.level_up {
                info!(level = outcome.placed.new_level, "Level up!");
            }
            emit(&outcome.placed)
        }
    }
}

pub async fn run_promo(ctx: &Context, action: PromoAction) -> Result<(), CliError> {
    match action {
        PromoAction::Validate { code } => emit(&ctx.client.validate_promo(code.trim()).await?),
    }
}
