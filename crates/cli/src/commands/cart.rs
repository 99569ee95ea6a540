//! Local cart commands.

use clap::{Args, Subcommand};
use tsmarket_client::{LineKey, LineOptions};
use tsmarket_core::ProductId;

use super::{CliError, Context, emit};

/// Options identifying a cart line.
#[derive(Args)]
pub struct LineArgs {
    #[arg(long)]
    size: Option<String>,
    #[arg(long)]
    color: Option<String>,
    /// Free-text customization
    #[arg(long)]
    custom: Option<String>,
}

impl From<LineArgs> for LineOptions {
    fn from(args: LineArgs) -> Self {
        Self {
            size: args.size,
            color: args.color,
            custom_request: args.custom,
        }
    }
}

#[derive(Subcommand)]
pub enum CartAction {
    /// Add a product; repeats increase the quantity
    Add {
        product_id: String,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
        #[command(flatten)]
        line: LineArgs,
    },
    /// Remove a line
    Remove {
        product_id: String,
        #[command(flatten)]
        line: LineArgs,
    },
    /// Set a line's quantity; zero or less removes it
    Set {
        product_id: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
        #[command(flatten)]
        line: LineArgs,
    },
    /// Show the cart with totals
    Show,
    /// Empty the cart
    Clear,
}

pub async fn run(ctx: &Context, action: CartAction) -> Result<(), CliError> {
    match action {
        CartAction::Add {
            product_id,
            quantity,
            line,
        } => {
            let product = ctx.client.product(&ProductId::new(product_id)).await?;
            if !product.is_available() {
                return Err(CliError::Usage(format!("{} is out of stock", product.name)));
            }
            ctx.cart.add_item(&product, quantity, line.into())?;
            show(ctx)
        }
        CartAction::Remove { product_id, line } => {
            ctx.cart
                .remove_item(&LineKey::new(ProductId::new(product_id), line.into()))?;
            show(ctx)
        }
        CartAction::Set {
            product_id,
            quantity,
            line,
        } => {
            ctx.cart.update_quantity(
                &LineKey::new(ProductId::new(product_id), line.into()),
                quantity,
            )?;
            show(ctx)
        }
        CartAction::Show => show(ctx),
        CartAction::Clear => {
            ctx.cart.clear()?;
            show(ctx)
        }
    }
}

fn show(ctx: &Context) -> Result<(), CliError> {
    emit(&serde_json::json!({
        "lines": ctx.cart.lines(),
        "item_count": ctx.cart.item_count(),
        "total": ctx.cart.total(),
        "total_xp": ctx.cart.total_xp(),
    }))
}
