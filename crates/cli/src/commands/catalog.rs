//! Catalog browsing commands.

use clap::Subcommand;
use rust_decimal::Decimal;
use tsmarket_client::ProductQuery;
use tsmarket_core::{CategoryId, ProductId};

use super::{CliError, Context, emit};

#[derive(Subcommand)]
pub enum CatalogAction {
    /// List products. Without filters, shows the cached landing snapshot.
    List {
        #[arg(short, long)]
        search: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(long)]
        min_price: Option<Decimal>,
        #[arg(long)]
        max_price: Option<Decimal>,
        #[arg(long)]
        min_xp: Option<u32>,
        #[arg(long)]
        size: Option<String>,
        #[arg(long)]
        skip: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show one product with its reviews
    Show { product_id: String },
    /// List categories
    Categories {
        /// Nest subcategories under their parents
        #[arg(long)]
        tree: bool,
    },
    /// List product tags
    Tags,
    /// List storefront themes
    Themes,
}

pub async fn run(ctx: &Context, action: CatalogAction) -> Result<(), CliError> {
    match action {
        CatalogAction::List {
            search,
            category,
            min_price,
            max_price,
            min_xp,
            size,
            skip,
            limit,
        } => {
            let query = ProductQuery {
                category_id: category.map(CategoryId::from),
                search,
                min_price,
                max_price,
                min_xp,
                size,
                skip,
                limit,
            };
            if query == ProductQuery::default() {
                emit(&ctx.client.catalog_snapshot().await?)
            } else {
                emit(&ctx.client.products(&query).await?)
            }
        }
        CatalogAction::Show { product_id } => {
            let product_id = ProductId::new(product_id);
            let (product, reviews) = tokio::join!(
                ctx.client.product(&product_id),
                ctx.client.reviews(&product_id)
            );
            let product = product?;
            emit(&serde_json::json!({
                "product": product,
                "effective_price": product.effective_price(),
                "reviews": reviews?,
            }))
        }
        CatalogAction::Categories { tree } => emit(&ctx.client.categories(tree).await?),
        CatalogAction::Tags => emit(&ctx.client.tags().await?),
        CatalogAction::Themes => emit(&ctx.client.themes().await?),
    }
}
