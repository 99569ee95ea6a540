//! TSMarket CLI - Drive the storefront from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (the session token is kept in the local storage file)
//! tsm auth login -e ali@example.com -p secret123
//!
//! # Browse and fill the cart
//! tsm catalog list --search hoodie
//! tsm cart add prod_1a2b3c --quantity 2 --size M
//!
//! # Preview discounts, then order
//! tsm checkout quote --promo SPRING10
//! tsm checkout submit --address "Rudaki 12, Dushanbe" --phone "+992900000000" --promo SPRING10
//!
//! # Top up by card transfer and wait for approval
//! tsm wallet topup 200 --receipt ./receipt.jpg --watch
//! ```
//!
//! Every command prints its result as JSON on stdout; logs go to stderr.
//!
//! # Environment Variables
//!
//! - `TSMARKET_API_URL` - Backend base URL
//! - `TSMARKET_STORAGE_PATH` - Local storage file for cart and session
//! - `SENTRY_DSN` - Optional error reporting

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{Context, CliError};

#[derive(Parser)]
#[command(name = "tsm")]
#[command(author, version, about = "TSMarket storefront CLI")]
struct Cli {
    /// Override the backend base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register, sign in and out
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Browse products and categories
    Catalog {
        #[command(subcommand)]
        action: commands::catalog::CatalogAction,
    },
    /// Edit the local cart
    Cart {
        #[command(subcommand)]
        action: commands::cart::CartAction,
    },
    /// Preview and place an order
    Checkout {
        #[command(subcommand)]
        action: commands::checkout::CheckoutAction,
    },
    /// Check promo codes
    Promo {
        #[command(subcommand)]
        action: commands::checkout::PromoAction,
    },
    /// Balance top-ups, codes and withdrawals
    Wallet {
        #[command(subcommand)]
        action: commands::wallet::WalletAction,
    },
    /// Levels, rewards, wheel, missions and leaderboard
    Loyalty {
        #[command(subcommand)]
        action: commands::loyalty::LoyaltyAction,
    },
    /// Order history, tracking and returns
    Orders {
        #[command(subcommand)]
        action: commands::orders::OrdersAction,
    },
    /// Support tickets and contacts
    Support {
        #[command(subcommand)]
        action: commands::support::SupportAction,
    },
    /// Courier queue
    Delivery {
        #[command(subcommand)]
        action: commands::delivery::DeliveryAction,
    },
    /// Back-office operations
    Admin {
        #[command(subcommand)]
        action: commands::admin::AdminAction,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry() -> Option<sentry::ClientInitGuard> {
    let dsn = std::env::var("SENTRY_DSN").ok().filter(|dsn| !dsn.is_empty())?;

    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tsmarket_client=info,tsmarket_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {}", e.user_message());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let ctx = Context::new(cli.api_url.as_deref())?;

    match cli.command {
        Commands::Auth { action } => commands::auth::run(&ctx, action).await,
        Commands::Catalog { action } => commands::catalog::run(&ctx, action).await,
        Commands::Cart { action } => commands::cart::run(&ctx, action).await,
        Commands::Checkout { action } => commands::checkout::run(&ctx, action).await,
        Commands::Promo { action } => commands::checkout::run_promo(&ctx, action).await,
        Commands::Wallet { action } => commands::wallet::run(&ctx, action).await,
        Commands::Loyalty { action } => commands::loyalty::run(&ctx, action).await,
        Commands::Orders { action } => commands::orders::run(&ctx, action).await,
        Commands::Support { action } => commands::support::run(&ctx, action).await,
        Commands::Delivery { action } => commands::delivery::run(&ctx, action).await,
        Commands::Admin { action } => commands::admin::run(&ctx, action).await,
    }
}
