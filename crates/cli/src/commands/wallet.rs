//! Wallet commands: top-ups, codes and withdrawals.

use std::path::Path;

use clap::Subcommand;
use rust_decimal::Decimal;
use serde_json::json;
use tracing::info;
use tsmarket_client::models::{Receipt, WithdrawalInput};
use tsmarket_client::{TopupWatch, WatchConfig, WatchOutcome};

use super::{CliError, Context, emit};

#[derive(Subcommand)]
pub enum WalletAction {
    /// Show where to transfer money for a top-up
    Settings,
    /// Request a top-up after a card transfer
    Topup {
        amount: Decimal,
        /// Receipt image file or URL
        #[arg(short, long)]
        receipt: String,
        /// Wait for staff approval
        #[arg(short, long)]
        watch: bool,
    },
    /// Wait for a pending top-up to be approved
    Watch,
    /// Redeem a prepaid top-up code
    Redeem { code: String },
    /// Ask for a payout to a bank card
    Withdraw {
        amount: Decimal,
        #[arg(long)]
        card_number: String,
        /// Card network or bank, e.g. "Visa" or "Korti Milli"
        #[arg(long)]
        card_type: String,
    },
    /// Top-up history, requests and withdrawals
    History,
    /// Shop bank cards
    Cards,
}

pub async fn run(ctx: &Context, action: WalletAction) -> Result<(), CliError> {
    match action {
        WalletAction::Settings => emit(&ctx.client.topup_settings().await?),
        WalletAction::Topup {
            amount,
            receipt,
            watch,
        } => {
            let receipt = load_receipt(&receipt).await?;
            let request = ctx.client.request_topup(amount, &receipt).await?;
            emit(&request)?;
            if watch {
                watch_topups(ctx).await?;
            }
            Ok(())
        }
        WalletAction::Watch => watch_topups(ctx).await,
        WalletAction::Redeem { code } => emit(&ctx.client.redeem_code(&code).await?),
        WalletAction::Withdraw {
            amount,
            card_number,
            card_type,
        } => {
            let user = ctx.current_user().await?;
            let input = WithdrawalInput {
                amount,
                card_number,
                card_type,
            };
            emit(&ctx.client.request_withdrawal(&input, user.balance).await?)
        }
        WalletAction::History => {
            let (history, requests, withdrawals) = tokio::join!(
                ctx.client.topup_history(),
                ctx.client.topup_requests(),
                ctx.client.withdrawal_requests()
            );
            emit(&json!({
                "history": history?,
                "topup_requests": requests?,
                "withdrawals": withdrawals?,
            }))
        }
        WalletAction::Cards => emit(&ctx.client.bank_cards().await?),
    }
}

async fn watch_topups(ctx: &Context) -> Result<(), CliError> {
    let config = WatchConfig::from(&ctx.config);
    info!(
        every_secs = config.poll_interval.as_secs(),
        for_secs = config.max_duration.as_secs(),
        "Waiting for top-up approval"
    );

    let watch = TopupWatch::spawn(ctx.client.clone(), config);
    let outcome = tokio::select! {
        outcome = watch.wait() => outcome,
        _ = tokio::signal::ctrl_c() => WatchOutcome::Cancelled,
    };

    match outcome {
        WatchOutcome::Approved(request) => {
            let user = ctx.current_user().await?;
            emit(&json!({
                "outcome": "approved",
                "request": request,
                "balance": user.balance,
            }))
        }
        WatchOutcome::NoPending => emit(&json!({ "outcome": "no_pending" })),
        WatchOutcome::TimedOut => emit(&json!({ "outcome": "timed_out" })),
        WatchOutcome::Cancelled => emit(&json!({ "outcome": "cancelled" })),
    }
}

async fn load_receipt(source: &str) -> Result<Receipt, CliError> {
    if source.starts_with("http://") || source.starts_with("https://") {
        return Ok(Receipt::Url(source.to_string()));
    }

    let path = Path::new(source);
    let mime = image_mime(path)
        .ok_or_else(|| CliError::Usage(format!("{source} is not a PNG, JPEG, WebP or GIF image")))?;
    let bytes = tokio::fs::read(path).await?;
    Ok(Receipt::Image {
        mime: mime.to_string(),
        bytes,
    })
}

fn image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}
