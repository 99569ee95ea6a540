//! Back-office commands.
//!
//! # Usage
//!
//! ```bash
//! # Dashboard counters
//! tsm admin stats
//!
//! # Make someone a helper
//! tsm admin set-role user_1a2b3c helper
//!
//! # Review a top-up
//! tsm admin approve-topup tr_9f8e7d
//! tsm admin reject-topup tr_9f8e7d --note "Receipt unreadable"
//! ```
//!
//! The server enforces roles; these commands only check them up front to
//! give a clearer message.

use clap::Subcommand;
use rust_decimal::Decimal;
use tracing::info;
use tsmarket_client::models::{OrderStatusUpdate, PromoCodeInput, TopupCodeInput};
use tsmarket_core::{
    OrderId, OrderStatus, PromoId, Role, TicketId, TicketStatus, TopupRequestId, UserId,
};

use super::{CliError, Context, emit};

#[derive(Subcommand)]
pub enum AdminAction {
    /// Dashboard counters
    Stats,
    /// List all users
    Users,
    /// Change a user's role (`user`, `helper`, `admin`, `delivery`)
    SetRole { user_id: String, role: String },
    /// Set a user's balance
    SetBalance { user_id: String, balance: Decimal },
    /// Set a user's XP
    SetXp { user_id: String, xp: u64 },
    /// Pending and past top-up requests
    Topups,
    /// Approve a top-up request
    ApproveTopup { request_id: String },
    /// Reject a top-up request
    RejectTopup {
        request_id: String,
        #[arg(short, long)]
        note: Option<String>,
    },
    /// Mint a prepaid top-up code
    CreateTopupCode {
        code: String,
        amount: Decimal,
    },
    /// List all orders
    Orders,
    /// Move an order to a new status
    OrderStatus {
        order_id: String,
        status: String,
        #[arg(short, long)]
        note: Option<String>,
        #[arg(short, long)]
        tracking: Option<String>,
    },
    /// Accept a pending return and refund the customer
    ApproveReturn { order_id: String },
    /// List promo codes
    Promos,
    /// Create a promo code
    CreatePromo {
        code: String,
        percent: Decimal,
        #[arg(long, default_value_t = 100)]
        usage_limit: u32,
    },
    /// Activate or deactivate a promo code
    TogglePromo { promo_id: String },
    /// List support tickets
    Tickets,
    /// Answer a support ticket
    RespondTicket {
        ticket_id: String,
        response: String,
        /// Mark resolved instead of in progress
        #[arg(long)]
        resolve: bool,
    },
}

pub async fn run(ctx: &Context, action: AdminAction) -> Result<(), CliError> {
    let role = ctx.current_user().await?.effective_role();
    if !role.is_staff() || role == Role::Delivery {
        return Err(CliError::Usage(format!("role {role} has no back-office access")));
    }

    match action {
        AdminAction::Stats => emit(&ctx.client.admin_stats().await?),
        AdminAction::Users => emit(&ctx.client.admin_users().await?),
        AdminAction::SetRole { user_id, role } => {
            let role: Role = role.parse().map_err(CliError::Usage)?;
            emit(&ctx.client.set_user_role(&UserId::new(user_id), role).await?)
        }
        AdminAction::SetBalance { user_id, balance } => emit(
            &ctx.client
                .set_user_balance(&UserId::new(user_id), balance)
                .await?,
        ),
        AdminAction::SetXp { user_id, xp } => {
            let updated = ctx.client.set_user_xp(&UserId::new(user_id), xp).await?;
            info!(level = updated.new_level, "XP updated");
            emit(&updated)
        }
        AdminAction::Topups => emit(&ctx.client.admin_topup_requests().await?),
        AdminAction::ApproveTopup { request_id } => emit(
            &ctx.client
                .approve_topup(&TopupRequestId::new(request_id))
                .await?,
        ),
        AdminAction::RejectTopup { request_id, note } => emit(
            &ctx.client
                .reject_topup(&TopupRequestId::new(request_id), note.as_deref())
                .await?,
        ),
        AdminAction::CreateTopupCode { code, amount } => emit(
            &ctx.client
                .create_topup_code(&TopupCodeInput { code, amount })
                .await?,
        ),
        AdminAction::Orders => emit(&ctx.client.admin_orders().await?),
        AdminAction::OrderStatus {
            order_id,
            status,
            note,
            tracking,
        } => {
            let status: OrderStatus = status.parse().map_err(CliError::Usage)?;
            let update = OrderStatusUpdate {
                status,
                note,
                tracking_number: tracking,
            };
            emit(
                &ctx.client
                    .update_order_status(&OrderId::new(order_id), &update)
                    .await?,
            )
        }
        AdminAction::ApproveReturn { order_id } => {
            emit(&ctx.client.approve_return(&OrderId::new(order_id)).await?)
        }
        AdminAction::Promos => emit(&ctx.client.promo_codes().await?),
        AdminAction::CreatePromo {
            code,
            percent,
            usage_limit,
        } => emit(
            &ctx.client
                .create_promo_code(&PromoCodeInput {
                    code,
                    discount_percent: percent,
                    usage_limit,
                })
                .await?,
        ),
        AdminAction::TogglePromo { promo_id } => {
            emit(&ctx.client.toggle_promo_code(&PromoId::new(promo_id)).await?)
        }
        AdminAction::Tickets => emit(&ctx.client.admin_tickets().await?),
        AdminAction::RespondTicket {
            ticket_id,
            response,
            resolve,
        } => {
            let status = if resolve {
                TicketStatus::Resolved
            } else {
                TicketStatus::InProgress
            };
            emit(
                &ctx.client
                    .respond_to_ticket(&TicketId::new(ticket_id), &response, status)
                    .await?,
            )
        }
    }
}
