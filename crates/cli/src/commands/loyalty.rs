//! Gamification commands.

use clap::Subcommand;
use serde_json::json;
use tracing::info;
use tsmarket_client::models::is_top10;
use tsmarket_core::MissionId;
use tsmarket_core::pricing::level_discount_percent;

use super::{CliError, Context, emit};

#[derive(Subcommand)]
pub enum LoyaltyAction {
    /// Level, XP progress and current discount
    Level,
    /// Level rewards and which can be claimed
    Rewards,
    /// Claim the reward unlocked at a level
    ClaimReward { level: u32 },
    /// List wheel prizes
    Prizes,
    /// Spend a wheel spin
    Spin,
    /// Active missions with progress
    Missions,
    /// Collect a completed mission's reward
    ClaimMission { mission_id: String },
    /// Top users by XP
    Leaderboard,
    /// Recent public activity
    Activity,
}

pub async fn run(ctx: &Context, action: LoyaltyAction) -> Result<(), CliError> {
    match action {
        LoyaltyAction::Level => {
            let user = ctx.current_user().await?;
            let leaderboard = ctx.client.leaderboard().await?;
            let top10 = is_top10(&leaderboard, &user.user_id);
            emit(&json!({
                "level": user.level,
                "xp": user.xp,
                "progress": user.level_progress(),
                "level_discount": level_discount_percent(user.level),
                "top10": top10,
                "wheel_spins_available": user.wheel_spins_available,
            }))
        }
        LoyaltyAction::Rewards => emit(&ctx.client.rewards().await?),
        LoyaltyAction::ClaimReward { level } => {
            let user = ctx.current_user().await?;
            if !user.can_claim_reward(level) {
                return Err(CliError::Usage(format!(
                    "the level {level} reward is not claimable at level {}",
                    user.level
                )));
            }
            emit(&ctx.client.claim_reward(level).await?)
        }
        LoyaltyAction::Prizes => emit(&ctx.client.wheel_prizes().await?),
        LoyaltyAction::Spin => {
            let result = ctx.client.spin_wheel().await?;
            info!(prize = %result.prize.name, "You won");
            emit(&result)
        }
        LoyaltyAction::Missions => {
            let missions = ctx.client.missions().await?;
            let rows: Vec<_> = missions
                .iter()
                .map(|m| {
                    json!({
                        "mission": m,
                        "percent_complete": m.percent_complete(),
                        "claimable": m.is_claimable(),
                    })
                })
                .collect();
            emit(&rows)
        }
        LoyaltyAction::ClaimMission { mission_id } => {
            emit(&ctx.client.claim_mission(&MissionId::new(mission_id)).await?)
        }
        LoyaltyAction::Leaderboard => emit(&ctx.client.leaderboard().await?),
        LoyaltyAction::Activity => emit(&ctx.client.activity_feed().await?),
    }
}
