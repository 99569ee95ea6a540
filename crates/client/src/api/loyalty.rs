//! Gamification endpoints: level rewards, wheel, missions, leaderboard.

use tracing::{info, instrument};
use tsmarket_core::MissionId;

use super::ApiClient;
use crate::error::ClientError;
use crate::models::{
    ActivityItem, LeaderboardEntry, Mission, MissionClaim, Reward, RewardClaim, SpinResult,
    WheelPrize,
};

impl ApiClient {
    /// Level rewards with the user's claim state.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn rewards(&self) -> Result<Vec<Reward>, ClientError> {
        self.get(&["rewards"]).await
    }

    /// Claim the reward unlocked at `level`.
    ///
    /// # Errors
    ///
    /// Returns an error if the level is not reached, the reward was already
    /// claimed, or the API request fails.
    #[instrument(skip(self))]
    pub async fn claim_reward(&self, level: u32) -> Result<RewardClaim, ClientError> {
        let level = level.to_string();
        self.post_empty(&["rewards", "claim", &level]).await
    }

    /// Prizes on the wheel.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn wheel_prizes(&self) -> Result<Vec<WheelPrize>, ClientError> {
        self.get(&["wheel", "prizes"]).await
    }

    /// Spend one wheel spin. The prize is credited by the server.
    ///
    /// # Errors
    ///
    /// Returns an error if no spins are left or the API request fails.
    #[instrument(skip(self))]
    pub async fn spin_wheel(&self) -> Result<SpinResult, ClientError> {
        let result: SpinResult = self.post_empty(&["wheel", "spin"]).await?;
        info!(prize = %result.prize.name, spins_remaining = result.spins_remaining, "Wheel spun");
        Ok(result)
    }

    /// Active missions with the user's progress.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn missions(&self) -> Result<Vec<Mission>, ClientError> {
        self.get(&["missions"]).await
    }

    /// Collect the reward of a completed mission.
    ///
    /// # Errors
    ///
    /// Returns an error if the mission is not completed, already claimed, or
    /// the API request fails.
    #[instrument(skip(self), fields(mission_id = %mission_id))]
    pub async fn claim_mission(&self, mission_id: &MissionId) -> Result<MissionClaim, ClientError> {
        self.post_empty(&["missions", mission_id.as_str(), "claim"])
            .await
    }

    /// Users ranked by XP.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, ClientError> {
        self.get(&["gamification", "leaderboard"]).await
    }

    /// Recent public activity.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn activity_feed(&self) -> Result<Vec<ActivityItem>, ClientError> {
        self.get(&["gamification", "activity"]).await
    }
}
