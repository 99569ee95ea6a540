//! Loyalty models: level rewards, the prize wheel and missions.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tsmarket_core::{MissionId, MissionRewardKind, MissionType, PrizeId, PrizeKind, RewardId, RewardKind};

use super::timestamp;

/// A reward unlocked at a given level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub reward_id: RewardId,
    pub level_required: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub reward_type: RewardKind,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    /// Granted every tenth level.
    #[serde(default)]
    pub is_exclusive: bool,
    /// Set by the server for the requesting user.
    #[serde(default)]
    pub can_claim: bool,
    #[serde(default)]
    pub is_claimed: bool,
}

/// Body of admin reward create and update calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewardInput {
    pub level_required: u32,
    pub name: String,
    pub description: String,
    pub reward_type: RewardKind,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    pub is_exclusive: bool,
}

/// Answer to a reward claim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardClaim {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub reward: Option<Reward>,
}

/// A segment of the prize wheel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WheelPrize {
    pub prize_id: PrizeId,
    pub name: String,
    pub prize_type: PrizeKind,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    /// Share of spins landing here, `0.0..=1.0`.
    #[serde(with = "rust_decimal::serde::float")]
    pub probability: Decimal,
    #[serde(default)]
    pub color: String,
}

/// Body of admin wheel prize create and update calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WheelPrizeInput {
    pub name: String,
    pub prize_type: PrizeKind,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub probability: Decimal,
    pub color: String,
}

/// Answer to `POST /wheel/spin`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinResult {
    pub prize: WheelPrize,
    #[serde(default)]
    pub spins_remaining: u32,
}

/// A mission with the requesting user's progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    pub mission_id: MissionId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub mission_type: MissionType,
    #[serde(with = "rust_decimal::serde::float")]
    pub target_value: Decimal,
    pub reward_type: MissionRewardKind,
    #[serde(with = "rust_decimal::serde::float")]
    pub reward_value: Decimal,
    #[serde(default)]
    pub min_level: u32,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default, with = "timestamp")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub progress: Decimal,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub is_claimed: bool,
}

impl Mission {
    /// Completion in percent, capped at 100.
    #[must_use]
    pub fn percent_complete(&self) -> Decimal {
        if self.target_value <= Decimal::ZERO {
            return Decimal::ONE_HUNDRED;
        }
        (self.progress / self.target_value * Decimal::ONE_HUNDRED)
            .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
            .round_dp(1)
    }

    /// Returns `true` if the reward is waiting to be claimed.
    #[must_use]
    pub const fn is_claimable(&self) -> bool {
        self.is_completed && !self.is_claimed
    }
}

/// Body of admin mission create and update calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissionInput {
    pub title: String,
    pub description: String,
    pub mission_type: MissionType,
    #[serde(with = "rust_decimal::serde::float")]
    pub target_value: Decimal,
    pub reward_type: MissionRewardKind,
    #[serde(with = "rust_decimal::serde::float")]
    pub reward_value: Decimal,
    pub min_level: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

/// Answer to a mission claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionClaim {
    #[serde(default)]
    pub message: Option<String>,
    pub reward_type: MissionRewardKind,
    #[serde(with = "rust_decimal::serde::float")]
    pub reward_value: Decimal,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn mission(progress: f64, target: f64) -> Mission {
        serde_json::from_value(json!({
            "mission_id": "mission_1",
            "title": "Buy 5 things",
            "mission_type": "orders_count",
            "target_value": target,
            "reward_type": "coins",
            "reward_value": 50,
            "progress": progress,
            "is_completed": progress >= target,
        }))
        .unwrap()
    }

    #[test]
    fn test_mission_percent() {
        assert_eq!(mission(2.0, 5.0).percent_complete(), Decimal::from(40));
        assert_eq!(mission(9.0, 5.0).percent_complete(), Decimal::ONE_HUNDRED);
        assert!(mission(5.0, 5.0).is_claimable());
        assert!(!mission(4.0, 5.0).is_claimable());
    }

    #[test]
    fn test_spin_result_decodes() {
        let spin: SpinResult = serde_json::from_value(json!({
            "prize": {
                "prize_id": "prize_1", "name": "50 coins", "prize_type": "coins",
                "value": 50, "probability": 0.3, "color": "#0D9488"
            },
            "spins_remaining": 2
        }))
        .unwrap();
        assert_eq!(spin.prize.prize_type, PrizeKind::Coins);
        assert_eq!(spin.prize.probability, Decimal::new(3, 1));
        assert_eq!(spin.spins_remaining, 2);
    }
}
