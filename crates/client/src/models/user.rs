//! Accounts, authentication payloads and gamification feeds.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tsmarket_core::{Email, Role, UserId, loyalty};

/// The signed-in account as returned by `/auth/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    #[serde(default)]
    pub xp: u64,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub wheel_spins_available: u32,
    /// Levels whose reward has already been claimed.
    #[serde(default)]
    pub claimed_rewards: Vec<u32>,
    #[serde(default, with = "super::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

const fn default_level() -> u32 {
    1
}

impl User {
    /// Role with the legacy `is_admin` flag folded in.
    #[must_use]
    pub const fn effective_role(&self) -> Role {
        if self.is_admin {
            Role::Admin
        } else {
            self.role
        }
    }

    /// Progress through the current level.
    #[must_use]
    pub fn level_progress(&self) -> loyalty::LevelProgress {
        loyalty::progress(self.level, self.xp)
    }

    /// Whether the level reward for `level_required` can be claimed now.
    #[must_use]
    pub fn can_claim_reward(&self, level_required: u32) -> bool {
        loyalty::reward_claimable(self.level, level_required, &self.claimed_rewards)
    }
}

/// Body of `POST /auth/register`.
#[derive(Clone, Serialize)]
pub struct RegisterRequest {
    pub email: Email,
    pub password: String,
    pub name: String,
}

/// Answer to a registration: a verification code was sent to `email`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Body of `POST /auth/login`.
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub email: Email,
    pub password: String,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("name", &self.name)
            .finish()
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Body of `POST /auth/verify`.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyRequest {
    pub email: Email,
    pub code: String,
}

/// Body of `POST /auth/session` (Google sign-in exchange).
#[derive(Debug, Clone, Serialize)]
pub struct SessionExchange {
    pub session_id: String,
}

/// A signed-in user together with a fresh bearer token.
#[derive(Clone, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    #[serde(deserialize_with = "deserialize_secret")]
    pub token: SecretString,
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: serde::Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

impl std::fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthResponse")
            .field("user", &self.user)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Leaderboard row, ordered by rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub user_id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub xp: u64,
}

/// Whether `user_id` is among the first ten leaderboard entries.
#[must_use]
pub fn is_top10(leaderboard: &[LeaderboardEntry], user_id: &UserId) -> bool {
    leaderboard
        .iter()
        .take(10)
        .any(|entry| &entry.user_id == user_id)
}

/// Public activity feed item (level ups, purchases, achievements).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityItem {
    #[serde(default)]
    pub activity_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub activity_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, with = "super::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}
