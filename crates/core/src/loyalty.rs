//! XP and level arithmetic.
//!
//! Leaving level `l` costs `100 + 50 * l` XP, so the total XP needed to reach
//! level `L` grows quadratically:
//!
//! ```text
//! total(L) = sum_{l=1}^{L-1} (100 + 50 l) = 100 (L - 1) + 25 L (L - 1)
//! ```

use serde::{Deserialize, Serialize};

/// XP cost of the first level step.
pub const BASE_LEVEL_XP: u64 = 100;

/// Additional XP per level for each step.
pub const LEVEL_XP_STEP: u64 = 50;

/// XP needed to advance from `level` to `level + 1`.
#[must_use]
pub const fn xp_to_advance(level: u32) -> u64 {
    BASE_LEVEL_XP + level as u64 * LEVEL_XP_STEP
}

/// Total XP accumulated when a user first reaches `level`.
///
/// Saturates at `u64::MAX` for levels beyond about 8.6e8.
#[must_use]
pub const fn total_xp_for_level(level: u32) -> u64 {
    if level <= 1 {
        return 0;
    }
    let l = level as u64;
    (LEVEL_XP_STEP / 2)
        .saturating_mul(l)
        .saturating_mul(l - 1)
        .saturating_add(BASE_LEVEL_XP * (l - 1))
}

/// Level reached with `xp` total experience.
#[must_use]
pub const fn level_for_xp(xp: u64) -> u32 {
    // Largest level whose threshold is at most `xp`; thresholds never decrease.
    let mut low: u32 = 1;
    let mut high: u32 = u32::MAX;
    while low < high {
        let mid = low + (high - low) / 2 + 1;
        if total_xp_for_level(mid) <= xp {
            low = mid;
        } else {
            high = mid - 1;
        }
    }
    low
}

/// Progress of a user through their current level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelProgress {
    pub level: u32,
    /// XP earned since reaching `level`.
    pub xp_into_level: u64,
    /// XP span of the current level.
    pub xp_for_level: u64,
    /// XP still missing to reach `level + 1`.
    pub xp_to_next: u64,
    /// Completion of the current level in percent, capped at 100.
    pub percent: f64,
}

/// Progress of a user with the server-reported `level` and `xp`.
///
/// The reported level is trusted even if it disagrees with [`level_for_xp`];
/// admins can edit XP and level independently.
#[must_use]
pub fn progress(level: u32, xp: u64) -> LevelProgress {
    let level = level.max(1);
    let floor = total_xp_for_level(level);
    let xp_for_level = total_xp_for_level(level.saturating_add(1)).saturating_sub(floor);
    let xp_into_level = xp.saturating_sub(floor).min(xp_for_level);

    #[allow(clippy::cast_precision_loss)] // XP values stay far below 2^52
    let percent = if xp_for_level == 0 {
        100.0
    } else {
        (xp_into_level as f64 / xp_for_level as f64 * 100.0).min(100.0)
    };

    LevelProgress {
        level,
        xp_into_level,
        xp_for_level,
        xp_to_next: xp_for_level - xp_into_level,
        percent,
    }
}

/// Level change caused by gaining XP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelChange {
    pub from: u32,
    pub to: u32,
}

impl LevelChange {
    /// Returns `true` if at least one level was gained.
    #[must_use]
    pub const fn is_level_up(self) -> bool {
        self.to > self.from
    }

    /// Levels gained. Each one grants a wheel spin on the server.
    #[must_use]
    pub const fn levels_gained(self) -> u32 {
        self.to.saturating_sub(self.from)
    }
}

/// Level change after adding `gained` XP to `current_xp`.
#[must_use]
pub const fn preview_level_change(current_xp: u64, gained: u64) -> LevelChange {
    LevelChange {
        from: level_for_xp(current_xp),
        to: level_for_xp(current_xp.saturating_add(gained)),
    }
}

/// Whether a level reward can be claimed.
#[must_use]
pub fn reward_claimable(user_level: u32, level_required: u32, claimed_rewards: &[u32]) -> bool {
    user_level >= level_required && !claimed_rewards.contains(&level_required)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Step-by-step sum, used to check the closed form.
    fn total_by_loop(level: u32) -> u64 {
        (1..level).map(xp_to_advance).sum()
    }

    #[test]
    fn test_total_xp_closed_form_matches_sum() {
        for level in 1..=60 {
            assert_eq!(total_xp_for_level(level), total_by_loop(level), "level {level}");
        }
        assert_eq!(total_xp_for_level(2), 150);
        assert_eq!(total_xp_for_level(3), 350);
    }

    #[test]
    fn test_level_boundaries() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(149), 1);
        assert_eq!(level_for_xp(150), 2);
        assert_eq!(level_for_xp(349), 2);
        assert_eq!(level_for_xp(350), 3);
    }

    #[test]
    fn test_level_for_xp_inverts_total() {
        for level in 1..=80 {
            assert_eq!(level_for_xp(total_xp_for_level(level)), level);
            if level > 1 {
                assert_eq!(level_for_xp(total_xp_for_level(level) - 1), level - 1);
            }
        }
    }

    #[test]
    fn test_progress_mid_level() {
        let p = progress(2, 250);
        assert_eq!(p.xp_into_level, 100);
        assert_eq!(p.xp_for_level, 200);
        assert_eq!(p.xp_to_next, 100);
        assert!((p.percent - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_progress_clamps_inconsistent_values() {
        // Admin set XP above the level's span without raising the level.
        let p = progress(1, 10_000);
        assert!((p.percent - 100.0).abs() < f64::EPSILON);
        assert_eq!(p.xp_to_next, 0);

        // XP below the level floor.
        let p = progress(5, 0);
        assert_eq!(p.xp_into_level, 0);
    }

    #[test]
    fn test_extreme_values_do_not_overflow() {
        assert_eq!(total_xp_for_level(u32::MAX), u64::MAX);
        assert!(total_xp_for_level(1_000_000) < total_xp_for_level(1_000_001));

        let top = progress(u32::MAX, u64::MAX);
        assert_eq!(top.level, u32::MAX);
        assert_eq!(top.xp_to_next, 0);
        assert!((top.percent - 100.0).abs() < f64::EPSILON);

        let p = progress(1_000_000_000, 0);
        assert_eq!(p.xp_into_level, 0);
        assert!(p.percent.is_finite());

        assert_eq!(level_for_xp(u64::MAX), u32::MAX);
        assert_eq!(preview_level_change(u64::MAX, 1).levels_gained(), 0);
    }

    #[test]
    fn test_preview_level_change() {
        let change = preview_level_change(100, 300);
        assert_eq!(change, LevelChange { from: 1, to: 3 });
        assert!(change.is_level_up());
        assert_eq!(change.levels_gained(), 2);

        assert!(!preview_level_change(0, 10).is_level_up());
    }

    #[test]
    fn test_reward_claimable() {
        assert!(reward_claimable(5, 5, &[2]));
        assert!(!reward_claimable(4, 5, &[]));
        assert!(!reward_claimable(6, 5, &[2, 5]));
    }
}
