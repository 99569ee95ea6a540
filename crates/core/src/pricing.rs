//! Checkout discount composition.
//!
//! Computes the payable amount shown before an order is submitted. The server
//! recomputes the charge on order creation and is authoritative; this is a
//! preview only.
//!
//! Discounts apply in sequence:
//!
//! 1. A level discount: `level` percent up to level 10, then half a percent
//!    per level above 10.
//! 2. For top-10 leaderboard members, both the level and the promo percent
//!    are doubled.
//! 3. The promo discount applies to the amount left after the level discount.
//! 4. The final total is rounded to two decimal places.
//!
//! # Example
//!
//! ```
//! use rust_decimal::Decimal;
//! use tsmarket_core::Percent;
//! use tsmarket_core::pricing::{DiscountInputs, quote};
//!
//! let quote = quote(&DiscountInputs {
//!     subtotal: Decimal::from(1000),
//!     user_level: 5,
//!     is_top10: false,
//!     promo_percent: Percent::whole(10),
//! });
//! assert_eq!(quote.final_total, Decimal::from(855));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::money::{Percent, round_money};

/// Level above which each further level only adds half a percent.
pub const LEVEL_DISCOUNT_KNEE: u32 = 10;

/// Cap applied when the level discount is shown on admin screens.
pub const ADMIN_DISPLAY_LEVEL_DISCOUNT_CAP: u32 = 15;

/// Inputs to the discount preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscountInputs {
    /// Sum of line price times quantity.
    pub subtotal: Decimal,
    /// The user's level. Values below 1 are treated as 1.
    pub user_level: u32,
    /// Top-10 leaderboard status. Always false for admins.
    pub is_top10: bool,
    /// Discount of a validated promo code, zero if none.
    pub promo_percent: Percent,
}

/// Discount breakdown for the checkout summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutQuote {
    pub subtotal: Decimal,
    /// Effective level percent, after top-10 doubling.
    pub level_discount_percent: Percent,
    /// Effective promo percent, after top-10 doubling.
    pub promo_discount_percent: Percent,
    pub level_discount_amount: Decimal,
    pub after_level: Decimal,
    pub promo_discount_amount: Decimal,
    /// Amount the user is expected to pay, rounded to cents.
    pub final_total: Decimal,
    /// Level plus promo discount, rounded to cents.
    pub total_saved: Decimal,
}

/// Level discount percent for a user level, before any top-10 doubling.
///
/// There is no cap past level 10 beyond the 100% ceiling of [`Percent`].
#[must_use]
pub fn level_discount_percent(user_level: u32) -> Percent {
    let level = user_level.max(1);
    if level <= LEVEL_DISCOUNT_KNEE {
        return Percent::whole(level);
    }
    let extra = Decimal::from(level - LEVEL_DISCOUNT_KNEE) * Decimal::new(5, 1);
    Percent::new(Decimal::from(LEVEL_DISCOUNT_KNEE) + extra)
}

/// Level discount as shown on admin screens, capped at 15%.
#[must_use]
pub fn admin_display_level_discount(user_level: u32) -> Percent {
    level_discount_percent(user_level).capped_at(Percent::whole(ADMIN_DISPLAY_LEVEL_DISCOUNT_CAP))
}

/// Compose level, top-10 and promo discounts into a checkout quote.
#[must_use]
pub fn quote(inputs: &DiscountInputs) -> CheckoutQuote {
    let subtotal = inputs.subtotal.max(Decimal::ZERO);

    let mut level_percent = level_discount_percent(inputs.user_level);
    let mut promo_percent = inputs.promo_percent;
    if inputs.is_top10 {
        level_percent = level_percent.doubled();
        promo_percent = promo_percent.doubled();
    }

    let level_discount_amount = level_percent.of(subtotal);
    let after_level = subtotal - level_discount_amount;
    let promo_discount_amount = promo_percent.of(after_level);

    CheckoutQuote {
        subtotal,
        level_discount_percent: level_percent,
        promo_discount_percent: promo_percent,
        level_discount_amount,
        after_level,
        promo_discount_amount,
        final_total: round_money(after_level - promo_discount_amount),
        total_saved: round_money(level_discount_amount + promo_discount_amount),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(subtotal: i64, level: u32, top10: bool, promo: u32) -> DiscountInputs {
        DiscountInputs {
            subtotal: Decimal::from(subtotal),
            user_level: level,
            is_top10: top10,
            promo_percent: Percent::whole(promo),
        }
    }

    #[test]
    fn test_level_percent_equals_level_up_to_ten() {
        for level in 1..=10 {
            let q = quote(&inputs(100, level, false, 0));
            assert_eq!(q.level_discount_percent, Percent::whole(level));
        }
    }

    #[test]
    fn test_level_percent_above_ten_adds_half_percent() {
        assert_eq!(
            level_discount_percent(15).value(),
            Decimal::new(125, 1),
            "10 + 5 * 0.5"
        );
        assert_eq!(level_discount_percent(30).value(), Decimal::from(20));
    }

    #[test]
    fn test_level_zero_is_treated_as_one() {
        assert_eq!(level_discount_percent(0), Percent::whole(1));
    }

    #[test]
    fn test_admin_display_caps_at_fifteen() {
        assert_eq!(admin_display_level_discount(12), Percent::whole(11));
        assert_eq!(admin_display_level_discount(40), Percent::whole(15));
    }

    #[test]
    fn test_reference_example() {
        let q = quote(&inputs(1000, 5, false, 10));
        assert_eq!(q.level_discount_amount, Decimal::from(50));
        assert_eq!(q.after_level, Decimal::from(950));
        assert_eq!(q.promo_discount_amount, Decimal::from(95));
        assert_eq!(q.final_total, Decimal::from(855));
        assert_eq!(q.total_saved, Decimal::from(145));
    }

    #[test]
    fn test_top10_doubles_both_percents() {
        let plain = quote(&inputs(1000, 7, false, 10));
        let top = quote(&inputs(1000, 7, true, 10));
        assert_eq!(
            top.level_discount_percent.value(),
            plain.level_discount_percent.value() * Decimal::TWO
        );
        assert_eq!(
            top.promo_discount_percent.value(),
            plain.promo_discount_percent.value() * Decimal::TWO
        );
        // 1000 - 14% = 860, then 20% off = 688
        assert_eq!(top.final_total, Decimal::from(688));
    }

    #[test]
    fn test_discounts_are_sequential_not_additive() {
        let q = quote(&inputs(1000, 10, false, 10));
        // Additive would give 800; sequential gives 900 - 90 = 810.
        assert_eq!(q.final_total, Decimal::from(810));
    }

    #[test]
    fn test_final_total_non_increasing_in_discount() {
        let subtotal = Decimal::new(123_456, 2);
        let mut previous = subtotal;
        for level in 1..=40 {
            for promo in [0, 5, 10, 25, 50] {
                let q = quote(&DiscountInputs {
                    subtotal,
                    user_level: level,
                    is_top10: false,
                    promo_percent: Percent::whole(promo),
                });
                assert!(q.final_total <= subtotal);
                if promo == 0 {
                    assert!(q.final_total <= previous, "level {level} raised the total");
                    previous = q.final_total;
                }
            }
        }

        let mut previous = subtotal;
        for promo in 0..=100 {
            let q = quote(&inputs(1000, 3, false, promo));
            assert!(q.final_total <= previous);
            previous = q.final_total;
        }
    }

    #[test]
    fn test_rounds_final_total_to_cents() {
        let q = quote(&DiscountInputs {
            subtotal: Decimal::new(9999, 2),
            user_level: 3,
            is_top10: false,
            promo_percent: Percent::whole(7),
        });
        // 99.99 * 0.97 = 96.9903; * 0.93 = 90.200979
        assert_eq!(q.final_total, Decimal::new(9020, 2));
    }

    #[test]
    fn test_negative_subtotal_defaults_to_zero() {
        let q = quote(&inputs(-50, 5, false, 10));
        assert_eq!(q.final_total, Decimal::ZERO);
    }
}
