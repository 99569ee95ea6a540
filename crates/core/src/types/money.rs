//! Money and percentage helpers built on decimal arithmetic.
//!
//! Balances, prices and totals are plain [`Decimal`] values in the store's
//! single currency (coins). The server exchanges them as JSON numbers and
//! rounds payable totals to two decimal places, half away from zero.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Round a monetary amount to two decimal places.
///
/// Uses half-away-from-zero, which matches the server's rounding of
/// non-negative totals.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Price after taking `percent` off.
#[must_use]
pub fn apply_percent_off(amount: Decimal, percent: Percent) -> Decimal {
    amount - percent.of(amount)
}

/// A discount percentage in `0..=100`.
///
/// Construction clamps out-of-range input: negative values become zero and
/// anything above 100 becomes 100, so a discount can never produce a
/// negative price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percent(Decimal);

impl Percent {
    /// No discount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a percentage, clamped to `0..=100`.
    #[must_use]
    pub fn new(value: Decimal) -> Self {
        Self(value.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED))
    }

    /// Create a whole-number percentage.
    #[must_use]
    pub fn whole(value: u32) -> Self {
        Self::new(Decimal::from(value))
    }

    /// The percentage value (e.g. `12.5` for 12.5%).
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }

    /// Returns `true` for a zero percentage.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// This percentage doubled, still capped at 100.
    #[must_use]
    pub fn doubled(self) -> Self {
        Self::new(self.0 * Decimal::TWO)
    }

    /// The smaller of this percentage and `cap`.
    #[must_use]
    pub fn capped_at(self, cap: Self) -> Self {
        self.min(cap)
    }

    /// `amount * self / 100`, unrounded.
    #[must_use]
    pub fn of(self, amount: Decimal) -> Decimal {
        amount * self.0 / Decimal::ONE_HUNDRED
    }
}

impl From<Decimal> for Percent {
    fn from(value: Decimal) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0.normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_money_half_away_from_zero() {
        assert_eq!(round_money(Decimal::new(12_345, 3)), Decimal::new(1235, 2));
        assert_eq!(round_money(Decimal::new(12_344, 3)), Decimal::new(1234, 2));
        assert_eq!(round_money(Decimal::new(855, 0)), Decimal::new(855, 0));
    }

    #[test]
    fn test_percent_clamps() {
        assert_eq!(Percent::new(Decimal::from(-5)), Percent::ZERO);
        assert_eq!(Percent::new(Decimal::from(150)).value(), Decimal::ONE_HUNDRED);
    }

    #[test]
    fn test_percent_doubled_caps_at_hundred() {
        assert_eq!(Percent::whole(10).doubled(), Percent::whole(20));
        assert_eq!(Percent::whole(70).doubled(), Percent::whole(100));
    }

    #[test]
    fn test_percent_of_and_apply() {
        let price = Decimal::from(200);
        assert_eq!(Percent::whole(15).of(price), Decimal::from(30));
        assert_eq!(apply_percent_off(price, Percent::whole(15)), Decimal::from(170));
    }

    #[test]
    fn test_percent_display() {
        assert_eq!(Percent::new(Decimal::new(125, 1)).to_string(), "12.5%");
        assert_eq!(Percent::whole(5).to_string(), "5%");
    }
}
