//! Loyalty Points
//!
//! One point redeems one minor currency unit. Redemption is capped at the whole part
//! of the subtotal and at the balance.

use rust_decimal::{Decimal, prelude::ToPrimitive};

/// Loyalty point balance and whether the shopper chose to redeem it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoyaltyPoints {
    balance: u64,
    enabled: bool,
}

impl LoyaltyPoints {
    /// Create a balance with redemption switched off.
    #[must_use]
    pub const fn new(balance: u64) -> Self {
        Self {
            balance,
            enabled: false,
        }
    }

    /// Points available
    pub const fn balance(&self) -> u64 {
        self.balance
    }

    /// Whether redemption is switched on
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Switch redemption on or off. Idempotent.
    pub fn toggle(&mut self, enable: bool) {
        self.enabled = enable;
    }

    /// Points redeemed against `sub_total`: `min(balance, floor(sub_total))` when
    /// enabled, otherwise zero.
    pub fn redeemed(&self, sub_total: Decimal) -> u64 {
        if !self.enabled {
            return 0;
        }

        let whole = sub_total.max(Decimal::ZERO).floor().to_u64().unwrap_or(u64::MAX);

        self.balance.min(whole)
    }

    /// Deduct spent points from the balance.
    pub fn spend(&mut self, points: u64) {
        self.balance = self.balance.saturating_sub(points);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_points_redeem_nothing() {
        let points = LoyaltyPoints::new(1000);

        assert_eq!(points.redeemed(Decimal::from(6998)), 0);
    }

    #[test]
    fn enabled_points_are_capped_by_balance() {
        let mut points = LoyaltyPoints::new(1000);
        points.toggle(true);

        assert_eq!(points.redeemed(Decimal::from(6998)), 1000);
    }

    #[test]
    fn enabled_points_are_capped_by_whole_subtotal() {
        let mut points = LoyaltyPoints::new(1000);
        points.toggle(true);

        assert_eq!(points.redeemed(Decimal::new(4509, 1)), 450);
        assert_eq!(points.redeemed(Decimal::ZERO), 0);
        assert_eq!(points.redeemed(Decimal::from(-10)), 0);
    }

    #[test]
    fn toggle_is_idempotent() {
        let mut once = LoyaltyPoints::new(1000);
        once.toggle(true);

        let mut twice = LoyaltyPoints::new(1000);
        twice.toggle(true);
        twice.toggle(true);

        assert_eq!(once, twice);
        assert_eq!(
            once.redeemed(Decimal::from(6998)),
            twice.redeemed(Decimal::from(6998))
        );
    }

    #[test]
    fn toggle_off_stops_redemption() {
        let mut points = LoyaltyPoints::new(1000);
        points.toggle(true);
        points.toggle(false);

        assert_eq!(points.redeemed(Decimal::from(6998)), 0);
        assert_eq!(points.balance(), 1000);
    }

    #[test]
    fn spend_saturates_at_zero() {
        let mut points = LoyaltyPoints::new(100);

        points.spend(60);
        assert_eq!(points.balance(), 40);

        points.spend(60);
        assert_eq!(points.balance(), 0);
    }
}
