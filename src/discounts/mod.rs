//! Discounts
//!
//! Pure evaluators over the cart and session flags. Every evaluator works on the
//! original subtotal; nothing here rounds.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;

use crate::discounts::bulk::BulkSchedule;

pub mod bulk;
pub mod coupons;
pub mod points;
pub mod student;

/// Percentage applied to verified students unless configured otherwise.
pub const DEFAULT_STUDENT_DISCOUNT_POINTS: u8 = 15;

/// The pricing policy applied when totals are computed.
#[derive(Debug, Clone)]
pub struct PricingRules {
    /// Bulk quantity tiers
    pub bulk: BulkSchedule,

    /// Discount unlocked by student verification
    pub student_discount: Percentage,
}

impl Default for PricingRules {
    fn default() -> Self {
        Self {
            bulk: BulkSchedule::default(),
            student_discount: percent_points(DEFAULT_STUDENT_DISCOUNT_POINTS),
        }
    }
}

/// Build a percentage from whole percent points (`15` is 15%).
pub fn percent_points(points: u8) -> Percentage {
    Percentage::from(Decimal::new(i64::from(points), 2))
}

/// Express a percentage as percent points (`0.15` is `15`).
pub fn to_percent_points(percent: Percentage) -> Decimal {
    (percent * Decimal::ONE_HUNDRED).normalize()
}

/// The unrounded share of `amount` described by `percent`.
pub fn percent_of(percent: Percentage, amount: Decimal) -> Decimal {
    (percent * Decimal::ONE).saturating_mul(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_points_builds_fraction() {
        assert_eq!(percent_points(15) * Decimal::ONE, Decimal::new(15, 2));
        assert_eq!(percent_points(0) * Decimal::ONE, Decimal::ZERO);
    }

    #[test]
    fn to_percent_points_round_trips_whole_points() {
        assert_eq!(to_percent_points(percent_points(10)), Decimal::from(10));
    }

    #[test]
    fn percent_of_does_not_round() {
        let amount = percent_of(percent_points(5), Decimal::from(6998));

        assert_eq!(amount, Decimal::new(3499, 1));
    }

    #[test]
    fn default_rules_use_fifteen_percent_student_discount() {
        let rules = PricingRules::default();

        assert_eq!(to_percent_points(rules.student_discount), Decimal::from(15));
    }
}
