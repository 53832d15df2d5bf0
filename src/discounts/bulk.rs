//! Bulk Quantity Discount
//!
//! A step function over the total number of units in the cart. With the default
//! schedule one unit earns nothing, two units earn 5% and three or more earn 10%.

use rust_decimal::Decimal;
use smallvec::{SmallVec, smallvec};
use thiserror::Error;

use crate::discounts::{percent_of, percent_points};

/// Errors raised when a bulk schedule is not monotonic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BulkScheduleError {
    /// Tier minimums must strictly increase (tier index).
    #[error("bulk tier {0} does not raise the minimum item count")]
    UnorderedTiers(usize),

    /// Tier percentages may not decrease (tier index).
    #[error("bulk tier {0} lowers the discount percentage")]
    DecreasingPercent(usize),

    /// A tier percentage above 100 (tier index, percent).
    #[error("bulk tier {0} has percentage {1} above 100")]
    PercentOutOfRange(usize, u8),
}

/// A single bulk tier: carts with at least `min_items` units earn `percent` off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkTier {
    /// Minimum total quantity
    pub min_items: u64,

    /// Whole percent points off the subtotal
    pub percent: u8,
}

/// An ordered, monotonic list of bulk tiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkSchedule {
    tiers: SmallVec<[BulkTier; 4]>,
}

impl BulkSchedule {
    /// Create a schedule from tiers ordered by minimum item count.
    ///
    /// # Errors
    ///
    /// Returns a [`BulkScheduleError`] if minimums do not strictly increase, percentages
    /// decrease, or a percentage exceeds 100.
    pub fn new(tiers: impl IntoIterator<Item = BulkTier>) -> Result<Self, BulkScheduleError> {
        let tiers: SmallVec<[BulkTier; 4]> = tiers.into_iter().collect();

        for (idx, tier) in tiers.iter().enumerate() {
            if tier.percent > 100 {
                return Err(BulkScheduleError::PercentOutOfRange(idx, tier.percent));
            }
        }

        for (idx, pair) in tiers.windows(2).enumerate() {
            if let [lower, upper] = pair {
                if upper.min_items <= lower.min_items {
                    return Err(BulkScheduleError::UnorderedTiers(idx + 1));
                }

                if upper.percent < lower.percent {
                    return Err(BulkScheduleError::DecreasingPercent(idx + 1));
                }
            }
        }

        Ok(Self { tiers })
    }

    /// A schedule that never discounts.
    #[must_use]
    pub fn none() -> Self {
        Self {
            tiers: SmallVec::new(),
        }
    }

    /// The configured tiers.
    pub fn tiers(&self) -> &[BulkTier] {
        &self.tiers
    }

    /// Percent points earned by a cart holding `total_items` units.
    pub fn percent_for(&self, total_items: u64) -> u8 {
        self.tiers
            .iter()
            .rev()
            .find(|tier| total_items >= tier.min_items)
            .map_or(0, |tier| tier.percent)
    }
}

impl Default for BulkSchedule {
    fn default() -> Self {
        Self {
            tiers: smallvec![
                BulkTier {
                    min_items: 2,
                    percent: 5,
                },
                BulkTier {
                    min_items: 3,
                    percent: 10,
                },
            ],
        }
    }
}

/// `sub_total × percent / 100`, unrounded.
pub fn bulk_discount(percent: u8, sub_total: Decimal) -> Decimal {
    percent_of(percent_points(percent), sub_total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule_steps_at_two_and_three_items() {
        let schedule = BulkSchedule::default();

        assert_eq!(schedule.percent_for(0), 0);
        assert_eq!(schedule.percent_for(1), 0);
        assert_eq!(schedule.percent_for(2), 5);
        assert_eq!(schedule.percent_for(3), 10);
        assert_eq!(schedule.percent_for(4), 10);
        assert_eq!(schedule.percent_for(u64::MAX), 10);
    }

    #[test]
    fn default_schedule_is_monotonic() {
        let schedule = BulkSchedule::default();

        let percents: Vec<u8> = (0..20).map(|n| schedule.percent_for(n)).collect();

        assert!(
            percents.windows(2).all(|w| matches!(w, [a, b] if a <= b)),
            "bulk percentages must never decrease: {percents:?}"
        );
    }

    #[test]
    fn none_never_discounts() {
        assert_eq!(BulkSchedule::none().percent_for(100), 0);
    }

    #[test]
    fn new_rejects_unordered_tiers() {
        let result = BulkSchedule::new([
            BulkTier {
                min_items: 3,
                percent: 5,
            },
            BulkTier {
                min_items: 3,
                percent: 10,
            },
        ]);

        assert_eq!(result, Err(BulkScheduleError::UnorderedTiers(1)));
    }

    #[test]
    fn new_rejects_decreasing_percent() {
        let result = BulkSchedule::new([
            BulkTier {
                min_items: 2,
                percent: 10,
            },
            BulkTier {
                min_items: 5,
                percent: 5,
            },
        ]);

        assert_eq!(result, Err(BulkScheduleError::DecreasingPercent(1)));
    }

    #[test]
    fn new_rejects_percent_above_one_hundred() {
        let result = BulkSchedule::new([BulkTier {
            min_items: 2,
            percent: 101,
        }]);

        assert_eq!(result, Err(BulkScheduleError::PercentOutOfRange(0, 101)));
    }

    #[test]
    fn new_accepts_custom_schedule() -> Result<(), BulkScheduleError> {
        let schedule = BulkSchedule::new([
            BulkTier {
                min_items: 5,
                percent: 8,
            },
            BulkTier {
                min_items: 10,
                percent: 12,
            },
        ])?;

        assert_eq!(schedule.percent_for(4), 0);
        assert_eq!(schedule.percent_for(7), 8);
        assert_eq!(schedule.percent_for(10), 12);

        Ok(())
    }

    #[test]
    fn bulk_discount_is_unrounded() {
        assert_eq!(bulk_discount(5, Decimal::from(6998)), Decimal::new(3499, 1));
        assert_eq!(bulk_discount(0, Decimal::from(6998)), Decimal::ZERO);
    }
}
