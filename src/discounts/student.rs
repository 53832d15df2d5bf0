//! Student Discount

use decimal_percentage::Percentage;
use rust_decimal::Decimal;

use crate::discounts::percent_of;

/// Discount earned by a verified student, unrounded. Unverified sessions earn nothing.
pub fn student_discount(verified: bool, percent: Percentage, sub_total: Decimal) -> Decimal {
    if verified {
        percent_of(percent, sub_total)
    } else {
        Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use crate::discounts::percent_points;

    use super::*;

    #[test]
    fn verified_student_earns_percentage() {
        let amount = student_discount(true, percent_points(15), Decimal::from(6998));

        assert_eq!(amount, Decimal::new(10497, 1));
    }

    #[test]
    fn unverified_student_earns_nothing() {
        let amount = student_discount(false, percent_points(15), Decimal::from(6998));

        assert_eq!(amount, Decimal::ZERO);
    }
}
