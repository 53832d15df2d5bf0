//! Pricing
//!
//! Amounts are accumulated as unrounded [`Decimal`] minor units and only rounded when
//! converted to [`Money`] for display.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};

use crate::cart::CartLine;

/// Calculates the subtotal of a list of cart lines.
pub fn subtotal(lines: &[CartLine]) -> Decimal {
    lines
        .iter()
        .fold(Decimal::ZERO, |acc, line| acc.saturating_add(line.line_total()))
}

/// Round an unrounded minor-unit amount to money for display.
///
/// Rounds half away from zero to whole minor units. Amounts beyond the `i64` range
/// saturate.
pub fn present(amount: Decimal, currency: &'static Currency) -> Money<'static, Currency> {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    let minor = rounded.to_i64().unwrap_or(if rounded.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    });

    Money::from_minor(minor, currency)
}

/// `max(0, amount)`
pub fn clamp_non_negative(amount: Decimal) -> Decimal {
    amount.max(Decimal::ZERO)
}
