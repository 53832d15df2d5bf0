//! Totals
//!
//! Combines the discount evaluators into the payable total. Discounts are applied in a
//! fixed order:
//!
//! 1. `sub_total = Σ(unit_price × quantity)`
//! 2. bulk, coupon and student discounts, each computed against `sub_total`
//! 3. `after_discounts = max(0, sub_total − discount_total)`
//! 4. `final_total = max(0, after_discounts − points_redeemed)`
//!
//! The three percentage/flat discounts stack additively against the original subtotal
//! rather than compounding.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;

use crate::{
    cart::Cart,
    discounts::{
        PricingRules,
        bulk::bulk_discount,
        coupons::Coupon,
        points::LoyaltyPoints,
        student::student_discount,
    },
    pricing::{clamp_non_negative, present},
};

/// Session flags feeding the discount evaluators.
#[derive(Debug, Clone, Copy)]
pub struct DiscountInputs<'c> {
    /// The active coupon
    pub coupon: Option<&'c Coupon>,

    /// Whether the shopper passed student verification
    pub student_verified: bool,

    /// Loyalty point balance and redemption toggle
    pub points: LoyaltyPoints,
}

/// The source of a single reduction.
#[derive(Debug, Clone)]
pub enum AdjustmentKind {
    /// Bulk quantity tier (percent points)
    Bulk(u8),

    /// The active coupon
    Coupon(Coupon),

    /// Verified student discount
    Student(Percentage),

    /// Loyalty points redeemed
    LoyaltyPoints(u64),
}

impl AdjustmentKind {
    /// Short label used on receipts.
    pub fn label(&self) -> String {
        match self {
            AdjustmentKind::Bulk(percent) => format!("Bulk discount ({percent}%)"),
            AdjustmentKind::Coupon(coupon) => format!("Coupon {}", coupon.code()),
            AdjustmentKind::Student(percent) => format!(
                "Student discount ({}%)",
                crate::discounts::to_percent_points(*percent)
            ),
            AdjustmentKind::LoyaltyPoints(points) => format!("Loyalty points ({points})"),
        }
    }
}

/// A reduction applied to the order, in unrounded minor units.
#[derive(Debug, Clone)]
pub struct Adjustment {
    /// Where the reduction came from
    pub kind: AdjustmentKind,

    /// Amount taken off
    pub amount: Decimal,
}

/// Derived totals for a cart.
#[derive(Debug, Clone)]
pub struct Totals {
    currency: &'static Currency,
    total_items: u64,
    bulk_discount_percent: u8,
    sub_total: Decimal,
    adjustments: SmallVec<[Adjustment; 4]>,
    discount_total: Decimal,
    after_discounts: Decimal,
    points_redeemed: u64,
    final_total: Decimal,
}

impl Totals {
    /// Compute the totals for a cart under the given rules and session flags.
    pub fn compute(cart: &Cart, inputs: DiscountInputs<'_>, rules: &PricingRules) -> Self {
        let sub_total = cart.subtotal();
        let total_items = cart.total_items();
        let bulk_discount_percent = rules.bulk.percent_for(total_items);

        let mut candidates: SmallVec<[AdjustmentKind; 4]> = SmallVec::new();

        if bulk_discount_percent > 0 {
            candidates.push(AdjustmentKind::Bulk(bulk_discount_percent));
        }

        if let Some(coupon) = inputs.coupon {
            candidates.push(AdjustmentKind::Coupon(coupon.clone()));
        }

        if inputs.student_verified {
            candidates.push(AdjustmentKind::Student(rules.student_discount));
        }

        let mut adjustments: SmallVec<[Adjustment; 4]> = candidates
            .into_iter()
            .map(|kind| {
                let amount = discount_amount(&kind, sub_total, inputs.student_verified);

                Adjustment { kind, amount }
            })
            .collect();

        let discount_total = adjustments
            .iter()
            .fold(Decimal::ZERO, |acc, adj| acc.saturating_add(adj.amount));

        let after_discounts = clamp_non_negative(sub_total.saturating_sub(discount_total));

        let points_redeemed = inputs.points.redeemed(sub_total);

        if points_redeemed > 0 {
            adjustments.push(Adjustment {
                kind: AdjustmentKind::LoyaltyPoints(points_redeemed),
                amount: Decimal::from(points_redeemed),
            });
        }

        let final_total =
            clamp_non_negative(after_discounts.saturating_sub(Decimal::from(points_redeemed)));

        Self {
            currency: cart.currency(),
            total_items,
            bulk_discount_percent,
            sub_total,
            adjustments,
            discount_total,
            after_discounts,
            points_redeemed,
            final_total,
        }
    }

    /// `Σ(unit_price × quantity)`
    pub fn sub_total(&self) -> Decimal {
        self.sub_total
    }

    /// Bulk + coupon + student discounts (points excluded).
    pub fn discount_total(&self) -> Decimal {
        self.discount_total
    }

    /// `max(0, sub_total − discount_total)`
    pub fn after_discounts(&self) -> Decimal {
        self.after_discounts
    }

    /// Payable amount, never negative.
    pub fn final_total(&self) -> Decimal {
        self.final_total
    }

    /// Points redeemed against this order.
    pub fn points_redeemed(&self) -> u64 {
        self.points_redeemed
    }

    /// Bulk tier earned by the cart (0, 5 or 10 with the default schedule).
    pub fn bulk_discount_percent(&self) -> u8 {
        self.bulk_discount_percent
    }

    /// Units across every line.
    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    /// Bulk discount amount.
    pub fn bulk_discount(&self) -> Decimal {
        self.amount_where(|kind| matches!(kind, AdjustmentKind::Bulk(_)))
    }

    /// Coupon discount amount.
    pub fn coupon_discount(&self) -> Decimal {
        self.amount_where(|kind| matches!(kind, AdjustmentKind::Coupon(_)))
    }

    /// Student discount amount.
    pub fn student_discount(&self) -> Decimal {
        self.amount_where(|kind| matches!(kind, AdjustmentKind::Student(_)))
    }

    /// Every reduction in application order, points last.
    pub fn adjustments(&self) -> &[Adjustment] {
        &self.adjustments
    }

    /// Currency of every amount.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Round an amount for display.
    pub fn money(&self, amount: Decimal) -> Money<'static, Currency> {
        present(amount, self.currency)
    }

    /// Everything taken off the subtotal, points included.
    pub fn savings(&self) -> Decimal {
        self.sub_total.saturating_sub(self.final_total)
    }

    /// Savings as a share of the subtotal.
    pub fn savings_percent(&self) -> Percentage {
        if self.sub_total.is_zero() {
            return Percentage::from(Decimal::ZERO);
        }

        Percentage::from(self.savings() / self.sub_total)
    }

    fn amount_where(&self, pred: impl Fn(&AdjustmentKind) -> bool) -> Decimal {
        self.adjustments
            .iter()
            .filter(|adj| pred(&adj.kind))
            .fold(Decimal::ZERO, |acc, adj| acc.saturating_add(adj.amount))
    }
}

fn discount_amount(kind: &AdjustmentKind, sub_total: Decimal, student_verified: bool) -> Decimal {
    match kind {
        AdjustmentKind::Bulk(percent) => bulk_discount(*percent, sub_total),
        AdjustmentKind::Coupon(coupon) => coupon.amount_off(sub_total),
        AdjustmentKind::Student(percent) => student_discount(student_verified, *percent, sub_total),
        AdjustmentKind::LoyaltyPoints(points) => Decimal::from(*points),
    }
}
