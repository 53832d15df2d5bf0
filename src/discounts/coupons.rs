//! Coupons
//!
//! At most one coupon is active per cart. Codes are matched case-insensitively.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    discounts::{percent_of, to_percent_points},
    prices::Price,
};

/// Errors returned when applying a coupon.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CouponError {
    /// No coupon matches the code as entered.
    #[error("Invalid coupon code: {0}")]
    InvalidCode(String),
}

/// What a coupon takes off the order.
#[derive(Debug, Copy, Clone)]
pub enum CouponDiscount {
    /// A percentage of the subtotal (e.g., "10% off")
    Percent(Percentage),

    /// A fixed amount, capped at the subtotal (e.g., "₹500 off")
    Flat(Price),
}

impl PartialEq for CouponDiscount {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CouponDiscount::Percent(a), CouponDiscount::Percent(b)) => {
                *a * Decimal::ONE == *b * Decimal::ONE
            }
            (CouponDiscount::Flat(a), CouponDiscount::Flat(b)) => a == b,
            _ => false,
        }
    }
}

/// A named discount rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Coupon {
    code: String,
    discount: CouponDiscount,
}

impl Coupon {
    /// Create a coupon; the code is stored normalized.
    pub fn new(code: &str, discount: CouponDiscount) -> Self {
        Self {
            code: normalize_code(code),
            discount,
        }
    }

    /// Normalized code
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Discount rule
    pub fn discount(&self) -> CouponDiscount {
        self.discount
    }

    /// Unrounded amount taken off `sub_total`.
    pub fn amount_off(&self, sub_total: Decimal) -> Decimal {
        match self.discount {
            CouponDiscount::Percent(percent) => percent_of(percent, sub_total),
            CouponDiscount::Flat(value) => value.to_decimal().min(sub_total),
        }
    }

    /// Message shown to the shopper once the coupon is active.
    pub fn confirmation(&self, currency: &'static Currency) -> String {
        match self.discount {
            CouponDiscount::Percent(percent) => format!(
                "Coupon {} applied: {}% off your order",
                self.code,
                to_percent_points(percent)
            ),
            CouponDiscount::Flat(value) => format!(
                "Coupon {} applied: {} off your order",
                self.code,
                value.to_money(currency)
            ),
        }
    }
}

/// Trim and upper-case a code so lookups ignore case and stray whitespace.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}
