//! Coupon Fixtures

use rusty_money::iso::Currency;
use serde::Deserialize;

use crate::{
    discounts::coupons::{Coupon, CouponDiscount},
    fixtures::{
        FixtureError,
        projects::{parse_percentage, parse_price},
    },
};

/// Wrapper for coupons in YAML
#[derive(Debug, Deserialize)]
pub struct CouponsFixture {
    /// Coupons offered by the storefront
    pub coupons: Vec<CouponFixture>,
}

/// Coupon fixture from YAML
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CouponFixture {
    /// Percentage off the subtotal
    Percent {
        /// Coupon code
        code: String,

        /// Percentage (e.g., "10%" or "0.10")
        value: String,
    },

    /// Fixed amount off the subtotal
    Flat {
        /// Coupon code
        code: String,

        /// Amount (e.g., "5.00 INR")
        value: String,
    },
}

impl CouponFixture {
    /// Convert into a [`Coupon`], returning the currency of flat amounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be parsed.
    pub fn try_into_coupon(self) -> Result<(Coupon, Option<&'static Currency>), FixtureError> {
        match self {
            CouponFixture::Percent { code, value } => {
                let percent = parse_percentage(&value)?;

                Ok((Coupon::new(&code, CouponDiscount::Percent(percent)), None))
            }
            CouponFixture::Flat { code, value } => {
                let (price, currency) = parse_price(&value)?;

                Ok((
                    Coupon::new(&code, CouponDiscount::Flat(price)),
                    Some(currency),
                ))
            }
        }
    }
}
