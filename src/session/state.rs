//! Cart State
//!
//! Every change to a shopping session goes through [`CartState::reduce`].

use rusty_money::iso::Currency;
use tracing::debug;

use crate::{
    cart::{Cart, NewCartLine},
    discounts::{PricingRules, coupons::Coupon, points::LoyaltyPoints},
    projects::PackageType,
    totals::{DiscountInputs, Totals},
};

/// A state transition.
#[derive(Debug, Clone)]
pub enum CartAction {
    /// Add one unit of a project package
    AddItem(NewCartLine),

    /// Delete a line
    RemoveItem {
        /// Catalog project identifier
        project_id: String,

        /// Package type
        package: PackageType,
    },

    /// Adjust a line's quantity, floored at one
    UpdateQuantity {
        /// Catalog project identifier
        project_id: String,

        /// Package type
        package: PackageType,

        /// Signed change
        delta: i32,
    },

    /// Empty the cart
    Clear,

    /// Activate a resolved coupon, replacing any previous one
    CouponApplied(Coupon),

    /// Drop the active coupon
    RemoveCoupon,

    /// Mark the shopper as a verified student. One-way.
    StudentVerified,

    /// Switch point redemption on or off
    TogglePoints(bool),

    /// Debit points after an order is placed
    PointsSpent(u64),
}

impl CartAction {
    /// Whether the action changes the cart lines.
    pub fn touches_cart(&self) -> bool {
        matches!(
            self,
            CartAction::AddItem(_)
                | CartAction::RemoveItem { .. }
                | CartAction::UpdateQuantity { .. }
                | CartAction::Clear
        )
    }

    /// Whether the action changes the verification flag.
    pub fn touches_student(&self) -> bool {
        matches!(self, CartAction::StudentVerified)
    }

    /// Whether the action changes the loyalty point balance.
    pub fn touches_points_balance(&self) -> bool {
        matches!(self, CartAction::PointsSpent(_))
    }
}

/// Cart, coupon, verification flag and loyalty points of one session.
#[derive(Debug, Clone)]
pub struct CartState {
    cart: Cart,
    coupon: Option<Coupon>,
    student_verified: bool,
    points: LoyaltyPoints,
}

impl CartState {
    /// Create an empty state.
    #[must_use]
    pub fn new(currency: &'static Currency, points_balance: u64) -> Self {
        Self::from_parts(Cart::new(currency), false, points_balance)
    }

    /// Create a state from a restored cart and verification flag.
    #[must_use]
    pub fn from_parts(cart: Cart, student_verified: bool, points_balance: u64) -> Self {
        Self {
            cart,
            coupon: None,
            student_verified,
            points: LoyaltyPoints::new(points_balance),
        }
    }

    /// Apply an action.
    pub fn reduce(&mut self, action: CartAction) {
        debug!(?action, "cart action");

        match action {
            CartAction::AddItem(line) => {
                self.cart.add_item(line);
            }
            CartAction::RemoveItem {
                project_id,
                package,
            } => {
                self.cart.remove_item(&project_id, package);
            }
            CartAction::UpdateQuantity {
                project_id,
                package,
                delta,
            } => {
                self.cart.update_quantity(&project_id, package, delta);
            }
            CartAction::Clear => self.cart.clear(),
            CartAction::CouponApplied(coupon) => self.coupon = Some(coupon),
            CartAction::RemoveCoupon => self.coupon = None,
            CartAction::StudentVerified => self.student_verified = true,
            CartAction::TogglePoints(enable) => self.points.toggle(enable),
            CartAction::PointsSpent(points) => self.points.spend(points),
        }
    }

    /// The cart
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The active coupon
    pub fn coupon(&self) -> Option<&Coupon> {
        self.coupon.as_ref()
    }

    /// Whether the shopper is a verified student
    pub fn is_student_verified(&self) -> bool {
        self.student_verified
    }

    /// Loyalty points
    pub fn points(&self) -> LoyaltyPoints {
        self.points
    }

    /// Totals under the given rules.
    pub fn totals(&self, rules: &PricingRules) -> Totals {
        Totals::compute(
            &self.cart,
            DiscountInputs {
                coupon: self.coupon.as_ref(),
                student_verified: self.student_verified,
                points: self.points,
            },
            rules,
        )
    }
}
