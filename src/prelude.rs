//! Kitcart prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartLine, NewCartLine},
    config::{ConfigError, PricingConfig},
    directory::{CouponDirectory, StaticCouponDirectory},
    discounts::{
        PricingRules,
        bulk::{BulkSchedule, BulkScheduleError, BulkTier},
        coupons::{Coupon, CouponDiscount, CouponError},
        points::LoyaltyPoints,
    },
    fixtures::{Fixture, FixtureError},
    prices::Price,
    projects::{PackageType, Project, ProjectKey},
    receipt::{Receipt, ReceiptError},
    session::{CartAction, CartSession, CartState, Collaborators, CompletedOrder},
    store::{MemoryStore, SessionStore, StoreError},
    totals::{Adjustment, AdjustmentKind, DiscountInputs, Totals},
    verification::{SimulatedVerifier, StudentDocument, StudentVerifier, Verdict},
};
