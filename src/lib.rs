//! Kitcart
//!
//! Kitcart is the cart pricing and discount engine behind a project-kit storefront. It
//! holds a shopper's cart, stacks bulk, coupon and student discounts against the
//! subtotal, redeems loyalty points and produces an itemised breakdown.

pub mod cart;
pub mod config;
pub mod directory;
pub mod discounts;
pub mod fixtures;
pub mod prelude;
pub mod prices;
pub mod pricing;
pub mod projects;
pub mod receipt;
pub mod session;
pub mod store;
pub mod totals;
pub mod utils;
pub mod verification;
