//! Coupon Directory

use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;
use rustc_hash::FxHashMap;

use crate::discounts::coupons::{Coupon, normalize_code};

/// Simulated round-trip time of the storefront's collaborators.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(800);

/// Resolves coupon codes.
#[automock]
#[async_trait]
pub trait CouponDirectory: Send + Sync {
    /// Look up a coupon by code, ignoring case and surrounding whitespace.
    async fn lookup(&self, code: &str) -> Option<Coupon>;
}

/// A fixed set of coupons answered after a simulated delay.
#[derive(Debug, Clone)]
pub struct StaticCouponDirectory {
    coupons: FxHashMap<String, Coupon>,
    latency: Duration,
}

impl StaticCouponDirectory {
    /// Create a directory that answers immediately.
    pub fn new(coupons: impl IntoIterator<Item = Coupon>) -> Self {
        Self {
            coupons: coupons
                .into_iter()
                .map(|coupon| (coupon.code().to_string(), coupon))
                .collect(),
            latency: Duration::ZERO,
        }
    }

    /// Delay every lookup by `latency`.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of known coupons
    pub fn len(&self) -> usize {
        self.coupons.len()
    }

    /// Whether the directory knows no coupons
    pub fn is_empty(&self) -> bool {
        self.coupons.is_empty()
    }
}

#[async_trait]
impl CouponDirectory for StaticCouponDirectory {
    async fn lookup(&self, code: &str) -> Option<Coupon> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        self.coupons.get(&normalize_code(code)).cloned()
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::Instant;

    use crate::{discounts::coupons::CouponDiscount, prices::Price};

    use super::*;

    fn directory() -> StaticCouponDirectory {
        StaticCouponDirectory::new([Coupon::new(
            "SAVE500",
            CouponDiscount::Flat(Price::new(500)),
        )])
    }

    #[tokio::test]
    async fn lookup_ignores_case_and_whitespace() {
        let directory = directory();

        let coupon = directory.lookup(" save500 ").await;

        assert_eq!(coupon.map(|c| c.code().to_string()).as_deref(), Some("SAVE500"));
    }

    #[tokio::test]
    async fn lookup_unknown_code_returns_none() {
        assert!(directory().lookup("NOPE").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn lookup_waits_for_latency() {
        let directory = directory().with_latency(DEFAULT_LATENCY);
        let started = Instant::now();

        let coupon = directory.lookup("SAVE500").await;

        assert!(coupon.is_some());
        assert!(started.elapsed() >= DEFAULT_LATENCY);
    }
}
