//! Cart Session
//!
//! An explicitly owned shopping session. Mutations are dispatched through
//! [`CartState::reduce`] and persisted to the session store afterwards. Async operations
//! take `&mut self`, so a session never has two lookups or checks in flight.

use std::{fmt, sync::Arc};

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::{
    cart::{Cart, CartLine, NewCartLine},
    config::PricingConfig,
    directory::CouponDirectory,
    discounts::{
        PricingRules,
        coupons::{Coupon, CouponError},
    },
    projects::PackageType,
    store::{
        SessionStore, cart_key, load_json, points_balance_key, save_json, student_verified_key,
    },
    totals::Totals,
    verification::{StudentDocument, StudentVerifier, Verdict},
};

mod state;

pub use state::{CartAction, CartState};

/// An order placed by [`CartSession::checkout`].
#[derive(Debug, Clone)]
pub struct CompletedOrder {
    /// Lines as they were when the order was placed
    pub lines: Vec<CartLine>,

    /// Totals charged
    pub totals: Totals,
}

/// External services a session talks to.
#[derive(Clone)]
pub struct Collaborators {
    /// Resolves coupon codes
    pub coupons: Arc<dyn CouponDirectory>,

    /// Checks student documents
    pub verifier: Arc<dyn StudentVerifier>,
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

/// A single shopper's cart with its discounts.
pub struct CartSession<S: SessionStore> {
    id: String,
    state: CartState,
    rules: PricingRules,
    collaborators: Collaborators,
    store: S,
}

impl<S: SessionStore> CartSession<S> {
    /// Start a fresh session. Nothing is read from the store.
    pub fn start(
        id: impl Into<String>,
        config: &PricingConfig,
        collaborators: Collaborators,
        store: S,
    ) -> Self {
        Self {
            id: id.into(),
            state: CartState::new(config.currency, config.points_balance),
            rules: config.rules.clone(),
            collaborators,
            store,
        }
    }

    /// Resume a session from the store.
    ///
    /// Stored lines are sanitised: zero quantities are dropped and repeated
    /// (project, package) pairs merged. A balance left by an earlier checkout replaces
    /// the configured starting balance. The active coupon and the redemption toggle are
    /// not stored, so a resumed session starts without a coupon and with redemption off.
    /// Unreadable state is logged and ignored.
    pub fn restore(
        id: impl Into<String>,
        config: &PricingConfig,
        collaborators: Collaborators,
        store: S,
    ) -> Self {
        let id = id.into();

        let lines: Vec<CartLine> = load_json(&store, &cart_key(&id))
            .unwrap_or_else(|source| {
                warn!(session_id = %id, "failed to restore cart: {source}");
                None
            })
            .unwrap_or_default();

        let student_verified: bool = load_json(&store, &student_verified_key(&id))
            .unwrap_or_else(|source| {
                warn!(session_id = %id, "failed to restore student verification: {source}");
                None
            })
            .unwrap_or(false);

        let points_balance: u64 = load_json(&store, &points_balance_key(&id))
            .unwrap_or_else(|source| {
                warn!(session_id = %id, "failed to restore points balance: {source}");
                None
            })
            .unwrap_or(config.points_balance);

        let cart = Cart::with_lines(lines, config.currency);

        info!(
            session_id = %id,
            lines = cart.len(),
            student_verified,
            points_balance,
            "restored cart session"
        );

        Self {
            id,
            state: CartState::from_parts(cart, student_verified, points_balance),
            rules: config.rules.clone(),
            collaborators,
            store,
        }
    }

    /// Session identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current state
    pub fn state(&self) -> &CartState {
        &self.state
    }

    /// The cart
    pub fn cart(&self) -> &Cart {
        self.state.cart()
    }

    /// The session store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Add one unit of a project package.
    pub fn add_item(&mut self, line: NewCartLine) {
        self.dispatch(CartAction::AddItem(line));
    }

    /// Remove a line. Missing lines are ignored.
    pub fn remove_item(&mut self, project_id: &str, package: PackageType) {
        self.dispatch(CartAction::RemoveItem {
            project_id: project_id.to_string(),
            package,
        });
    }

    /// Change a line's quantity by `delta`, never below one.
    pub fn update_quantity(&mut self, project_id: &str, package: PackageType, delta: i32) {
        self.dispatch(CartAction::UpdateQuantity {
            project_id: project_id.to_string(),
            package,
            delta,
        });
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.dispatch(CartAction::Clear);
    }

    /// Look up `code` and make it the active coupon.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::InvalidCode`] when no coupon matches; the current coupon
    /// is left in place.
    #[tracing::instrument(
        name = "cart.session.apply_coupon",
        skip(self),
        fields(session_id = %self.id),
        err
    )]
    pub async fn apply_coupon(&mut self, code: &str) -> Result<Coupon, CouponError> {
        let Some(coupon) = self.collaborators.coupons.lookup(code).await else {
            warn!("rejected coupon code");

            return Err(CouponError::InvalidCode(code.trim().to_string()));
        };

        self.dispatch(CartAction::CouponApplied(coupon.clone()));

        info!(coupon = coupon.code(), "applied coupon");

        Ok(coupon)
    }

    /// Drop the active coupon.
    pub fn remove_coupon(&mut self) {
        self.dispatch(CartAction::RemoveCoupon);
    }

    /// Submit a student document for verification.
    ///
    /// Verification is one-way: a verified session is never checked again.
    #[tracing::instrument(
        name = "cart.session.verify_student",
        skip(self, document),
        fields(session_id = %self.id, file_name = %document.file_name)
    )]
    pub async fn verify_student(&mut self, document: &StudentDocument) -> Verdict {
        if self.state.is_student_verified() {
            return Verdict::Approved;
        }

        let verdict = self.collaborators.verifier.verify(document).await;

        match verdict {
            Verdict::Approved => {
                self.dispatch(CartAction::StudentVerified);
                info!("student verified");
            }
            Verdict::Rejected => info!("student verification rejected"),
        }

        verdict
    }

    /// Switch loyalty point redemption on or off.
    pub fn toggle_points(&mut self, enable: bool) {
        self.dispatch(CartAction::TogglePoints(enable));
    }

    /// Place the order.
    ///
    /// Redeemed points are debited, the cart and coupon are cleared and redemption is
    /// switched off. Returns `None`, changing nothing, when the cart is empty.
    #[tracing::instrument(name = "cart.session.checkout", skip(self), fields(session_id = %self.id))]
    pub fn checkout(&mut self) -> Option<CompletedOrder> {
        if self.cart().is_empty() {
            return None;
        }

        let totals = self.totals();
        let lines = self.cart().lines().to_vec();

        self.dispatch(CartAction::PointsSpent(totals.points_redeemed()));
        self.dispatch(CartAction::TogglePoints(false));
        self.dispatch(CartAction::RemoveCoupon);
        self.dispatch(CartAction::Clear);

        info!(
            lines = lines.len(),
            final_total = %totals.money(totals.final_total()),
            points_redeemed = totals.points_redeemed(),
            "checked out"
        );

        Some(CompletedOrder { lines, totals })
    }

    /// Full breakdown of the current totals.
    pub fn totals(&self) -> Totals {
        self.state.totals(&self.rules)
    }

    /// `Σ(unit_price × quantity)`
    pub fn sub_total(&self) -> Decimal {
        self.cart().subtotal()
    }

    /// Bulk, coupon and student discounts combined
    pub fn discount_total(&self) -> Decimal {
        self.totals().discount_total()
    }

    /// Payable amount
    pub fn final_total(&self) -> Decimal {
        self.totals().final_total()
    }

    /// Bulk tier earned by the cart
    pub fn bulk_discount_percent(&self) -> u8 {
        self.rules.bulk.percent_for(self.cart().total_items())
    }

    /// The active coupon
    pub fn applied_coupon(&self) -> Option<&Coupon> {
        self.state.coupon()
    }

    /// Whether the shopper is a verified student
    pub fn is_student_verified(&self) -> bool {
        self.state.is_student_verified()
    }

    /// Points available
    pub fn points_balance(&self) -> u64 {
        self.state.points().balance()
    }

    /// Points that would be redeemed against the current cart
    pub fn points_redeemed(&self) -> u64 {
        self.state.points().redeemed(self.sub_total())
    }

    fn dispatch(&mut self, action: CartAction) {
        let touches_cart = action.touches_cart();
        let touches_student = action.touches_student();
        let touches_points_balance = action.touches_points_balance();

        self.state.reduce(action);

        if touches_cart {
            self.persist_cart();
        }

        if touches_student {
            self.persist_student_verified();
        }

        if touches_points_balance {
            self.persist_points_balance();
        }
    }

    fn persist_cart(&self) {
        let key = cart_key(&self.id);

        let saved = if self.cart().is_empty() {
            self.store.remove(&key)
        } else {
            save_json(&self.store, &key, self.cart().lines())
        };

        if let Err(source) = saved {
            warn!(session_id = %self.id, "failed to persist cart: {source}");
        }
    }

    fn persist_points_balance(&self) {
        let key = points_balance_key(&self.id);

        if let Err(source) = save_json(&self.store, &key, &self.points_balance()) {
            warn!(session_id = %self.id, "failed to persist points balance: {source}");
        }
    }

    fn persist_student_verified(&self) {
        let key = student_verified_key(&self.id);

        if let Err(source) = save_json(&self.store, &key, &self.state.is_student_verified()) {
            warn!(session_id = %self.id, "failed to persist student verification: {source}");
        }
    }
}

impl<S: SessionStore> fmt::Debug for CartSession<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartSession")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use testresult::TestResult;
    use tokio::time::Instant;

    use crate::{
        directory::{MockCouponDirectory, StaticCouponDirectory},
        discounts::coupons::CouponDiscount,
        prices::Price,
        store::{MemoryStore, StoreError},
        verification::{MockStudentVerifier, SimulatedVerifier},
    };

    use super::*;

    struct BrokenStore;

    impl SessionStore for BrokenStore {
        fn load(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Backend("offline".to_string()))
        }

        fn save(&self, _key: &str, _value: String) -> Result<(), StoreError> {
            Err(StoreError::Backend("offline".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Backend("offline".to_string()))
        }
    }

    fn kit() -> NewCartLine {
        NewCartLine {
            project_id: "p1".to_string(),
            package: PackageType::HardwareKit,
            unit_price: Price::new(3499),
            image_url: "/images/p1.jpg".to_string(),
            title: "Line Following Robot".to_string(),
        }
    }

    fn save500() -> Coupon {
        Coupon::new("SAVE500", CouponDiscount::Flat(Price::new(500)))
    }

    fn collaborators() -> Collaborators {
        Collaborators {
            coupons: Arc::new(StaticCouponDirectory::new([save500()])),
            verifier: Arc::new(SimulatedVerifier::default()),
        }
    }

    fn config(points_balance: u64) -> PricingConfig {
        PricingConfig {
            points_balance,
            ..PricingConfig::default()
        }
    }

    fn session_with_two_kits<S: SessionStore>(store: S, points: u64) -> CartSession<S> {
        let mut session = CartSession::start("s1", &config(points), collaborators(), store);

        session.add_item(kit());
        session.add_item(kit());

        session
    }

    #[test]
    fn derived_fields_follow_cart() {
        let session = session_with_two_kits(MemoryStore::new(), 0);

        assert_eq!(session.sub_total(), Decimal::from(6998));
        assert_eq!(session.bulk_discount_percent(), 5);
        assert_eq!(session.discount_total(), Decimal::new(3499, 1));
        assert_eq!(session.final_total(), Decimal::new(66481, 1));
    }

    #[tokio::test]
    async fn apply_coupon_sets_active_coupon() -> TestResult {
        let mut session = session_with_two_kits(MemoryStore::new(), 0);

        let coupon = session.apply_coupon("save500").await?;

        assert_eq!(coupon.code(), "SAVE500");
        assert_eq!(session.applied_coupon().map(Coupon::code), Some("SAVE500"));
        assert_eq!(session.final_total(), Decimal::new(61481, 1));

        Ok(())
    }

    #[tokio::test]
    async fn invalid_coupon_keeps_existing_coupon() -> TestResult {
        let mut session = session_with_two_kits(MemoryStore::new(), 0);

        session.apply_coupon("SAVE500").await?;

        let result = session.apply_coupon("BOGUS").await;

        assert!(matches!(result, Err(CouponError::InvalidCode(code)) if code == "BOGUS"));
        assert_eq!(session.applied_coupon().map(Coupon::code), Some("SAVE500"));

        Ok(())
    }

    #[tokio::test]
    async fn apply_coupon_uses_directory_once() -> TestResult {
        let mut directory = MockCouponDirectory::new();

        directory
            .expect_lookup()
            .times(1)
            .returning(|_| Some(Coupon::new("TEN", CouponDiscount::Flat(Price::new(10)))));

        let collaborators = Collaborators {
            coupons: Arc::new(directory),
            verifier: Arc::new(SimulatedVerifier::default()),
        };

        let mut session =
            CartSession::start("s1", &config(0), collaborators, MemoryStore::new());

        session.apply_coupon("ten").await?;

        assert_eq!(session.applied_coupon().map(Coupon::code), Some("TEN"));

        Ok(())
    }

    #[test]
    fn remove_coupon_clears_it() {
        let mut session = session_with_two_kits(MemoryStore::new(), 0);

        session.remove_coupon();

        assert!(session.applied_coupon().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn verify_student_waits_and_unlocks_discount() {
        let collaborators = Collaborators {
            coupons: Arc::new(StaticCouponDirectory::new([])),
            verifier: Arc::new(SimulatedVerifier::new(Duration::from_millis(800))),
        };

        let mut session =
            CartSession::start("s1", &config(0), collaborators, MemoryStore::new());
        session.add_item(kit());

        let started = Instant::now();
        let verdict = session
            .verify_student(&StudentDocument::new("id.png", b"png".to_vec()))
            .await;

        assert_eq!(verdict, Verdict::Approved);
        assert!(started.elapsed() >= Duration::from_millis(800));
        assert!(session.is_student_verified());
        assert_eq!(session.totals().student_discount(), Decimal::new(52485, 2));
    }

    #[tokio::test]
    async fn verify_student_is_one_way() {
        let mut verifier = MockStudentVerifier::new();

        verifier
            .expect_verify()
            .times(1)
            .returning(|_| Verdict::Approved);

        let collaborators = Collaborators {
            coupons: Arc::new(StaticCouponDirectory::new([])),
            verifier: Arc::new(verifier),
        };

        let mut session =
            CartSession::start("s1", &config(0), collaborators, MemoryStore::new());
        let document = StudentDocument::new("id.png", Vec::new());

        assert_eq!(session.verify_student(&document).await, Verdict::Approved);
        assert_eq!(session.verify_student(&document).await, Verdict::Approved);
        assert!(session.is_student_verified());
    }

    #[tokio::test]
    async fn rejected_verification_leaves_session_unverified() {
        let mut verifier = MockStudentVerifier::new();

        verifier
            .expect_verify()
            .times(1)
            .returning(|_| Verdict::Rejected);

        let collaborators = Collaborators {
            coupons: Arc::new(StaticCouponDirectory::new([])),
            verifier: Arc::new(verifier),
        };

        let mut session =
            CartSession::start("s1", &config(0), collaborators, MemoryStore::new());

        let verdict = session
            .verify_student(&StudentDocument::new("id.png", Vec::new()))
            .await;

        assert_eq!(verdict, Verdict::Rejected);
        assert!(!session.is_student_verified());
    }

    #[test]
    fn toggle_points_redeems_up_to_balance() {
        let mut session = session_with_two_kits(MemoryStore::new(), 1000);

        assert_eq!(session.points_redeemed(), 0);

        session.toggle_points(true);
        session.toggle_points(true);

        assert_eq!(session.points_redeemed(), 1000);
        assert_eq!(session.final_total(), Decimal::new(56481, 1));

        session.toggle_points(false);

        assert_eq!(session.points_redeemed(), 0);
    }

    #[tokio::test]
    async fn checkout_debits_points_and_resets_session() -> TestResult {
        let mut session = session_with_two_kits(MemoryStore::new(), 1000);

        session.apply_coupon("SAVE500").await?;
        session.toggle_points(true);

        let order = session.checkout().ok_or("expected an order")?;

        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.totals.final_total(), Decimal::new(51481, 1));
        assert_eq!(session.points_balance(), 0);
        assert!(session.cart().is_empty());
        assert!(session.applied_coupon().is_none());
        assert!(!session.state().points().is_enabled());

        Ok(())
    }

    #[test]
    fn checkout_of_empty_cart_changes_nothing() {
        let mut session =
            CartSession::start("s1", &config(1000), collaborators(), MemoryStore::new());
        session.toggle_points(true);

        assert!(session.checkout().is_none());
        assert_eq!(session.points_balance(), 1000);
        assert!(session.state().points().is_enabled());
    }

    #[test]
    fn mutations_are_persisted() -> TestResult {
        let store = MemoryStore::new();
        let session = session_with_two_kits(&store, 0);

        let lines: Option<Vec<CartLine>> = load_json(&store, &cart_key(session.id()))?;

        assert_eq!(lines.map(|l| l.len()), Some(1));

        Ok(())
    }

    #[test]
    fn emptying_the_cart_removes_stored_lines() -> TestResult {
        let store = MemoryStore::new();
        let mut session = session_with_two_kits(&store, 0);

        session.remove_item("p1", PackageType::HardwareKit);

        assert_eq!(store.load(&cart_key(session.id()))?, None);

        Ok(())
    }

    #[test]
    fn checkout_persists_remaining_points() -> TestResult {
        let store = MemoryStore::new();
        let mut session = session_with_two_kits(&store, 10_000);

        session.toggle_points(true);
        session.checkout().ok_or("expected an order")?;

        let balance: Option<u64> = load_json(&store, &points_balance_key(session.id()))?;

        // 6998 redeemed from 10000
        assert_eq!(balance, Some(3002));

        let restored = CartSession::restore("s1", &config(10_000), collaborators(), &store);

        assert_eq!(restored.points_balance(), 3002);
        assert!(!restored.state().points().is_enabled());

        Ok(())
    }

    #[tokio::test]
    async fn restore_resumes_cart_and_verification() -> TestResult {
        let store = MemoryStore::new();

        {
            let mut session = session_with_two_kits(&store, 0);

            session.apply_coupon("SAVE500").await?;
            session
                .verify_student(&StudentDocument::new("id.png", Vec::new()))
                .await;
        }

        let restored = CartSession::restore("s1", &config(0), collaborators(), &store);

        assert_eq!(restored.cart().total_items(), 2);
        assert!(restored.is_student_verified());
        // coupons are re-applied by the shopper
        assert!(restored.applied_coupon().is_none());

        Ok(())
    }

    #[test]
    fn restore_of_unknown_session_is_empty() {
        let restored =
            CartSession::restore("nobody", &config(0), collaborators(), MemoryStore::new());

        assert!(restored.cart().is_empty());
        assert!(!restored.is_student_verified());
    }

    #[test]
    fn restore_ignores_malformed_state() -> TestResult {
        let store = MemoryStore::new();

        store.save(&cart_key("s1"), "{not json".to_string())?;
        store.save(&student_verified_key("s1"), "\"yes\"".to_string())?;

        let restored = CartSession::restore("s1", &config(0), collaborators(), &store);

        assert!(restored.cart().is_empty());
        assert!(!restored.is_student_verified());

        Ok(())
    }

    #[test]
    fn store_failures_do_not_fail_operations() {
        let mut session = CartSession::restore("s1", &config(0), collaborators(), BrokenStore);

        session.add_item(kit());
        session.update_quantity("p1", PackageType::HardwareKit, 1);

        assert_eq!(session.cart().total_items(), 2);
    }
}
