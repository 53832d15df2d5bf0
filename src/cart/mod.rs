//! Cart
//!
//! The line-item store for a shopping session. Lines are unique per
//! (project, package) pair; quantities never drop below one while a line exists.

use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize};

use crate::{pricing::subtotal, prices::Price, projects::PackageType};

/// Data required to put a project package in the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCartLine {
    /// Catalog project identifier
    pub project_id: String,

    /// Package being bought
    pub package: PackageType,

    /// Price of one unit in minor units
    pub unit_price: Price,

    /// Image shown next to the line
    pub image_url: String,

    /// Display title
    pub title: String,
}

/// A single (project, package) entry with a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    project_id: String,
    package: PackageType,
    quantity: u32,
    unit_price: Price,
    image_url: String,
    title: String,
}

impl CartLine {
    fn from_new(line: NewCartLine, quantity: u32) -> Self {
        Self {
            project_id: line.project_id,
            package: line.package,
            quantity,
            unit_price: line.unit_price,
            image_url: line.image_url,
            title: line.title,
        }
    }

    /// Catalog project identifier
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Package type
    pub fn package(&self) -> PackageType {
        self.package
    }

    /// Number of units, always at least one.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Price of one unit
    pub fn unit_price(&self) -> Price {
        self.unit_price
    }

    /// Image shown next to the line
    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    /// Display title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// `unit_price × quantity`, unrounded.
    pub fn line_total(&self) -> Decimal {
        self.unit_price.times(self.quantity)
    }

    fn matches(&self, project_id: &str, package: PackageType) -> bool {
        self.package == package && self.project_id == project_id
    }
}

/// Cart
#[derive(Debug, Clone)]
pub struct Cart {
    lines: Vec<CartLine>,
    currency: &'static Currency,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            lines: Vec::new(),
            currency,
        }
    }

    /// Create a cart from previously stored lines.
    ///
    /// Lines with a zero quantity are dropped and repeated (project, package) pairs are
    /// merged, so the result upholds the same invariants as a cart built through
    /// [`Cart::add_item`].
    #[must_use]
    pub fn with_lines(
        lines: impl IntoIterator<Item = CartLine>,
        currency: &'static Currency,
    ) -> Self {
        let mut cart = Cart::new(currency);

        for line in lines.into_iter().filter(|line| line.quantity > 0) {
            match cart.find_mut(&line.project_id, line.package) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(line.quantity);
                }
                None => cart.lines.push(line),
            }
        }

        cart
    }

    /// Add one unit of a project package, returning the line's new quantity.
    ///
    /// Adding a pair that is already in the cart increments its quantity; the unit price
    /// captured when the line was created is kept.
    pub fn add_item(&mut self, line: NewCartLine) -> u32 {
        if let Some(existing) = self.find_mut(&line.project_id, line.package) {
            existing.quantity = existing.quantity.saturating_add(1);

            return existing.quantity;
        }

        self.lines.push(CartLine::from_new(line, 1));

        1
    }

    /// Delete the matching line, returning it. Missing lines are ignored.
    pub fn remove_item(&mut self, project_id: &str, package: PackageType) -> Option<CartLine> {
        let index = self.position(project_id, package)?;

        Some(self.lines.remove(index))
    }

    /// Adjust a line's quantity by `delta`, flooring at one.
    ///
    /// Returns the new quantity, or `None` when no line matches.
    pub fn update_quantity(
        &mut self,
        project_id: &str,
        package: PackageType,
        delta: i32,
    ) -> Option<u32> {
        let line = self.find_mut(project_id, package)?;

        let adjusted = if delta.is_negative() {
            line.quantity.saturating_sub(delta.unsigned_abs())
        } else {
            line.quantity.saturating_add(delta.unsigned_abs())
        };

        line.quantity = adjusted.max(1);

        Some(line.quantity)
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Look up a line.
    pub fn get(&self, project_id: &str, package: PackageType) -> Option<&CartLine> {
        self.lines
            .iter()
            .find(|line| line.matches(project_id, package))
    }

    /// Iterate over the lines in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter()
    }

    /// The lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of quantities across every line.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// `Σ(unit_price × quantity)`, unrounded.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        subtotal(&self.lines)
    }

    /// Get the currency of the cart.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    fn position(&self, project_id: &str, package: PackageType) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| line.matches(project_id, package))
    }

    fn find_mut(&mut self, project_id: &str, package: PackageType) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.matches(project_id, package))
    }
}
