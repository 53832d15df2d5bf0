//! Prices

use std::{fmt, ops::Deref};

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};

/// Represents a price in the smallest unit of its currency (pence, cents, paise).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price {
    value: u64,
}

impl Price {
    /// Creates a new Price
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Price { value }
    }

    /// The unrounded decimal amount in minor units.
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        Decimal::from(self.value)
    }

    /// Price multiplied by a quantity, saturating at [`Decimal::MAX`].
    #[must_use]
    pub fn times(self, quantity: u32) -> Decimal {
        self.to_decimal().saturating_mul(Decimal::from(quantity))
    }

    /// Converts the price into money in the given currency.
    #[must_use]
    pub fn to_money(self, currency: &'static Currency) -> Money<'static, Currency> {
        Money::from_minor(i64::try_from(self.value).unwrap_or(i64::MAX), currency)
    }
}

impl Deref for Price {
    type Target = u64;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl From<u64> for Price {
    fn from(value: u64) -> Self {
        Price::new(value)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}
