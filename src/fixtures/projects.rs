//! Project Fixtures

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::iso::{Currency, EUR, GBP, INR, USD};
use serde::Deserialize;
use smallvec::SmallVec;

use crate::{
    fixtures::FixtureError,
    prices::Price,
    projects::{PackageType, Project},
};

/// Wrapper for projects in YAML
#[derive(Debug, Deserialize)]
pub struct ProjectsFixture {
    /// Map of project id -> project fixture
    pub projects: FxHashMap<String, ProjectFixture>,
}

/// Project Fixture
#[derive(Debug, Deserialize)]
pub struct ProjectFixture {
    /// Display title
    pub title: String,

    /// Gallery image
    #[serde(default)]
    pub image_url: String,

    /// Package prices (e.g., `HARDWARE_KIT: "34.99 INR"`)
    pub packages: FxHashMap<PackageType, String>,
}

impl ProjectFixture {
    /// Convert into a [`Project`], returning the currency its prices are written in.
    ///
    /// # Errors
    ///
    /// Returns an error if a price cannot be parsed or the packages disagree on currency.
    pub fn try_into_project(
        self,
        id: String,
    ) -> Result<(Project, Option<&'static Currency>), FixtureError> {
        let mut currency: Option<&'static Currency> = None;
        let mut packages: SmallVec<[(PackageType, Price); 3]> = SmallVec::new();

        for (package, raw) in self.packages {
            let (price, price_currency) = parse_price(&raw)?;

            match currency {
                Some(existing) if existing != price_currency => {
                    return Err(FixtureError::CurrencyMismatch(
                        existing.iso_alpha_code.to_string(),
                        price_currency.iso_alpha_code.to_string(),
                    ));
                }
                Some(_) => {}
                None => currency = Some(price_currency),
            }

            packages.push((package, price));
        }

        packages.sort_by_key(|(package, _)| *package);

        let project = Project {
            id,
            title: self.title,
            image_url: self.image_url,
            packages,
        };

        Ok((project, currency))
    }
}

/// Parse a currency code (e.g., "INR")
///
/// # Errors
///
/// Returns an error if the code is not one of the supported currencies.
pub fn parse_currency(code: &str) -> Result<&'static Currency, FixtureError> {
    match code.trim() {
        "INR" => Ok(INR),
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        other => Err(FixtureError::UnknownCurrency(other.to_string())),
    }
}

/// Parse price string (e.g., "34.99 INR") into a minor-unit price and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY", if the
/// amount is negative or unparseable, or if the currency code is not recognized.
pub fn parse_price(s: &str) -> Result<(Price, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    let [amount, currency_code] = parts.as_slice() else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = parse_currency(currency_code)?;

    let minor_units = amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|value| value.round_dp(0).to_u64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((Price::new(minor_units), currency))
}

/// Parse percentage string (e.g., "15%" or "0.15") into a `Percentage`
///
/// # Errors
///
/// Returns an error if the string cannot be parsed or lies outside 0% to 100%.
pub fn parse_percentage(s: &str) -> Result<Percentage, FixtureError> {
    let trimmed = s.trim();

    let fraction = if let Some(percent_str) = trimmed.strip_suffix('%') {
        percent_str
            .trim()
            .parse::<Decimal>()
            .map(|value| value / Decimal::ONE_HUNDRED)
    } else {
        trimmed.parse::<Decimal>()
    }
    .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?;

    if fraction.is_sign_negative() || fraction > Decimal::ONE {
        return Err(FixtureError::InvalidPercentage(s.to_string()));
    }

    Ok(Percentage::from(fraction))
}
