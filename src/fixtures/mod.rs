//! Fixtures

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use slotmap::SlotMap;
use thiserror::Error;

use crate::{
    cart::{Cart, NewCartLine},
    directory::StaticCouponDirectory,
    discounts::coupons::Coupon,
    fixtures::{coupons::CouponsFixture, projects::ProjectsFixture},
    projects::{PackageType, Project, ProjectKey},
};

pub mod coupons;
pub mod projects;

pub use projects::{parse_currency, parse_percentage, parse_price};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Project not found
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    /// Project does not offer the package
    #[error("Project {0} is not offered as {1}")]
    PackageNotOffered(String, PackageType),

    /// Currency mismatch between prices
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No priced fixtures loaded yet
    #[error("No projects loaded yet; currency unknown")]
    NoCurrency,
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Projects stored under generated keys
    projects: SlotMap<ProjectKey, Project>,

    /// Project id -> `SlotMap` key
    project_keys: FxHashMap<String, ProjectKey>,

    /// Coupons offered with the catalog
    coupons: Vec<Coupon>,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            projects: SlotMap::with_key(),
            project_keys: FxHashMap::default(),
            coupons: Vec::new(),
            currency: None,
        }
    }

    /// Load projects from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if there are currency mismatches.
    pub fn load_projects(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("projects").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: ProjectsFixture = serde_norway::from_str(&contents)?;

        for (id, project_fixture) in fixture.projects {
            let (project, currency) = project_fixture.try_into_project(id.clone())?;

            if let Some(currency) = currency {
                self.check_currency(currency)?;
            }

            let project_key = self.projects.insert(project);

            self.project_keys.insert(id, project_key);
        }

        Ok(self)
    }

    /// Load coupons from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if flat amounts use a
    /// different currency from the catalog.
    pub fn load_coupons(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("coupons").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: CouponsFixture = serde_norway::from_str(&contents)?;

        for coupon_fixture in fixture.coupons {
            let (coupon, currency) = coupon_fixture.try_into_coupon()?;

            if let Some(currency) = currency {
                self.check_currency(currency)?;
            }

            self.coupons.push(coupon);
        }

        Ok(self)
    }

    /// Load a complete fixture set (projects and coupons with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_projects(name)?.load_coupons(name)?;

        Ok(fixture)
    }

    /// Get a project by its id
    ///
    /// # Errors
    ///
    /// Returns an error if the project is not found.
    pub fn project(&self, id: &str) -> Result<&Project, FixtureError> {
        let project_key = self.project_key(id)?;

        self.projects
            .get(project_key)
            .ok_or_else(|| FixtureError::ProjectNotFound(id.to_string()))
    }

    /// Get a project key by its id
    ///
    /// # Errors
    ///
    /// Returns an error if the project is not found.
    pub fn project_key(&self, id: &str) -> Result<ProjectKey, FixtureError> {
        self.project_keys
            .get(id)
            .copied()
            .ok_or_else(|| FixtureError::ProjectNotFound(id.to_string()))
    }

    /// Build the cart line for one unit of a project package
    ///
    /// # Errors
    ///
    /// Returns an error if the project is unknown or not offered as `package`.
    pub fn line(&self, id: &str, package: PackageType) -> Result<NewCartLine, FixtureError> {
        self.project(id)?
            .line(package)
            .ok_or_else(|| FixtureError::PackageNotOffered(id.to_string(), package))
    }

    /// Project `SlotMap`
    pub fn projects(&self) -> &SlotMap<ProjectKey, Project> {
        &self.projects
    }

    /// Get all coupons
    pub fn coupons(&self) -> &[Coupon] {
        &self.coupons
    }

    /// A coupon directory answering with the loaded coupons
    pub fn coupon_directory(&self) -> StaticCouponDirectory {
        StaticCouponDirectory::new(self.coupons.iter().cloned())
    }

    /// An empty cart in the fixture currency
    ///
    /// # Errors
    ///
    /// Returns an error if no priced fixtures have been loaded yet.
    pub fn cart(&self) -> Result<Cart, FixtureError> {
        Ok(Cart::new(self.currency()?))
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no priced fixtures have been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }

    fn check_currency(&mut self, currency: &'static Currency) -> Result<(), FixtureError> {
        match self.currency {
            Some(existing) if existing != currency => Err(FixtureError::CurrencyMismatch(
                existing.iso_alpha_code.to_string(),
                currency.iso_alpha_code.to_string(),
            )),
            Some(_) => Ok(()),
            None => {
                self.currency = Some(currency);
                Ok(())
            }
        }
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
