//! Configuration
//!
//! Storefront pricing policy, loaded from YAML or taken from the defaults.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use rusty_money::iso::{Currency, INR};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    directory::DEFAULT_LATENCY,
    discounts::{
        PricingRules,
        bulk::{BulkSchedule, BulkScheduleError, BulkTier},
    },
    fixtures::{FixtureError, parse_currency, parse_percentage},
};

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the configuration file
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// File that could not be read
        path: PathBuf,

        /// Underlying error
        source: std::io::Error,
    },

    /// YAML parsing error
    #[error("Failed to parse config YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid currency or percentage
    #[error(transparent)]
    Value(#[from] FixtureError),

    /// Bulk tiers are not monotonic
    #[error(transparent)]
    BulkSchedule(#[from] BulkScheduleError),
}

/// Bulk tier as written in YAML
#[derive(Debug, Deserialize)]
struct BulkTierFile {
    min_items: u64,
    percent: u8,
}

/// Configuration as written in YAML; every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PricingConfigFile {
    currency: Option<String>,
    bulk_tiers: Option<Vec<BulkTierFile>>,
    student_discount: Option<String>,
    points_balance: Option<u64>,
    latency_ms: Option<u64>,
}

/// Storefront pricing configuration.
#[derive(Debug, Clone)]
pub struct PricingConfig {
    /// Currency of the storefront
    pub currency: &'static Currency,

    /// Discount rules used by the aggregation
    pub rules: PricingRules,

    /// Loyalty points a new session starts with
    pub points_balance: u64,

    /// Simulated collaborator latency
    pub latency: Duration,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            currency: INR,
            rules: PricingRules::default(),
            points_balance: 0,
            latency: DEFAULT_LATENCY,
        }
    }
}

impl PricingConfig {
    /// Parse configuration from YAML. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the YAML is malformed, names an unknown currency,
    /// carries an invalid percentage, or describes non-monotonic bulk tiers.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let file: PricingConfigFile = serde_norway::from_str(yaml)?;
        let defaults = Self::default();

        let currency = match file.currency {
            Some(code) => parse_currency(&code)?,
            None => defaults.currency,
        };

        let bulk = match file.bulk_tiers {
            Some(tiers) => BulkSchedule::new(tiers.into_iter().map(|tier| BulkTier {
                min_items: tier.min_items,
                percent: tier.percent,
            }))?,
            None => defaults.rules.bulk,
        };

        let student_discount = match file.student_discount {
            Some(raw) => parse_percentage(&raw)?,
            None => defaults.rules.student_discount,
        };

        Ok(Self {
            currency,
            rules: PricingRules {
                bulk,
                student_discount,
            },
            points_balance: file.points_balance.unwrap_or(defaults.points_balance),
            latency: file
                .latency_ms
                .map_or(defaults.latency, Duration::from_millis),
        })
    }

    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or is invalid.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_yaml_str(&contents)
    }

    /// Load `./fixtures/config/<name>.yml`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or is invalid.
    pub fn from_set(name: &str) -> Result<Self, ConfigError> {
        Self::from_path(Path::new("./fixtures/config").join(format!("{name}.yml")))
    }
}
