//! Fixtures
//!
//! Package catalogs stored as YAML under `{base}/packages/{name}.yml`.

use std::{fs, path::PathBuf};

use async_trait::async_trait;
use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::iso::{self, Currency};
use thiserror::Error;

use crate::{
    packages::{Catalog, CatalogError, CatalogSource},
    pricing::minor_per_major,
};

pub mod packages;

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

    /// The fixture lists no packages
    #[error("No packages in fixture; currency unknown")]
    NoPackages,

    /// Catalog construction error
    #[error("Failed to build catalog: {0}")]
    Catalog(#[from] CatalogError),
}

/// Fixture loader
#[derive(Debug, Clone)]
pub struct Fixture {
    base_path: PathBuf,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    /// Create a loader reading from `./fixtures`
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a loader with a custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Load the package catalog with the given name.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, a price is
    /// malformed, or packages disagree on currency.
    pub fn catalog(&self, name: &str) -> Result<Catalog<'static>, FixtureError> {
        let file_path = self.base_path.join("packages").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        packages::parse_catalog(&contents)
    }
}

/// Catalog source backed by a fixture file.
#[derive(Debug, Clone)]
pub struct FixtureSource {
    fixture: Fixture,
    name: String,
}

impl FixtureSource {
    /// Serve the named catalog from the given loader.
    pub fn new(fixture: Fixture, name: impl Into<String>) -> Self {
        Self {
            fixture,
            name: name.into(),
        }
    }
}

#[async_trait]
impl CatalogSource for FixtureSource {
    async fn fetch_catalog(&self) -> Result<Catalog<'static>, CatalogError> {
        self.fixture
            .catalog(&self.name)
            .map_err(|error| CatalogError::Unavailable(error.to_string()))
    }
}

/// Parse a currency code (e.g. "RWF").
///
/// # Errors
///
/// Returns [`FixtureError::UnknownCurrency`] if the code is not an ISO currency.
pub fn parse_currency(code: &str) -> Result<&'static Currency, FixtureError> {
    let code = code.trim();

    iso::find(code).ok_or_else(|| FixtureError::UnknownCurrency(code.to_string()))
}

/// Parse price string (e.g., "15000 RWF" or "2.99 USD") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    let [amount, currency_code] = parts.as_slice() else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    if amount.is_sign_negative() {
        return Err(FixtureError::InvalidPrice(s.to_string()));
    }

    let currency = parse_currency(currency_code)?;

    let scale = minor_per_major(currency).map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let minor_units = amount
        .checked_mul(Decimal::from(scale))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, currency))
}

/// Parse percentage string (e.g., "10%" or "0.10") into a `Percentage`
///
/// Accepts two formats:
/// - Percentage format: "10%" for 10%
/// - Decimal format: "0.10" for 10%
///
/// # Errors
///
/// Returns an error if the string cannot be parsed.
pub fn parse_percentage(s: &str) -> Result<Percentage, FixtureError> {
    let trimmed = s.trim();

    if let Some(percent_str) = trimmed.strip_suffix('%') {
        let value = percent_str
            .trim()
            .parse::<Decimal>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?;

        Ok(Percentage::from(value / Decimal::ONE_HUNDRED))
    } else {
        let value = trimmed
            .parse::<Decimal>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?;

        Ok(Percentage::from(value))
    }
}
