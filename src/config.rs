//! Config

use std::{fs, path::Path, time::Duration};

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    fixtures::{FixtureError, parse_currency, parse_percentage, parse_price},
    pricing::{PricingError, UnitRates},
};

/// Route viewers are sent to after an individual purchase.
pub const DEFAULT_LIVE_STREAM_ROUTE: &str = "/live-stream";

/// How long the success state is shown before navigating on.
pub const DEFAULT_SUCCESS_DELAY: Duration = Duration::from_secs(2);

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the config file
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price, percentage or currency value
    #[error(transparent)]
    Value(#[from] FixtureError),

    /// Default rates could not be derived
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// A rate is priced in a different currency to the catalog
    #[error("{0} rate is in {1}, expected {2}")]
    RateCurrency(&'static str, &'static str, &'static str),

    /// Discount outside 0-100%
    #[error("group discount must be between 0% and 100%, got {0}")]
    DiscountRange(String),
}

/// Booking behaviour settings.
#[derive(Debug, Clone)]
pub struct BookingConfig {
    /// Currency all prices are quoted in
    pub currency: &'static Currency,

    /// Prices of extra photos and videos
    pub rates: UnitRates<'static>,

    /// Per-person discount for group packages
    pub group_discount: Percentage,

    /// Delay between a successful submission and navigation
    pub success_delay: Duration,

    /// Route for individual viewers after purchase
    pub live_stream_route: String,
}

impl BookingConfig {
    /// Defaults for a catalog priced in `currency`.
    ///
    /// # Errors
    ///
    /// Returns an error if the standard rates cannot be expressed in the currency.
    pub fn for_currency(currency: &'static Currency) -> Result<Self, ConfigError> {
        Ok(Self {
            currency,
            rates: UnitRates::standard(currency)?,
            group_discount: Percentage::from(Decimal::new(10, 2)),
            success_delay: DEFAULT_SUCCESS_DELAY,
            live_stream_route: DEFAULT_LIVE_STREAM_ROUTE.to_string(),
        })
    }

    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or holds invalid values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents)
    }

    /// Parse configuration from YAML; unset keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or holds invalid values.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_norway::from_str(yaml)?;

        file.try_into()
    }
}

/// On-disk shape of the config file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    currency: Option<String>,
    photo_rate: Option<String>,
    video_rate: Option<String>,
    group_discount: Option<String>,
    success_delay_ms: Option<u64>,
    live_stream_route: Option<String>,
}

impl TryFrom<ConfigFile> for BookingConfig {
    type Error = ConfigError;

    fn try_from(file: ConfigFile) -> Result<Self, Self::Error> {
        let currency = match file.currency.as_deref() {
            Some(code) => parse_currency(code)?,
            None => iso::RWF,
        };

        let mut config = Self::for_currency(currency)?;

        if let Some(rate) = file.photo_rate {
            config.rates.photo = rate_in(&rate, "photo", currency)?;
        }

        if let Some(rate) = file.video_rate {
            config.rates.video = rate_in(&rate, "video", currency)?;
        }

        if let Some(discount) = file.group_discount {
            let percentage = parse_percentage(&discount)?;
            let fraction = percentage * Decimal::ONE;

            if fraction < Decimal::ZERO || fraction > Decimal::ONE {
                return Err(ConfigError::DiscountRange(discount));
            }

            config.group_discount = percentage;
        }

        if let Some(ms) = file.success_delay_ms {
            config.success_delay = Duration::from_millis(ms);
        }

        if let Some(route) = file.live_stream_route {
            config.live_stream_route = route;
        }

        Ok(config)
    }
}

fn rate_in(
    value: &str,
    name: &'static str,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, ConfigError> {
    let (minor, rate_currency) = parse_price(value)?;

    if rate_currency != currency {
        return Err(ConfigError::RateCurrency(
            name,
            rate_currency.iso_alpha_code,
            currency.iso_alpha_code,
        ));
    }

    Ok(Money::from_minor(minor, currency))
}
