//! Package Fixtures

use rusty_money::Money;
use serde::Deserialize;

use crate::{
    fixtures::{FixtureError, parse_price},
    packages::{Catalog, Feature, Package, PackageId, PackageKind},
};

/// Wrapper for packages in YAML
#[derive(Debug, Deserialize)]
pub struct PackagesFixture {
    /// Packages in display order
    pub packages: Vec<PackageFixture>,
}

/// Package Fixture
#[derive(Debug, Deserialize)]
pub struct PackageFixture {
    /// Package id
    pub id: String,

    /// Display name
    pub name: String,

    /// Individual or group pricing
    #[serde(default)]
    pub kind: PackageKind,

    /// Base price (e.g., "15000 RWF")
    pub price: String,

    /// Price period label
    #[serde(default)]
    pub period: String,

    /// Feature list
    #[serde(default)]
    pub features: Vec<FeatureFixture>,

    /// Included photos
    #[serde(default)]
    pub included_photos: Option<u32>,

    /// Included videos
    #[serde(default)]
    pub included_videos: Option<u32>,
}

/// Feature Fixture
#[derive(Debug, Deserialize)]
pub struct FeatureFixture {
    /// Feature text
    pub text: String,

    /// Whether the feature is included (defaults to true)
    #[serde(default = "included_by_default")]
    pub included: bool,
}

fn included_by_default() -> bool {
    true
}

impl TryFrom<PackageFixture> for Package<'static> {
    type Error = FixtureError;

    fn try_from(fixture: PackageFixture) -> Result<Self, Self::Error> {
        let (minor_units, currency) = parse_price(&fixture.price)?;

        Ok(Package {
            id: PackageId::new(fixture.id),
            name: fixture.name,
            kind: fixture.kind,
            price: Money::from_minor(minor_units, currency),
            period: fixture.period,
            features: fixture
                .features
                .into_iter()
                .map(|feature| Feature {
                    text: feature.text,
                    included: feature.included,
                })
                .collect(),
            included_photos: fixture.included_photos,
            included_videos: fixture.included_videos,
        })
    }
}

/// Parse a YAML package list into a catalog; the first package sets the currency.
///
/// # Errors
///
/// Returns an error if the YAML is malformed, a price is invalid, the list is
/// empty, or packages disagree on id uniqueness or currency.
pub fn parse_catalog(yaml: &str) -> Result<Catalog<'static>, FixtureError> {
    let fixture: PackagesFixture = serde_norway::from_str(yaml)?;

    let packages = fixture
        .packages
        .into_iter()
        .map(Package::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    let currency = packages
        .first()
        .map(|package| package.price.currency())
        .ok_or(FixtureError::NoPackages)?;

    Ok(Catalog::with_packages(packages, currency)?)
}
