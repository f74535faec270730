//! Packages

use std::{fmt, slice};

use async_trait::async_trait;
use mockall::automock;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};
use thiserror::Error;

new_key_type! {
    /// Package Key
    pub struct PackageKey;
}

/// Identifier of a package in the external catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageId(String);

impl PackageId {
    /// Creates a new package identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PackageId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Whether a package is bought for one viewer or shared by a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageKind {
    /// Single viewer, priced at the package base price plus extras.
    #[default]
    Individual,

    /// Several viewers sharing one purchase at a discounted per-person fee.
    Group,
}

/// A single line in a package's feature list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    /// Feature text
    pub text: String,

    /// Whether the package includes this feature
    pub included: bool,
}

/// Package
#[derive(Debug, Clone)]
pub struct Package<'a> {
    /// Package identifier
    pub id: PackageId,

    /// Display name
    pub name: String,

    /// Individual or group pricing
    pub kind: PackageKind,

    /// Base price
    pub price: Money<'a, Currency>,

    /// Price unit or period label (e.g. "per event")
    pub period: String,

    /// Ordered feature list
    pub features: Vec<Feature>,

    /// Photos included before extras apply
    pub included_photos: Option<u32>,

    /// Videos included before extras apply
    pub included_videos: Option<u32>,
}

impl Package<'_> {
    /// Returns true if this package is priced per person for a group.
    pub fn is_group(&self) -> bool {
        self.kind == PackageKind::Group
    }
}

/// Errors raised while building a catalog.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    /// A package with the same id is already present.
    #[error("duplicate package id: {0}")]
    DuplicatePackage(PackageId),

    /// A package's currency differs from the catalog currency (package, package currency, catalog currency).
    #[error("package {0} has currency {1}, but catalog has currency {2}")]
    CurrencyMismatch(PackageId, &'static str, &'static str),

    /// No package exists with the given id.
    #[error("package not found: {0}")]
    PackageNotFound(PackageId),

    /// The catalog could not be fetched.
    #[error("package catalog unavailable: {0}")]
    Unavailable(String),
}

/// Supplies the package catalog, from the backend API or a local fixture.
#[automock]
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the current package catalog.
    async fn fetch_catalog(&self) -> Result<Catalog<'static>, CatalogError>;
}

/// Immutable package catalog, kept in the order packages were loaded.
#[derive(Debug)]
pub struct Catalog<'a> {
    packages: SlotMap<PackageKey, Package<'a>>,
    keys: FxHashMap<PackageId, PackageKey>,
    order: Vec<PackageKey>,
    currency: &'static Currency,
}

impl<'a> Catalog<'a> {
    /// Create an empty catalog priced in the given currency.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            packages: SlotMap::with_key(),
            keys: FxHashMap::default(),
            order: Vec::new(),
            currency,
        }
    }

    /// Create a catalog from a list of packages.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] on duplicate ids or currency mismatches.
    pub fn with_packages(
        packages: impl IntoIterator<Item = Package<'a>>,
        currency: &'static Currency,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::new(currency);

        for package in packages {
            catalog.insert(package)?;
        }

        Ok(catalog)
    }

    /// Add a package to the catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the id is already taken or the package is
    /// priced in a different currency.
    pub fn insert(&mut self, package: Package<'a>) -> Result<PackageKey, CatalogError> {
        if self.keys.contains_key(&package.id) {
            return Err(CatalogError::DuplicatePackage(package.id));
        }

        let package_currency = package.price.currency();

        if package_currency != self.currency {
            return Err(CatalogError::CurrencyMismatch(
                package.id,
                package_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        let id = package.id.clone();
        let key = self.packages.insert(package);

        self.keys.insert(id, key);
        self.order.push(key);

        Ok(key)
    }

    /// Look up a package by id.
    pub fn get(&self, id: &PackageId) -> Option<&Package<'a>> {
        self.keys.get(id).and_then(|key| self.packages.get(*key))
    }

    /// Look up a package by id, failing if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::PackageNotFound`] for unknown ids.
    pub fn require(&self, id: &PackageId) -> Result<&Package<'a>, CatalogError> {
        self.get(id)
            .ok_or_else(|| CatalogError::PackageNotFound(id.clone()))
    }

    /// Iterate over packages in load order.
    pub fn iter(&self) -> CatalogIter<'_, 'a> {
        CatalogIter {
            keys: self.order.iter(),
            packages: &self.packages,
        }
    }

    /// Number of packages in the catalog.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Currency every package is priced in.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

/// Iterator over catalog packages in load order.
#[derive(Debug)]
pub struct CatalogIter<'c, 'a> {
    keys: slice::Iter<'c, PackageKey>,
    packages: &'c SlotMap<PackageKey, Package<'a>>,
}

impl<'c, 'a> Iterator for CatalogIter<'c, 'a> {
    type Item = &'c Package<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let packages = self.packages;

        self.keys.by_ref().find_map(|key| packages.get(*key))
    }
}

impl<'c, 'a> IntoIterator for &'c Catalog<'a> {
    type Item = &'c Package<'a>;
    type IntoIter = CatalogIter<'c, 'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
