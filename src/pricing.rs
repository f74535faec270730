//! Pricing
//!
//! Pure price derivation for package selections: base price plus per-unit
//! extras, and the per-person group discount.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, MoneyError, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::packages::{Package, PackageKind};

/// Smallest head count accepted for group pricing.
pub const MIN_GROUP_SIZE: u32 = 2;

/// Errors that can occur while deriving prices.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// A multiplication or sum left the range of minor units.
    #[error("price arithmetic overflowed")]
    Overflow,

    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Extra units bought on top of a package's included allotment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extras {
    /// Extra photos
    pub photos: u32,

    /// Extra videos
    pub videos: u32,
}

impl Extras {
    /// Create a new extras selection.
    pub fn new(photos: u32, videos: u32) -> Self {
        Self { photos, videos }
    }

    /// Returns true when no extras are selected.
    pub fn is_empty(&self) -> bool {
        self.photos == 0 && self.videos == 0
    }
}

/// Per-unit prices for extras.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitRates<'a> {
    /// Price of one extra photo
    pub photo: Money<'a, Currency>,

    /// Price of one extra video
    pub video: Money<'a, Currency>,
}

impl<'a> UnitRates<'a> {
    /// Default rates: one major unit per photo, two per video.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the currency exponent cannot be
    /// represented in minor units.
    pub fn standard(currency: &'a Currency) -> Result<Self, PricingError> {
        let unit = minor_per_major(currency)?;

        Ok(Self {
            photo: Money::from_minor(unit, currency),
            video: Money::from_minor(unit.checked_mul(2).ok_or(PricingError::Overflow)?, currency),
        })
    }
}

/// Price breakdown for a package with extras.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PackagePrice<'a> {
    /// Package base price
    pub base: Money<'a, Currency>,

    /// Cost of the extra photos
    pub photos: Money<'a, Currency>,

    /// Cost of the extra videos
    pub videos: Money<'a, Currency>,

    /// Base plus extras
    pub total: Money<'a, Currency>,
}

/// Calculates the total price for a package with extras:
/// `base + photos * photo_rate + videos * video_rate`.
///
/// # Errors
///
/// - [`PricingError::Overflow`]: the total does not fit in minor units.
/// - [`PricingError::Money`]: the rates are in a different currency to the base price.
pub fn package_total<'a>(
    base: Money<'a, Currency>,
    extras: Extras,
    rates: &UnitRates<'a>,
) -> Result<PackagePrice<'a>, PricingError> {
    let photos = times(rates.photo, extras.photos)?;
    let videos = times(rates.video, extras.videos)?;

    let total = base.add(photos)?.add(videos)?;

    Ok(PackagePrice {
        base,
        photos,
        videos,
        total,
    })
}

/// Price breakdown for a group purchase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupQuote<'a> {
    /// Fee a single viewer would pay alone
    pub individual_fee: Money<'a, Currency>,

    /// Discounted fee per person
    pub per_person: Money<'a, Currency>,

    /// Discounted fee for the whole group
    pub total: Money<'a, Currency>,

    /// Saved against everyone paying the individual fee
    pub savings: Money<'a, Currency>,

    /// Number of people covered
    pub people: u32,
}

impl GroupQuote<'_> {
    /// A zero or one person group prices fine but can never be booked.
    pub fn is_bookable(&self) -> bool {
        meets_group_minimum(self.people)
    }
}

/// Returns true if `people` is enough for a group booking.
pub fn meets_group_minimum(people: u32) -> bool {
    people >= MIN_GROUP_SIZE
}

/// Calculates group pricing:
///
/// - `per_person = individual_fee * (1 - discount)`
/// - `total = per_person * people`
/// - `savings = individual_fee * people - total`
///
/// # Errors
///
/// - [`PricingError::PercentConversion`]: the discount cannot be applied in minor units.
/// - [`PricingError::Overflow`]: totals do not fit in minor units.
pub fn group_quote<'a>(
    individual_fee: Money<'a, Currency>,
    people: u32,
    discount: &Percentage,
) -> Result<GroupQuote<'a>, PricingError> {
    let currency = individual_fee.currency();
    let fee_minor = individual_fee.to_minor_units();

    let discount_minor = percent_of_minor(discount, fee_minor)?;
    let per_person_minor = fee_minor
        .checked_sub(discount_minor)
        .ok_or(PricingError::Overflow)?;

    let per_person = Money::from_minor(per_person_minor, currency);
    let total = times(per_person, people)?;
    let undiscounted = times(individual_fee, people)?;
    let savings = undiscounted.sub(total)?;

    Ok(GroupQuote {
        individual_fee,
        per_person,
        total,
        savings,
        people,
    })
}

/// Price of a package selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionPrice<'a> {
    /// Individual package with extras
    Individual(PackagePrice<'a>),

    /// Group package priced per person
    Group(GroupQuote<'a>),
}

impl<'a> SelectionPrice<'a> {
    /// Amount due
    pub fn total(&self) -> Money<'a, Currency> {
        match self {
            SelectionPrice::Individual(price) => price.total,
            SelectionPrice::Group(quote) => quote.total,
        }
    }

    /// Savings from the group discount, if any.
    pub fn savings(&self) -> Option<Money<'a, Currency>> {
        match self {
            SelectionPrice::Individual(_) => None,
            SelectionPrice::Group(quote) => Some(quote.savings),
        }
    }
}

/// Price a package selection. Extras apply to individual packages; group
/// packages are priced per person.
///
/// # Errors
///
/// Returns a [`PricingError`] if the arithmetic fails.
pub fn price_selection<'a>(
    package: &Package<'a>,
    extras: Extras,
    people: u32,
    rates: &UnitRates<'a>,
    discount: &Percentage,
) -> Result<SelectionPrice<'a>, PricingError> {
    match package.kind {
        PackageKind::Individual => {
            package_total(package.price, extras, rates).map(SelectionPrice::Individual)
        }
        PackageKind::Group => {
            group_quote(package.price, people, discount).map(SelectionPrice::Group)
        }
    }
}

/// Multiply a price by a unit count.
fn times<'a>(price: Money<'a, Currency>, count: u32) -> Result<Money<'a, Currency>, PricingError> {
    let minor = price
        .to_minor_units()
        .checked_mul(i64::from(count))
        .ok_or(PricingError::Overflow)?;

    Ok(Money::from_minor(minor, price.currency()))
}

/// Calculate a percentage of a minor unit amount, rounded to a whole minor unit.
pub(crate) fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, PricingError> {
    let minor = Decimal::from_i64(minor).ok_or(PricingError::PercentConversion)?;

    ((*percent) * Decimal::ONE)
        .checked_mul(minor)
        .ok_or(PricingError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(PricingError::PercentConversion)
}

/// Minor units in one major unit of the currency.
pub(crate) fn minor_per_major(currency: &Currency) -> Result<i64, PricingError> {
    10_i64
        .checked_pow(currency.exponent)
        .ok_or(PricingError::Overflow)
}
