//! Booking
//!
//! The booking draft and the state machine that gates its submission.
//!
//! ```text
//! NoPackageSelected -> PackageSelected ---------------------------> FormComplete -> Submitting -> Succeeded
//!                   \-> PeopleCountPending <-> PeopleCountValid --/                            \-> Failed
//! ```
//!
//! A failed submission keeps the draft. It is a complete form with an error
//! attached, so the user may resubmit; the first edit clears the error.

use decimal_percentage::Percentage;
use rusty_money::{Money, iso::Currency};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    config::BookingConfig,
    details::{DetailField, EventDetails, Visibility},
    extras::{ExtraKind, ExtrasSelection},
    input::{FieldKind, NumericField},
    packages::{Catalog, Package, PackageId, PackageKind},
    payments::{PaymentDetails, PaymentError, PaymentField, PaymentForm, PaymentMethod},
    pricing::{
        Extras, MIN_GROUP_SIZE, PricingError, SelectionPrice, UnitRates, meets_group_minimum,
        price_selection,
    },
};

/// Error shown while a group has fewer than [`MIN_GROUP_SIZE`] people.
pub const PEOPLE_BELOW_MINIMUM: &str = "A group booking needs at least 2 people";

/// Where the booking is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingState {
    /// Nothing selected yet
    NoPackageSelected,

    /// An individual package is selected; the form is incomplete
    PackageSelected,

    /// A group package is selected without a valid people count
    PeopleCountPending,

    /// A group package with a valid people count; the form is incomplete
    PeopleCountValid,

    /// Every requirement is met
    FormComplete,

    /// Waiting on the collaborator
    Submitting,

    /// The collaborator accepted the booking
    Succeeded,

    /// The collaborator rejected the booking; the form can be resubmitted
    Failed,
}

/// Reasons a booking cannot proceed.
#[derive(Debug, Error, PartialEq)]
pub enum BookingError {
    /// No package selected
    #[error("select a package first")]
    NoPackage,

    /// People count entered for an individual package
    #[error("package {0} is not a group package")]
    NotGroupPackage(PackageId),

    /// Group people count missing or below the minimum
    #[error("a group booking needs at least {MIN_GROUP_SIZE} people")]
    PeopleCount,

    /// A count holds a number too large to price
    #[error("{0} is too large")]
    OutOfRange(FieldKind),

    /// A required event detail is empty
    #[error("{0} is required")]
    MissingDetail(DetailField),

    /// Payment form is incomplete or invalid
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Price could not be derived
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// A submission is already waiting on the collaborator
    #[error("booking is already being submitted")]
    AlreadySubmitting,

    /// The booking has already been accepted
    #[error("booking has already been submitted")]
    AlreadySucceeded,

    /// A submission result arrived with no submission pending
    #[error("no submission is in progress")]
    NotSubmitting,
}

/// Payload handed to the booking collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingRequest {
    /// Selected package
    pub package_id: PackageId,

    /// Individual or group
    pub kind: PackageKind,

    /// Group size; `None` for individual packages
    pub people: Option<u32>,

    /// Extras on individual packages
    pub extras: Extras,

    /// Amount due in minor units
    pub total_minor: i64,

    /// ISO currency code of `total_minor`
    pub currency: &'static str,

    /// Event details
    pub details: EventDetails,

    /// Validated payment details
    pub payment: PaymentDetails,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Submission {
    Idle,
    Submitting,
    Succeeded,
    Failed(String),
}

/// Booking draft and state machine.
#[derive(Debug, Clone)]
pub struct BookingFlow<'a> {
    rates: UnitRates<'a>,
    group_discount: Percentage,
    package: Option<Package<'a>>,
    extras: ExtrasSelection,
    people: NumericField,
    details: EventDetails,
    payment: PaymentForm,
    submission: Submission,
}

impl<'a> BookingFlow<'a> {
    /// Create an empty flow with the given pricing terms.
    pub fn new(rates: UnitRates<'a>, group_discount: Percentage) -> Self {
        Self {
            rates,
            group_discount,
            package: None,
            extras: ExtrasSelection::new(),
            people: NumericField::new(FieldKind::PeopleCount),
            details: EventDetails::default(),
            payment: PaymentForm::new(),
            submission: Submission::Idle,
        }
    }

    /// Create an empty flow priced with the configured terms.
    pub fn from_config(config: &BookingConfig) -> Self {
        Self::new(config.rates, config.group_discount)
    }

    /// Start every package in `catalog` with empty extras.
    pub fn load_catalog(&mut self, catalog: &Catalog<'a>) {
        self.extras = ExtrasSelection::for_packages(catalog.iter().map(|package| &package.id));

        debug!(packages = catalog.len(), "extras loaded for catalog");
    }

    /// Current lifecycle state.
    pub fn state(&self) -> BookingState {
        match (&self.submission, &self.package) {
            (Submission::Submitting, _) => BookingState::Submitting,
            (Submission::Succeeded, _) => BookingState::Succeeded,
            (_, None) => BookingState::NoPackageSelected,
            (Submission::Failed(_), Some(_)) => BookingState::Failed,
            (Submission::Idle, Some(package)) => {
                if package.is_group() && !self.people_valid() {
                    BookingState::PeopleCountPending
                } else if self.validate().is_ok() {
                    BookingState::FormComplete
                } else if package.is_group() {
                    BookingState::PeopleCountValid
                } else {
                    BookingState::PackageSelected
                }
            }
        }
    }

    /// Select a package. Switching away from another package resets the
    /// extras, people count and errors that belonged to it.
    pub fn select_package(&mut self, package: &Package<'a>) {
        if self.package.as_ref().is_some_and(|current| current.id == package.id) {
            return;
        }

        self.reset_selection();
        self.package = Some(package.clone());

        debug!(package = %package.id, kind = ?package.kind, "package selected");
    }

    /// Cancel the selection, clearing extras, people count and errors.
    pub fn cancel(&mut self) {
        self.reset_selection();

        debug!("package selection cancelled");
    }

    fn reset_selection(&mut self) {
        self.package = None;
        self.extras.clear();
        self.people.clear();
        self.submission = Submission::Idle;
    }

    /// Apply a keystroke to the selected package's extras.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::NoPackage`] when nothing is selected.
    pub fn input_extra(&mut self, kind: ExtraKind, raw: &str) -> Result<(), BookingError> {
        let id = self.selected()?.id.clone();

        self.touch();
        self.extras.input(&id, kind, raw);

        Ok(())
    }

    /// Apply a keystroke to the group people count.
    ///
    /// # Errors
    ///
    /// Returns an error when nothing is selected or the package is not a group package.
    pub fn input_people(&mut self, raw: &str) -> Result<(), BookingError> {
        let package = self.selected()?;

        if !package.is_group() {
            return Err(BookingError::NotGroupPackage(package.id.clone()));
        }

        self.touch();
        self.people.input(raw);

        Ok(())
    }

    /// Set an event detail field.
    pub fn set_detail(&mut self, field: DetailField, value: impl Into<String>) {
        self.touch();
        self.details.set(field, value);
    }

    /// Set the event visibility.
    pub fn set_visibility(&mut self, visibility: Visibility) {
        self.touch();
        self.details.visibility = visibility;
    }

    /// Choose the payment method.
    pub fn select_payment(&mut self, method: PaymentMethod) {
        self.touch();
        self.payment.select(method);
    }

    /// Apply a keystroke to a payment field.
    pub fn input_payment(&mut self, field: PaymentField, raw: &str) {
        self.touch();
        self.payment.input(field, raw);
    }

    /// Any edit after a failure returns the draft to the editable states.
    fn touch(&mut self) {
        if matches!(self.submission, Submission::Failed(_)) {
            self.submission = Submission::Idle;
        }
    }

    /// Selected package
    pub fn package(&self) -> Option<&Package<'a>> {
        self.package.as_ref()
    }

    /// Event details
    pub fn details(&self) -> &EventDetails {
        &self.details
    }

    /// Payment form
    pub fn payment(&self) -> &PaymentForm {
        &self.payment
    }

    /// Extras inputs, per package
    pub fn extras(&self) -> &ExtrasSelection {
        &self.extras
    }

    /// People count input
    pub fn people(&self) -> &NumericField {
        &self.people
    }

    /// Error to show beside the people count, if any.
    pub fn people_error(&self) -> Option<&'static str> {
        if !self.package.as_ref().is_some_and(Package::is_group) {
            return None;
        }

        self.people.error().or_else(|| {
            (!self.people.is_empty() && !self.people_valid()).then_some(PEOPLE_BELOW_MINIMUM)
        })
    }

    /// Collaborator error from the last failed submission.
    pub fn error(&self) -> Option<&str> {
        match &self.submission {
            Submission::Failed(message) => Some(message),
            _ => None,
        }
    }

    fn people_valid(&self) -> bool {
        self.people.count().is_some_and(meets_group_minimum)
    }

    fn people_count(&self) -> Result<u32, BookingError> {
        if self.people.is_out_of_range() {
            return Err(BookingError::OutOfRange(FieldKind::PeopleCount));
        }

        Ok(self.people.count().unwrap_or(0))
    }

    /// Extras counts for the selected package.
    ///
    /// # Errors
    ///
    /// Returns an error when nothing is selected or a count is too large.
    pub fn selected_extras(&self) -> Result<Extras, BookingError> {
        let package = self.selected()?;

        self.extras.counts(&package.id).map_err(BookingError::OutOfRange)
    }

    fn selected(&self) -> Result<&Package<'a>, BookingError> {
        self.package.as_ref().ok_or(BookingError::NoPackage)
    }

    /// Check every submission requirement.
    ///
    /// # Errors
    ///
    /// Returns the first unmet requirement.
    pub fn validate(&self) -> Result<PaymentDetails, BookingError> {
        if let SelectionPrice::Group(quote) = self.price()?
            && !quote.is_bookable()
        {
            return Err(BookingError::PeopleCount);
        }

        if let Some(field) = self.details.missing_required().first() {
            return Err(BookingError::MissingDetail(*field));
        }

        Ok(self.payment.validate()?)
    }

    /// Whether the submit action is enabled.
    pub fn can_submit(&self) -> bool {
        matches!(self.submission, Submission::Idle | Submission::Failed(_))
            && self.validate().is_ok()
    }

    /// Price of the current selection.
    ///
    /// # Errors
    ///
    /// Returns an error when nothing is selected or pricing fails.
    pub fn price(&self) -> Result<SelectionPrice<'a>, BookingError> {
        let package = self.selected()?;
        let extras = self.selected_extras()?;
        let people = self.people_count()?;

        Ok(price_selection(
            package,
            extras,
            people,
            &self.rates,
            &self.group_discount,
        )?)
    }

    /// Amount due for the current selection.
    ///
    /// # Errors
    ///
    /// Returns an error when nothing is selected or pricing fails.
    pub fn total(&self) -> Result<Money<'a, Currency>, BookingError> {
        Ok(self.price()?.total())
    }

    /// Move to `Submitting` and build the collaborator payload.
    ///
    /// # Errors
    ///
    /// Returns an error if a submission is pending or has succeeded, or the
    /// form is incomplete.
    pub fn begin_submission(&mut self) -> Result<BookingRequest, BookingError> {
        match self.submission {
            Submission::Submitting => return Err(BookingError::AlreadySubmitting),
            Submission::Succeeded => return Err(BookingError::AlreadySucceeded),
            Submission::Idle | Submission::Failed(_) => {}
        }

        let payment = self.validate()?;
        let price = self.price()?;
        let package = self.selected()?;
        let total = price.total();

        let request = BookingRequest {
            package_id: package.id.clone(),
            kind: package.kind,
            people: package.is_group().then(|| self.people.count()).flatten(),
            extras: match price {
                SelectionPrice::Individual(_) => self.selected_extras()?,
                SelectionPrice::Group(_) => Extras::default(),
            },
            total_minor: total.to_minor_units(),
            currency: total.currency().iso_alpha_code,
            details: self.details.clone(),
            payment,
        };

        self.submission = Submission::Submitting;

        info!(
            package = %request.package_id,
            total = %total,
            method = %request.payment.method(),
            "booking submission started"
        );

        Ok(request)
    }

    /// Give up on a pending submission whose answer will never arrive. The
    /// draft moves to `Failed` with `message` so it can be resubmitted.
    pub fn abandon_submission(&mut self, message: impl Into<String>) {
        if self.submission != Submission::Submitting {
            return;
        }

        let message = message.into();

        warn!(error = %message, "booking submission abandoned");

        self.submission = Submission::Failed(message);
    }

    /// Record the collaborator's answer: `Ok` moves to `Succeeded`, `Err`
    /// moves to `Failed` keeping the draft for a manual retry.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::NotSubmitting`] when no submission is pending.
    pub fn complete_submission(&mut self, result: Result<(), String>) -> Result<(), BookingError> {
        if self.submission != Submission::Submitting {
            return Err(BookingError::NotSubmitting);
        }

        self.submission = match result {
            Ok(()) => {
                info!("booking submission succeeded");
                Submission::Succeeded
            }
            Err(message) => {
                info!(error = %message, "booking submission failed");
                Submission::Failed(message)
            }
        };

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use rust_decimal::Decimal;
    use rusty_money::iso::RWF;
    use testresult::TestResult;

    use crate::{extras::ExtrasEntry, packages::tests::package};

    use super::*;

    pub(crate) fn flow<'a>() -> TestResult<BookingFlow<'a>> {
        Ok(BookingFlow::new(
            UnitRates::standard(RWF)?,
            Percentage::from(Decimal::new(10, 2)),
        ))
    }

    pub(crate) fn fill_details(flow: &mut BookingFlow<'_>) {
        flow.set_detail(DetailField::Date, "2026-11-02");
        flow.set_detail(DetailField::StartTime, "14:00");
        flow.set_detail(DetailField::EndTime, "18:00");
        flow.set_detail(DetailField::EventType, "Wedding");
        flow.set_detail(DetailField::Location, "Kigali");
    }

    pub(crate) fn fill_mobile_money(flow: &mut BookingFlow<'_>) {
        flow.select_payment(PaymentMethod::MtnMobileMoney);
        flow.input_payment(PaymentField::Phone, "0788123456");
    }

    #[test]
    fn empty_flow_has_no_package() -> TestResult {
        let flow = flow()?;

        assert_eq!(flow.state(), BookingState::NoPackageSelected);
        assert!(!flow.can_submit());
        assert_eq!(flow.validate(), Err(BookingError::NoPackage));

        Ok(())
    }

    #[test]
    fn individual_package_walks_to_form_complete() -> TestResult {
        let mut flow = flow()?;
        let basic = package("basic", PackageKind::Individual, 10_000);

        flow.select_package(&basic);
        assert_eq!(flow.state(), BookingState::PackageSelected);

        fill_details(&mut flow);
        assert_eq!(flow.state(), BookingState::PackageSelected);
        assert!(!flow.can_submit());

        fill_mobile_money(&mut flow);
        assert_eq!(flow.state(), BookingState::FormComplete);
        assert!(flow.can_submit());

        Ok(())
    }

    #[test]
    fn each_missing_detail_disables_submit() -> TestResult {
        for field in DetailField::REQUIRED {
            let mut flow = flow()?;
            flow.select_package(&package("basic", PackageKind::Individual, 10_000));
            fill_details(&mut flow);
            fill_mobile_money(&mut flow);

            flow.set_detail(field, "");

            assert!(!flow.can_submit(), "{field} should be required");
            assert_eq!(flow.validate(), Err(BookingError::MissingDetail(field)));
        }

        Ok(())
    }

    #[test]
    fn group_package_waits_for_people_count() -> TestResult {
        let mut flow = flow()?;
        flow.select_package(&package("group", PackageKind::Group, 15_000));
        fill_details(&mut flow);
        fill_mobile_money(&mut flow);

        assert_eq!(flow.state(), BookingState::PeopleCountPending);
        assert_eq!(flow.people_error(), None);

        for raw in ["0", "1"] {
            flow.input_people(raw)?;

            assert_eq!(flow.state(), BookingState::PeopleCountPending, "people={raw}");
            assert!(!flow.can_submit(), "people={raw} must not enable submit");
            assert_eq!(flow.people_error(), Some(PEOPLE_BELOW_MINIMUM));
        }

        flow.input_people("3")?;

        assert_eq!(flow.state(), BookingState::FormComplete);
        assert_eq!(flow.people_error(), None);
        assert!(flow.can_submit());

        Ok(())
    }

    #[test]
    fn valid_people_count_with_incomplete_form() -> TestResult {
        let mut flow = flow()?;
        flow.select_package(&package("group", PackageKind::Group, 15_000));

        flow.input_people("4")?;

        assert_eq!(flow.state(), BookingState::PeopleCountValid);

        Ok(())
    }

    #[test]
    fn letters_in_people_count_are_dropped() -> TestResult {
        let mut flow = flow()?;
        flow.select_package(&package("group", PackageKind::Group, 15_000));

        flow.input_people("3a")?;

        assert_eq!(flow.people().text(), "3");
        assert_eq!(
            flow.people_error(),
            Some("Number of people must be a whole number")
        );

        flow.input_people("3")?;

        assert_eq!(flow.people_error(), None);

        Ok(())
    }

    #[test]
    fn people_count_requires_group_package() -> TestResult {
        let mut flow = flow()?;

        assert_eq!(flow.input_people("3"), Err(BookingError::NoPackage));

        flow.select_package(&package("basic", PackageKind::Individual, 10_000));

        assert_eq!(
            flow.input_people("3"),
            Err(BookingError::NotGroupPackage(PackageId::new("basic")))
        );

        Ok(())
    }

    #[test]
    fn group_price_matches_discounted_fee() -> TestResult {
        let mut flow = flow()?;
        flow.select_package(&package("group", PackageKind::Group, 15_000));
        flow.input_people("3")?;

        let SelectionPrice::Group(quote) = flow.price()? else {
            panic!("group package should price per person");
        };

        assert_eq!(quote.per_person, Money::from_minor(13_500, RWF));
        assert_eq!(quote.total, Money::from_minor(40_500, RWF));
        assert_eq!(quote.savings, Money::from_minor(4_500, RWF));

        Ok(())
    }

    #[test]
    fn extras_update_individual_total() -> TestResult {
        let mut flow = flow()?;
        flow.select_package(&package("basic", PackageKind::Individual, 10_000));

        flow.input_extra(ExtraKind::Photos, "10")?;
        flow.input_extra(ExtraKind::Videos, "5")?;

        assert_eq!(flow.total()?, Money::from_minor(10_020, RWF));

        Ok(())
    }

    #[test]
    fn cancel_clears_derived_fields() -> TestResult {
        let mut flow = flow()?;
        let group = package("group", PackageKind::Group, 15_000);

        flow.select_package(&group);
        flow.input_people("1x")?;
        flow.cancel();

        assert_eq!(flow.state(), BookingState::NoPackageSelected);
        assert!(flow.people().is_empty());
        assert_eq!(flow.people().error(), None);

        flow.select_package(&group);

        assert_eq!(flow.state(), BookingState::PeopleCountPending);
        assert_eq!(flow.people_error(), None);

        Ok(())
    }

    #[test]
    fn switching_package_resets_extras() -> TestResult {
        let mut flow = flow()?;
        let basic = package("basic", PackageKind::Individual, 10_000);
        let premium = package("premium", PackageKind::Individual, 50_000);

        flow.select_package(&basic);
        flow.input_extra(ExtraKind::Photos, "10")?;
        flow.select_package(&basic);

        assert_eq!(flow.extras().counts(&basic.id), Ok(Extras::new(10, 0)));

        flow.select_package(&premium);

        assert_eq!(flow.extras().counts(&basic.id), Ok(Extras::default()));
        assert_eq!(flow.total()?, Money::from_minor(50_000, RWF));

        Ok(())
    }

    #[test]
    fn oversized_extras_block_pricing() -> TestResult {
        let mut flow = flow()?;
        flow.select_package(&package("basic", PackageKind::Individual, 10_000));
        fill_details(&mut flow);
        fill_mobile_money(&mut flow);

        flow.input_extra(ExtraKind::Photos, "5000000000")?;

        let out_of_range = Err(BookingError::OutOfRange(FieldKind::ExtraPhotos));

        assert_eq!(
            flow.extras().error(&PackageId::new("basic")),
            Some("Extra photos is too large")
        );
        assert_eq!(flow.total().map(|_| ()), out_of_range);
        assert_eq!(flow.validate().map(|_| ()), out_of_range);
        assert_eq!(flow.begin_submission().map(|_| ()), out_of_range);
        assert_eq!(flow.state(), BookingState::PackageSelected);
        assert!(!flow.can_submit());

        flow.input_extra(ExtraKind::Photos, "50")?;

        assert_eq!(flow.total()?, Money::from_minor(10_050, RWF));
        assert!(flow.can_submit());

        Ok(())
    }

    #[test]
    fn oversized_people_count_is_out_of_range() -> TestResult {
        let mut flow = flow()?;
        flow.select_package(&package("group", PackageKind::Group, 15_000));
        fill_details(&mut flow);
        fill_mobile_money(&mut flow);

        flow.input_people("5000000000")?;

        assert_eq!(flow.people_error(), Some("Number of people is too large"));
        assert_eq!(flow.state(), BookingState::PeopleCountPending);
        assert_eq!(
            flow.validate().map(|_| ()),
            Err(BookingError::OutOfRange(FieldKind::PeopleCount))
        );

        Ok(())
    }

    #[test]
    fn validation_follows_group_quote() -> TestResult {
        let mut flow = flow()?;
        flow.select_package(&package("group", PackageKind::Group, 15_000));
        fill_details(&mut flow);
        fill_mobile_money(&mut flow);

        for (raw, bookable) in [("1", false), ("2", true)] {
            flow.input_people(raw)?;

            let SelectionPrice::Group(quote) = flow.price()? else {
                panic!("group package should price per person");
            };

            assert_eq!(quote.is_bookable(), bookable, "people={raw}");
            assert_eq!(flow.validate().is_ok(), bookable, "people={raw}");
            assert_eq!(flow.people_error().is_none(), bookable, "people={raw}");
        }

        Ok(())
    }

    #[test]
    fn loaded_catalog_starts_every_package_empty() -> TestResult {
        let mut flow = flow()?;
        let basic = package("basic", PackageKind::Individual, 10_000);
        let premium = package("premium", PackageKind::Individual, 50_000);
        let catalog = Catalog::with_packages([basic.clone(), premium.clone()], RWF)?;

        flow.load_catalog(&catalog);

        for id in [&basic.id, &premium.id] {
            let entry = flow.extras().entry(id);

            assert!(entry.is_some(), "{id} should have an extras entry");
            assert_eq!(entry.map(ExtrasEntry::counts), Some(Ok(Extras::default())));
        }

        flow.select_package(&premium);
        flow.input_extra(ExtraKind::Videos, "3")?;

        assert_eq!(flow.selected_extras()?, Extras::new(0, 3));
        assert_eq!(flow.extras().counts(&basic.id), Ok(Extras::default()));

        Ok(())
    }

    #[test]
    fn card_with_empty_number_keeps_pay_disabled() -> TestResult {
        let mut flow = flow()?;
        flow.select_package(&package("basic", PackageKind::Individual, 10_000));
        fill_details(&mut flow);

        flow.select_payment(PaymentMethod::Card);
        flow.input_payment(PaymentField::Expiry, "08/28");
        flow.input_payment(PaymentField::Cvv, "123");
        flow.input_payment(PaymentField::HolderName, "Aline Uwase");

        assert!(!flow.can_submit());
        assert_eq!(
            flow.validate(),
            Err(BookingError::Payment(PaymentError::Missing(PaymentField::CardNumber)))
        );

        flow.input_payment(PaymentField::CardNumber, "4111 1111 1111 1111");

        assert!(flow.can_submit());

        Ok(())
    }

    #[test]
    fn request_debug_hides_card_secrets() -> TestResult {
        let mut flow = flow()?;
        flow.select_package(&package("basic", PackageKind::Individual, 10_000));
        fill_details(&mut flow);

        flow.select_payment(PaymentMethod::Card);
        flow.input_payment(PaymentField::CardNumber, "4000 0566 5566 5556");
        flow.input_payment(PaymentField::Expiry, "03/30");
        flow.input_payment(PaymentField::Cvv, "737");
        flow.input_payment(PaymentField::HolderName, "Aline Uwase");

        let request = flow.begin_submission()?;

        for text in [format!("{request:?}"), format!("{flow:?}")] {
            assert!(!text.contains("4000056655665556"), "{text}");
            assert!(!text.contains("4000 0566"), "{text}");
            assert!(!text.contains("737"), "{text}");
        }

        Ok(())
    }

    #[test]
    fn submission_lifecycle_success() -> TestResult {
        let mut flow = flow()?;
        flow.select_package(&package("group", PackageKind::Group, 15_000));
        flow.input_people("3")?;
        fill_details(&mut flow);
        fill_mobile_money(&mut flow);

        let request = flow.begin_submission()?;

        assert_eq!(request.people, Some(3));
        assert_eq!(request.total_minor, 40_500);
        assert_eq!(request.currency, "RWF");
        assert_eq!(flow.state(), BookingState::Submitting);
        assert!(!flow.can_submit());
        assert_eq!(flow.begin_submission(), Err(BookingError::AlreadySubmitting));

        flow.complete_submission(Ok(()))?;

        assert_eq!(flow.state(), BookingState::Succeeded);
        assert_eq!(flow.begin_submission(), Err(BookingError::AlreadySucceeded));

        Ok(())
    }

    #[test]
    fn failed_submission_keeps_draft_for_retry() -> TestResult {
        let mut flow = flow()?;
        flow.select_package(&package("basic", PackageKind::Individual, 10_000));
        fill_details(&mut flow);
        fill_mobile_money(&mut flow);

        flow.begin_submission()?;
        flow.complete_submission(Err("Insufficient balance".to_string()))?;

        assert_eq!(flow.state(), BookingState::Failed);
        assert_eq!(flow.error(), Some("Insufficient balance"));
        assert!(flow.can_submit());
        assert_eq!(flow.details().location, "Kigali");

        flow.set_detail(DetailField::Title, "Reception");

        assert_eq!(flow.state(), BookingState::FormComplete);
        assert_eq!(flow.error(), None);

        Ok(())
    }

    #[test]
    fn abandoned_submission_can_be_retried() -> TestResult {
        let mut flow = flow()?;
        flow.select_package(&package("basic", PackageKind::Individual, 10_000));
        fill_details(&mut flow);
        fill_mobile_money(&mut flow);

        flow.abandon_submission("ignored while idle");

        assert_eq!(flow.state(), BookingState::FormComplete);
        assert_eq!(flow.error(), None);

        flow.begin_submission()?;
        flow.abandon_submission("Connection lost");

        assert_eq!(flow.state(), BookingState::Failed);
        assert_eq!(flow.error(), Some("Connection lost"));
        assert_eq!(flow.complete_submission(Ok(())), Err(BookingError::NotSubmitting));
        assert!(flow.can_submit());

        flow.begin_submission()?;
        flow.complete_submission(Ok(()))?;

        assert_eq!(flow.state(), BookingState::Succeeded);

        Ok(())
    }

    #[test]
    fn incomplete_form_cannot_begin_submission() -> TestResult {
        let mut flow = flow()?;
        flow.select_package(&package("basic", PackageKind::Individual, 10_000));

        assert_eq!(
            flow.begin_submission(),
            Err(BookingError::MissingDetail(DetailField::Date))
        );
        assert_eq!(flow.state(), BookingState::PackageSelected);

        Ok(())
    }

    #[test]
    fn completing_without_submission_errors() -> TestResult {
        let mut flow = flow()?;

        assert_eq!(flow.complete_submission(Ok(())), Err(BookingError::NotSubmitting));

        Ok(())
    }
}
