//! Lensbook prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    booking::{BookingError, BookingFlow, BookingRequest, BookingState},
    config::{BookingConfig, ConfigError},
    details::{DetailField, EventDetails, Visibility},
    extras::{ExtraKind, ExtrasSelection},
    fixtures::{Fixture, FixtureError, FixtureSource},
    input::{FieldKind, NumericField, filter_input},
    packages::{Catalog, CatalogError, CatalogSource, Package, PackageId, PackageKind},
    payments::{PaymentDetails, PaymentError, PaymentField, PaymentForm, PaymentMethod},
    pricing::{Extras, GroupQuote, PackagePrice, PricingError, SelectionPrice, UnitRates},
    quote::{Quote, QuoteError},
    session::{SessionFlags, session},
    share::{ShareLink, ShareLinkError},
    submission::{
        ApiResponse, BookingCollaborator, BookingConfirmation, OfflineCollaborator,
        SubmissionController, SubmissionError, SubmissionOutcome,
    },
};
