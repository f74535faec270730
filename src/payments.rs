//! Payments
//!
//! The payment method form. Exactly one method is selected at a time and
//! only that method's fields are validated.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::input::{FieldKind, NumericField};

/// Mobile money phone numbers are this many digits long.
pub const PHONE_DIGITS: usize = 10;

/// Supported payment methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// MTN Mobile Money
    MtnMobileMoney,

    /// Airtel Money
    AirtelMoney,

    /// Debit or credit card
    Card,
}

impl PaymentMethod {
    /// Every supported method, in display order.
    pub const ALL: [PaymentMethod; 3] = [
        PaymentMethod::MtnMobileMoney,
        PaymentMethod::AirtelMoney,
        PaymentMethod::Card,
    ];

    /// Returns true for the mobile money variants.
    pub fn is_mobile_money(self) -> bool {
        matches!(self, PaymentMethod::MtnMobileMoney | PaymentMethod::AirtelMoney)
    }

    /// Fields this method requires.
    pub fn required_fields(self) -> &'static [PaymentField] {
        if self.is_mobile_money() {
            &[PaymentField::Phone]
        } else {
            &[
                PaymentField::CardNumber,
                PaymentField::Expiry,
                PaymentField::Cvv,
                PaymentField::HolderName,
            ]
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentMethod::MtnMobileMoney => "MTN Mobile Money",
            PaymentMethod::AirtelMoney => "Airtel Money",
            PaymentMethod::Card => "Card",
        };

        f.write_str(label)
    }
}

/// Input fields of the payment form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentField {
    /// Mobile money phone number
    Phone,
    /// Card number
    CardNumber,
    /// Card expiry
    Expiry,
    /// Card security code
    Cvv,
    /// Name on the card
    HolderName,
}

impl fmt::Display for PaymentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentField::Phone => "phone number",
            PaymentField::CardNumber => "card number",
            PaymentField::Expiry => "expiry date",
            PaymentField::Cvv => "CVV",
            PaymentField::HolderName => "cardholder name",
        };

        f.write_str(label)
    }
}

/// Payment form validation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaymentError {
    /// No payment method has been chosen.
    #[error("select a payment method")]
    NoMethod,

    /// A required field is empty.
    #[error("{0} is required")]
    Missing(PaymentField),

    /// A required field is filled but malformed.
    #[error("{field} is invalid: {reason}")]
    Invalid {
        /// Offending field
        field: PaymentField,
        /// Why the value was rejected
        reason: &'static str,
    },
}

/// Validated payment details, ready to hand to a collaborator.
///
/// `Debug` output shows only the last four card digits and never the CVV.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PaymentDetails {
    /// Mobile money payment
    MobileMoney {
        /// Provider
        provider: PaymentMethod,
        /// Phone number, digits only
        phone: String,
    },

    /// Card payment
    Card {
        /// Card number, digits only
        number: String,
        /// Expiry month (1-12)
        expiry_month: u8,
        /// Two-digit expiry year
        expiry_year: u8,
        /// Security code
        cvv: String,
        /// Name on the card
        holder_name: String,
    },
}

impl PaymentDetails {
    /// Method the details were captured for.
    pub fn method(&self) -> PaymentMethod {
        match self {
            PaymentDetails::MobileMoney { provider, .. } => *provider,
            PaymentDetails::Card { .. } => PaymentMethod::Card,
        }
    }
}

impl fmt::Debug for PaymentDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentDetails::MobileMoney { provider, phone } => f
                .debug_struct("MobileMoney")
                .field("provider", provider)
                .field("phone", phone)
                .finish(),
            PaymentDetails::Card {
                number,
                expiry_month,
                expiry_year,
                cvv,
                holder_name,
            } => f
                .debug_struct("Card")
                .field("number", &LastFour(number))
                .field("expiry_month", expiry_month)
                .field("expiry_year", expiry_year)
                .field("cvv", &Hidden(cvv))
                .field("holder_name", holder_name)
                .finish(),
        }
    }
}

/// Card number with all but its last four characters masked.
struct LastFour<'s>(&'s str);

impl fmt::Debug for LastFour<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tail = self
            .0
            .get(self.0.len().saturating_sub(4)..)
            .unwrap_or_default();

        if self.0.len() > tail.len() {
            write!(f, "\"****{tail}\"")
        } else {
            write!(f, "{tail:?}")
        }
    }
}

/// Secret that is never shown, only whether it was entered.
struct Hidden<'s>(&'s str);

impl fmt::Debug for Hidden<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.0.is_empty() { "\"\"" } else { "\"***\"" })
    }
}

/// Payment method form
#[derive(Clone, PartialEq, Eq)]
pub struct PaymentForm {
    method: Option<PaymentMethod>,
    phone: NumericField,
    card_number: NumericField,
    expiry: NumericField,
    cvv: NumericField,
    holder_name: String,
}

impl fmt::Debug for PaymentForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentForm")
            .field("method", &self.method)
            .field("phone", &self.phone)
            .field("card_number", &LastFour(self.card_number.text()))
            .field("expiry", &self.expiry)
            .field("cvv", &Hidden(self.cvv.text()))
            .field("holder_name", &self.holder_name)
            .finish()
    }
}

impl Default for PaymentForm {
    fn default() -> Self {
        Self {
            method: None,
            phone: NumericField::new(FieldKind::PhoneNumber),
            card_number: NumericField::new(FieldKind::CardNumber),
            expiry: NumericField::new(FieldKind::Expiry),
            cvv: NumericField::new(FieldKind::Cvv),
            holder_name: String::new(),
        }
    }
}

impl PaymentForm {
    /// Create an empty form with no method selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose the payment method, replacing any previous choice.
    pub fn select(&mut self, method: PaymentMethod) {
        self.method = Some(method);
    }

    /// Selected payment method
    pub fn method(&self) -> Option<PaymentMethod> {
        self.method
    }

    /// Apply a keystroke to a field.
    pub fn input(&mut self, field: PaymentField, raw: &str) {
        match field {
            PaymentField::Phone => self.phone.input(raw),
            PaymentField::CardNumber => self.card_number.input(raw),
            PaymentField::Expiry => self.expiry.input(raw),
            PaymentField::Cvv => self.cvv.input(raw),
            PaymentField::HolderName => raw.clone_into(&mut self.holder_name),
        }
    }

    /// Stored text of a field.
    pub fn text(&self, field: PaymentField) -> &str {
        match field {
            PaymentField::Phone => self.phone.text(),
            PaymentField::CardNumber => self.card_number.text(),
            PaymentField::Expiry => self.expiry.text(),
            PaymentField::Cvv => self.cvv.text(),
            PaymentField::HolderName => &self.holder_name,
        }
    }

    /// Keystroke error for a field.
    pub fn error(&self, field: PaymentField) -> Option<&'static str> {
        match field {
            PaymentField::Phone => self.phone.error(),
            PaymentField::CardNumber => self.card_number.error(),
            PaymentField::Expiry => self.expiry.error(),
            PaymentField::Cvv => self.cvv.error(),
            PaymentField::HolderName => None,
        }
    }

    /// Returns true if the selected method's fields are valid.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Validate the selected method's required fields. Blank fields are
    /// reported before malformed ones, in [`PaymentMethod::required_fields`]
    /// order.
    ///
    /// # Errors
    ///
    /// Returns a [`PaymentError`] for the first missing or malformed field,
    /// or [`PaymentError::NoMethod`] when nothing is selected.
    pub fn validate(&self) -> Result<PaymentDetails, PaymentError> {
        let method = self.method.ok_or(PaymentError::NoMethod)?;

        if let Some(field) = method
            .required_fields()
            .iter()
            .copied()
            .find(|&field| self.text(field).trim().is_empty())
        {
            return Err(PaymentError::Missing(field));
        }

        if method.is_mobile_money() {
            return Ok(PaymentDetails::MobileMoney {
                provider: method,
                phone: validate_phone(&self.phone)?,
            });
        }

        let number = validate_card_number(&self.card_number)?;
        let (expiry_month, expiry_year) = validate_expiry(&self.expiry)?;
        let cvv = validate_cvv(&self.cvv)?;

        Ok(PaymentDetails::Card {
            number,
            expiry_month,
            expiry_year,
            cvv,
            holder_name: self.holder_name.trim().to_string(),
        })
    }
}

fn validate_phone(field: &NumericField) -> Result<String, PaymentError> {
    let phone = field.digits();

    if phone.len() != PHONE_DIGITS {
        return Err(PaymentError::Invalid {
            field: PaymentField::Phone,
            reason: "must be 10 digits",
        });
    }

    Ok(phone)
}

fn validate_card_number(field: &NumericField) -> Result<String, PaymentError> {
    let number = field.digits();

    if !(12..=19).contains(&number.len()) {
        return Err(PaymentError::Invalid {
            field: PaymentField::CardNumber,
            reason: "must be 12 to 19 digits",
        });
    }

    Ok(number)
}

fn validate_expiry(field: &NumericField) -> Result<(u8, u8), PaymentError> {
    const REASON: &str = "must be MM/YY";

    let invalid = || PaymentError::Invalid {
        field: PaymentField::Expiry,
        reason: REASON,
    };

    let (month, year) = field.text().split_once('/').ok_or_else(invalid)?;

    if month.len() != 2 || year.len() != 2 {
        return Err(invalid());
    }

    let month: u8 = month.parse().map_err(|_err| invalid())?;
    let year: u8 = year.parse().map_err(|_err| invalid())?;

    if !(1..=12).contains(&month) {
        return Err(PaymentError::Invalid {
            field: PaymentField::Expiry,
            reason: "month must be between 01 and 12",
        });
    }

    Ok((month, year))
}

fn validate_cvv(field: &NumericField) -> Result<String, PaymentError> {
    let cvv = field.digits();

    if !(3..=4).contains(&cvv.len()) {
        return Err(PaymentError::Invalid {
            field: PaymentField::Cvv,
            reason: "must be 3 or 4 digits",
        });
    }

    Ok(cvv)
}
