//! Input
//!
//! Keystroke-level validation for the numeric fields of the booking and
//! payment forms. Rejected characters never reach the stored value; the
//! field keeps a human-readable error until a clean input arrives.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The numeric fields the forms accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Extra photos on top of a package
    ExtraPhotos,

    /// Extra videos on top of a package
    ExtraVideos,

    /// Number of people in a group booking
    PeopleCount,

    /// Mobile money phone number
    PhoneNumber,

    /// Card number, optionally grouped with spaces
    CardNumber,

    /// Card expiry as `MM/YY`
    Expiry,

    /// Card security code
    Cvv,
}

impl FieldKind {
    /// Returns true if `c` may appear in this field.
    pub fn allows(self, c: char) -> bool {
        match self {
            FieldKind::CardNumber => c.is_ascii_digit() || c == ' ',
            FieldKind::Expiry => c.is_ascii_digit() || c == '/',
            FieldKind::ExtraPhotos
            | FieldKind::ExtraVideos
            | FieldKind::PeopleCount
            | FieldKind::PhoneNumber
            | FieldKind::Cvv => c.is_ascii_digit(),
        }
    }

    /// Error shown when a rejected character is typed.
    pub fn error_message(self) -> &'static str {
        match self {
            FieldKind::ExtraPhotos => "Extra photos must be a whole number",
            FieldKind::ExtraVideos => "Extra videos must be a whole number",
            FieldKind::PeopleCount => "Number of people must be a whole number",
            FieldKind::PhoneNumber => "Phone number can only contain digits",
            FieldKind::CardNumber => "Card number can only contain digits",
            FieldKind::Expiry => "Expiry date can only contain digits and '/'",
            FieldKind::Cvv => "CVV can only contain digits",
        }
    }

    /// Returns true for fields holding a unit count rather than a code.
    pub fn is_count(self) -> bool {
        matches!(
            self,
            FieldKind::ExtraPhotos | FieldKind::ExtraVideos | FieldKind::PeopleCount
        )
    }

    /// Error shown when a count is too large to book.
    pub fn range_message(self) -> &'static str {
        match self {
            FieldKind::ExtraPhotos => "Extra photos is too large",
            FieldKind::ExtraVideos => "Extra videos is too large",
            FieldKind::PeopleCount => "Number of people is too large",
            FieldKind::PhoneNumber
            | FieldKind::CardNumber
            | FieldKind::Expiry
            | FieldKind::Cvv => "Value is too large",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FieldKind::ExtraPhotos => "extra photos",
            FieldKind::ExtraVideos => "extra videos",
            FieldKind::PeopleCount => "number of people",
            FieldKind::PhoneNumber => "phone number",
            FieldKind::CardNumber => "card number",
            FieldKind::Expiry => "expiry date",
            FieldKind::Cvv => "CVV",
        };

        f.write_str(label)
    }
}

/// Result of filtering a raw input string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filtered {
    /// Input with every disallowed character removed
    pub text: String,

    /// Whether any character was removed
    pub rejected: bool,
}

/// Strip the characters `kind` does not allow from `raw`.
pub fn filter_input(kind: FieldKind, raw: &str) -> Filtered {
    let text: String = raw.chars().filter(|c| kind.allows(*c)).collect();
    let rejected = text.len() != raw.len();

    Filtered { text, rejected }
}

/// A validated numeric input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericField {
    kind: FieldKind,
    text: String,
    value: Option<u64>,
    error: Option<&'static str>,
}

impl NumericField {
    /// Create an empty field.
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            text: String::new(),
            value: None,
            error: None,
        }
    }

    /// Apply a keystroke: the full raw contents of the field after the edit.
    ///
    /// Disallowed characters are dropped and flag the field's error message;
    /// clean input clears it. The number only updates when the filtered text
    /// is non-empty and parses; otherwise it is left unset. A count that does
    /// not fit a `u32` keeps its value and flags the range error.
    pub fn input(&mut self, raw: &str) {
        let Filtered { text, rejected } = filter_input(self.kind, raw);

        self.value = parse_digits(&text);
        self.text = text;
        self.error = if rejected {
            Some(self.kind.error_message())
        } else if self.is_out_of_range() {
            Some(self.kind.range_message())
        } else {
            None
        };
    }

    /// Returns true if this is a count field holding a number beyond `u32`.
    /// Count text is digits only, so text without a value overflowed `u64`.
    pub fn is_out_of_range(&self) -> bool {
        self.kind.is_count()
            && !self.text.is_empty()
            && self.value.is_none_or(|v| u32::try_from(v).is_err())
    }

    /// Empty the field and clear any error.
    pub fn clear(&mut self) {
        self.text.clear();
        self.value = None;
        self.error = None;
    }

    /// Field kind
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Stored (filtered) text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Parsed value, if the stored text is a number.
    pub fn value(&self) -> Option<u64> {
        self.value
    }

    /// Parsed value as a count, if it fits.
    pub fn count(&self) -> Option<u32> {
        self.value.and_then(|v| u32::try_from(v).ok())
    }

    /// Current validation error
    pub fn error(&self) -> Option<&'static str> {
        self.error
    }

    /// Only the digits of the stored text.
    pub fn digits(&self) -> String {
        self.text.chars().filter(char::is_ascii_digit).collect()
    }

    /// Returns true if nothing has been entered.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

fn parse_digits(text: &str) -> Option<u64> {
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    text.parse().ok()
}
