//! Event Details

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Who can find the event once it is booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Listed publicly
    #[default]
    Public,

    /// Only reachable through an invite or share link
    Private,
}

/// Text fields of the event details form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetailField {
    /// Event date
    Date,
    /// Start time
    StartTime,
    /// End time
    EndTime,
    /// Event type
    EventType,
    /// Venue or address
    Location,
    /// Event title
    Title,
    /// Free-text description
    Description,
    /// Organizer name
    Organizer,
}

impl DetailField {
    /// Fields that must be filled before a booking can be submitted.
    pub const REQUIRED: [DetailField; 5] = [
        DetailField::Date,
        DetailField::StartTime,
        DetailField::EndTime,
        DetailField::EventType,
        DetailField::Location,
    ];

    /// Returns true if the field must be filled.
    pub fn is_required(self) -> bool {
        Self::REQUIRED.contains(&self)
    }
}

impl fmt::Display for DetailField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DetailField::Date => "date",
            DetailField::StartTime => "start time",
            DetailField::EndTime => "end time",
            DetailField::EventType => "event type",
            DetailField::Location => "location",
            DetailField::Title => "title",
            DetailField::Description => "description",
            DetailField::Organizer => "organizer",
        };

        f.write_str(label)
    }
}

/// Event details form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    /// Event date
    pub date: String,

    /// Start time
    pub start_time: String,

    /// End time
    pub end_time: String,

    /// Event type
    pub event_type: String,

    /// Venue or address
    pub location: String,

    /// Event title
    pub title: String,

    /// Free-text description
    pub description: String,

    /// Organizer name
    pub organizer: String,

    /// Listing visibility
    pub visibility: Visibility,
}

impl EventDetails {
    /// Set a text field.
    pub fn set(&mut self, field: DetailField, value: impl Into<String>) {
        *self.field_mut(field) = value.into();
    }

    /// Read a text field.
    pub fn get(&self, field: DetailField) -> &str {
        match field {
            DetailField::Date => &self.date,
            DetailField::StartTime => &self.start_time,
            DetailField::EndTime => &self.end_time,
            DetailField::EventType => &self.event_type,
            DetailField::Location => &self.location,
            DetailField::Title => &self.title,
            DetailField::Description => &self.description,
            DetailField::Organizer => &self.organizer,
        }
    }

    /// Required fields that are empty or whitespace.
    pub fn missing_required(&self) -> SmallVec<[DetailField; 5]> {
        DetailField::REQUIRED
            .into_iter()
            .filter(|field| self.get(*field).trim().is_empty())
            .collect()
    }

    /// Returns true once every required field is filled.
    pub fn is_complete(&self) -> bool {
        self.missing_required().is_empty()
    }

    fn field_mut(&mut self, field: DetailField) -> &mut String {
        match field {
            DetailField::Date => &mut self.date,
            DetailField::StartTime => &mut self.start_time,
            DetailField::EndTime => &mut self.end_time,
            DetailField::EventType => &mut self.event_type,
            DetailField::Location => &mut self.location,
            DetailField::Title => &mut self.title,
            DetailField::Description => &mut self.description,
            DetailField::Organizer => &mut self.organizer,
        }
    }
}
