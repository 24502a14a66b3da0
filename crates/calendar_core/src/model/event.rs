//! Calendar event domain model.
//!
//! # Responsibility
//! - Define the persisted event record and its creation payload.
//! - Validate display fields before persistence and after read-back.
//!
//! # Invariants
//! - `id` is assigned by the store and never reused for another event.
//! - `time` has zero seconds; constructors truncate sub-minute precision.
//! - `title` and `tag` are non-blank.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned event identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub i64);

impl Display for EventId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Well-known tags offered as suggestions by callers.
///
/// Stored tags are free text; this list is not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTag {
    Match,
    Training,
    Gym,
    Tactics,
    Other,
}

impl EventTag {
    pub fn all() -> &'static [EventTag] {
        &[
            EventTag::Match,
            EventTag::Training,
            EventTag::Gym,
            EventTag::Tactics,
            EventTag::Other,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventTag::Match => "Match",
            EventTag::Training => "Training",
            EventTag::Gym => "Gym",
            EventTag::Tactics => "Tactics",
            EventTag::Other => "Other",
        }
    }
}

/// Validation failures for event display fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventValidationError {
    EmptyTitle,
    EmptyTag,
}

impl Display for EventValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "event title cannot be empty"),
            Self::EmptyTag => write!(f, "event tag cannot be empty"),
        }
    }
}

impl Error for EventValidationError {}

/// Write model for a not-yet-persisted event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub title: String,
    pub tag: String,
}

impl NewEvent {
    /// Builds a creation payload, trimming display fields and dropping
    /// sub-minute precision from `time`.
    pub fn new(
        date: NaiveDate,
        time: NaiveTime,
        title: impl Into<String>,
        tag: impl Into<String>,
    ) -> Self {
        Self {
            date,
            time: truncate_to_minute(time),
            title: title.into().trim().to_string(),
            tag: tag.into().trim().to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), EventValidationError> {
        validate_fields(&self.title, &self.tag)
    }

    /// Attaches a store-assigned id.
    pub fn with_id(self, id: EventId) -> Event {
        Event {
            id,
            date: self.date,
            time: self.time,
            title: self.title,
            tag: self.tag,
        }
    }
}

/// Persisted calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub date: NaiveDate,
    /// Start time within `date`, minute precision.
    pub time: NaiveTime,
    pub title: String,
    pub tag: String,
}

impl Event {
    pub fn validate(&self) -> Result<(), EventValidationError> {
        validate_fields(&self.title, &self.tag)
    }

    /// Start instant on the continuous local timeline.
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    /// Case-insensitive tag comparison used by filters.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag.trim())
    }
}

/// Drops seconds and nanoseconds from a time of day.
pub fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    time.with_second(0)
        .and_then(|value| value.with_nanosecond(0))
        .unwrap_or(time)
}

fn validate_fields(title: &str, tag: &str) -> Result<(), EventValidationError> {
    if title.trim().is_empty() {
        return Err(EventValidationError::EmptyTitle);
    }
    if tag.trim().is_empty() {
        return Err(EventValidationError::EmptyTag);
    }
    Ok(())
}
