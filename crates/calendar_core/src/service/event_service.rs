//! Event use-case service.
//!
//! # Responsibility
//! - Provide add/modify/delete entry points for calendar callers.
//! - Parse user-entered start times.
//!
//! # Invariants
//! - Service APIs never bypass repository validation.
//! - Day-wide deletion removes all events of the date in one transaction.

use crate::model::event::{Event, EventId, NewEvent};
use crate::repo::event_repo::{EventRepository, RepoError, RepoResult};
use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static EVENT_TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{2})(?::(\d{2}))?$").expect("valid event time regex")
});

/// Service error for event use-cases.
#[derive(Debug)]
pub enum EventServiceError {
    /// Start time text is not `H:MM`, `HH:MM` or `HH:MM:SS`.
    InvalidTime(String),
    EventNotFound(EventId),
    Repo(RepoError),
}

impl Display for EventServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTime(value) => write!(f, "invalid event time: `{value}`"),
            Self::EventNotFound(id) => write!(f, "event not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EventServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for EventServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::EventNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Partial update for an existing event; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventChanges {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub title: Option<String>,
    pub tag: Option<String>,
}

pub struct EventService<R: EventRepository> {
    repo: R,
}

impl<R: EventRepository> EventService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one event and returns it as stored.
    pub fn add_event(
        &self,
        date: NaiveDate,
        time: NaiveTime,
        title: impl Into<String>,
        tag: impl Into<String>,
    ) -> Result<Event, EventServiceError> {
        let new_event = NewEvent::new(date, time, title, tag);
        let id = self.repo.add_event(&new_event)?;
        Ok(new_event.with_id(id))
    }

    /// Applies `changes` to the stored event and returns the result.
    pub fn modify_event(
        &self,
        id: EventId,
        changes: EventChanges,
    ) -> Result<Event, EventServiceError> {
        let current = self
            .repo
            .get_event(id)?
            .ok_or(EventServiceError::EventNotFound(id))?;

        let updated = NewEvent::new(
            changes.date.unwrap_or(current.date),
            changes.time.unwrap_or(current.time),
            changes.title.unwrap_or(current.title),
            changes.tag.unwrap_or(current.tag),
        )
        .with_id(id);
        self.repo.update_event(&updated)?;
        Ok(updated)
    }

    pub fn delete_event(&self, id: EventId) -> Result<(), EventServiceError> {
        self.repo.delete_event(id)?;
        Ok(())
    }

    /// Deletes every event on `date`; returns how many were removed.
    pub fn delete_day_events(&self, date: NaiveDate) -> Result<usize, EventServiceError> {
        let ids: Vec<EventId> = self
            .repo
            .get_events_on_date(date)?
            .iter()
            .map(|event| event.id)
            .collect();
        Ok(self.repo.delete_events(&ids)?)
    }

    pub fn get_event(&self, id: EventId) -> RepoResult<Option<Event>> {
        self.repo.get_event(id)
    }

    pub fn events_on(&self, date: NaiveDate) -> RepoResult<Vec<Event>> {
        self.repo.get_events_on_date(date)
    }

    pub fn all_events(&self) -> RepoResult<Vec<Event>> {
        self.repo.get_all_events()
    }
}

/// Parses a user-entered start time. Seconds, when present, are dropped.
pub fn parse_event_time(value: &str) -> Result<NaiveTime, EventServiceError> {
    let trimmed = value.trim();
    let invalid = || EventServiceError::InvalidTime(trimmed.to_string());

    let caps = EVENT_TIME_RE.captures(trimmed).ok_or_else(invalid)?;
    let hour: u32 = caps[1].parse().map_err(|_| invalid())?;
    let minute: u32 = caps[2].parse().map_err(|_| invalid())?;
    if let Some(seconds) = caps.get(3) {
        let seconds: u32 = seconds.as_str().parse().map_err(|_| invalid())?;
        if seconds > 59 {
            return Err(invalid());
        }
    }
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::{parse_event_time, EventServiceError};
    use chrono::NaiveTime;

    #[test]
    fn parse_event_time_accepts_short_and_long_forms() {
        let expected = NaiveTime::from_hms_opt(9, 5, 0).expect("valid time");
        assert_eq!(parse_event_time("9:05").expect("short form"), expected);
        assert_eq!(parse_event_time(" 09:05 ").expect("padded form"), expected);
        assert_eq!(parse_event_time("09:05:30").expect("seconds form"), expected);
    }

    #[test]
    fn parse_event_time_rejects_out_of_range_and_garbage() {
        for input in ["24:00", "12:60", "08:15:75", "noon", "1230", ""] {
            let err = parse_event_time(input).expect_err("input must be rejected");
            assert!(matches!(err, EventServiceError::InvalidTime(_)), "{input}");
        }
    }
}
