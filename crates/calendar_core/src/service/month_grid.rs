//! Month grid projection with tag filtering.
//!
//! # Responsibility
//! - Build one cell per day of the selected month with that day's events.
//! - Apply the active tag filter and mark the selected day.
//!
//! # Invariants
//! - Cells are ordered by date and cover the whole month exactly once.
//! - Exactly one cell is selected: the one dated `selected`.
//! - Tag filtering is case-insensitive; `All` keeps every event.

use crate::model::event::Event;
use crate::repo::event_repo::{EventRepository, RepoResult};
use chrono::{Datelike, Months, NaiveDate};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Tag filter applied to month cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TagFilter {
    #[default]
    All,
    Tag(String),
}

impl TagFilter {
    pub fn matches(&self, event: &Event) -> bool {
        match self {
            Self::All => true,
            Self::Tag(tag) => event.has_tag(tag),
        }
    }
}

impl FromStr for TagFilter {
    type Err = Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            Ok(Self::Tag(trimmed.to_string()))
        }
    }
}

impl Display for TagFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "All"),
            Self::Tag(tag) => write!(f, "{tag}"),
        }
    }
}

/// One day of the month grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub is_selected: bool,
    /// Filtered events ordered by start time.
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub selected: NaiveDate,
    pub filter: TagFilter,
    pub days: Vec<DayCell>,
}

impl MonthGrid {
    pub fn selected_day(&self) -> Option<&DayCell> {
        self.days.iter().find(|day| day.is_selected)
    }

    pub fn event_count(&self) -> usize {
        self.days.iter().map(|day| day.events.len()).sum()
    }
}

/// Builds the grid for the month containing `selected`.
///
/// Loads the whole month with a single range query.
pub fn build_month<R: EventRepository>(
    repo: &R,
    selected: NaiveDate,
    filter: &TagFilter,
) -> RepoResult<MonthGrid> {
    let first = first_of_month(selected);
    let dates: Vec<NaiveDate> = first
        .iter_days()
        .take_while(|date| date.month() == first.month())
        .collect();
    let last = dates.last().copied().unwrap_or(first);

    let mut events = repo
        .get_events_between(first, last)?
        .into_iter()
        .filter(|event| filter.matches(event))
        .peekable();

    let mut days = Vec::with_capacity(dates.len());
    for date in dates {
        let mut day_events = Vec::new();
        while let Some(event) = events.next_if(|event| event.date == date) {
            day_events.push(event);
        }
        days.push(DayCell {
            date,
            is_selected: date == selected,
            events: day_events,
        });
    }

    Ok(MonthGrid {
        selected,
        filter: filter.clone(),
        days,
    })
}

/// Moves `date` by `delta` months, clamping the day to the target month.
pub fn shift_month(date: NaiveDate, delta: i32) -> NaiveDate {
    let months = Months::new(delta.unsigned_abs());
    let shifted = if delta >= 0 {
        date.checked_add_months(months)
    } else {
        date.checked_sub_months(months)
    };
    shifted.unwrap_or(date)
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}
