#![allow(dead_code)]

use calendar_core::db::DbError;
use calendar_core::{Event, EventId, EventRepository, NewEvent, RepoError, RepoResult};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::cell::{Cell, RefCell};

/// In-memory event store with caller-chosen ids and injectable failures.
#[derive(Default)]
pub struct MemoryStore {
    events: RefCell<Vec<Event>>,
    next_id: Cell<i64>,
    fail_all: Cell<bool>,
    fail_on: Cell<Option<NaiveDate>>,
    queried: RefCell<Vec<NaiveDate>>,
    ranges: RefCell<Vec<(NaiveDate, NaiveDate)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(1000),
            ..Self::default()
        }
    }

    pub fn insert(&self, id: i64, date: NaiveDate, time: NaiveTime, title: &str) {
        self.events
            .borrow_mut()
            .push(NewEvent::new(date, time, title, "Match").with_id(EventId(id)));
    }

    pub fn remove(&self, id: i64) {
        self.events.borrow_mut().retain(|event| event.id != EventId(id));
    }

    pub fn fail_all(&self, fail: bool) {
        self.fail_all.set(fail);
    }

    pub fn fail_on(&self, date: Option<NaiveDate>) {
        self.fail_on.set(date);
    }

    pub fn queried_dates(&self) -> Vec<NaiveDate> {
        self.queried.borrow().clone()
    }

    pub fn queried_ranges(&self) -> Vec<(NaiveDate, NaiveDate)> {
        self.ranges.borrow().clone()
    }

    pub fn clear_queries(&self) {
        self.queried.borrow_mut().clear();
        self.ranges.borrow_mut().clear();
    }

    fn check_failure(&self, start: NaiveDate, end: NaiveDate) -> RepoResult<()> {
        let failing_day = self
            .fail_on
            .get()
            .is_some_and(|day| day >= start && day <= end);
        if self.fail_all.get() || failing_day {
            return Err(RepoError::Db(DbError::Sqlite(
                rusqlite::Error::InvalidQuery,
            )));
        }
        Ok(())
    }
}

impl EventRepository for MemoryStore {
    fn get_events_on_date(&self, date: NaiveDate) -> RepoResult<Vec<Event>> {
        self.queried.borrow_mut().push(date);
        self.check_failure(date, date)?;
        Ok(self
            .events
            .borrow()
            .iter()
            .filter(|event| event.date == date)
            .cloned()
            .collect())
    }

    fn get_events_between(&self, start: NaiveDate, end: NaiveDate) -> RepoResult<Vec<Event>> {
        self.ranges.borrow_mut().push((start, end));
        self.check_failure(start, end)?;
        let mut events: Vec<Event> = self
            .events
            .borrow()
            .iter()
            .filter(|event| event.date >= start && event.date <= end)
            .cloned()
            .collect();
        events.sort_by_key(|event| (event.date, event.time, event.id));
        Ok(events)
    }

    fn get_all_events(&self) -> RepoResult<Vec<Event>> {
        Ok(self.events.borrow().clone())
    }

    fn get_event(&self, id: EventId) -> RepoResult<Option<Event>> {
        Ok(self
            .events
            .borrow()
            .iter()
            .find(|event| event.id == id)
            .cloned())
    }

    fn add_event(&self, event: &NewEvent) -> RepoResult<EventId> {
        event.validate()?;
        let id = EventId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.events.borrow_mut().push(event.clone().with_id(id));
        Ok(id)
    }

    fn update_event(&self, event: &Event) -> RepoResult<()> {
        let mut events = self.events.borrow_mut();
        let slot = events
            .iter_mut()
            .find(|stored| stored.id == event.id)
            .ok_or(RepoError::NotFound(event.id))?;
        *slot = event.clone();
        Ok(())
    }

    fn delete_event(&self, id: EventId) -> RepoResult<()> {
        let mut events = self.events.borrow_mut();
        let before = events.len();
        events.retain(|event| event.id != id);
        if events.len() == before {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn delete_events(&self, ids: &[EventId]) -> RepoResult<usize> {
        let mut events = self.events.borrow_mut();
        let before = events.len();
        events.retain(|event| !ids.contains(&event.id));
        Ok(before - events.len())
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

pub fn at(day: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    day.and_time(hm(hour, minute))
}
