//! Event repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide date-keyed queries and CRUD over the `events` table.
//! - Keep SQL and text encodings of dates/times inside the store boundary.
//!
//! # Invariants
//! - `get_events_on_date` returns every event of that date exactly once.
//! - Write paths validate before SQL mutations.
//! - Read paths reject malformed persisted rows instead of masking them.

use crate::db::DbError;
use crate::model::event::{Event, EventId, EventValidationError, NewEvent};
use chrono::{NaiveDate, NaiveTime};
use log::info;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const EVENT_SELECT_SQL: &str = "SELECT
    id,
    date,
    time,
    title,
    tag
FROM events";

/// Storage encoding for `events.date`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Storage encoding for `events.time`.
pub const TIME_FORMAT: &str = "%H:%M";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for event persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(EventValidationError),
    Db(DbError),
    NotFound(EventId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "event not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted event data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<EventValidationError> for RepoError {
    fn from(value: EventValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for event storage.
pub trait EventRepository {
    /// Returns all events dated `date`, ordered by time then id.
    fn get_events_on_date(&self, date: NaiveDate) -> RepoResult<Vec<Event>>;
    /// Returns events dated within `start..=end`, ordered by date, time, id.
    fn get_events_between(&self, start: NaiveDate, end: NaiveDate) -> RepoResult<Vec<Event>>;
    /// Returns every stored event ordered by date, time, id.
    fn get_all_events(&self) -> RepoResult<Vec<Event>>;
    fn get_event(&self, id: EventId) -> RepoResult<Option<Event>>;
    /// Persists a new event and returns its store-assigned id.
    fn add_event(&self, event: &NewEvent) -> RepoResult<EventId>;
    fn update_event(&self, event: &Event) -> RepoResult<()>;
    fn delete_event(&self, id: EventId) -> RepoResult<()>;
    /// Deletes all listed ids in one transaction; returns rows removed.
    fn delete_events(&self, ids: &[EventId]) -> RepoResult<usize>;
}

impl<R: EventRepository + ?Sized> EventRepository for &R {
    fn get_events_on_date(&self, date: NaiveDate) -> RepoResult<Vec<Event>> {
        (**self).get_events_on_date(date)
    }

    fn get_events_between(&self, start: NaiveDate, end: NaiveDate) -> RepoResult<Vec<Event>> {
        (**self).get_events_between(start, end)
    }

    fn get_all_events(&self) -> RepoResult<Vec<Event>> {
        (**self).get_all_events()
    }

    fn get_event(&self, id: EventId) -> RepoResult<Option<Event>> {
        (**self).get_event(id)
    }

    fn add_event(&self, event: &NewEvent) -> RepoResult<EventId> {
        (**self).add_event(event)
    }

    fn update_event(&self, event: &Event) -> RepoResult<()> {
        (**self).update_event(event)
    }

    fn delete_event(&self, id: EventId) -> RepoResult<()> {
        (**self).delete_event(id)
    }

    fn delete_events(&self, ids: &[EventId]) -> RepoResult<usize> {
        (**self).delete_events(ids)
    }
}

/// SQLite-backed event repository.
pub struct SqliteEventRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEventRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_events(&self, sql: &str, bind_values: Vec<Value>) -> RepoResult<Vec<Event>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut events = Vec::new();
        while let Some(row) = rows.next()? {
            events.push(parse_event_row(row)?);
        }
        Ok(events)
    }
}

impl EventRepository for SqliteEventRepository<'_> {
    fn get_events_on_date(&self, date: NaiveDate) -> RepoResult<Vec<Event>> {
        self.query_events(
            &format!("{EVENT_SELECT_SQL} WHERE date = ?1 ORDER BY time ASC, id ASC;"),
            vec![Value::Text(format_date(date))],
        )
    }

    fn get_events_between(&self, start: NaiveDate, end: NaiveDate) -> RepoResult<Vec<Event>> {
        // `YYYY-MM-DD` text compares in calendar order.
        self.query_events(
            &format!(
                "{EVENT_SELECT_SQL} WHERE date >= ?1 AND date <= ?2 ORDER BY date ASC, time ASC, id ASC;"
            ),
            vec![Value::Text(format_date(start)), Value::Text(format_date(end))],
        )
    }

    fn get_all_events(&self) -> RepoResult<Vec<Event>> {
        self.query_events(
            &format!("{EVENT_SELECT_SQL} ORDER BY date ASC, time ASC, id ASC;"),
            Vec::new(),
        )
    }

    fn get_event(&self, id: EventId) -> RepoResult<Option<Event>> {
        let mut events = self.query_events(
            &format!("{EVENT_SELECT_SQL} WHERE id = ?1;"),
            vec![Value::Integer(id.0)],
        )?;
        Ok(events.pop())
    }

    fn add_event(&self, event: &NewEvent) -> RepoResult<EventId> {
        event.validate()?;

        self.conn.execute(
            "INSERT INTO events (date, time, title, tag) VALUES (?1, ?2, ?3, ?4);",
            params![
                format_date(event.date),
                format_time(event.time),
                event.title.as_str(),
                event.tag.as_str(),
            ],
        )?;
        let id = EventId(self.conn.last_insert_rowid());

        info!("event=event_write module=repo status=ok op=add event_id={id}");
        Ok(id)
    }

    fn update_event(&self, event: &Event) -> RepoResult<()> {
        event.validate()?;

        let changed = self.conn.execute(
            "UPDATE events
             SET
                date = ?1,
                time = ?2,
                title = ?3,
                tag = ?4
             WHERE id = ?5;",
            params![
                format_date(event.date),
                format_time(event.time),
                event.title.as_str(),
                event.tag.as_str(),
                event.id.0,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(event.id));
        }

        info!(
            "event=event_write module=repo status=ok op=update event_id={}",
            event.id
        );
        Ok(())
    }

    fn delete_event(&self, id: EventId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM events WHERE id = ?1;", [id.0])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        info!("event=event_write module=repo status=ok op=delete event_id={id}");
        Ok(())
    }

    fn delete_events(&self, ids: &[EventId]) -> RepoResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.unchecked_transaction()?;
        let placeholders = vec!["?"; ids.len()].join(", ");
        let removed = tx.execute(
            &format!("DELETE FROM events WHERE id IN ({placeholders});"),
            params_from_iter(ids.iter().map(|id| id.0)),
        )?;
        tx.commit()?;

        info!(
            "event=event_write module=repo status=ok op=delete_many requested={} removed={}",
            ids.len(),
            removed
        );
        Ok(removed)
    }
}

/// Encodes a date the way `events.date` stores it.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Encodes a time the way `events.time` stores it.
pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

fn parse_event_row(row: &Row<'_>) -> RepoResult<Event> {
    let date_text: String = row.get("date")?;
    let date = NaiveDate::parse_from_str(&date_text, DATE_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!("invalid date value `{date_text}` in events.date"))
    })?;

    let time_text: String = row.get("time")?;
    let time = NaiveTime::parse_from_str(&time_text, TIME_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!("invalid time value `{time_text}` in events.time"))
    })?;

    let event = Event {
        id: EventId(row.get("id")?),
        date,
        time,
        title: row.get("title")?,
        tag: row.get("tag")?,
    };
    event.validate()?;
    Ok(event)
}
