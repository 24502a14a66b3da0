//! Upcoming-event notification engine.
//!
//! # Responsibility
//! - Match stored events against the look-ahead window `[now, now + window]`.
//! - Emit one alert per event the first time it enters the window.
//! - Track alerted ids and forget them once they leave the window.
//!
//! # Invariants
//! - An id is in notification memory iff an alert was emitted for it since
//!   the last `reset()` and it was relevant at the last successful check.
//! - A check either completes fully or fails before emitting anything and
//!   without touching notification memory.
//! - Relevance is decided on the continuous timeline; windows that cross
//!   midnight also query the following date(s).

use crate::model::event::{Event, EventId};
use crate::repo::event_repo::{EventRepository, RepoResult};
use crate::service::alert::{Alert, AlertSink};
use chrono::{NaiveDateTime, TimeDelta};
use log::{debug, error, info};
use std::collections::BTreeSet;

/// Default look-ahead window length in minutes.
pub const DEFAULT_LOOK_AHEAD_MINUTES: u32 = 10;

/// Outcome counters for one completed check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Events inside the window at this check.
    pub relevant: usize,
    /// Alerts emitted by this check.
    pub alerted: usize,
    /// Ids forgotten because they left the window.
    pub pruned: usize,
}

/// Notification engine over an injected event store and alert sink.
///
/// Holds mutable memory without locking; callers serialize checks.
pub struct NotificationEngine<R: EventRepository, S: AlertSink> {
    repo: R,
    sink: S,
    look_ahead: TimeDelta,
    notified: BTreeSet<EventId>,
}

impl<R: EventRepository, S: AlertSink> NotificationEngine<R, S> {
    /// Creates an engine with the default 10-minute window.
    pub fn new(repo: R, sink: S) -> Self {
        Self::with_look_ahead(repo, sink, DEFAULT_LOOK_AHEAD_MINUTES)
    }

    /// Creates an engine with a custom window length in minutes.
    pub fn with_look_ahead(repo: R, sink: S, minutes: u32) -> Self {
        Self {
            repo,
            sink,
            look_ahead: TimeDelta::minutes(i64::from(minutes)),
            notified: BTreeSet::new(),
        }
    }

    /// Runs one check at `now`.
    ///
    /// # Errors
    /// Returns the store error unchanged when any candidate query fails; no
    /// alert is emitted and memory is left as it was.
    pub fn check_upcoming(&mut self, now: NaiveDateTime) -> RepoResult<TickSummary> {
        let threshold = now + self.look_ahead;

        let candidates = match self.fetch_candidates(now, threshold) {
            Ok(events) => events,
            Err(err) => {
                error!(
                    "event=notify_tick module=notify status=error error_code=store_query_failed error={}",
                    err
                );
                return Err(err);
            }
        };

        let relevant: Vec<&Event> = candidates
            .iter()
            .filter(|event| is_within_window(event, now, threshold))
            .collect();

        let mut alerted = 0;
        for event in &relevant {
            if self.notified.contains(&event.id) {
                continue;
            }
            let alert = Alert::for_event(event, now);
            info!(
                "event=notify_alert module=notify status=ok event_id={} minutes_until_start={}",
                alert.event_id, alert.minutes_until_start
            );
            self.sink.emit(&alert);
            self.notified.insert(event.id);
            alerted += 1;
        }

        let relevant_ids: BTreeSet<EventId> = relevant.iter().map(|event| event.id).collect();
        let before = self.notified.len();
        self.notified.retain(|id| relevant_ids.contains(id));
        let summary = TickSummary {
            relevant: relevant_ids.len(),
            alerted,
            pruned: before - self.notified.len(),
        };

        debug!(
            "event=notify_tick module=notify status=ok candidates={} relevant={} alerted={} pruned={}",
            candidates.len(),
            summary.relevant,
            summary.alerted,
            summary.pruned
        );
        Ok(summary)
    }

    /// Forgets every alerted id so events in the window alert again.
    pub fn reset(&mut self) {
        let cleared = self.notified.len();
        self.notified.clear();
        info!("event=notify_reset module=notify status=ok cleared={cleared}");
    }

    /// Returns whether `id` is currently in notification memory.
    pub fn is_notified(&self, id: EventId) -> bool {
        self.notified.contains(&id)
    }

    /// Ids currently in notification memory, in ascending order.
    pub fn notified_ids(&self) -> impl Iterator<Item = EventId> + '_ {
        self.notified.iter().copied()
    }

    /// Length of the look-ahead window.
    pub fn look_ahead(&self) -> TimeDelta {
        self.look_ahead
    }

    /// Shared access to the alert sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable access to the alert sink, e.g. to drain a collector.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    fn fetch_candidates(
        &self,
        now: NaiveDateTime,
        threshold: NaiveDateTime,
    ) -> RepoResult<Vec<Event>> {
        let last_date = threshold.date();
        let mut events = Vec::new();
        for date in now.date().iter_days().take_while(|date| *date <= last_date) {
            events.extend(self.repo.get_events_on_date(date)?);
        }
        Ok(events)
    }
}

/// Window test on the continuous timeline, upper bound inclusive.
fn is_within_window(event: &Event, now: NaiveDateTime, threshold: NaiveDateTime) -> bool {
    let starts_at = event.starts_at();
    starts_at >= now && starts_at <= threshold
}
