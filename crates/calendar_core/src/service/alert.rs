//! Alert payload and emission channel for upcoming-event notifications.
//!
//! # Responsibility
//! - Define the structured alert produced for an event entering the window.
//! - Define the observer interface the notification engine writes to.
//!
//! # Invariants
//! - Emission is fire-and-forget: sinks never report failure to the engine.

use crate::model::event::{Event, EventId};
use chrono::{NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::Sender;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// One pop-up notification for an event about to start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub event_id: EventId,
    pub title: String,
    pub tag: String,
    pub starts_at: NaiveTime,
    /// Whole minutes from the check instant to the event start, rounded to
    /// the nearest minute.
    pub minutes_until_start: i64,
}

impl Alert {
    /// Builds the alert for `event` as seen from `now`.
    pub fn for_event(event: &Event, now: NaiveDateTime) -> Self {
        Self {
            event_id: event.id,
            title: event.title.clone(),
            tag: event.tag.clone(),
            starts_at: event.time,
            minutes_until_start: minutes_between(now, event.starts_at()),
        }
    }

    /// Human-readable two-line message shown in the pop-up.
    pub fn message(&self) -> String {
        format!(
            "{} ({})\nStarts in {} minutes at {}",
            collapse_whitespace(&self.title),
            collapse_whitespace(&self.tag),
            self.minutes_until_start,
            self.starts_at.format("%H:%M")
        )
    }
}

/// Observer receiving alerts from the notification engine.
pub trait AlertSink {
    fn emit(&mut self, alert: &Alert);
}

impl<F> AlertSink for F
where
    F: FnMut(&Alert),
{
    fn emit(&mut self, alert: &Alert) {
        self(alert)
    }
}

/// In-memory sink that keeps every emitted alert in order.
#[derive(Debug, Default)]
pub struct AlertCollector {
    alerts: Vec<Alert>,
}

impl AlertCollector {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    /// Removes and returns everything collected so far.
    pub fn drain(&mut self) -> Vec<Alert> {
        std::mem::take(&mut self.alerts)
    }
}

impl AlertSink for AlertCollector {
    fn emit(&mut self, alert: &Alert) {
        self.alerts.push(alert.clone());
    }
}

/// Sink forwarding alerts to an `mpsc` receiver, typically a display thread.
///
/// A disconnected receiver drops the alert silently.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: Sender<Alert>,
}

impl ChannelSink {
    /// Wraps the sending half of an alert channel.
    pub fn new(sender: Sender<Alert>) -> Self {
        Self { sender }
    }
}

impl AlertSink for ChannelSink {
    fn emit(&mut self, alert: &Alert) {
        let _ = self.sender.send(alert.clone());
    }
}

fn minutes_between(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    let seconds = (to - from).num_seconds() as f64;
    (seconds / 60.0).round() as i64
}

fn collapse_whitespace(value: &str) -> String {
    WHITESPACE_RE.replace_all(value.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::{Alert, AlertCollector, AlertSink, ChannelSink};
    use crate::model::event::{EventId, NewEvent};
    use chrono::{NaiveDate, NaiveTime};
    use std::sync::mpsc;

    fn sample_alert() -> Alert {
        let date = NaiveDate::from_ymd_opt(2025, 5, 1).expect("valid date");
        let event = NewEvent::new(
            date,
            NaiveTime::from_hms_opt(9, 5, 0).expect("valid time"),
            "Cup\n  final",
            "Match",
        )
        .with_id(EventId(3));
        let now = date
            .and_hms_opt(8, 57, 20)
            .expect("valid datetime");
        Alert::for_event(&event, now)
    }

    #[test]
    fn minutes_until_start_rounds_to_nearest_minute() {
        // 7 min 40 s rounds up.
        assert_eq!(sample_alert().minutes_until_start, 8);
    }

    #[test]
    fn message_collapses_whitespace_and_formats_time() {
        assert_eq!(
            sample_alert().message(),
            "Cup final (Match)\nStarts in 8 minutes at 09:05"
        );
    }

    #[test]
    fn collector_keeps_order_and_drains() {
        let mut collector = AlertCollector::new();
        let alert = sample_alert();
        collector.emit(&alert);
        collector.emit(&alert);
        assert_eq!(collector.alerts().len(), 2);
        assert_eq!(collector.drain().len(), 2);
        assert!(collector.alerts().is_empty());
    }

    #[test]
    fn channel_sink_ignores_disconnected_receiver() {
        let (sender, receiver) = mpsc::channel();
        let mut sink = ChannelSink::new(sender);
        sink.emit(&sample_alert());
        assert_eq!(receiver.recv().expect("alert should arrive").event_id, EventId(3));

        drop(receiver);
        sink.emit(&sample_alert());
    }

    #[test]
    fn closures_are_sinks() {
        let mut seen = Vec::new();
        {
            let mut sink = |alert: &Alert| seen.push(alert.event_id);
            sink.emit(&sample_alert());
        }
        assert_eq!(seen, vec![EventId(3)]);
    }
}
