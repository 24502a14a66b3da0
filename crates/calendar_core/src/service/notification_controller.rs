//! Notification scheduling policy around the engine.
//!
//! # Responsibility
//! - Gate periodic checks on the user's `notifications_enabled` setting.
//! - Reset notification memory and re-check immediately on re-enable.
//! - Drive the periodic check loop for long-running hosts.
//!
//! # Invariants
//! - A disabled controller never queries the store or emits alerts.
//! - Store failures in the loop are logged and retried on the next tick.

use crate::repo::event_repo::{EventRepository, RepoResult};
use crate::service::alert::AlertSink;
use crate::service::notification_engine::{NotificationEngine, TickSummary};
use chrono::NaiveDateTime;
use log::{info, warn};
use std::time::Duration;

/// Default delay between periodic checks.
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(60);

pub struct NotificationController<R: EventRepository, S: AlertSink> {
    engine: NotificationEngine<R, S>,
    enabled: bool,
}

impl<R: EventRepository, S: AlertSink> NotificationController<R, S> {
    /// Wraps `engine`; `enabled` is the initial notifications setting.
    pub fn new(engine: NotificationEngine<R, S>, enabled: bool) -> Self {
        Self { engine, enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Startup check. Same gating as a periodic tick.
    pub fn start(&mut self, now: NaiveDateTime) -> RepoResult<TickSummary> {
        info!(
            "event=notify_start module=notify status=ok enabled={}",
            self.enabled
        );
        self.tick(now)
    }

    /// Periodic check; returns an empty summary while disabled.
    pub fn tick(&mut self, now: NaiveDateTime) -> RepoResult<TickSummary> {
        if !self.enabled {
            return Ok(TickSummary::default());
        }
        self.engine.check_upcoming(now)
    }

    /// Applies a settings change.
    ///
    /// Enabling from a disabled state clears notification memory and checks
    /// immediately, so events already in the window alert again.
    pub fn set_enabled(&mut self, enabled: bool, now: NaiveDateTime) -> RepoResult<TickSummary> {
        if self.enabled == enabled {
            return Ok(TickSummary::default());
        }
        self.enabled = enabled;
        info!("event=notify_toggle module=notify status=ok enabled={enabled}");

        if !enabled {
            return Ok(TickSummary::default());
        }
        self.engine.reset();
        self.engine.check_upcoming(now)
    }

    /// Runs `start` followed by periodic ticks every `interval`.
    ///
    /// `clock` supplies the check instant. `enabled` is polled before the
    /// startup check and before every tick; a change is applied through
    /// [`Self::set_enabled`], so flipping back on re-alerts events already
    /// in the window. `max_ticks` bounds the number of periodic ticks after
    /// startup; `None` runs until the process exits.
    /// Returns the total number of alerts emitted.
    pub fn run(
        &mut self,
        mut clock: impl FnMut() -> NaiveDateTime,
        mut enabled: impl FnMut() -> bool,
        interval: Duration,
        max_ticks: Option<u64>,
    ) -> usize {
        let wanted = enabled();
        let mut alerted = self.logged_tick(
            |controller, now| {
                controller.enabled = wanted;
                controller.start(now)
            },
            clock(),
        );

        let mut ticks = 0_u64;
        while max_ticks.map_or(true, |limit| ticks < limit) {
            std::thread::sleep(interval);
            let now = clock();
            let wanted = enabled();
            alerted += self.logged_tick(|controller, now| controller.sync_and_tick(wanted, now), now);
            ticks += 1;
        }
        alerted
    }

    /// Read access to the wrapped engine.
    pub fn engine(&self) -> &NotificationEngine<R, S> {
        &self.engine
    }

    /// One loop step: a flag transition replaces the plain tick, since
    /// enabling already resets memory and checks.
    fn sync_and_tick(&mut self, enabled: bool, now: NaiveDateTime) -> RepoResult<TickSummary> {
        if enabled != self.enabled {
            return self.set_enabled(enabled, now);
        }
        self.tick(now)
    }

    fn logged_tick(
        &mut self,
        check: impl FnOnce(&mut Self, NaiveDateTime) -> RepoResult<TickSummary>,
        now: NaiveDateTime,
    ) -> usize {
        match check(self, now) {
            Ok(summary) => summary.alerted,
            Err(err) => {
                warn!("event=notify_loop module=notify status=retry_next_tick error={err}");
                0
            }
        }
    }
}
