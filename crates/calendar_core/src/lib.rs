//! Core logic for the match-day calendar.
//! Owns event storage, the month grid and upcoming-event notifications.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod settings;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::event::{Event, EventId, EventTag, EventValidationError, NewEvent};
pub use repo::event_repo::{EventRepository, RepoError, RepoResult, SqliteEventRepository};
pub use service::alert::{Alert, AlertCollector, AlertSink, ChannelSink};
pub use service::event_service::{parse_event_time, EventChanges, EventService, EventServiceError};
pub use service::month_grid::{build_month, shift_month, DayCell, MonthGrid, TagFilter};
pub use service::notification_controller::{NotificationController, DEFAULT_CHECK_INTERVAL};
pub use service::notification_engine::{
    NotificationEngine, TickSummary, DEFAULT_LOOK_AHEAD_MINUTES,
};
pub use settings::{Settings, SettingsError, SETTINGS_FILE_NAME};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
