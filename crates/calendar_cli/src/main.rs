//! Command-line shell over `calendar_core`.
//!
//! # Responsibility
//! - Map subcommands onto event CRUD, month grid and notification use-cases.
//! - Host the periodic notification loop (`watch`).

use anyhow::{Context, Result};
use calendar_core::db::open_db;
use calendar_core::{
    build_month, default_log_level, init_logging, parse_event_time, shift_month, Alert,
    EventChanges, EventId, EventService, EventTag, NotificationController, NotificationEngine,
    Settings, SqliteEventRepository, TagFilter, SETTINGS_FILE_NAME,
};
use chrono::{Local, NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::{Path, PathBuf};

const DB_FILE_NAME: &str = "events.db";

#[derive(Debug, Parser)]
#[command(name = "calendar", version, about = "Match-day calendar with upcoming-event alerts")]
struct Cli {
    /// Directory holding the database, settings and logs.
    #[arg(long, global = true, default_value = ".calendar")]
    data_dir: PathBuf,

    /// Log level override (trace|debug|info|warn|error).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Add an event.
    Add {
        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,
        #[arg(long, value_parser = parse_time)]
        time: NaiveTime,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "Other")]
        tag: String,
    },
    /// Change fields of an existing event.
    Edit {
        id: i64,
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        #[arg(long, value_parser = parse_time)]
        time: Option<NaiveTime>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        tag: Option<String>,
    },
    /// Delete one event.
    Delete { id: i64 },
    /// Delete every event on a date.
    DeleteDay {
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
    },
    /// List events of one date, or all events.
    List {
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
    /// Print the month grid around a date.
    Month {
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        /// Tag filter; `All` shows everything.
        #[arg(long, default_value = "All")]
        tag: String,
        /// Shift by whole months (e.g. -1 for previous).
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        shift: i32,
    },
    /// Run the upcoming-event notification loop.
    Watch {
        /// Stop after this many periodic checks.
        #[arg(long)]
        max_ticks: Option<u64>,
    },
    /// Turn desktop notifications on or off.
    Notifications {
        #[arg(value_parser = ["on", "off"])]
        state: String,
    },
    /// List the suggested event tags.
    Tags,
}

fn main() {
    if let Err(err) = run(Cli::parse()) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let data_dir = absolute(&cli.data_dir)?;
    let settings_path = data_dir.join(SETTINGS_FILE_NAME);
    let mut settings = Settings::load(&settings_path)
        .with_context(|| format!("failed to load {}", settings_path.display()))?;

    let level = cli
        .log_level
        .as_deref()
        .or(settings.log_level.as_deref())
        .unwrap_or(default_log_level());
    init_logging(level, data_dir.join("logs")).context("failed to initialize logging")?;

    let conn = open_db(data_dir.join(DB_FILE_NAME)).context("failed to open event database")?;
    let repo = SqliteEventRepository::new(&conn);
    let service = EventService::new(&repo);

    match cli.command {
        Command::Add {
            date,
            time,
            title,
            tag,
        } => {
            let event = service.add_event(date, time, title, tag)?;
            println!("added #{} {} {}", event.id, event.date, event.time.format("%H:%M"));
        }
        Command::Edit {
            id,
            date,
            time,
            title,
            tag,
        } => {
            let changes = EventChanges {
                date,
                time,
                title,
                tag,
            };
            let event = service.modify_event(EventId(id), changes)?;
            println!("updated #{} {} {}", event.id, event.date, event.time.format("%H:%M"));
        }
        Command::Delete { id } => {
            service.delete_event(EventId(id))?;
            println!("deleted #{id}");
        }
        Command::DeleteDay { date } => {
            let removed = service.delete_day_events(date)?;
            println!("deleted {removed} event(s) on {date}");
        }
        Command::List { date } => {
            let events = match date {
                Some(date) => service.events_on(date)?,
                None => service.all_events()?,
            };
            for event in events {
                println!(
                    "#{:<5} {} {}  {} ({})",
                    event.id,
                    event.date,
                    event.time.format("%H:%M"),
                    event.title,
                    event.tag
                );
            }
        }
        Command::Month { date, tag, shift } => {
            let selected = shift_month(date.unwrap_or_else(|| Local::now().date_naive()), shift);
            let filter: TagFilter = tag.parse()?;
            let grid = build_month(&repo, selected, &filter)?;
            println!("{} [{}]", selected.format("%B %Y"), grid.filter);
            for day in &grid.days {
                let marker = if day.is_selected { '>' } else { ' ' };
                let summary = day
                    .events
                    .iter()
                    .map(|event| format!("{} {}", event.time.format("%H:%M"), event.title))
                    .collect::<Vec<_>>()
                    .join(", ");
                println!("{marker} {}  {summary}", day.date.format("%a %d"));
            }
        }
        Command::Watch { max_ticks } => {
            let engine = NotificationEngine::with_look_ahead(
                &repo,
                |alert: &Alert| println!("\n{}", alert.message()),
                settings.look_ahead_minutes,
            );
            let mut controller = NotificationController::new(engine, settings.notifications_enabled);
            info!(
                "event=watch_start module=cli status=ok interval_secs={} look_ahead_minutes={}",
                settings.check_interval_secs, settings.look_ahead_minutes
            );
            let mut last_enabled = settings.notifications_enabled;
            let enabled = || {
                match Settings::load(&settings_path) {
                    Ok(current) => last_enabled = current.notifications_enabled,
                    Err(err) => warn!(
                        "event=settings_reload module=cli status=error keep_enabled={last_enabled} error={err}"
                    ),
                }
                last_enabled
            };
            let alerted = controller.run(
                || Local::now().naive_local(),
                enabled,
                settings.check_interval(),
                max_ticks,
            );
            println!("watch finished, {alerted} alert(s) raised");
        }
        Command::Notifications { state } => {
            settings.notifications_enabled = state == "on";
            settings
                .save(&settings_path)
                .with_context(|| format!("failed to save {}", settings_path.display()))?;
            println!("notifications {state}");
        }
        Command::Tags => {
            for tag in EventTag::all() {
                println!("{}", tag.as_str());
            }
        }
    }

    Ok(())
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    Ok(cwd.join(path))
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|err| format!("expected YYYY-MM-DD: {err}"))
}

fn parse_time(value: &str) -> Result<NaiveTime, String> {
    parse_event_time(value).map_err(|err| err.to_string())
}
