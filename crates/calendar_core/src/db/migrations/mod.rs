//! Event-store schema versions.
//!
//! # Responsibility
//! - Create the `events` table on first open and bring older files forward.
//! - Refuse database files written by a newer calendar build.
//!
//! # Invariants
//! - `SCHEMA_STEPS` is sorted by strictly increasing `version`.
//! - `PRAGMA user_version` always names the last step applied to the file.

use crate::db::{DbError, DbResult};
use log::{info, warn};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[SchemaStep {
    version: 1,
    sql: include_str!("0001_events.sql"),
}];

/// Returns the newest event-store schema this build can read.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Reads the schema version recorded in the database file.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

/// Brings the event store up to [`latest_version`].
///
/// Outstanding steps run in one transaction; a failing step leaves the file
/// at the version it had on entry.
///
/// # Errors
/// - [`DbError::UnsupportedSchemaVersion`] when the file is newer than this
///   build.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found = schema_version(conn)?;
    let outstanding = steps_after(found)?;
    let Some(target) = outstanding.last().map(|step| step.version) else {
        return Ok(());
    };

    let tx = conn.transaction()?;
    for step in outstanding {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={found} to_version={target} steps={}",
        outstanding.len()
    );
    Ok(())
}

fn steps_after(found: u32) -> DbResult<&'static [SchemaStep]> {
    let latest = latest_version();
    if found > latest {
        warn!(
            "event=db_migrate module=db status=error reason=newer_schema db_version={found} latest_supported={latest}"
        );
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: found,
            latest_supported: latest,
        });
    }
    let applied = SCHEMA_STEPS.partition_point(|step| step.version <= found);
    Ok(&SCHEMA_STEPS[applied..])
}

#[cfg(test)]
mod tests {
    use super::{latest_version, steps_after, SCHEMA_STEPS};
    use crate::db::DbError;

    #[test]
    fn schema_steps_are_strictly_increasing() {
        assert!(SCHEMA_STEPS
            .windows(2)
            .all(|pair| pair[0].version < pair[1].version));
        assert!(latest_version() >= 1);
    }

    #[test]
    fn fresh_file_runs_every_step_and_current_file_runs_none() {
        assert_eq!(steps_after(0).expect("fresh file").len(), SCHEMA_STEPS.len());
        assert!(steps_after(latest_version())
            .expect("current file")
            .is_empty());
    }

    #[test]
    fn newer_file_is_refused() {
        let err = steps_after(latest_version() + 1).expect_err("newer file must fail");
        assert!(matches!(
            err,
            DbError::UnsupportedSchemaVersion { db_version, .. } if db_version == latest_version() + 1
        ));
    }
}
