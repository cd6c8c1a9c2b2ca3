//! Connection bootstrap for catalog stores.
//!
//! # Invariants
//! - Returned connections enforce foreign keys, so a book cannot reference
//!   a missing author and a detail cannot outlive its book row.
//! - Returned connections are migrated to `latest_version()`.

use super::migrations::apply_migrations;
use super::{DbError, DbResult, StoreLocation};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens the store at `location`, creating and migrating it as needed.
///
/// Emits `db_open` events with the elapsed time; failures are logged with
/// the stage that failed (`db_open_failed` or `db_bootstrap_failed`).
pub fn open_store(location: &StoreLocation) -> DbResult<Connection> {
    let started_at = Instant::now();
    let mode = location.mode();
    info!("event=db_open module=db status=start mode={mode} location={location}");

    let connected = match location {
        StoreLocation::File(path) => Connection::open(path),
        StoreLocation::Memory => Connection::open_in_memory(),
    };
    let result = connected
        .map_err(|err| ("db_open_failed", DbError::from(err)))
        .and_then(|mut conn| match configure(&mut conn) {
            Ok(()) => Ok(conn),
            Err(err) => Err(("db_bootstrap_failed", err)),
        });

    let elapsed_ms = started_at.elapsed().as_millis();
    match result {
        Ok(conn) => {
            info!("event=db_open module=db status=ok mode={mode} duration_ms={elapsed_ms}");
            Ok(conn)
        }
        Err((error_code, err)) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={elapsed_ms} error_code={error_code} error={err}"
            );
            Err(err)
        }
    }
}

/// Opens (or creates) a store file.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_store(&StoreLocation::File(path.as_ref().to_path_buf()))
}

/// Opens a fresh private in-memory store.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_store(&StoreLocation::Memory)
}

fn configure(conn: &mut Connection) -> DbResult<()> {
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_migrations(conn)
}
