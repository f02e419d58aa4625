use crate::db::migrate::run_pending_migrations;
use crate::errors::AppResult;
use rusqlite::Connection;
use std::time::Duration;

/// Wait this long on a lock held by another process (e.g. a watching dashboard).
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Pragmas first, then the schema (created or upgraded by the migration engine).
pub fn init_db(conn: &Connection) -> AppResult<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    run_pending_migrations(conn)?;
    Ok(())
}
