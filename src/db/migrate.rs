use crate::ui::messages::{success, warning};
use rusqlite::{Connection, OptionalExtension, Result};

/// Ensure that the `log` table exists.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?1")?;
    let exists: Option<String> = stmt.query_row([table], |row| row.get(0)).optional()?;
    Ok(exists.is_some())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info('{}')", table))?;
    let cols = stmt.query_map([], |row| row.get::<_, String>(1))?;

    for c in cols {
        if c? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn migration_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn mark_applied(conn: &Connection, version: &str, message: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (strftime('%Y-%m-%dT%H:%M:%SZ','now'), 'migration_applied', ?1, ?2)",
        [version, message],
    )?;
    Ok(())
}

/// Create the core tables with the current schema.
///
/// Task columns other than `title` are nullable: rows written by other
/// clients may be incomplete and readers must cope with that.
fn create_core_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id            TEXT PRIMARY KEY,
            username      TEXT NOT NULL UNIQUE,
            display_name  TEXT,
            role          TEXT,
            last_seen_at  TEXT,
            created_at    TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS sessions (
            token       TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL,
            created_at  TEXT NOT NULL,
            expires_at  TEXT NOT NULL,
            revoked_at  TEXT
        );

        CREATE TABLE IF NOT EXISTS tasks (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            title        TEXT NOT NULL,
            status       TEXT,
            priority     TEXT,
            due_date     TEXT,
            created_at   TEXT,
            updated_at   TEXT,
            assignee_id  TEXT,
            project_id   TEXT
        );

        CREATE TABLE IF NOT EXISTS auth_failures (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            username      TEXT NOT NULL,
            attempted_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_sessions_expires ON sessions(expires_at);
        CREATE INDEX IF NOT EXISTS idx_tasks_assignee ON tasks(assignee_id);
        CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status);
        CREATE INDEX IF NOT EXISTS idx_auth_failures_user ON auth_failures(username, attempted_at);
        "#,
    )?;
    Ok(())
}

/// Early databases had no activity timestamp on `users`.
fn migrate_add_last_seen_column(conn: &Connection) -> Result<()> {
    let version = "20250310_0002_users_last_seen";

    if migration_applied(conn, version)? {
        return Ok(());
    }

    if !table_has_column(conn, "users", "last_seen_at")? {
        warning("Adding 'last_seen_at' column to users table...");
        conn.execute("ALTER TABLE users ADD COLUMN last_seen_at TEXT;", [])?;
        success(format!(
            "Migration applied: {} → added 'last_seen_at' to users table",
            version
        ));
    }

    mark_applied(conn, version, "users.last_seen_at present")?;
    Ok(())
}

/// Early databases had no project column on `tasks`.
fn migrate_add_project_column(conn: &Connection) -> Result<()> {
    let version = "20250402_0003_tasks_project";

    if migration_applied(conn, version)? {
        return Ok(());
    }

    if !table_has_column(conn, "tasks", "project_id")? {
        warning("Adding 'project_id' column to tasks table...");
        conn.execute("ALTER TABLE tasks ADD COLUMN project_id TEXT;", [])?;
        success(format!(
            "Migration applied: {} → added 'project_id' to tasks table",
            version
        ));
    }
    conn.execute_batch("CREATE INDEX IF NOT EXISTS idx_tasks_project ON tasks(project_id);")?;

    mark_applied(conn, version, "tasks.project_id present")?;
    Ok(())
}

/// Public entry point: run all pending migrations.
///
/// Invocata da db::initialize::init_db().
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    // 1) Ensure log table
    ensure_log_table(conn)?;

    // 2) Core schema (no-op on existing tables)
    let fresh = !table_exists(conn, "tasks")?;
    create_core_tables(conn)?;
    if fresh {
        success("Created core tables (users, sessions, tasks, auth_failures).");
    }

    // 3) Versioned upgrades for older files
    migrate_add_last_seen_column(conn)?;
    migrate_add_project_column(conn)?;

    Ok(())
}
