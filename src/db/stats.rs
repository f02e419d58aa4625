use crate::db::pool::DbPool;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use rusqlite::OptionalExtension;
use std::fs;

/// Row counts of the tables shown by `db --info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DbCounts {
    pub users: i64,
    pub active_sessions: i64,
    pub tasks: i64,
    pub open_tasks: i64,
    pub log_entries: i64,
}

fn count(pool: &DbPool, sql: &str) -> rusqlite::Result<i64> {
    pool.conn.query_row(sql, [], |row| row.get(0))
}

pub fn collect_counts(pool: &DbPool) -> rusqlite::Result<DbCounts> {
    Ok(DbCounts {
        users: count(pool, "SELECT COUNT(*) FROM users")?,
        active_sessions: count(pool, "SELECT COUNT(*) FROM sessions WHERE revoked_at IS NULL")?,
        tasks: count(pool, "SELECT COUNT(*) FROM tasks")?,
        open_tasks: count(
            pool,
            "SELECT COUNT(*) FROM tasks WHERE status IS NULL OR status <> 'done'",
        )?,
        log_entries: count(pool, "SELECT COUNT(*) FROM log")?,
    })
}

pub fn print_db_info(pool: &DbPool, db_path: &str) -> rusqlite::Result<()> {
    println!();

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);

    //
    // 2) COUNTS
    //
    let c = collect_counts(pool)?;
    println!("{}• Users:{} {}{}{}", CYAN, RESET, GREEN, c.users, RESET);
    println!(
        "{}• Active sessions:{} {}{}{}",
        CYAN, RESET, GREEN, c.active_sessions, RESET
    );
    println!(
        "{}• Tasks:{} {}{}{} ({} open)",
        CYAN, RESET, GREEN, c.tasks, RESET, c.open_tasks
    );
    println!("{}• Log entries:{} {}", CYAN, RESET, c.log_entries);

    //
    // 3) TASK DATE RANGE
    //
    let first: Option<String> = pool
        .conn
        .query_row(
            "SELECT MIN(created_at) FROM tasks WHERE created_at IS NOT NULL",
            [],
            |row| row.get(0),
        )
        .optional()?
        .flatten();
    let last: Option<String> = pool
        .conn
        .query_row(
            "SELECT MAX(created_at) FROM tasks WHERE created_at IS NOT NULL",
            [],
            |row| row.get(0),
        )
        .optional()?
        .flatten();

    println!("{}• Tasks created:{}", CYAN, RESET);
    println!(
        "    from: {}",
        first.unwrap_or_else(|| format!("{GREY}--{RESET}"))
    );
    println!(
        "    to:   {}",
        last.unwrap_or_else(|| format!("{GREY}--{RESET}"))
    );

    println!();
    Ok(())
}
