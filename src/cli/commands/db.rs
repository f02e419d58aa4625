use crate::cli::commands::clock;
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::db::log::ttlog_quiet;
use crate::db::migrate::run_pending_migrations;
use crate::db::pool::DbPool;
use crate::db::{queries, stats};
use crate::errors::{AppError, AppResult};
use crate::utils::colors::{CYAN, GREEN, RED, RESET};

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let Commands::Db {
        migrate,
        check,
        vacuum,
        info,
    } = &cli.command
    else {
        return Ok(());
    };

    let pool = DbPool::new(&cfg.database)?;

    if *migrate {
        println!("{}▶ Running migrations…{}", CYAN, RESET);
        run_pending_migrations(&pool.conn)?;
        println!("{}✔ Schema is up to date.{}\n", GREEN, RESET);
    }

    if *info {
        stats::print_db_info(&pool, &cfg.database)?;
    }

    if *check {
        integrity_check(&pool)?;
    }

    if *vacuum {
        compact(&pool, cli, cfg)?;
    }

    Ok(())
}

fn integrity_check(pool: &DbPool) -> AppResult<()> {
    println!("{}▶ Running integrity check…{}", CYAN, RESET);

    let result: String = pool
        .conn
        .query_row("PRAGMA integrity_check;", [], |row| row.get(0))?;

    if result == "ok" {
        println!("{}✔ Integrity check passed.{}\n", GREEN, RESET);
    } else {
        println!("{}✘ Integrity check failed:{} {}\n", RED, RESET, result);
    }
    Ok(())
}

/// Purge dead sessions and expired sign-in failures, then VACUUM.
fn compact(pool: &DbPool, cli: &Cli, cfg: &Config) -> AppResult<()> {
    let now = clock(cli)?.now();
    let window = cfg.lockout_window()?;

    let sessions = queries::purge_dead_sessions(&pool.conn, &now)?;
    let before = now
        .checked_sub_signed(window)
        .ok_or_else(|| AppError::Config("lockout window out of range".into()))?;
    let failures = queries::purge_auth_failures(&pool.conn, &before)?;
    println!(
        "{}▶ Removed {} dead session(s) and {} expired sign-in failure(s).{}",
        CYAN, sessions, failures, RESET
    );

    pool.conn.execute_batch("VACUUM;")?;
    ttlog_quiet(
        &pool.conn,
        "vacuum",
        "",
        &format!("purged {sessions} sessions, {failures} auth failures"),
    );
    println!("{}✔ Vacuum completed.{}\n", GREEN, RESET);
    Ok(())
}
