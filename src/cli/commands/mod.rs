pub mod config;
pub mod dashboard;
pub mod db;
pub mod export;
pub mod init;
pub mod log;
pub mod login;
pub mod logout;
pub mod task;
pub mod whoami;

use crate::auth::gate::{Route, resolve_entry_route};
use crate::auth::role::View;
use crate::backend::sqlite::SqliteBackend;
use crate::backend::{Backend, Session};
use crate::cli::parser::Cli;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::utils::date::Clock;

/// Clock for this invocation (`--now` or the system clock).
pub(crate) fn clock(cli: &Cli) -> AppResult<Clock> {
    Clock::from_arg(cli.now.as_deref()).map_err(AppError::InvalidDate)
}

pub(crate) fn open_backend(cli: &Cli, cfg: &Config) -> AppResult<SqliteBackend> {
    let backend = SqliteBackend::open(&cfg.database, clock(cli)?)?
        .with_session_ttl(cfg.session_ttl()?);
    Ok(backend)
}

/// The current session and the view it routes to, or `NotSignedIn`.
pub(crate) fn require_session(backend: &SqliteBackend) -> AppResult<(Session, View)> {
    let session = backend.get_session()?;
    match resolve_entry_route(backend, session.as_ref(), backend.now()) {
        Route::Dashboard(view) => session
            .map(|s| (s, view))
            .ok_or(AppError::NotSignedIn),
        Route::Login => Err(AppError::NotSignedIn),
    }
}
