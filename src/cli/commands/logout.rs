use crate::backend::Backend;
use crate::cli::commands::open_backend;
use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::log::ttlog_quiet;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let backend = open_backend(cli, cfg)?;

    match backend.get_session()? {
        Some(session) => {
            backend.sign_out()?;
            ttlog_quiet(backend.conn(), "logout", &session.user_id, "session revoked");
            success(format!("Signed out {}.", session.user_id));
        }
        None => info("No active session."),
    }
    Ok(())
}
