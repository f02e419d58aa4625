use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::log::LogLogic;
use crate::db::pool::DbPool;
use crate::errors::AppResult;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if matches!(cli.command, Commands::Log { print: true }) {
        let pool = DbPool::open_migrated(&cfg.database)?;
        LogLogic::print_log(&pool)?;
    }

    Ok(())
}
