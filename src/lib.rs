//! teamdeck library root.
//! Exposes the CLI parser, the high-level run() function, and the sign-in,
//! backend and dashboard modules.

pub mod auth;
pub mod backend;
pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod export;
pub mod models;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    match &cli.command {
        Commands::Init => cli::commands::init::handle(cli),
        Commands::Config { .. } => cli::commands::config::handle(cli, cfg),
        Commands::Login { .. } => cli::commands::login::handle(cli, cfg),
        Commands::Logout => cli::commands::logout::handle(cli, cfg),
        Commands::Whoami => cli::commands::whoami::handle(cli, cfg),
        Commands::Task { .. } => cli::commands::task::handle(cli, cfg),
        Commands::Dashboard { .. } => cli::commands::dashboard::handle(cli, cfg),
        Commands::Export { .. } => cli::commands::export::handle(cli, cfg),
        Commands::Log { .. } => cli::commands::log::handle(cli, cfg),
        Commands::Db { .. } => cli::commands::db::handle(cli, cfg),
    }
}

/// Entry point usato da main.rs
pub fn run() -> AppResult<()> {
    // 1️⃣ parse CLI
    let cli = Cli::parse();

    // 2️⃣ init non dipende da una config esistente
    if matches!(cli.command, Commands::Init) {
        return dispatch(&cli, &Config::default());
    }

    // 3️⃣ carica config UNA sola volta
    let mut cfg = Config::load()?;

    // 4️⃣ applica eventuale override del DB da riga di comando
    if let Some(custom_db) = &cli.db {
        cfg.database = utils::path::expand_tilde_str(custom_db);
    }

    log::debug!("using database {}", cfg.database);

    // 5️⃣ passa tutto al dispatcher
    dispatch(&cli, &cfg)
}
