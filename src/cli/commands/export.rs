use crate::cli::commands::{open_backend, require_session};
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::session::DashboardSession;
use crate::db::log::ttlog_quiet;
use crate::errors::AppResult;
use crate::export::ExportLogic;
use crate::utils::path::expand_tilde_str;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        format,
        file,
        window,
        force,
    } = &cli.command
    {
        let backend = open_backend(cli, cfg)?;
        let (session, view) = require_session(&backend)?;

        let mut dash = DashboardSession::new(
            view,
            &session.user_id,
            window.unwrap_or(cfg.dashboard_window_days),
            cfg.chart_bucket_cap,
        );
        let report = dash.reload(&backend, backend.now())?;

        let file = expand_tilde_str(file);
        ExportLogic::export(report, *format, &file, *force)?;
        ttlog_quiet(
            backend.conn(),
            "export",
            format.as_str(),
            &format!("{} report exported to {}", view, file),
        );
    }
    Ok(())
}
