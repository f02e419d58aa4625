use crate::auth::gate::{Route, resolve_entry_route};
use crate::backend::Backend;
use crate::cli::commands::open_backend;
use crate::cli::parser::Cli;
use crate::config::Config;
use crate::errors::AppResult;
use crate::utils::colors::{CYAN, GREY, RESET};

/// Print the entry route for the current session.
pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let backend = open_backend(cli, cfg)?;
    let session = backend.get_session()?;
    let route = resolve_entry_route(&backend, session.as_ref(), backend.now());

    match (route, session) {
        (Route::Dashboard(view), Some(s)) => {
            println!("{}• User:{} {}", CYAN, RESET, s.user_id);
            println!("{}• Route:{} {} dashboard", CYAN, RESET, view);
            println!(
                "{}• Session expires:{} {}",
                CYAN,
                RESET,
                s.expires_at.format("%Y-%m-%d %H:%M")
            );
        }
        _ => {
            println!("{}Not signed in{} → login", GREY, RESET);
        }
    }
    Ok(())
}
