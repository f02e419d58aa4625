use crate::auth::IdentityProvider;
use crate::auth::credentials::CredentialVerifier;
use crate::auth::flow::{LoginFlow, LoginOutcome, LoginPolicy, LoginStep};
use crate::auth::gate::{Route, resolve_entry_route};
use crate::backend::sqlite::SqliteBackend;
use crate::backend::{Backend, ProfileFields};
use crate::cli::commands::open_backend;
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::db::log::ttlog_quiet;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{error, info, prompt, success, warning};
use std::io::{self, BufRead};
use std::time::Duration;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Login { username, password } = &cli.command {
        let backend = open_backend(cli, cfg)?;
        let provider = CredentialVerifier::new(cfg.credentials.clone());

        let mut policy = LoginPolicy::from_config(cfg);
        if cli.test {
            policy.lockout_reset_delay = Duration::ZERO;
        }

        let stdin = io::stdin();
        let mut input = stdin.lock();
        run_login(
            &backend,
            &provider,
            policy,
            cfg.lockout_window()?,
            username.clone(),
            password.clone(),
            &mut input,
        )?;
    }
    Ok(())
}

fn read_or_prompt<R: BufRead>(
    preset: &mut Option<String>,
    input: &mut R,
    label: &str,
) -> AppResult<String> {
    if let Some(v) = preset.take() {
        return Ok(v);
    }
    prompt(input, label)?.ok_or_else(|| AppError::AuthFlow("sign-in aborted".into()))
}

/// Drive one sign-in interaction to completion.
///
/// `username`/`password` pre-fill the first credentials step only; later
/// attempts are read from `input`. Returns the entry route of the new session.
pub fn run_login<R: BufRead>(
    backend: &SqliteBackend,
    provider: &dyn IdentityProvider,
    policy: LoginPolicy,
    failure_window: chrono::Duration,
    mut username: Option<String>,
    mut password: Option<String>,
    input: &mut R,
) -> AppResult<Route> {
    let mut flow = LoginFlow::new(provider, policy);
    let mut current_user = String::new();

    loop {
        match flow.step() {
            // -----------------------------
            // Step 1: username + password
            // -----------------------------
            LoginStep::Credentials => {
                let user = read_or_prompt(&mut username, input, "Username")?
                    .trim()
                    .to_string();
                let pass = read_or_prompt(&mut password, input, "Password")?;

                flow.observe_prior_failures(backend.recent_auth_failures(&user, failure_window)?);
                let attempts_before = flow.login_attempts();

                let outcome = flow.submit_credentials(&user, &pass)?;
                if flow.login_attempts() > attempts_before {
                    backend.record_auth_failure(&user)?;
                    ttlog_quiet(backend.conn(), "login_failed", &user, "invalid credentials");
                }

                match outcome {
                    LoginOutcome::CodeRequired { .. } => {
                        info(outcome.message());
                        info("Type 'resend' to receive the code again.");
                        current_user = user;
                    }
                    LoginOutcome::InvalidCredentials { .. } => warning(outcome.message()),
                    LoginOutcome::PermanentLockout => {
                        ttlog_quiet(
                            backend.conn(),
                            "lockout",
                            &user,
                            "too many failed sign-in attempts",
                        );
                        error(outcome.message());
                        return Err(AppError::AuthFlow(
                            "account locked after too many failed sign-in attempts".into(),
                        ));
                    }
                    other => {
                        return Err(AppError::AuthFlow(format!(
                            "unexpected outcome at credentials step: {:?}",
                            other
                        )));
                    }
                }
            }

            // -----------------------------
            // Step 2: one-time code
            // -----------------------------
            LoginStep::SecondFactor => {
                let code = prompt(input, "Code")?
                    .ok_or_else(|| AppError::AuthFlow("sign-in aborted".into()))?;

                if code.trim().eq_ignore_ascii_case("resend") {
                    flow.resend_code()?;
                    info("A new code has been sent to your registered device.");
                    continue;
                }

                match flow.submit_code(&code)? {
                    outcome @ LoginOutcome::InvalidCode { .. } => warning(outcome.message()),
                    outcome @ LoginOutcome::LockedOut { reset_after } => {
                        error(outcome.message());
                        ttlog_quiet(
                            backend.conn(),
                            "lockout",
                            &current_user,
                            "too many invalid codes",
                        );
                        if !reset_after.is_zero() {
                            std::thread::sleep(reset_after);
                        }
                        flow.reset();
                        info("Back to sign-in.");
                    }
                    LoginOutcome::Verified {
                        username,
                        role,
                        view,
                    } => {
                        let session = backend.create_session(&username)?;
                        backend.upsert_user_profile(
                            &username,
                            &ProfileFields {
                                display_name: Some(username.clone()),
                                role: Some(role),
                                last_seen_at: Some(backend.now()),
                            },
                        )?;
                        backend.clear_auth_failures(&username)?;
                        ttlog_quiet(
                            backend.conn(),
                            "login",
                            &username,
                            &format!("signed in ({} view)", view),
                        );

                        let route = resolve_entry_route(backend, Some(&session), backend.now());
                        success(format!("Signed in as {} → {}", username, route));
                        return Ok(route);
                    }
                    other => {
                        return Err(AppError::AuthFlow(format!(
                            "unexpected outcome at code step: {:?}",
                            other
                        )));
                    }
                }
            }
        }
    }
}
