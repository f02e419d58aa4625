//! Two-step sign-in interaction: credentials, then a one-time code.
//!
//! A `LoginFlow` lives exactly as long as one sign-in interaction. It never
//! sleeps or touches storage; the driver (the `login` command) persists
//! failures, waits out lockout delays and creates the session.

use std::time::Duration;

use super::IdentityProvider;
use super::credentials::Verification;
use super::role::{View, route_for_role};
use super::second_factor::{CodeCheck, DEFAULT_CODE_ATTEMPTS, SecondFactor};
use crate::config::Config;
use crate::errors::{AppError, AppResult};

pub const DEFAULT_LOGIN_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginPolicy {
    pub max_login_attempts: u32,
    pub max_code_attempts: u32,
    pub lockout_reset_delay: Duration,
}

impl Default for LoginPolicy {
    fn default() -> Self {
        Self {
            max_login_attempts: DEFAULT_LOGIN_ATTEMPTS,
            max_code_attempts: DEFAULT_CODE_ATTEMPTS,
            lockout_reset_delay: Duration::from_millis(3000),
        }
    }
}

impl LoginPolicy {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            max_login_attempts: cfg.max_login_attempts.max(1),
            max_code_attempts: cfg.max_code_attempts.max(1),
            lockout_reset_delay: Duration::from_millis(cfg.lockout_reset_delay_ms),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStep {
    Credentials,
    SecondFactor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Credentials accepted, a code is now expected.
    CodeRequired { attempts_remaining: u32 },
    InvalidCredentials { attempts_left: u32 },
    /// Cumulative credential failures reached the limit.
    PermanentLockout,
    InvalidCode { attempts_remaining: u32 },
    /// Code attempts exhausted. The flow must be `reset` after `reset_after`.
    LockedOut { reset_after: Duration },
    Verified {
        username: String,
        role: String,
        view: View,
    },
}

impl LoginOutcome {
    pub fn message(&self) -> String {
        match self {
            LoginOutcome::CodeRequired { attempts_remaining } => format!(
                "Credentials accepted. Enter the 6-digit code ({} attempts).",
                attempts_remaining
            ),
            LoginOutcome::InvalidCredentials { attempts_left } => format!(
                "Invalid username or password. {} attempt(s) left.",
                attempts_left
            ),
            LoginOutcome::PermanentLockout => {
                "Too many failed sign-in attempts. This account is locked.".to_string()
            }
            LoginOutcome::InvalidCode { attempts_remaining } => format!(
                "Invalid code. {} attempt(s) remaining.",
                attempts_remaining
            ),
            LoginOutcome::LockedOut { reset_after } => format!(
                "Too many invalid codes: locked out. Returning to sign-in in {}s.",
                reset_after.as_secs()
            ),
            LoginOutcome::Verified { username, view, .. } => {
                format!("Signed in as {} ({} view).", username, view)
            }
        }
    }
}

pub struct LoginFlow<'p> {
    provider: &'p dyn IdentityProvider,
    policy: LoginPolicy,
    step: LoginStep,
    login_attempts: u32,
    second_factor: Option<SecondFactor>,
}

impl<'p> LoginFlow<'p> {
    pub fn new(provider: &'p dyn IdentityProvider, policy: LoginPolicy) -> Self {
        Self {
            provider,
            policy,
            step: LoginStep::Credentials,
            login_attempts: 0,
            second_factor: None,
        }
    }

    pub fn step(&self) -> LoginStep {
        self.step
    }

    pub fn login_attempts(&self) -> u32 {
        self.login_attempts
    }

    pub fn is_permanently_locked(&self) -> bool {
        self.login_attempts >= self.policy.max_login_attempts
    }

    /// Fold in failures recorded before this interaction started.
    pub fn observe_prior_failures(&mut self, failures: u32) {
        self.login_attempts = self.login_attempts.max(failures);
    }

    pub fn second_factor(&self) -> Option<&SecondFactor> {
        self.second_factor.as_ref()
    }

    pub fn submit_credentials(
        &mut self,
        username: &str,
        password: &str,
    ) -> AppResult<LoginOutcome> {
        if self.step != LoginStep::Credentials {
            return Err(AppError::AuthFlow("a code is already pending".into()));
        }
        if self.is_permanently_locked() {
            return Ok(LoginOutcome::PermanentLockout);
        }

        match self.provider.check_credentials(username.trim(), password) {
            Verification::Verified { role } => {
                let factor =
                    SecondFactor::new(username.trim(), &role, self.policy.max_code_attempts);
                let attempts_remaining = factor.attempts_remaining();
                self.second_factor = Some(factor);
                self.step = LoginStep::SecondFactor;
                Ok(LoginOutcome::CodeRequired { attempts_remaining })
            }
            Verification::Rejected => {
                self.login_attempts += 1;
                if self.is_permanently_locked() {
                    Ok(LoginOutcome::PermanentLockout)
                } else {
                    Ok(LoginOutcome::InvalidCredentials {
                        attempts_left: self.policy.max_login_attempts - self.login_attempts,
                    })
                }
            }
        }
    }

    pub fn submit_code(&mut self, code: &str) -> AppResult<LoginOutcome> {
        if self.step != LoginStep::SecondFactor {
            return Err(AppError::AuthFlow("credentials must be verified first".into()));
        }
        let factor = self
            .second_factor
            .as_mut()
            .ok_or_else(|| AppError::AuthFlow("sign-in already completed".into()))?;

        match factor.submit(self.provider, code)? {
            CodeCheck::Verified => {
                let username = factor.username().to_string();
                let role = factor.role().to_string();
                let view = route_for_role(Some(role.as_str()));
                self.second_factor = None;
                Ok(LoginOutcome::Verified {
                    username,
                    role,
                    view,
                })
            }
            CodeCheck::Retry { attempts_remaining } => {
                Ok(LoginOutcome::InvalidCode { attempts_remaining })
            }
            CodeCheck::LockedOut => Ok(LoginOutcome::LockedOut {
                reset_after: self.policy.lockout_reset_delay,
            }),
        }
    }

    pub fn resend_code(&self) -> AppResult<()> {
        match (&self.second_factor, self.step) {
            (Some(factor), LoginStep::SecondFactor) => factor.resend(self.provider),
            _ => Err(AppError::AuthFlow("no code challenge is pending".into())),
        }
    }

    /// Drop role and step state and go back to the credentials step.
    /// The credential failure counter is kept.
    pub fn reset(&mut self) {
        self.second_factor = None;
        self.step = LoginStep::Credentials;
    }
}
