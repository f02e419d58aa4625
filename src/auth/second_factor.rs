//! One-time code check with a bounded number of attempts.

use super::IdentityProvider;
use crate::errors::{AppError, AppResult};

pub const CODE_LENGTH: usize = 6;
pub const DEFAULT_CODE_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactorState {
    AwaitingCode { attempts_remaining: u32 },
    Verified,
    LockedOut,
}

/// Result of a single code submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeCheck {
    Verified,
    Retry { attempts_remaining: u32 },
    LockedOut,
}

/// True when `code` is exactly six ASCII digits.
pub fn is_well_formed(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Debug, Clone)]
pub struct SecondFactor {
    username: String,
    role: String,
    state: FactorState,
}

impl SecondFactor {
    pub fn new(username: &str, role: &str, max_attempts: u32) -> Self {
        Self {
            username: username.to_string(),
            role: role.to_string(),
            state: FactorState::AwaitingCode {
                attempts_remaining: max_attempts.max(1),
            },
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn state(&self) -> FactorState {
        self.state
    }

    pub fn attempts_remaining(&self) -> u32 {
        match self.state {
            FactorState::AwaitingCode { attempts_remaining } => attempts_remaining,
            _ => 0,
        }
    }

    pub fn submit(&mut self, provider: &dyn IdentityProvider, code: &str) -> AppResult<CodeCheck> {
        let remaining = match self.state {
            FactorState::AwaitingCode { attempts_remaining } => attempts_remaining,
            FactorState::Verified => {
                return Err(AppError::AuthFlow("code already verified".into()));
            }
            FactorState::LockedOut => {
                return Err(AppError::AuthFlow("too many invalid codes".into()));
            }
        };

        let code = code.trim();
        if is_well_formed(code) && provider.check_code(&self.username, code) {
            self.state = FactorState::Verified;
            return Ok(CodeCheck::Verified);
        }

        let left = remaining.saturating_sub(1);
        if left == 0 {
            self.state = FactorState::LockedOut;
            Ok(CodeCheck::LockedOut)
        } else {
            self.state = FactorState::AwaitingCode {
                attempts_remaining: left,
            };
            Ok(CodeCheck::Retry {
                attempts_remaining: left,
            })
        }
    }

    /// Re-issue the code. Does not consume an attempt.
    pub fn resend(&self, provider: &dyn IdentityProvider) -> AppResult<()> {
        match self.state {
            FactorState::AwaitingCode { .. } => provider.resend_code(&self.username),
            _ => Err(AppError::AuthFlow("no code challenge is pending".into())),
        }
    }
}
