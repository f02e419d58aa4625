//! Sign-in core: credential check, second factor, role routing and the
//! entry gate that decides where a caller lands.

pub mod credentials;
pub mod flow;
pub mod gate;
pub mod role;
pub mod second_factor;

use crate::errors::AppResult;
use credentials::Verification;

/// Seam to the identity provider.
///
/// Verification is one-way: callers learn pass/fail only, never the
/// expected secret.
pub trait IdentityProvider {
    fn check_credentials(&self, username: &str, password: &str) -> Verification;

    fn check_code(&self, username: &str, code: &str) -> bool;

    /// Ask the provider to deliver the one-time code again.
    fn resend_code(&self, username: &str) -> AppResult<()>;
}
