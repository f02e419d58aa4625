//! Static credential table used by the built-in identity provider.
//!
//! Records never hold plaintext secrets: passwords and one-time codes are
//! kept as `sha256(salt ":" secret)` hex digests and compared in constant time.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::IdentityProvider;
use crate::errors::AppResult;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CredentialRecord {
    pub username: String,
    pub role: String,
    pub salt: String,
    pub password_hash: String,
    pub code_hash: String,
}

impl CredentialRecord {
    /// Build a record from plaintext secrets, generating a fresh salt.
    pub fn new(username: &str, password: &str, code: &str, role: &str) -> Self {
        let salt = uuid::Uuid::new_v4().simple().to_string();
        Self {
            username: username.to_string(),
            role: role.to_string(),
            password_hash: digest(&salt, password),
            code_hash: digest(&salt, code),
            salt,
        }
    }

    pub fn password_matches(&self, password: &str) -> bool {
        constant_time_eq(
            digest(&self.salt, password).as_bytes(),
            self.password_hash.as_bytes(),
        )
    }

    pub fn code_matches(&self, code: &str) -> bool {
        constant_time_eq(
            digest(&self.salt, code).as_bytes(),
            self.code_hash.as_bytes(),
        )
    }
}

/// Hex digest of a salted secret.
pub fn digest(salt: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Outcome of a username/password check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Verified { role: String },
    Rejected,
}

impl Verification {
    pub fn is_ok(&self) -> bool {
        matches!(self, Verification::Verified { .. })
    }
}

/// Exact-match verifier over a fixed set of credential records.
#[derive(Debug, Clone)]
pub struct CredentialVerifier {
    records: Vec<CredentialRecord>,
}

impl CredentialVerifier {
    pub fn new(records: Vec<CredentialRecord>) -> Self {
        Self { records }
    }

    fn find(&self, username: &str) -> Option<&CredentialRecord> {
        self.records.iter().find(|r| r.username == username)
    }

    pub fn verify(&self, username: &str, password: &str) -> Verification {
        match self.find(username) {
            Some(rec) if rec.password_matches(password) => Verification::Verified {
                role: rec.role.clone(),
            },
            _ => Verification::Rejected,
        }
    }
}

impl IdentityProvider for CredentialVerifier {
    fn check_credentials(&self, username: &str, password: &str) -> Verification {
        self.verify(username, password)
    }

    fn check_code(&self, username: &str, code: &str) -> bool {
        self.find(username)
            .map(|rec| rec.code_matches(code))
            .unwrap_or(false)
    }

    fn resend_code(&self, username: &str) -> AppResult<()> {
        // Static codes are provisioned out of band: nothing to re-issue.
        log::debug!("code re-issue requested for '{}'", username);
        Ok(())
    }
}
