//! Backing collaborator: sessions, user profiles, task rows and the change feed.
//!
//! The core only talks to the `Backend` trait; `sqlite::SqliteBackend` is the
//! implementation the CLI uses.

pub mod changes;
pub mod sqlite;

use chrono::{DateTime, Local};

use crate::errors::AppResult;
use crate::models::task::{Task, TaskFilter};
use changes::{ChangeCallback, Subscription, Table};

/// Proof of a completed sign-in. Opaque to the core except for `user_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub created_at: DateTime<Local>,
    pub expires_at: DateTime<Local>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Local>) -> bool {
        self.expires_at <= now
    }
}

/// Partial profile update; `None` fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileFields {
    pub display_name: Option<String>,
    pub role: Option<String>,
    pub last_seen_at: Option<DateTime<Local>>,
}

impl ProfileFields {
    pub fn seen_at(now: DateTime<Local>) -> Self {
        Self {
            last_seen_at: Some(now),
            ..Self::default()
        }
    }
}

pub trait Backend {
    /// The current valid session, if any.
    fn get_session(&self) -> AppResult<Option<Session>>;

    /// Primary role string for a user; `None` when the user has no role on record.
    fn get_user_primary_role(&self, user_id: &str) -> AppResult<Option<String>>;

    fn query_tasks(&self, filter: &TaskFilter) -> AppResult<Vec<Task>>;

    fn subscribe_to_changes(&self, table: Table, on_change: ChangeCallback) -> Subscription;

    fn sign_out(&self) -> AppResult<()>;

    fn upsert_user_profile(&self, user_id: &str, fields: &ProfileFields) -> AppResult<()>;
}
