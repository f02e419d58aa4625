use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use chrono::{DateTime, Duration, Local};

use super::changes::{ChangeCallback, ChangeEvent, ChangeFeed, ChangeKind, Subscription, Table};
use super::{Backend, ProfileFields, Session};
use crate::db::pool::DbPool;
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::models::task::{Task, TaskFilter};
use crate::models::task_status::TaskStatus;
use crate::utils::date::Clock;

pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24 * 7;

/// `Backend` over a local SQLite file.
///
/// Writes made through this value notify the change feed directly;
/// writes made by other connections are picked up by `poll_changes`.
pub struct SqliteBackend {
    pool: DbPool,
    clock: Clock,
    session_ttl: Duration,
    feed: ChangeFeed,
    last_data_version: Cell<Option<i64>>,
    fingerprints: RefCell<HashMap<Table, String>>,
}

impl SqliteBackend {
    pub fn new(pool: DbPool, clock: Clock) -> Self {
        Self {
            pool,
            clock,
            session_ttl: Duration::hours(DEFAULT_SESSION_TTL_HOURS),
            feed: ChangeFeed::new(),
            last_data_version: Cell::new(None),
            fingerprints: RefCell::new(HashMap::new()),
        }
    }

    /// Open (and migrate) the database at `path`.
    pub fn open(path: &str, clock: Clock) -> AppResult<Self> {
        Ok(Self::new(DbPool::open_migrated(path)?, clock))
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn conn(&self) -> &rusqlite::Connection {
        &self.pool.conn
    }

    pub fn now(&self) -> DateTime<Local> {
        self.clock.now()
    }

    pub fn feed(&self) -> &ChangeFeed {
        &self.feed
    }

    fn emit(&self, table: Table, kind: ChangeKind) {
        self.feed.notify(&ChangeEvent { table, kind });
    }

    // -----------------------------------------------------------------
    // Sessions
    // -----------------------------------------------------------------

    pub fn create_session(&self, user_id: &str) -> AppResult<Session> {
        let now = self.now();
        let expires_at = now
            .checked_add_signed(self.session_ttl)
            .ok_or_else(|| AppError::Config("session lifetime out of range".into()))?;
        let session = Session {
            token: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            created_at: now,
            expires_at,
        };
        queries::insert_session(self.conn(), &session)?;
        self.emit(Table::Sessions, ChangeKind::Insert);
        Ok(session)
    }

    // -----------------------------------------------------------------
    // Tasks
    // -----------------------------------------------------------------

    pub fn insert_task(&self, task: &Task) -> AppResult<i64> {
        let id = queries::insert_task(self.conn(), task)?;
        self.emit(Table::Tasks, ChangeKind::Insert);
        Ok(id)
    }

    pub fn update_task_status(&self, id: i64, status: TaskStatus) -> AppResult<()> {
        queries::update_task_status(self.conn(), id, status, &self.now())?;
        self.emit(Table::Tasks, ChangeKind::Update);
        Ok(())
    }

    pub fn delete_task(&self, id: i64) -> AppResult<()> {
        queries::delete_task(self.conn(), id)?;
        self.emit(Table::Tasks, ChangeKind::Delete);
        Ok(())
    }

    pub fn load_task(&self, id: i64) -> AppResult<Task> {
        queries::load_task(self.conn(), id)
    }

    // -----------------------------------------------------------------
    // Failed sign-ins
    // -----------------------------------------------------------------

    pub fn record_auth_failure(&self, username: &str) -> AppResult<()> {
        queries::insert_auth_failure(self.conn(), username, &self.now())
    }

    /// Failures for `username` within the trailing `window`.
    pub fn recent_auth_failures(&self, username: &str, window: Duration) -> AppResult<u32> {
        let since = self
            .now()
            .checked_sub_signed(window)
            .ok_or_else(|| AppError::Config("lockout window out of range".into()))?;
        queries::count_auth_failures(self.conn(), username, &since)
    }

    pub fn clear_auth_failures(&self, username: &str) -> AppResult<()> {
        queries::clear_auth_failures(self.conn(), username)?;
        Ok(())
    }

    // -----------------------------------------------------------------
    // External changes
    // -----------------------------------------------------------------

    /// Detect commits made by other connections since the previous poll and
    /// notify subscribers of the tables that changed. Returns those tables.
    ///
    /// The first call only records a baseline.
    pub fn poll_changes(&self) -> AppResult<Vec<Table>> {
        let version = queries::data_version(self.conn())?;
        let previous = self.last_data_version.replace(Some(version));

        let mut changed = Vec::new();
        let mut prints = self.fingerprints.borrow_mut();
        for table in Table::ALL {
            let fp = queries::table_fingerprint(self.conn(), table.name())?;
            let old = prints.insert(table, fp.clone());
            if previous.is_some()
                && previous != Some(version)
                && old.as_deref() != Some(fp.as_str())
            {
                changed.push(table);
            }
        }
        drop(prints);

        for table in &changed {
            self.emit(*table, ChangeKind::External);
        }
        Ok(changed)
    }
}

impl Backend for SqliteBackend {
    fn get_session(&self) -> AppResult<Option<Session>> {
        queries::load_active_session(self.conn(), &self.now())
    }

    fn get_user_primary_role(&self, user_id: &str) -> AppResult<Option<String>> {
        queries::load_user_role(self.conn(), user_id)
    }

    fn query_tasks(&self, filter: &TaskFilter) -> AppResult<Vec<Task>> {
        queries::load_tasks(self.conn(), filter)
    }

    fn subscribe_to_changes(&self, table: Table, on_change: ChangeCallback) -> Subscription {
        self.feed.subscribe(table, on_change)
    }

    fn sign_out(&self) -> AppResult<()> {
        let revoked = queries::revoke_sessions(self.conn(), &self.now())?;
        if revoked > 0 {
            self.emit(Table::Sessions, ChangeKind::Update);
        }
        Ok(())
    }

    fn upsert_user_profile(&self, user_id: &str, fields: &ProfileFields) -> AppResult<()> {
        queries::upsert_user(self.conn(), user_id, fields, &self.now())?;
        self.emit(Table::Users, ChangeKind::Update);
        Ok(())
    }
}
