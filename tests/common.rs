#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::{DateTime, Local, NaiveDate, TimeZone};
use std::cell::Cell;
use std::env;
use std::fs;
use std::path::PathBuf;
use teamdeck::auth::IdentityProvider;
use teamdeck::auth::credentials::{CredentialRecord, CredentialVerifier, Verification};
use rusqlite::{Connection, OptionalExtension};
use teamdeck::backend::changes::{ChangeCallback, Subscription, Table};
use teamdeck::backend::sqlite::SqliteBackend;
use teamdeck::backend::{Backend, ProfileFields, Session};
use teamdeck::errors::{AppError, AppResult};
use teamdeck::utils::date::from_db_timestamp;
use teamdeck::models::task::Task;
use teamdeck::models::task_status::TaskStatus;

pub fn td() -> Command {
    cargo_bin_cmd!("teamdeck")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_teamdeck.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// Initialize the DB in test mode (no config file is written)
pub fn init_db(db_path: &str) {
    td()
        .args(["--db", db_path, "--test", "init"])
        .assert()
        .success();
}

/// Sign in through the CLI, answering the code prompt from stdin
pub fn login(db_path: &str, username: &str, password: &str, code: &str) {
    td()
        .args([
            "--db", db_path, "--test", "login", "-u", username, "-p", password,
        ])
        .write_stdin(format!("{code}\n"))
        .assert()
        .success();
}

pub fn login_admin(db_path: &str) {
    login(db_path, "admin", "Admin@123", "123456");
}

pub fn login_member(db_path: &str) {
    login(db_path, "member", "Member@123", "654321");
}

/// Fixed local instant: `date` at `hour:00`
pub fn at(date: &str, hour: u32) -> DateTime<Local> {
    let d = NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("valid date");
    Local
        .from_local_datetime(&d.and_hms_opt(hour, 0, 0).expect("valid time"))
        .earliest()
        .expect("local time exists")
}

pub fn day(date: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("valid date")
}

/// Task builder used by the pure aggregation tests
pub fn task(id: i64, status: Option<TaskStatus>, created: &str, updated: &str) -> Task {
    let mut t = Task::new(&format!("task {id}"), at(created, 10));
    t.id = id;
    t.status = status;
    t.updated_at = Some(at(updated, 10));
    t
}

/// The two built-in accounts
pub fn builtin_verifier() -> CredentialVerifier {
    CredentialVerifier::new(vec![
        CredentialRecord::new("admin", "Admin@123", "123456", "admin"),
        CredentialRecord::new("member", "Member@123", "654321", "member"),
    ])
}

/// Provider wrapper counting resend requests
pub struct CountingProvider {
    pub inner: CredentialVerifier,
    pub resends: Cell<u32>,
}

impl CountingProvider {
    pub fn new() -> Self {
        Self {
            inner: builtin_verifier(),
            resends: Cell::new(0),
        }
    }
}

impl IdentityProvider for CountingProvider {
    fn check_credentials(&self, username: &str, password: &str) -> Verification {
        self.inner.check_credentials(username, password)
    }

    fn check_code(&self, username: &str, code: &str) -> bool {
        self.inner.check_code(username, code)
    }

    fn resend_code(&self, username: &str) -> AppResult<()> {
        self.resends.set(self.resends.get() + 1);
        self.inner.resend_code(username)
    }
}

/// Stored `last_seen_at` of a user
pub fn last_seen(conn: &Connection, user_id: &str) -> Option<DateTime<Local>> {
    let raw: Option<Option<String>> = conn
        .query_row(
            "SELECT last_seen_at FROM users WHERE id = ?1",
            [user_id],
            |row| row.get(0),
        )
        .optional()
        .expect("query last_seen_at");
    from_db_timestamp(raw.flatten().as_deref())
}

/// Backend whose role lookup always fails; everything else goes to SQLite
pub struct RoleLookupFails(pub SqliteBackend);

impl Backend for RoleLookupFails {
    fn get_session(&self) -> AppResult<Option<Session>> {
        self.0.get_session()
    }

    fn get_user_primary_role(&self, _user_id: &str) -> AppResult<Option<String>> {
        Err(AppError::Other("role service unavailable".into()))
    }

    fn query_tasks(&self, filter: &teamdeck::models::task::TaskFilter) -> AppResult<Vec<Task>> {
        self.0.query_tasks(filter)
    }

    fn subscribe_to_changes(&self, table: Table, on_change: ChangeCallback) -> Subscription {
        self.0.subscribe_to_changes(table, on_change)
    }

    fn sign_out(&self) -> AppResult<()> {
        self.0.sign_out()
    }

    fn upsert_user_profile(&self, user_id: &str, fields: &ProfileFields) -> AppResult<()> {
        self.0.upsert_user_profile(user_id, fields)
    }
}
