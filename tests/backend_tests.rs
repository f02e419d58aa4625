mod common;

use chrono::Duration;
use common::{RoleLookupFails, at, last_seen, setup_test_db};
use std::cell::RefCell;
use std::rc::Rc;
use teamdeck::auth::gate::{Route, resolve_entry_route};
use teamdeck::auth::role::View;
use teamdeck::backend::changes::{ChangeEvent, ChangeFeed, ChangeKind, Table};
use teamdeck::backend::sqlite::SqliteBackend;
use teamdeck::backend::{Backend, ProfileFields};
use teamdeck::core::session::DashboardSession;
use teamdeck::db::pool::DbPool;
use teamdeck::models::task::{Task, TaskFilter};
use teamdeck::models::task_status::TaskStatus;
use teamdeck::utils::date::Clock;

fn memory_backend() -> SqliteBackend {
    let pool = DbPool::in_memory().expect("in-memory db");
    SqliteBackend::new(pool, Clock::Fixed(at("2025-05-10", 12)))
}

fn assigned_task(title: &str, who: &str, backend: &SqliteBackend) -> Task {
    let mut t = Task::new(title, backend.now());
    t.assignee_id = Some(who.to_string());
    t
}

// ---------------------------------------------------------------
// Change feed
// ---------------------------------------------------------------

#[test]
fn test_feed_delivers_only_matching_table() {
    let feed = ChangeFeed::new();
    let seen: Rc<RefCell<Vec<ChangeEvent>>> = Rc::default();

    let sink = Rc::clone(&seen);
    let _sub = feed.subscribe(
        Table::Tasks,
        Box::new(move |e: &ChangeEvent| sink.borrow_mut().push(*e)),
    );

    feed.notify(&ChangeEvent {
        table: Table::Users,
        kind: ChangeKind::Update,
    });
    feed.notify(&ChangeEvent {
        table: Table::Tasks,
        kind: ChangeKind::Insert,
    });

    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].kind, ChangeKind::Insert);
}

#[test]
fn test_dropping_subscription_unsubscribes() {
    let feed = ChangeFeed::new();
    let hits = Rc::new(RefCell::new(0));

    let counter = Rc::clone(&hits);
    let sub = feed.subscribe(Table::Tasks, Box::new(move |_| *counter.borrow_mut() += 1));
    assert_eq!(feed.listener_count(), 1);

    let event = ChangeEvent {
        table: Table::Tasks,
        kind: ChangeKind::Delete,
    };
    feed.notify(&event);
    sub.unsubscribe();
    feed.notify(&event);

    assert_eq!(*hits.borrow(), 1);
    assert_eq!(feed.listener_count(), 0);
}

#[test]
fn test_subscription_outliving_feed_is_harmless() {
    let sub = {
        let feed = ChangeFeed::new();
        feed.subscribe(Table::Sessions, Box::new(|_| {}))
    };
    assert_eq!(sub.table(), Table::Sessions);
    drop(sub);
}

// ---------------------------------------------------------------
// Tasks through the backend
// ---------------------------------------------------------------

#[test]
fn test_task_writes_notify_subscribers() {
    let backend = memory_backend();
    let kinds: Rc<RefCell<Vec<ChangeKind>>> = Rc::default();
    let sink = Rc::clone(&kinds);
    let _sub = backend.subscribe_to_changes(
        Table::Tasks,
        Box::new(move |e: &ChangeEvent| sink.borrow_mut().push(e.kind)),
    );

    let id = backend
        .insert_task(&Task::new("write docs", backend.now()))
        .expect("insert");
    backend
        .update_task_status(id, TaskStatus::Done)
        .expect("update");
    backend.delete_task(id).expect("delete");

    assert_eq!(
        *kinds.borrow(),
        vec![ChangeKind::Insert, ChangeKind::Update, ChangeKind::Delete]
    );
}

#[test]
fn test_query_tasks_filters_by_assignee_and_status() {
    let backend = memory_backend();
    backend
        .insert_task(&assigned_task("a", "alice", &backend))
        .unwrap();
    let bob = backend
        .insert_task(&assigned_task("b", "bob", &backend))
        .unwrap();
    backend.update_task_status(bob, TaskStatus::Review).unwrap();

    assert_eq!(backend.query_tasks(&TaskFilter::all()).unwrap().len(), 2);

    let mine = backend
        .query_tasks(&TaskFilter::assigned_to("alice"))
        .unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].title, "a");

    let review = backend
        .query_tasks(&TaskFilter {
            status: Some(TaskStatus::Review),
            ..TaskFilter::default()
        })
        .unwrap();
    assert_eq!(review.len(), 1);
    assert_eq!(review[0].id, bob);
}

#[test]
fn test_deleting_missing_task_fails() {
    let backend = memory_backend();
    assert!(backend.delete_task(999).is_err());
}

#[test]
fn test_malformed_rows_are_read_with_missing_fields() {
    let backend = memory_backend();
    backend
        .conn()
        .execute(
            "INSERT INTO tasks (title, status, priority, due_date, created_at)
             VALUES ('legacy', 'weird', NULL, 'not-a-date', 'yesterday')",
            [],
        )
        .unwrap();

    let tasks = backend.query_tasks(&TaskFilter::all()).unwrap();
    assert_eq!(tasks.len(), 1);
    let t = &tasks[0];
    assert_eq!(t.status, None);
    assert_eq!(t.priority, None);
    assert_eq!(t.due_date, None);
    assert_eq!(t.created_at, None);
    assert!(!t.is_overdue(at("2025-05-10", 12).date_naive()));
}

#[test]
fn test_blob_cells_degrade_to_missing_fields() {
    let backend = memory_backend();
    backend.insert_task(&Task::new("fine", backend.now())).unwrap();
    backend
        .conn()
        .execute(
            "INSERT INTO tasks (title, status, priority, due_date, created_at, updated_at)
             VALUES ('binary', X'00FF', X'01', X'02', X'03', X'04')",
            [],
        )
        .unwrap();

    let tasks = backend.query_tasks(&TaskFilter::all()).unwrap();
    assert_eq!(tasks.len(), 2);
    let t = &tasks[1];
    assert_eq!(t.title, "binary");
    assert_eq!(t.status, None);
    assert_eq!(t.priority, None);
    assert_eq!(t.due_date, None);
    assert_eq!(t.created_at, None);
    assert_eq!(t.updated_at, None);
    assert_eq!(tasks[0].status, Some(TaskStatus::Todo));
}

// ---------------------------------------------------------------
// Sessions and the entry gate
// ---------------------------------------------------------------

#[test]
fn test_no_session_routes_to_login() {
    let backend = memory_backend();
    assert_eq!(backend.get_session().unwrap(), None);
    assert_eq!(resolve_entry_route(&backend, None, backend.now()), Route::Login);
}

#[test]
fn test_session_routes_by_stored_role_and_refreshes_activity() {
    let backend = memory_backend();
    backend
        .upsert_user_profile(
            "boss",
            &ProfileFields {
                role: Some("manager".to_string()),
                ..ProfileFields::default()
            },
        )
        .unwrap();
    let session = backend.create_session("boss").unwrap();

    let route = resolve_entry_route(&backend, Some(&session), backend.now());
    assert_eq!(route, Route::Dashboard(View::Admin));

    let seen = last_seen(backend.conn(), "boss");
    assert_eq!(seen.map(|t| t.timestamp()), Some(backend.now().timestamp()));
}

#[test]
fn test_session_without_role_gets_member_view() {
    let backend = memory_backend();
    let session = backend.create_session("newcomer").unwrap();
    assert_eq!(
        resolve_entry_route(&backend, Some(&session), backend.now()),
        Route::Dashboard(View::Member)
    );
}

#[test]
fn test_failing_role_lookup_falls_back_to_member_view() {
    let inner = memory_backend();
    inner
        .upsert_user_profile(
            "boss",
            &ProfileFields {
                role: Some("admin".to_string()),
                ..ProfileFields::default()
            },
        )
        .unwrap();
    let session = inner.create_session("boss").unwrap();
    let now = inner.now();
    let backend = RoleLookupFails(inner);

    let route = resolve_entry_route(&backend, Some(&session), now);
    assert_eq!(route, Route::Dashboard(View::Member));
    assert_ne!(route, Route::Dashboard(View::Admin));
}

#[test]
fn test_unrepresentable_durations_are_errors() {
    let pool = DbPool::in_memory().expect("in-memory db");
    let backend = SqliteBackend::new(pool, Clock::Fixed(at("2025-05-10", 12)))
        .with_session_ttl(chrono::TimeDelta::MAX);

    assert!(backend.create_session("admin").is_err());
    assert_eq!(backend.get_session().unwrap(), None);
    assert!(backend.recent_auth_failures("admin", chrono::TimeDelta::MAX).is_err());
}

#[test]
fn test_sign_out_revokes_session() {
    let backend = memory_backend();
    backend.create_session("admin").unwrap();
    assert!(backend.get_session().unwrap().is_some());

    backend.sign_out().unwrap();
    assert_eq!(backend.get_session().unwrap(), None);
}

#[test]
fn test_expired_session_is_ignored() {
    let path = setup_test_db("backend_expired_session");
    let early = SqliteBackend::open(&path, Clock::Fixed(at("2025-05-01", 12)))
        .unwrap()
        .with_session_ttl(Duration::hours(1));
    early.create_session("admin").unwrap();
    assert!(early.get_session().unwrap().is_some());

    let later = SqliteBackend::open(&path, Clock::Fixed(at("2025-05-02", 12))).unwrap();
    assert_eq!(later.get_session().unwrap(), None);
}

// ---------------------------------------------------------------
// Failed sign-ins
// ---------------------------------------------------------------

#[test]
fn test_auth_failures_counted_within_window_and_cleared() {
    let backend = memory_backend();
    backend.record_auth_failure("admin").unwrap();
    backend.record_auth_failure("admin").unwrap();
    backend.record_auth_failure("member").unwrap();

    let window = Duration::minutes(15);
    assert_eq!(backend.recent_auth_failures("admin", window).unwrap(), 2);

    backend.clear_auth_failures("admin").unwrap();
    assert_eq!(backend.recent_auth_failures("admin", window).unwrap(), 0);
    assert_eq!(backend.recent_auth_failures("member", window).unwrap(), 1);
}

// ---------------------------------------------------------------
// External changes and the dashboard session
// ---------------------------------------------------------------

#[test]
fn test_poll_changes_picks_up_other_connections() {
    let path = setup_test_db("backend_poll_changes");
    let watcher = SqliteBackend::open(&path, Clock::Fixed(at("2025-05-10", 12))).unwrap();
    let writer = SqliteBackend::open(&path, Clock::Fixed(at("2025-05-10", 12))).unwrap();

    // baseline
    assert!(watcher.poll_changes().unwrap().is_empty());
    assert!(watcher.poll_changes().unwrap().is_empty());

    writer
        .insert_task(&Task::new("from elsewhere", writer.now()))
        .unwrap();

    assert_eq!(watcher.poll_changes().unwrap(), vec![Table::Tasks]);
    assert!(watcher.poll_changes().unwrap().is_empty());
}

#[test]
fn test_dashboard_session_goes_stale_on_task_change() {
    let backend = memory_backend();
    backend
        .insert_task(&assigned_task("mine", "member", &backend))
        .unwrap();
    backend
        .insert_task(&assigned_task("theirs", "someone", &backend))
        .unwrap();

    let mut dash = DashboardSession::new(View::Member, "member", 14, 14);
    dash.attach(&backend);
    assert!(dash.is_attached());

    let report = dash.reload(&backend, backend.now()).unwrap();
    assert_eq!(report.metrics.total_tasks, 1);
    assert!(!dash.needs_reload());

    backend
        .insert_task(&assigned_task("another", "member", &backend))
        .unwrap();
    assert!(dash.needs_reload());

    let report = dash.reload(&backend, backend.now()).unwrap();
    assert_eq!(report.metrics.total_tasks, 2);

    dash.detach();
    assert!(!dash.is_attached());
    assert_eq!(backend.feed().listener_count(), 0);
}
