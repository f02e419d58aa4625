mod common;

use common::{init_db, login_admin, login_member, setup_test_db, td, temp_out};
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use serde_json::Value;
use std::fs;

fn dashboard_json(db_path: &str) -> Value {
    let out = td()
        .args(["--db", db_path, "dashboard", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    serde_json::from_slice(&out).expect("dashboard prints valid JSON")
}

fn add_task(db_path: &str, args: &[&str]) {
    td()
        .args(["--db", db_path, "task", "add"])
        .args(args)
        .assert()
        .success();
}

// ---------------------------------------------------------------
// Sign-in
// ---------------------------------------------------------------

#[test]
fn test_whoami_without_session_routes_to_login() {
    let db_path = setup_test_db("cli_whoami_anon");
    init_db(&db_path);

    td().args(["--db", &db_path, "whoami"])
        .assert()
        .success()
        .stdout(contains("Not signed in").and(contains("login")));
}

#[test]
fn test_admin_login_lands_on_admin_dashboard() {
    let db_path = setup_test_db("cli_login_admin");
    init_db(&db_path);

    td().args([
        "--db", &db_path, "--test", "login", "-u", "admin", "-p", "Admin@123",
    ])
    .write_stdin("123456\n")
    .assert()
    .success()
    .stdout(contains("Signed in as admin").and(contains("admin dashboard")));

    td().args(["--db", &db_path, "whoami"])
        .assert()
        .success()
        .stdout(contains("admin dashboard"));
}

#[test]
fn test_member_login_lands_on_member_dashboard() {
    let db_path = setup_test_db("cli_login_member");
    init_db(&db_path);
    login_member(&db_path);

    td().args(["--db", &db_path, "whoami"])
        .assert()
        .success()
        .stdout(contains("member dashboard"));
}

#[test]
fn test_credentials_read_from_stdin() {
    let db_path = setup_test_db("cli_login_stdin");
    init_db(&db_path);

    td().args(["--db", &db_path, "--test", "login"])
        .write_stdin("member\nMember@123\n654321\n")
        .assert()
        .success()
        .stdout(contains("member dashboard"));
}

#[test]
fn test_resend_then_correct_code() {
    let db_path = setup_test_db("cli_login_resend");
    init_db(&db_path);

    td().args([
        "--db", &db_path, "--test", "login", "-u", "admin", "-p", "Admin@123",
    ])
    .write_stdin("resend\n123456\n")
    .assert()
    .success()
    .stdout(contains("A new code has been sent").and(contains("Signed in as admin")));
}

#[test]
fn test_three_bad_codes_lock_out_then_sign_in_again() {
    let db_path = setup_test_db("cli_login_code_lockout");
    init_db(&db_path);

    td().args([
        "--db", &db_path, "--test", "login", "-u", "admin", "-p", "Admin@123",
    ])
    .write_stdin("000000\n111111\n222222\nadmin\nAdmin@123\n123456\n")
    .assert()
    .success()
    .stdout(
        contains("2 attempt(s) remaining")
            .and(contains("locked out"))
            .and(contains("Back to sign-in"))
            .and(contains("Signed in as admin")),
    );
}

#[test]
fn test_code_lockout_without_retry_aborts() {
    let db_path = setup_test_db("cli_login_code_abort");
    init_db(&db_path);

    td().args([
        "--db", &db_path, "--test", "login", "-u", "member", "-p", "Member@123",
    ])
    .write_stdin("123456\n123456\n123456\n")
    .assert()
    .failure()
    .stderr(contains("sign-in aborted"));

    td().args(["--db", &db_path, "whoami"])
        .assert()
        .success()
        .stdout(contains("Not signed in"));
}

#[test]
fn test_five_bad_passwords_lock_the_account() {
    let db_path = setup_test_db("cli_login_password_lockout");
    init_db(&db_path);

    td().args([
        "--db", &db_path, "--test", "login", "-u", "admin", "-p", "wrong",
    ])
    .write_stdin("admin\nwrong\nadmin\nwrong\nadmin\nwrong\nadmin\nwrong\n")
    .assert()
    .failure()
    .stdout(contains("1 attempt(s) left"))
    .stderr(contains("account locked"));

    // failures are persisted: the right password is refused too
    td().args([
        "--db", &db_path, "--test", "login", "-u", "admin", "-p", "Admin@123",
    ])
    .write_stdin("123456\n")
    .assert()
    .failure()
    .stderr(contains("account locked"));
}

#[test]
fn test_logout_revokes_session() {
    let db_path = setup_test_db("cli_logout");
    init_db(&db_path);
    login_admin(&db_path);

    td().args(["--db", &db_path, "logout"])
        .assert()
        .success()
        .stdout(contains("Signed out admin"));

    td().args(["--db", &db_path, "dashboard"])
        .assert()
        .failure()
        .stderr(contains("Not signed in"));
}

// ---------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------

#[test]
fn test_task_lifecycle() {
    let db_path = setup_test_db("cli_task_lifecycle");
    init_db(&db_path);
    login_member(&db_path);

    td().args(["--db", &db_path, "task", "add", "Write release notes", "--priority", "high"])
        .assert()
        .success()
        .stdout(contains("Task #1 added"));

    td().args(["--db", &db_path, "task", "list", "--mine"])
        .assert()
        .success()
        .stdout(
            contains("Write release notes")
                .and(contains("high"))
                .and(contains("member")),
        );

    td().args(["--db", &db_path, "task", "status", "1", "in_progress"])
        .assert()
        .success()
        .stdout(contains("in-progress"));

    td().args(["--db", &db_path, "task", "status", "1", "finished"])
        .assert()
        .failure()
        .stderr(contains("Invalid task status"));

    td().args(["--db", &db_path, "task", "del", "1"])
        .assert()
        .success()
        .stdout(contains("deleted"));

    td().args(["--db", &db_path, "task", "del", "1"])
        .assert()
        .failure()
        .stderr(contains("Task 1 not found"));
}

#[test]
fn test_task_add_rejects_bad_input() {
    let db_path = setup_test_db("cli_task_bad_input");
    init_db(&db_path);

    td().args(["--db", &db_path, "task", "add", "   "])
        .assert()
        .failure();

    td().args(["--db", &db_path, "task", "add", "x", "--due", "31/12/2025"])
        .assert()
        .failure()
        .stderr(contains("Invalid date"));

    td().args(["--db", &db_path, "task", "add", "x", "--priority", "urgent"])
        .assert()
        .failure()
        .stderr(contains("Invalid priority"));
}

// ---------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------

#[test]
fn test_dashboard_requires_session() {
    let db_path = setup_test_db("cli_dashboard_anon");
    init_db(&db_path);

    td().args(["--db", &db_path, "dashboard"])
        .assert()
        .failure()
        .stderr(contains("Not signed in"));
}

#[test]
fn test_member_dashboard_only_counts_own_tasks() {
    let db_path = setup_test_db("cli_dashboard_member");
    init_db(&db_path);
    login_member(&db_path);

    add_task(&db_path, &["mine"]);
    add_task(&db_path, &["overdue", "--due", "2000-01-01"]);
    add_task(&db_path, &["someone else's", "--assignee", "admin"]);
    td().args(["--db", &db_path, "task", "status", "1", "done"])
        .assert()
        .success();

    let json = dashboard_json(&db_path);
    assert_eq!(json["view"], "member");
    assert_eq!(json["user_id"], "member");
    assert_eq!(json["metrics"]["total_tasks"], 2);
    assert_eq!(json["metrics"]["completed_tasks"], 1);
    assert_eq!(json["metrics"]["overdue_tasks"], 1);
    assert_eq!(json["metrics"]["completion_rate"], 50);
    assert!(json.get("team").is_none());

    let workload = json["workload"].as_array().expect("workload array");
    assert_eq!(workload.len(), 1);
    assert_eq!(workload[0]["created_count"], 2);
    assert_eq!(workload[0]["completed_count"], 1);
}

#[test]
fn test_admin_dashboard_shows_team_breakdown() {
    let db_path = setup_test_db("cli_dashboard_admin");
    init_db(&db_path);
    login_admin(&db_path);

    add_task(&db_path, &["a", "--assignee", "member"]);
    add_task(&db_path, &["b", "--assignee", "member", "--status", "review"]);
    add_task(&db_path, &["c"]);

    let json = dashboard_json(&db_path);
    assert_eq!(json["view"], "admin");
    assert_eq!(json["metrics"]["total_tasks"], 3);
    assert_eq!(json["team"][0]["assignee_id"], "member");
    assert_eq!(json["team"][0]["open"], 2);
    assert_eq!(json["by_status"]["review"], 1);
    assert_eq!(json["by_status"]["done"], 0);

    td().args(["--db", &db_path, "dashboard"])
        .assert()
        .success()
        .stdout(
            contains("Executive dashboard")
                .and(contains("Team workload"))
                .and(contains("By priority")),
        );
}

#[test]
fn test_dashboard_watch_stops_after_max_refreshes() {
    let db_path = setup_test_db("cli_dashboard_watch");
    init_db(&db_path);
    login_member(&db_path);

    td().args([
        "--db",
        &db_path,
        "dashboard",
        "--watch",
        "1",
        "--max-refreshes",
        "1",
    ])
    .assert()
    .success()
    .stdout(contains("My dashboard"));
}

// ---------------------------------------------------------------
// Export
// ---------------------------------------------------------------

#[test]
fn test_export_json_writes_full_report() {
    let db_path = setup_test_db("cli_export_json");
    init_db(&db_path);
    login_admin(&db_path);
    add_task(&db_path, &["ship it"]);

    let out = temp_out("cli_export_json", "json");
    td().args([
        "--db", &db_path, "export", "--format", "json", "--file", &out,
    ])
    .assert()
    .success();

    let content = fs::read_to_string(&out).expect("read exported json");
    let json: Value = serde_json::from_str(&content).expect("valid JSON");
    assert_eq!(json["metrics"]["total_tasks"], 1);
    assert!(json["team"].is_array());
}

#[test]
fn test_export_csv_has_header_and_rows() {
    let db_path = setup_test_db("cli_export_csv");
    init_db(&db_path);
    login_member(&db_path);
    add_task(&db_path, &["one"]);
    add_task(&db_path, &["two"]);

    let out = temp_out("cli_export_csv", "csv");
    td().args(["--db", &db_path, "export", "--file", &out])
        .assert()
        .success();

    let content = fs::read_to_string(&out).expect("read exported csv");
    let mut lines = content.lines();
    assert_eq!(
        lines.next(),
        Some("date,created_count,completed_count,view,total_tasks,completion_rate,overdue_tasks")
    );
    let row = lines.next().expect("one workload row");
    assert!(row.contains(",2,0,member,2,0,0"), "row was {row}");
    assert!(lines.next().is_none());
}

#[test]
fn test_export_rejects_relative_path() {
    let db_path = setup_test_db("cli_export_relative");
    init_db(&db_path);
    login_member(&db_path);

    td().args(["--db", &db_path, "export", "--file", "out.csv"])
        .assert()
        .failure()
        .stderr(contains("must be absolute"));
}

// ---------------------------------------------------------------
// Log and db maintenance
// ---------------------------------------------------------------

#[test]
fn test_log_print_shows_audit_trail() {
    let db_path = setup_test_db("cli_log_print");
    init_db(&db_path);
    login_admin(&db_path);
    add_task(&db_path, &["audited"]);

    td().args(["--db", &db_path, "log", "--print"])
        .assert()
        .success()
        .stdout(
            contains("migration_applied")
                .and(contains("login"))
                .and(contains("task #1")),
        );
}

#[test]
fn test_db_info_and_check() {
    let db_path = setup_test_db("cli_db_info");
    init_db(&db_path);
    login_member(&db_path);
    add_task(&db_path, &["counted"]);

    td().args(["--db", &db_path, "db", "--info", "--check"])
        .assert()
        .success()
        .stdout(
            contains("Users:")
                .and(contains("Tasks:"))
                .and(contains("1 open"))
                .and(contains("Integrity check passed")),
        );
}

#[test]
fn test_export_warns_on_mismatched_extension() {
    let db_path = setup_test_db("cli_export_ext");
    init_db(&db_path);
    login_member(&db_path);

    let out = temp_out("cli_export_ext", "csv");
    td().args([
        "--db", &db_path, "export", "--format", "json", "--file", &out,
    ])
    .assert()
    .success()
    .stdout(contains("does not end in .json"));

    let content = fs::read_to_string(&out).expect("read exported file");
    assert!(content.trim_start().starts_with('{'));
}

#[test]
fn test_db_vacuum_purges_revoked_sessions() {
    let db_path = setup_test_db("cli_db_vacuum");
    init_db(&db_path);
    login_admin(&db_path);
    td().args(["--db", &db_path, "logout"]).assert().success();

    td().args(["--db", &db_path, "db", "--vacuum"])
        .assert()
        .success()
        .stdout(contains("Removed 1 dead session(s)").and(contains("Vacuum completed")));
}
