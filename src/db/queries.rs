use crate::backend::{ProfileFields, Session};
use crate::errors::{AppError, AppResult};
use crate::models::priority::Priority;
use crate::models::task::{Task, TaskFilter};
use crate::models::task_status::TaskStatus;
use crate::utils::date::{from_db_timestamp, parse_date, to_db_date, to_db_timestamp};
use chrono::{DateTime, Local};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Result, Row, params, params_from_iter};

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// Map a `tasks` row. Never fails on bad content: unknown status/priority
/// and unparseable dates become `None`.
pub fn map_task_row(row: &Row) -> Result<Task> {
    // non-text cells read as missing
    let text = |col: &str| -> Result<Option<String>> {
        Ok(row.get_ref(col)?.as_str().ok().map(str::to_string))
    };
    let status = text("status")?;
    let priority = text("priority")?;
    let due = text("due_date")?;
    let created = text("created_at")?;
    let updated = text("updated_at")?;

    Ok(Task {
        id: row.get("id")?,
        title: text("title")?.unwrap_or_default(),
        status: status.as_deref().and_then(TaskStatus::from_db_str),
        priority: priority.as_deref().and_then(Priority::from_db_str),
        due_date: due.as_deref().and_then(parse_date),
        created_at: from_db_timestamp(created.as_deref()),
        updated_at: from_db_timestamp(updated.as_deref()),
        assignee_id: text("assignee_id")?,
        project_id: text("project_id")?,
    })
}

pub fn load_tasks(conn: &Connection, filter: &TaskFilter) -> AppResult<Vec<Task>> {
    let mut sql = String::from(
        "SELECT id, title, status, priority, due_date, created_at, updated_at, assignee_id, project_id
         FROM tasks WHERE 1=1",
    );
    let mut args: Vec<Value> = Vec::new();

    if let Some(a) = &filter.assignee_id {
        args.push(Value::Text(a.clone()));
        sql.push_str(&format!(" AND assignee_id = ?{}", args.len()));
    }
    if let Some(p) = &filter.project_id {
        args.push(Value::Text(p.clone()));
        sql.push_str(&format!(" AND project_id = ?{}", args.len()));
    }
    if let Some(s) = &filter.status {
        args.push(Value::Text(s.to_db_str().to_string()));
        sql.push_str(&format!(" AND status = ?{}", args.len()));
    }
    sql.push_str(" ORDER BY id ASC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(args), map_task_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn load_task(conn: &Connection, id: i64) -> AppResult<Task> {
    conn.query_row(
        "SELECT id, title, status, priority, due_date, created_at, updated_at, assignee_id, project_id
         FROM tasks WHERE id = ?1",
        [id],
        map_task_row,
    )
    .optional()?
    .ok_or(AppError::TaskNotFound(id))
}

/// Insert a task and return its new id.
pub fn insert_task(conn: &Connection, task: &Task) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO tasks (title, status, priority, due_date, created_at, updated_at, assignee_id, project_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            task.title,
            task.status.map(|s| s.to_db_str()),
            task.priority.map(|p| p.to_db_str()),
            task.due_date.as_ref().map(to_db_date),
            task.created_at.as_ref().map(to_db_timestamp),
            task.updated_at.as_ref().map(to_db_timestamp),
            task.assignee_id,
            task.project_id,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_task_status(
    conn: &Connection,
    id: i64,
    status: TaskStatus,
    now: &DateTime<Local>,
) -> AppResult<()> {
    let n = conn.execute(
        "UPDATE tasks SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.to_db_str(), to_db_timestamp(now), id],
    )?;
    if n == 0 {
        return Err(AppError::TaskNotFound(id));
    }
    Ok(())
}

pub fn delete_task(conn: &Connection, id: i64) -> AppResult<()> {
    let n = conn.execute("DELETE FROM tasks WHERE id = ?1", [id])?;
    if n == 0 {
        return Err(AppError::TaskNotFound(id));
    }
    Ok(())
}

/// Cheap summary of a table's content, compared between polls.
pub fn table_fingerprint(conn: &Connection, table: &str) -> Result<String> {
    let sql = match table {
        "tasks" => {
            "SELECT COUNT(*) || ':' || IFNULL(MAX(id),0) || ':' || IFNULL(MAX(updated_at),'') \
             || ':' || IFNULL(SUM(LENGTH(IFNULL(status,''))),0) FROM tasks"
        }
        "users" => {
            "SELECT COUNT(*) || ':' || IFNULL(MAX(last_seen_at),'') || ':' \
             || IFNULL(GROUP_CONCAT(IFNULL(role,''), ','),'') FROM users"
        }
        "sessions" => {
            "SELECT COUNT(*) || ':' || IFNULL(MAX(created_at),'') || ':' \
             || IFNULL(MAX(revoked_at),'') FROM sessions"
        }
        _ => return Ok(String::new()),
    };
    conn.query_row(sql, [], |row| row.get(0))
}

pub fn data_version(conn: &Connection) -> Result<i64> {
    conn.query_row("PRAGMA data_version;", [], |row| row.get(0))
}

// ---------------------------------------------------------------------------
// Users & sessions
// ---------------------------------------------------------------------------

pub fn upsert_user(
    conn: &Connection,
    user_id: &str,
    fields: &ProfileFields,
    now: &DateTime<Local>,
) -> AppResult<()> {
    conn.execute(
        "INSERT INTO users (id, username, display_name, role, last_seen_at, created_at)
         VALUES (?1, ?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(id) DO UPDATE SET
            display_name = COALESCE(excluded.display_name, users.display_name),
            role         = COALESCE(excluded.role, users.role),
            last_seen_at = COALESCE(excluded.last_seen_at, users.last_seen_at)",
        params![
            user_id,
            fields.display_name,
            fields.role,
            fields.last_seen_at.as_ref().map(to_db_timestamp),
            to_db_timestamp(now),
        ],
    )?;
    Ok(())
}

pub fn load_user_role(conn: &Connection, user_id: &str) -> AppResult<Option<String>> {
    let role: Option<Option<String>> = conn
        .query_row("SELECT role FROM users WHERE id = ?1", [user_id], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(role.flatten())
}

pub fn insert_session(conn: &Connection, session: &Session) -> AppResult<()> {
    conn.execute(
        "INSERT INTO sessions (token, user_id, created_at, expires_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            session.token,
            session.user_id,
            to_db_timestamp(&session.created_at),
            to_db_timestamp(&session.expires_at),
        ],
    )?;
    Ok(())
}

/// Most recent session that is neither revoked nor expired at `now`.
pub fn load_active_session(conn: &Connection, now: &DateTime<Local>) -> AppResult<Option<Session>> {
    let row = conn
        .query_row(
            "SELECT token, user_id, created_at, expires_at FROM sessions
             WHERE revoked_at IS NULL AND expires_at > ?1
             ORDER BY created_at DESC, rowid DESC
             LIMIT 1",
            [to_db_timestamp(now)],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        )
        .optional()?;

    let Some((token, user_id, created, expires)) = row else {
        return Ok(None);
    };

    // A session whose timestamps cannot be read is treated as absent
    match (
        from_db_timestamp(Some(created.as_str())),
        from_db_timestamp(Some(expires.as_str())),
    ) {
        (Some(created_at), Some(expires_at)) => Ok(Some(Session {
            token,
            user_id,
            created_at,
            expires_at,
        })),
        _ => Ok(None),
    }
}

/// Revoke every open session. Returns how many were revoked.
pub fn revoke_sessions(conn: &Connection, now: &DateTime<Local>) -> AppResult<usize> {
    let n = conn.execute(
        "UPDATE sessions SET revoked_at = ?1 WHERE revoked_at IS NULL",
        [to_db_timestamp(now)],
    )?;
    Ok(n)
}

/// Delete sessions that were revoked or have expired before `now`.
pub fn purge_dead_sessions(conn: &Connection, now: &DateTime<Local>) -> AppResult<usize> {
    let n = conn.execute(
        "DELETE FROM sessions WHERE revoked_at IS NOT NULL OR expires_at <= ?1",
        [to_db_timestamp(now)],
    )?;
    Ok(n)
}

// ---------------------------------------------------------------------------
// Failed sign-in log
// ---------------------------------------------------------------------------

pub fn insert_auth_failure(
    conn: &Connection,
    username: &str,
    now: &DateTime<Local>,
) -> AppResult<()> {
    conn.execute(
        "INSERT INTO auth_failures (username, attempted_at) VALUES (?1, ?2)",
        params![username, to_db_timestamp(now)],
    )?;
    Ok(())
}

pub fn count_auth_failures(
    conn: &Connection,
    username: &str,
    since: &DateTime<Local>,
) -> AppResult<u32> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM auth_failures WHERE username = ?1 AND attempted_at >= ?2",
        params![username, to_db_timestamp(since)],
        |row| row.get(0),
    )?;
    Ok(n.max(0) as u32)
}

pub fn clear_auth_failures(conn: &Connection, username: &str) -> AppResult<usize> {
    let n = conn.execute("DELETE FROM auth_failures WHERE username = ?1", [username])?;
    Ok(n)
}

/// Drop failed sign-ins older than `before`: they no longer count toward a lockout.
pub fn purge_auth_failures(conn: &Connection, before: &DateTime<Local>) -> AppResult<usize> {
    let n = conn.execute(
        "DELETE FROM auth_failures WHERE attempted_at < ?1",
        [to_db_timestamp(before)],
    )?;
    Ok(n)
}
