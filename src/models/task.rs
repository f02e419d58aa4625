use super::{priority::Priority, task_status::TaskStatus};
use chrono::{DateTime, Local, NaiveDate};
use serde::Serialize;

/// A task as read from the store.
///
/// Every field except `id` and `title` may be missing on malformed rows;
/// readers treat a missing value as its safe default.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub status: Option<TaskStatus>,        // ⇔ tasks.status (NULL or unknown → None)
    pub priority: Option<Priority>,        // ⇔ tasks.priority
    pub due_date: Option<NaiveDate>,       // ⇔ tasks.due_date (TEXT "YYYY-MM-DD")
    pub created_at: Option<DateTime<Local>>, // ⇔ tasks.created_at (TEXT, RFC3339 UTC)
    pub updated_at: Option<DateTime<Local>>, // ⇔ tasks.updated_at
    pub assignee_id: Option<String>,
    pub project_id: Option<String>,
}

impl Task {
    /// Build a task not yet stored (`id = 0`).
    pub fn new(title: &str, now: DateTime<Local>) -> Self {
        Self {
            id: 0,
            title: title.to_string(),
            status: Some(TaskStatus::Todo),
            priority: Some(Priority::Medium),
            due_date: None,
            created_at: Some(now),
            updated_at: Some(now),
            assignee_id: None,
            project_id: None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.status.map(|s| s.is_done()).unwrap_or(false)
    }

    /// Due strictly before `today` and not done. Unknown status is never overdue.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        match (self.status, self.due_date) {
            (Some(status), Some(due)) => !status.is_done() && due < today,
            _ => false,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.status, Some(s) if !s.is_done())
    }
}

/// Store-side selection applied by `Backend::query_tasks`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub assignee_id: Option<String>,
    pub project_id: Option<String>,
    pub status: Option<TaskStatus>,
}

impl TaskFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn assigned_to(user_id: &str) -> Self {
        Self {
            assignee_id: Some(user_id.to_string()),
            ..Self::default()
        }
    }
}
