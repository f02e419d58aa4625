use crate::backend::sqlite::SqliteBackend;
use crate::db::log::ttlog_quiet;
use crate::errors::{AppError, AppResult};
use crate::models::priority::Priority;
use crate::models::task::Task;
use crate::models::task_status::TaskStatus;
use crate::utils::date::parse_date;

/// Raw task fields as typed on the command line.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub status: String,
    pub priority: String,
    pub due: Option<String>,
    pub assignee: Option<String>,
    pub project: Option<String>,
}

/// High-level business logic for the `task` commands.
pub struct TaskLogic;

impl TaskLogic {
    pub fn parse_status(s: &str) -> AppResult<TaskStatus> {
        TaskStatus::parse(s).ok_or_else(|| {
            AppError::InvalidStatus(format!(
                "'{}' (use backlog, todo, in-progress, review or done)",
                s
            ))
        })
    }

    pub fn parse_priority(s: &str) -> AppResult<Priority> {
        Priority::from_code(s)
            .ok_or_else(|| AppError::InvalidPriority(format!("'{}' (use low, medium or high)", s)))
    }

    /// Validate and store a new task. Returns its id.
    pub fn add(backend: &SqliteBackend, input: &NewTask) -> AppResult<i64> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(AppError::Other("task title cannot be empty".into()));
        }

        let mut task = Task::new(title, backend.now());
        task.status = Some(Self::parse_status(&input.status)?);
        task.priority = Some(Self::parse_priority(&input.priority)?);
        task.due_date = match &input.due {
            Some(d) => Some(parse_date(d).ok_or_else(|| AppError::InvalidDate(d.clone()))?),
            None => None,
        };
        task.assignee_id = input.assignee.clone().filter(|a| !a.trim().is_empty());
        task.project_id = input.project.clone().filter(|p| !p.trim().is_empty());

        let id = backend.insert_task(&task)?;
        ttlog_quiet(
            backend.conn(),
            "add",
            &format!("task #{}", id),
            &format!("'{}' ({})", title, task.status.map(|s| s.to_db_str()).unwrap_or("-")),
        );
        Ok(id)
    }

    pub fn set_status(backend: &SqliteBackend, id: i64, status: &str) -> AppResult<TaskStatus> {
        let status = Self::parse_status(status)?;
        backend.update_task_status(id, status)?;
        ttlog_quiet(
            backend.conn(),
            "edit",
            &format!("task #{}", id),
            &format!("status → {}", status),
        );
        Ok(status)
    }

    pub fn delete(backend: &SqliteBackend, id: i64) -> AppResult<Task> {
        let task = backend.load_task(id)?;
        backend.delete_task(id)?;
        ttlog_quiet(
            backend.conn(),
            "del",
            &format!("task #{}", id),
            &format!("'{}' deleted", task.title),
        );
        Ok(task)
    }
}
