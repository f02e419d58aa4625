use crate::backend::Backend;
use crate::cli::commands::open_backend;
use crate::cli::parser::{Cli, Commands, TaskAction};
use crate::config::Config;
use crate::core::tasks::{NewTask, TaskLogic};
use crate::errors::{AppError, AppResult};
use crate::models::task::{Task, TaskFilter};
use crate::ui::messages::{info, success};
use crate::utils::formatting::{or_dash, truncate};
use crate::utils::table::{Column, Table};

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let Commands::Task { action } = &cli.command else {
        return Ok(());
    };
    let backend = open_backend(cli, cfg)?;

    match action {
        TaskAction::Add {
            title,
            status,
            priority,
            due,
            assignee,
            project,
        } => {
            // Default assignee: whoever is signed in
            let assignee = match assignee {
                Some(a) => Some(a.clone()),
                None => backend.get_session()?.map(|s| s.user_id),
            };

            let id = TaskLogic::add(
                &backend,
                &NewTask {
                    title: title.clone(),
                    status: status.clone(),
                    priority: priority.clone(),
                    due: due.clone(),
                    assignee,
                    project: project.clone(),
                },
            )?;
            success(format!("Task #{} added: {}", id, title.trim()));
        }

        TaskAction::List {
            mine,
            status,
            project,
        } => {
            let mut filter = if *mine {
                let session = backend.get_session()?.ok_or(AppError::NotSignedIn)?;
                TaskFilter::assigned_to(&session.user_id)
            } else {
                TaskFilter::all()
            };
            filter.status = status
                .as_deref()
                .map(TaskLogic::parse_status)
                .transpose()?;
            filter.project_id = project.clone();

            let tasks = backend.query_tasks(&filter)?;
            if tasks.is_empty() {
                info("No tasks found.");
            } else {
                print!("{}", render_tasks(&tasks));
            }
        }

        TaskAction::Status { id, status } => {
            let status = TaskLogic::set_status(&backend, *id, status)?;
            success(format!("Task #{} → {}", id, status));
        }

        TaskAction::Del { id } => {
            let task = TaskLogic::delete(&backend, *id)?;
            success(format!("Task #{} deleted: {}", id, task.title));
        }
    }

    Ok(())
}

fn render_tasks(tasks: &[Task]) -> String {
    let mut table = Table::new(vec![
        Column::new("ID", 4),
        Column::new("STATUS", 11),
        Column::new("PRIORITY", 8),
        Column::new("DUE", 10),
        Column::new("ASSIGNEE", 10),
        Column::new("PROJECT", 10),
        Column::new("TITLE", 40),
    ]);

    for t in tasks {
        table.add_row(vec![
            t.id.to_string(),
            or_dash(t.status.map(|s| s.to_string())),
            or_dash(t.priority.map(|p| p.to_string())),
            or_dash(t.due_date.map(|d| d.format("%Y-%m-%d").to_string())),
            or_dash(t.assignee_id.clone()),
            or_dash(t.project_id.clone()),
            truncate(&t.title, 40),
        ]);
    }
    table.render()
}
