use std::time::Duration;

use crate::auth::role::View;
use crate::cli::commands::{open_backend, require_session};
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::report::DashboardReport;
use crate::core::session::DashboardSession;
use crate::errors::{AppError, AppResult};
use crate::models::task_status::TaskStatus;
use crate::ui::messages::info;
use crate::utils::colors::{
    CYAN, RESET, color_for_overdue, color_for_rate, color_for_status, colorize_count,
};
use crate::utils::formatting::{bar, bold, percent};
use crate::utils::table::{Column, Table};

const BAR_WIDTH: usize = 20;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let Commands::Dashboard {
        window,
        json,
        watch,
        max_refreshes,
    } = &cli.command
    else {
        return Ok(());
    };

    let backend = open_backend(cli, cfg)?;
    let (session, view) = require_session(&backend)?;

    let mut dash = DashboardSession::new(
        view,
        &session.user_id,
        window.unwrap_or(cfg.dashboard_window_days),
        cfg.chart_bucket_cap,
    );
    dash.attach(&backend);

    let report = dash.reload(&backend, backend.now())?;
    print_report(report, *json)?;

    //
    // WATCH MODE: poll for commits from other processes, redraw on change
    //
    if let Some(secs) = watch {
        let interval = Duration::from_secs((*secs).max(1));
        let mut refreshes = 0usize;
        backend.poll_changes()?; // baseline

        info(format!("Watching for task changes every {}s (Ctrl+C to stop)", interval.as_secs()));
        while max_refreshes.is_none_or(|max| refreshes < max) {
            std::thread::sleep(interval);
            backend.poll_changes()?;

            if dash.needs_reload() {
                let report = dash.reload(&backend, backend.now())?;
                print_report(report, *json)?;
            }
            refreshes += 1;
        }
    }

    dash.detach();
    Ok(())
}

fn print_report(report: &DashboardReport, json: bool) -> AppResult<()> {
    if json {
        let out = serde_json::to_string_pretty(report)
            .map_err(|e| AppError::Other(format!("JSON serialization error: {e}")))?;
        println!("{}", out);
    } else {
        print!("{}", render_report(report));
    }
    Ok(())
}

/// Human-readable dashboard.
pub fn render_report(report: &DashboardReport) -> String {
    let m = &report.metrics;
    let mut out = String::new();

    out.push_str(&bold(&format!(
        "====================== {} · {}",
        report.view.title(),
        report.user_id
    )));
    out.push_str("\n\n");

    let line = |label: &str, value: String| format!("{}• {:<22}{} {}\n", CYAN, label, RESET, value);

    out.push_str(&line("Total tasks:", m.total_tasks.to_string()));
    out.push_str(&line("Completed:", colorize_count(m.completed_tasks)));
    out.push_str(&line("In progress:", colorize_count(m.in_progress_tasks)));
    out.push_str(&line(
        "Overdue:",
        format!("{}{}{}", color_for_overdue(m.overdue_tasks), m.overdue_tasks, RESET),
    ));
    out.push_str(&line("Due today:", colorize_count(m.due_today_tasks)));
    out.push_str(&line("Completed this week:", colorize_count(m.completed_this_week)));
    out.push_str(&line(
        "Completion rate:",
        format!(
            "{}{}{}",
            color_for_rate(m.completion_rate),
            percent(m.completion_rate),
            RESET
        ),
    ));

    // -----------------------------
    // Workload per day
    // -----------------------------
    out.push('\n');
    out.push_str(&bold(&format!("Workload (last {} days)", report.window_days)));
    out.push('\n');
    if report.workload.is_empty() {
        out.push_str("  no activity in this window\n");
    } else {
        let peak = report
            .workload
            .iter()
            .map(|b| b.created_count.max(b.completed_count))
            .max()
            .unwrap_or(0);
        for b in &report.workload {
            out.push_str(&format!(
                "  {}  created {:>3} {}  done {:>3} {}\n",
                b.date.format("%Y-%m-%d"),
                b.created_count,
                bar(b.created_count, peak, BAR_WIDTH),
                b.completed_count,
                bar(b.completed_count, peak, BAR_WIDTH),
            ));
        }
    }

    // -----------------------------
    // Executive extras
    // -----------------------------
    if report.view == View::Admin {
        if let Some(team) = &report.team {
            out.push('\n');
            out.push_str(&bold("Team workload"));
            out.push('\n');
            let mut table = Table::new(vec![
                Column::new("ASSIGNEE", 14),
                Column::new("OPEN", 5),
                Column::new("DONE", 5),
                Column::new("OVERDUE", 7),
            ]);
            for member in team {
                table.add_row(vec![
                    member
                        .assignee_id
                        .clone()
                        .unwrap_or_else(|| "(unassigned)".to_string()),
                    member.open.to_string(),
                    member.completed.to_string(),
                    member.overdue.to_string(),
                ]);
            }
            out.push_str(&table.render());
        }

        if let Some(by_status) = &report.by_status {
            let parts: Vec<String> = by_status
                .iter()
                .map(|(s, n)| {
                    let color = color_for_status(TaskStatus::from_db_str(s));
                    format!("{color}{s}{RESET}={n}")
                })
                .collect();
            out.push_str(&format!("\nBy status:   {}\n", parts.join("  ")));
        }
        if let Some(by_priority) = &report.by_priority {
            let parts: Vec<String> = by_priority
                .iter()
                .map(|(p, n)| format!("{p}={n}"))
                .collect();
            out.push_str(&format!("By priority: {}\n", parts.join("  ")));
        }
    }

    out
}
