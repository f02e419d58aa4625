//! Dashboard aggregation over a task snapshot.
//!
//! Everything here is a pure function of `(tasks, now, window_days)`: calling
//! it twice on the same snapshot gives identical output.

use std::collections::BTreeMap;

use chrono::{DateTime, Days, Duration, Local, NaiveDate};
use serde::Serialize;

use crate::models::task::Task;
use crate::models::task_status::TaskStatus;

/// Upper bound of buckets drawn in a workload chart.
pub const CHART_BUCKET_CAP: usize = 14;
pub const WEEK_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Metrics {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub in_progress_tasks: usize,
    pub overdue_tasks: usize,
    /// Percentage 0..=100, rounded.
    pub completion_rate: u32,
    pub due_today_tasks: usize,
    pub completed_this_week: usize,
}

/// Created/completed counts for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkloadBucket {
    pub date: NaiveDate,
    pub created_count: usize,
    pub completed_count: usize,
}

/// Buckets sorted by date, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Workload {
    buckets: Vec<WorkloadBucket>,
}

impl Workload {
    pub fn buckets(&self) -> &[WorkloadBucket] {
        &self.buckets
    }

    /// The last `cap` buckets (all of them when fewer).
    pub fn most_recent(&self, cap: usize) -> &[WorkloadBucket] {
        let start = self.buckets.len().saturating_sub(cap);
        &self.buckets[start..]
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub metrics: Metrics,
    pub workload: Workload,
}

/// `round(completed / total * 100)`, 0 for an empty set.
pub fn completion_rate(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((completed as f64 / total as f64) * 100.0).round() as u32
}

fn completed_within_week(task: &Task, now: DateTime<Local>) -> bool {
    if !task.is_done() {
        return false;
    }
    match task.updated_at {
        Some(at) => at <= now && at >= now - Duration::days(WEEK_DAYS),
        None => false,
    }
}

pub fn compute_metrics(tasks: &[Task], now: DateTime<Local>) -> Metrics {
    let today = now.date_naive();

    let total_tasks = tasks.len();
    let completed_tasks = tasks.iter().filter(|t| t.is_done()).count();
    let in_progress_tasks = tasks
        .iter()
        .filter(|t| t.status == Some(TaskStatus::InProgress))
        .count();
    let overdue_tasks = tasks.iter().filter(|t| t.is_overdue(today)).count();
    let due_today_tasks = tasks
        .iter()
        .filter(|t| t.is_open() && t.due_date == Some(today))
        .count();
    let completed_this_week = tasks
        .iter()
        .filter(|t| completed_within_week(t, now))
        .count();

    Metrics {
        total_tasks,
        completed_tasks,
        in_progress_tasks,
        overdue_tasks,
        completion_rate: completion_rate(completed_tasks, total_tasks),
        due_today_tasks,
        completed_this_week,
    }
}

/// One bucket per calendar day seen in the snapshot, limited to the
/// `window_days` days ending at `today` (inclusive).
pub fn build_workload(tasks: &[Task], today: NaiveDate, window_days: u32) -> Workload {
    if window_days == 0 {
        return Workload::default();
    }
    // a window reaching past the calendar's start covers everything up to today
    let first_day = today
        .checked_sub_days(Days::new(u64::from(window_days) - 1))
        .unwrap_or(NaiveDate::MIN);
    let in_window = |d: NaiveDate| d >= first_day && d <= today;

    let mut days: BTreeMap<NaiveDate, (usize, usize)> = BTreeMap::new();

    for task in tasks {
        if let Some(created) = task.created_at.map(|t| t.date_naive())
            && in_window(created)
        {
            days.entry(created).or_default().0 += 1;
        }

        if task.is_done()
            && let Some(completed) = task.updated_at.map(|t| t.date_naive())
            && in_window(completed)
        {
            days.entry(completed).or_default().1 += 1;
        }
    }

    Workload {
        buckets: days
            .into_iter()
            .map(|(date, (created_count, completed_count))| WorkloadBucket {
                date,
                created_count,
                completed_count,
            })
            .collect(),
    }
}

pub fn aggregate(tasks: &[Task], now: DateTime<Local>, window_days: u32) -> Dashboard {
    Dashboard {
        metrics: compute_metrics(tasks, now),
        workload: build_workload(tasks, now.date_naive(), window_days),
    }
}
