//! Executive breakdowns: per-assignee load and status/priority distribution.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::priority::Priority;
use crate::models::task::Task;
use crate::models::task_status::TaskStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberLoad {
    /// `None` groups unassigned tasks.
    pub assignee_id: Option<String>,
    pub open: usize,
    pub completed: usize,
    pub overdue: usize,
}

/// Sorted by open count (desc), then assignee id; unassigned last on ties.
pub fn team_workload(tasks: &[Task], today: NaiveDate) -> Vec<MemberLoad> {
    let mut by_member: HashMap<Option<&str>, MemberLoad> = HashMap::new();

    for task in tasks {
        let key = task.assignee_id.as_deref();
        let entry = by_member.entry(key).or_insert_with(|| MemberLoad {
            assignee_id: key.map(str::to_string),
            open: 0,
            completed: 0,
            overdue: 0,
        });

        if task.is_done() {
            entry.completed += 1;
        } else if task.is_open() {
            entry.open += 1;
        }
        if task.is_overdue(today) {
            entry.overdue += 1;
        }
    }

    let mut out: Vec<MemberLoad> = by_member.into_values().collect();
    out.sort_by(|a, b| {
        b.open
            .cmp(&a.open)
            .then_with(|| a.assignee_id.is_none().cmp(&b.assignee_id.is_none()))
            .then_with(|| a.assignee_id.cmp(&b.assignee_id))
    });
    out
}

/// Count per known status; every status is present (possibly 0).
/// Tasks with no readable status are left out.
pub fn status_distribution(tasks: &[Task]) -> BTreeMap<TaskStatus, usize> {
    let mut out: BTreeMap<TaskStatus, usize> = TaskStatus::ALL.iter().map(|s| (*s, 0)).collect();
    for status in tasks.iter().filter_map(|t| t.status) {
        *out.entry(status).or_default() += 1;
    }
    out
}

pub fn priority_distribution(tasks: &[Task]) -> BTreeMap<Priority, usize> {
    let mut out: BTreeMap<Priority, usize> = Priority::ALL.iter().map(|p| (*p, 0)).collect();
    for priority in tasks.iter().filter_map(|t| t.priority) {
        *out.entry(priority).or_default() += 1;
    }
    out
}
