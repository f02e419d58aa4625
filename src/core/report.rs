use std::collections::BTreeMap;

use chrono::{DateTime, Local};
use serde::Serialize;

use super::dashboard::{Dashboard, Metrics, WorkloadBucket, aggregate};
use super::team::{MemberLoad, priority_distribution, status_distribution, team_workload};
use crate::auth::role::View;
use crate::models::task::Task;

/// Everything one dashboard screen (or export) shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub view: View,
    pub user_id: String,
    pub generated_at: DateTime<Local>,
    pub window_days: u32,
    pub metrics: Metrics,
    pub workload: Vec<WorkloadBucket>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<Vec<MemberLoad>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_status: Option<BTreeMap<String, usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_priority: Option<BTreeMap<String, usize>>,
}

impl DashboardReport {
    /// Admin views get the team and distribution breakdowns on top of the
    /// metrics and the (capped) workload.
    pub fn build(
        view: View,
        user_id: &str,
        tasks: &[Task],
        now: DateTime<Local>,
        window_days: u32,
        bucket_cap: usize,
    ) -> Self {
        let dashboard = aggregate(tasks, now, window_days);
        Self::from_dashboard(view, user_id, &dashboard, tasks, now, window_days, bucket_cap)
    }

    pub fn from_dashboard(
        view: View,
        user_id: &str,
        dashboard: &Dashboard,
        tasks: &[Task],
        now: DateTime<Local>,
        window_days: u32,
        bucket_cap: usize,
    ) -> Self {
        let executive = view == View::Admin;

        Self {
            view,
            user_id: user_id.to_string(),
            generated_at: now,
            window_days,
            metrics: dashboard.metrics,
            workload: dashboard.workload.most_recent(bucket_cap).to_vec(),
            team: executive.then(|| team_workload(tasks, now.date_naive())),
            by_status: executive.then(|| {
                status_distribution(tasks)
                    .into_iter()
                    .map(|(s, n)| (s.to_db_str().to_string(), n))
                    .collect()
            }),
            by_priority: executive.then(|| {
                priority_distribution(tasks)
                    .into_iter()
                    .map(|(p, n)| (p.to_db_str().to_string(), n))
                    .collect()
            }),
        }
    }
}
