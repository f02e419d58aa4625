// src/export/model.rs

use crate::core::dashboard::WorkloadBucket;
use crate::core::report::DashboardReport;
use serde::Serialize;

/// Flat CSV row: one workload day, with the report totals repeated so the
/// file stands on its own in a spreadsheet.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct WorkloadRow {
    pub date: String,
    pub created_count: usize,
    pub completed_count: usize,
    pub view: String,
    pub total_tasks: usize,
    pub completion_rate: u32,
    pub overdue_tasks: usize,
}

impl WorkloadRow {
    fn from_bucket(bucket: &WorkloadBucket, report: &DashboardReport) -> Self {
        Self {
            date: bucket.date.format("%Y-%m-%d").to_string(),
            created_count: bucket.created_count,
            completed_count: bucket.completed_count,
            view: report.view.as_str().to_string(),
            total_tasks: report.metrics.total_tasks,
            completion_rate: report.metrics.completion_rate,
            overdue_tasks: report.metrics.overdue_tasks,
        }
    }
}

pub(crate) fn report_to_rows(report: &DashboardReport) -> Vec<WorkloadRow> {
    report
        .workload
        .iter()
        .map(|b| WorkloadRow::from_bucket(b, report))
        .collect()
}
