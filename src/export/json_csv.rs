// src/export/json_csv.rs

use crate::core::report::DashboardReport;
use crate::errors::{AppError, AppResult};
use crate::export::model::WorkloadRow;
use crate::export::notify_export_success;
use crate::ui::messages::info;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Export JSON pretty-printed (the whole report).
pub(crate) fn export_json(report: &DashboardReport, path: &Path) -> AppResult<()> {
    info(format!("Exporting to JSON: {}", path.display()));

    let json_data = serde_json::to_string_pretty(report)
        .map_err(|e| AppError::Export(format!("JSON serialization error: {e}")))?;

    let mut file = File::create(path)?;
    file.write_all(json_data.as_bytes())?;

    notify_export_success("JSON", report.workload.len(), path);
    Ok(())
}

/// Export CSV (header incluso grazie a serde).
pub(crate) fn export_csv(rows: &[WorkloadRow], path: &Path) -> AppResult<()> {
    info(format!("Exporting to CSV: {}", path.display()));

    let mut wtr = csv::Writer::from_path(path)
        .map_err(|e| AppError::Export(format!("CSV open error: {e}")))?;

    if rows.is_empty() {
        // serde writes the header only with the first record
        wtr.write_record([
            "date",
            "created_count",
            "completed_count",
            "view",
            "total_tasks",
            "completion_rate",
            "overdue_tasks",
        ])
        .map_err(|e| AppError::Export(format!("CSV write error: {e}")))?;
    }

    for item in rows {
        wtr.serialize(item)
            .map_err(|e| AppError::Export(format!("CSV write error: {e}")))?;
    }

    wtr.flush()?;

    notify_export_success("CSV", rows.len(), path);
    Ok(())
}
