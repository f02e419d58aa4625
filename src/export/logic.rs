// src/export/logic.rs

use crate::core::report::DashboardReport;
use crate::errors::{AppError, AppResult};
use crate::export::ExportFormat;
use crate::export::fs_utils::ensure_writable;
use crate::export::json_csv::{export_csv, export_json};
use crate::export::model::report_to_rows;
use crate::ui::messages::warning;
use std::path::Path;

/// Logica di alto livello per l'export del report.
pub struct ExportLogic;

impl ExportLogic {
    /// Write `report` to `file`.
    ///
    /// - `format`: csv (one row per workload day) or json (full report)
    /// - `file`: absolute path of the output file
    /// - `force`: overwrite without asking
    pub fn export(
        report: &DashboardReport,
        format: ExportFormat,
        file: &str,
        force: bool,
    ) -> AppResult<()> {
        let path = Path::new(file);

        if !path.is_absolute() {
            return Err(AppError::Export(format!(
                "Output file path must be absolute: {file}"
            )));
        }

        if !format.matches_extension(path) {
            warning(format!(
                "'{}' does not end in .{}: writing {} anyway",
                path.display(),
                format.as_str(),
                format.as_str().to_uppercase()
            ));
        }

        ensure_writable(path, force)?;

        match format {
            ExportFormat::Json => export_json(report, path),
            ExportFormat::Csv => export_csv(&report_to_rows(report), path),
        }
    }
}
