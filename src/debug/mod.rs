//! Audit bundle writer for inspecting what a run produced and why.

use std::fs::{File, create_dir_all};
use std::path::PathBuf;

use chrono::Local;
use serde::Serialize;

use crate::app::pipeline::RunOutput;
use crate::domain::{GenConfig, RunDiagnostics};
use crate::error::AppError;

#[derive(Debug, Serialize)]
struct AuditBundle<'a> {
    run_id: &'a str,
    generated_at: String,
    facts_path: String,
    template_path: String,
    rows_count: usize,
    diagnostics: &'a RunDiagnostics,
}

/// Write the audit JSON for a run into the output directory.
pub fn write_audit_bundle(
    run: &RunOutput,
    config: &GenConfig,
    run_id: &str,
) -> Result<PathBuf, AppError> {
    create_dir_all(&config.output_dir)
        .map_err(|e| AppError::input(format!("Failed to create output dir: {e}")))?;

    let path = config.output_dir.join(format!("audit_{run_id}.json"));
    let file = File::create(&path)
        .map_err(|e| AppError::input(format!("Failed to create audit file '{}': {e}", path.display())))?;

    let bundle = AuditBundle {
        run_id,
        generated_at: Local::now().to_rfc3339(),
        facts_path: config.facts_path.display().to_string(),
        template_path: config.template_path.display().to_string(),
        rows_count: run.rows.len(),
        diagnostics: &run.diagnostics,
    };

    serde_json::to_writer_pretty(file, &bundle)
        .map_err(|e| AppError::input(format!("Failed to write audit JSON: {e}")))?;

    Ok(path)
}
