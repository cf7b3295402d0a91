//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the resolution/expansion code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::app::pipeline::RunOutput;
use crate::domain::{GenConfig, GeographyTable, TemplateCatalog};

/// Format the full run summary (inputs, resolution notes, diagnostics).
pub fn format_run_summary(run: &RunOutput, config: &GenConfig) -> String {
    let mut out = String::new();

    out.push_str("=== txm - Tax Test Matrix Generator ===\n");
    out.push_str(&format!("Facts: {}\n", config.facts_path.display()));
    out.push_str(&format!("Template: {}\n", config.template_path.display()));
    out.push_str(&format!(
        "Catalog: {} codes | {} aliases | {} columns\n",
        run.catalog.codes.len(),
        run.catalog.aliases.len(),
        run.catalog.columns.len()
    ));
    out.push_str(&format!(
        "Rows: {} expanded | {} kept | {} dropped (cap {})\n",
        run.diagnostics.rows_before_cap,
        run.diagnostics.rows_after_cap,
        run.diagnostics.rows_dropped,
        config.max_combinations
    ));
    out.push_str(&format!(
        "Rates: {} unique keys | {} rows without expected value\n",
        run.diagnostics.unique_rate_keys, run.diagnostics.missing_expected
    ));
    if let Some(note) = &run.diagnostics.rate_note {
        out.push_str(&format!("  ({note})\n"));
    }

    if !run.diagnostics.warnings.is_empty() {
        out.push_str("\nWarnings:\n");
        for warning in &run.diagnostics.warnings {
            out.push_str(&format!("- {warning}\n"));
        }
    }

    if !run.diagnostics.mapping_notes.is_empty() {
        out.push_str("\nResolution notes:\n");
        for note in &run.diagnostics.mapping_notes {
            out.push_str(&format!("- {note}\n"));
        }
    }

    out
}

/// Format the reference data summary for `txm inspect`.
pub fn format_inspect_summary(catalog: &TemplateCatalog, geo: &GeographyTable) -> String {
    let mut out = String::new();

    out.push_str("=== txm - Reference Data ===\n");
    out.push_str(&format!(
        "Template: {} columns | {} product codes | {} aliases\n",
        catalog.columns.len(),
        catalog.codes.len(),
        catalog.aliases.len()
    ));
    out.push_str(&format!("Geography: {} postal codes\n", geo.len()));

    out.push_str("\nColumns:\n");
    for column in &catalog.columns {
        out.push_str(&format!("- {column}\n"));
    }

    out.push_str("\nProduct codes:\n");
    for code in &catalog.codes {
        let org = catalog.org_for(code);
        let mut line = format!("- {code}");
        if !org.division.is_empty() {
            line.push_str(&format!(" div={}", org.division));
        }
        if !org.department.is_empty() {
            line.push_str(&format!(" dept={}", org.department));
        }
        if !org.company.is_empty() {
            line.push_str(&format!(" co={}", org.company));
        }
        out.push_str(&line);
        out.push('\n');
    }

    out
}
