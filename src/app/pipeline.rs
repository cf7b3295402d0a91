//! Shared generation pipeline used by the `generate` and `expand` commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! facts ingest -> product + jurisdiction resolution -> cross-product
//! expansion (capped) -> rate enrichment -> diagnostics
//!
//! The CLI front-end then focuses on presentation and file output.

use crate::data::{RateSource, enrich_rows};
use crate::domain::{GenConfig, RunDiagnostics, TemplateCatalog, TestRow};
use crate::error::AppError;
use crate::expand::expand_rows;
use crate::io::{load_facts, read_geography_table, read_template_catalog};
use crate::resolve::{resolve_destinations, resolve_products};

/// All computed outputs of a single generation run.
///
/// The pipeline either returns a complete row list or fails before producing
/// any rows; there is no partially-populated state to observe.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub rows: Vec<TestRow>,
    /// The catalog is part of the output contract: its column schema drives
    /// the row export.
    pub catalog: TemplateCatalog,
    pub diagnostics: RunDiagnostics,
}

/// Execute the generation pipeline.
///
/// `rates` is the externally supplied lookup capability; `None` skips
/// enrichment entirely (offline mode). A failing source degrades to rows
/// without expected values — only missing reference data aborts the run.
pub fn run_generation(
    config: &GenConfig,
    rates: Option<&dyn RateSource>,
) -> Result<RunOutput, AppError> {
    // 1) Load reference data. Both files are required for the run to proceed.
    let catalog = read_template_catalog(&config.template_path)?;
    let geo = read_geography_table(&config.geo_path)?;

    // 2) Ingest and validate the extraction facts.
    let (facts, warnings) = load_facts(&config.facts_path)?;

    // 3) Resolve products and destinations. These are independent of each
    //    other; both degrade to documented fallbacks rather than failing.
    //    Product class labels stand in when no identifiers were extracted.
    let identifiers = if facts.identifiers.is_empty() {
        &facts.product_classes
    } else {
        &facts.identifiers
    };
    let products = resolve_products(identifiers, &catalog, &config.default_product);
    let destinations = resolve_destinations(
        &facts.states,
        &facts.postal_codes,
        &geo,
        &config.default_country,
    );

    // 4) Expand the cross-product, applying the combination cap.
    let expansion = expand_rows(&facts, &products, &destinations, &catalog, config);
    let mut rows = expansion.rows;
    if rows.is_empty() {
        return Err(AppError::new(3, "Expansion produced no rows (no products resolved)."));
    }

    // 5) Enrich expected values with the single batched rate lookup.
    let (unique_rate_keys, rate_note) = match rates {
        Some(source) => {
            let outcome = enrich_rows(&mut rows, source);
            (outcome.unique_keys, outcome.note)
        }
        None => (0, Some("Rate lookup skipped.".to_string())),
    };

    let missing_expected = rows.iter().filter(|r| r.expected_value.is_none()).count();
    let diagnostics = RunDiagnostics {
        rows_before_cap: expansion.rows_before_cap,
        rows_after_cap: rows.len(),
        rows_dropped: expansion.rows_dropped,
        missing_expected,
        unique_rate_keys,
        mapping_notes: products.notes,
        warnings,
        rate_note,
    };

    Ok(RunOutput {
        rows,
        catalog,
        diagnostics,
    })
}
