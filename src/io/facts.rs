//! Extraction facts ingest and boundary validation.
//!
//! The upstream extraction step produces loosely-typed key-value data. It is
//! deserialized, normalized, and sanity-checked exactly once here; everything
//! downstream sees only the typed `ExtractionFacts` value.

use std::fs::File;
use std::path::Path;

use crate::domain::ExtractionFacts;
use crate::error::AppError;

/// Read, normalize, and validate a facts JSON file.
///
/// Returns the facts plus non-fatal clarification warnings for diagnostics.
pub fn load_facts(path: &Path) -> Result<(ExtractionFacts, Vec<String>), AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::input(format!("Failed to open facts JSON '{}': {e}", path.display()))
    })?;
    let mut facts: ExtractionFacts = serde_json::from_reader(file)
        .map_err(|e| AppError::input(format!("Invalid facts JSON '{}': {e}", path.display())))?;

    normalize_facts(&mut facts);
    let warnings = validate_facts(&facts);
    Ok((facts, warnings))
}

/// Apply the boundary normalization rules in place.
///
/// - identifiers and postal codes are trimmed (blanks kept; the product
///   resolver skips them and order must be preserved)
/// - states are trimmed and upper-cased
/// - confidence is clamped to [0, 1]
pub fn normalize_facts(facts: &mut ExtractionFacts) {
    for id in &mut facts.identifiers {
        *id = id.trim().to_string();
    }
    for state in &mut facts.states {
        *state = state.trim().to_uppercase();
    }
    facts.states.retain(|s| !s.is_empty());
    for postal in &mut facts.postal_codes {
        *postal = postal.trim().to_string();
    }
    facts.postal_codes.retain(|p| !p.is_empty());
    facts.confidence = facts.confidence.clamp(0.0, 1.0);
}

/// Non-fatal clarification warnings about incomplete facts.
///
/// These mirror the questions a reviewer would ask before trusting the run;
/// the pipeline proceeds regardless, using the documented fallbacks.
pub fn validate_facts(facts: &ExtractionFacts) -> Vec<String> {
    let mut warnings = Vec::new();

    if facts.identifiers.iter().all(|id| id.is_empty()) && facts.product_classes.is_empty() {
        warnings.push("No product codes or classes found; the default product will be used.".to_string());
    }
    if facts.states.is_empty() && facts.postal_codes.is_empty() {
        warnings.push(
            "No jurisdictions found (states or postal codes); rows will be unscoped.".to_string(),
        );
    }
    let has_effective = facts
        .date_specs
        .iter()
        .any(|d| d.kind == "effective" && !d.date.is_empty());
    if !has_effective {
        warnings.push("No effective date provided; the fallback date will be used.".to_string());
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DateSpec;
    use std::io::Write;

    #[test]
    fn load_facts_accepts_upstream_field_names() {
        let mut path = std::env::temp_dir();
        path.push(format!("txm_facts_{}.json", std::process::id()));
        let mut f = File::create(&path).unwrap();
        f.write_all(
            br#"{
                "item_codes": [" bwater ", "Granola Bars"],
                "states": ["ca", " ny "],
                "date_specs": [{"type": "effective", "date": "2025-06-01"}],
                "flex_fields": {"flex_field_1": "A"},
                "confidence": 1.7
            }"#,
        )
        .unwrap();

        let (facts, warnings) = load_facts(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(facts.identifiers, vec!["bwater", "Granola Bars"]);
        assert_eq!(facts.states, vec!["CA", "NY"]);
        assert_eq!(facts.confidence, 1.0);
        assert_eq!(facts.flex(1), "A");
        assert!(warnings.is_empty());
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = load_facts(Path::new("/nonexistent/facts.json")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn validate_flags_missing_sections() {
        let facts = ExtractionFacts::default();
        let warnings = validate_facts(&facts);
        assert_eq!(warnings.len(), 3);

        let mut facts = ExtractionFacts::default();
        facts.identifiers = vec!["BWATER".to_string()];
        facts.postal_codes = vec!["94107".to_string()];
        facts.date_specs = vec![DateSpec {
            kind: "effective".to_string(),
            date: "2025-06-01".to_string(),
        }];
        assert!(validate_facts(&facts).is_empty());
    }

    #[test]
    fn effective_spec_without_date_still_warns() {
        let mut facts = ExtractionFacts::default();
        facts.date_specs = vec![DateSpec {
            kind: "effective".to_string(),
            date: String::new(),
        }];
        let warnings = validate_facts(&facts);
        assert!(warnings.iter().any(|w| w.contains("effective date")));
    }
}
