//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during expansion and enrichment
//! - exported to CSV/JSON
//! - inspected later in audit bundles

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One dated spec attached to the extraction facts (e.g. an effective date).
///
/// The `kind` tag is free text supplied by the upstream extractor; the
/// expansion engine only gives special meaning to `"effective"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateSpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub date: String,
}

/// The validated input boundary for one run.
///
/// Upstream extraction produces loosely-typed key-value data; it is
/// deserialized and normalized exactly once (see `io::facts`) and every
/// downstream component operates only on this structure. Immutable for the
/// duration of a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionFacts {
    /// Raw product identifiers: catalog codes or free-text names.
    #[serde(alias = "item_codes", alias = "product_codes")]
    pub identifiers: Vec<String>,
    /// Extracted product class labels (first one is carried onto rows).
    pub product_classes: Vec<String>,
    /// Two-letter state/region codes.
    pub states: Vec<String>,
    /// Destination postal codes. When present these win over `states`.
    pub postal_codes: Vec<String>,
    /// Dated specs; the first `effective` spec with a date drives the run.
    pub date_specs: Vec<DateSpec>,
    /// Named flex fields (`flex_field_1` .. `flex_field_5`).
    pub flex_fields: BTreeMap<String, String>,
    /// Extraction confidence in [0, 1].
    pub confidence: f64,
    /// Fallback document date used when no effective date spec is present
    /// (typically the source ticket's creation date).
    #[serde(alias = "created_at")]
    pub fallback_date: String,
}

impl ExtractionFacts {
    /// Flex field by 1-based slot number, empty string when absent.
    pub fn flex(&self, n: usize) -> &str {
        let key = format!("flex_field_{n}");
        self.flex_fields.get(&key).map(String::as_str).unwrap_or("")
    }
}

/// Division/department/company codes attached to one catalog product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgCodes {
    pub division: String,
    pub department: String,
    pub company: String,
}

/// Reference catalog built from the template file.
///
/// Built once per run and read-only thereafter. All internal maps are ordered
/// (`BTreeMap`/`BTreeSet`) so that iteration — and therefore alias substring
/// matching and note text — is independent of the template's row order.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    /// Output column names, in template order. This is the row schema the
    /// exporter targets.
    pub columns: Vec<String>,
    /// Known product codes, upper-cased.
    pub codes: BTreeSet<String>,
    /// Lower-cased product name/alias -> codes it denotes. One alias may map
    /// to several codes.
    pub aliases: BTreeMap<String, BTreeSet<String>>,
    /// Product code -> organizational codes (empty strings when the template
    /// has no such columns).
    pub org: BTreeMap<String, OrgCodes>,
}

impl TemplateCatalog {
    pub fn contains_code(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    /// Org codes for a product, defaulting to empty strings for unknown codes.
    pub fn org_for(&self, code: &str) -> OrgCodes {
        self.org.get(code).cloned().unwrap_or_default()
    }
}

/// One geography reference row: the region and country a postal code sits in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoRow {
    pub region: String,
    pub country: String,
}

/// Postal code -> (region, country) reference table.
///
/// Built once per run from a static reference file and passed by reference;
/// there is no hidden process-wide cache. The sorted map makes every
/// "first match" over the table a declared, load-order-independent choice.
#[derive(Debug, Clone, Default)]
pub struct GeographyTable {
    rows: BTreeMap<String, GeoRow>,
}

impl GeographyTable {
    pub fn from_rows(rows: impl IntoIterator<Item = (String, GeoRow)>) -> Self {
        Self {
            rows: rows.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn lookup_postal(&self, postal: &str) -> Option<&GeoRow> {
        self.rows.get(postal)
    }

    /// Representative postal code for a region: the lexicographically smallest
    /// postal code mapped to it. Case-insensitive on the region.
    pub fn representative_postal(&self, region: &str) -> Option<(&str, &GeoRow)> {
        self.rows
            .iter()
            .find(|(_, row)| row.region.eq_ignore_ascii_case(region))
            .map(|(postal, row)| (postal.as_str(), row))
    }
}

/// One resolved geographic target for a test row.
///
/// Empty strings mean "not resolved"; an all-empty destination represents the
/// unscoped "all jurisdictions" placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Destination {
    pub country: String,
    pub region: String,
    pub postal_code: String,
}

/// Run-level provenance attached to every row.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RowProvenance {
    /// Human-readable product resolution notes, in resolution order.
    pub mapping_notes: Vec<String>,
}

/// Run-level annotations attached to every row.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RowMetadata {
    /// Extraction confidence carried through unchanged.
    pub confidence: f64,
}

/// One fully populated record of the output matrix: a single
/// (product, destination) combination.
///
/// Rows are owned by the run that created them and are immutable once
/// enrichment completes.
#[derive(Debug, Clone, Serialize)]
pub struct TestRow {
    /// 1-based, assigned sequentially in expansion order.
    pub document_number: u32,
    pub transaction_type: String,
    pub message_type: String,
    pub company_code: String,
    pub division_code: String,
    pub department_code: String,
    pub line_item_number: u32,
    pub extended_price: String,
    pub flex1: String,
    pub flex2: String,
    pub flex3: String,
    pub flex4: String,
    pub flex5: String,
    pub document_date: String,
    pub dest_country: String,
    pub dest_main_division: String,
    pub dest_postal_code: String,
    pub phys_country: String,
    pub phys_main_division: String,
    pub phys_postal_code: String,
    pub product_class_code: String,
    pub product_code: String,
    /// Filled by rate enrichment when the external source knows the key.
    pub expected_value: Option<String>,
    pub source: RowProvenance,
    pub metadata: RowMetadata,
}

/// Composite join key between a `TestRow` and the external rate source.
///
/// Built identically when querying and when merging results back, including
/// the normalization rules (upper-casing, empty-string defaults). `Ord` so
/// key sets iterate deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RateKey {
    pub product_code: String,
    pub region: String,
    pub postal_code: String,
    pub date: String,
}

impl RateKey {
    pub fn for_row(row: &TestRow) -> Self {
        Self {
            product_code: row.product_code.to_uppercase(),
            region: row.dest_main_division.to_uppercase(),
            postal_code: row.dest_postal_code.clone(),
            date: row.document_date.clone(),
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags plus environment fallbacks (see
/// `app::gen_config_from_args`).
#[derive(Debug, Clone)]
pub struct GenConfig {
    pub facts_path: PathBuf,
    pub template_path: PathBuf,
    pub geo_path: PathBuf,
    /// Explicit output CSV path; derived from `output_dir` + facts stem when
    /// absent.
    pub out_path: Option<PathBuf>,
    pub output_dir: PathBuf,

    /// Product code substituted when an identifier cannot be resolved.
    pub default_product: String,
    /// Extended price stamped on every generated row.
    pub default_extended_price: f64,
    /// Combination cap: maximum rows a single run may emit.
    pub max_combinations: usize,
    /// Country assumed for state-only jurisdictions with no geography match.
    pub default_country: String,

    /// Write a JSON audit bundle alongside the output CSV.
    pub write_audit: bool,
}

/// Diagnostic counters exposed for the surrounding audit/logging tooling.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunDiagnostics {
    pub rows_before_cap: usize,
    pub rows_after_cap: usize,
    pub rows_dropped: usize,
    /// Rows whose expected value stayed unset after enrichment.
    pub missing_expected: usize,
    /// Unique rate keys carried by the single batched lookup (0 when skipped).
    pub unique_rate_keys: usize,
    /// Per-identifier product resolution notes.
    pub mapping_notes: Vec<String>,
    /// Non-fatal clarification warnings from facts validation.
    pub warnings: Vec<String>,
    /// Why enrichment was skipped or degraded, when it was.
    pub rate_note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn representative_postal_is_smallest_for_region() {
        // Insertion order intentionally scrambled; the table must not care.
        let geo = GeographyTable::from_rows(vec![
            (
                "94109".to_string(),
                GeoRow { region: "CA".to_string(), country: "US".to_string() },
            ),
            (
                "94107".to_string(),
                GeoRow { region: "CA".to_string(), country: "US".to_string() },
            ),
            (
                "10001".to_string(),
                GeoRow { region: "NY".to_string(), country: "US".to_string() },
            ),
        ]);

        let (postal, row) = geo.representative_postal("ca").unwrap();
        assert_eq!(postal, "94107");
        assert_eq!(row.country, "US");
        assert!(geo.representative_postal("TX").is_none());
    }

    #[test]
    fn rate_key_normalizes_product_and_region() {
        let row = sample_row();
        let key = RateKey::for_row(&row);
        assert_eq!(key.product_code, "BWATER");
        assert_eq!(key.region, "CA");
        assert_eq!(key.postal_code, "94107");
        assert_eq!(key.date, "2025-06-01");
    }

    #[test]
    fn flex_lookup_defaults_to_empty() {
        let mut facts = ExtractionFacts::default();
        facts
            .flex_fields
            .insert("flex_field_2".to_string(), "PO-17".to_string());
        assert_eq!(facts.flex(2), "PO-17");
        assert_eq!(facts.flex(1), "");
    }

    fn sample_row() -> TestRow {
        TestRow {
            document_number: 1,
            transaction_type: "SALE".to_string(),
            message_type: "INVOICE".to_string(),
            company_code: String::new(),
            division_code: String::new(),
            department_code: String::new(),
            line_item_number: 1,
            extended_price: "9.99".to_string(),
            flex1: String::new(),
            flex2: String::new(),
            flex3: String::new(),
            flex4: String::new(),
            flex5: String::new(),
            document_date: "2025-06-01".to_string(),
            dest_country: "US".to_string(),
            dest_main_division: "ca".to_string(),
            dest_postal_code: "94107".to_string(),
            phys_country: "US".to_string(),
            phys_main_division: "ca".to_string(),
            phys_postal_code: "94107".to_string(),
            product_class_code: String::new(),
            product_code: "bwater".to_string(),
            expected_value: None,
            source: RowProvenance::default(),
            metadata: RowMetadata { confidence: 0.9 },
        }
    }
}
