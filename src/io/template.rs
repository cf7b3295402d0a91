//! Template catalog ingest.
//!
//! The template file is the tabular reference the output rows must conform
//! to: its header row defines the output column schema, and its body lists
//! known product codes with optional name and organizational columns.
//!
//! Design goals:
//! - **Strict schema** for the product-code column (clear errors + exit code 2)
//! - **Tolerant body**: blank codes are skipped, optional columns degrade to
//!   empty strings
//! - **Deterministic behavior**: ordered maps, no dependence on row order

use std::fs::File;
use std::path::Path;

use crate::domain::{OrgCodes, TemplateCatalog};
use crate::error::AppError;
use crate::io::{build_header_map, get_field, pick_column};

/// Recognized header aliases, in priority order, per catalog field.
const CODE_COLUMNS: [&str; 4] = ["product code", "product_code", "product class code", "product class"];
const NAME_COLUMNS: [&str; 4] = ["product name", "description", "product description", "product_class_name"];
const DIVISION_COLUMNS: [&str; 2] = ["division code", "division"];
const DEPARTMENT_COLUMNS: [&str; 2] = ["department code", "department"];
const COMPANY_COLUMNS: [&str; 2] = ["company code", "company"];

/// Load the template catalog from a CSV file.
///
/// Missing file, unreadable headers, or an absent product-code column are
/// fatal: without a target schema the run cannot proceed.
pub fn read_template_catalog(path: &Path) -> Result<TemplateCatalog, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::input(format!("Failed to open template '{}': {e}", path.display()))
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read template headers: {e}")))?
        .clone();

    let columns: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
    let header_map = build_header_map(&headers);

    let code_idx = pick_column(&header_map, &CODE_COLUMNS).ok_or_else(|| {
        AppError::input(format!(
            "Template '{}' has no product code column (expected one of: {}).",
            path.display(),
            CODE_COLUMNS.join(", ")
        ))
    })?;
    let name_idx = pick_column(&header_map, &NAME_COLUMNS);
    let division_idx = pick_column(&header_map, &DIVISION_COLUMNS);
    let department_idx = pick_column(&header_map, &DEPARTMENT_COLUMNS);
    let company_idx = pick_column(&header_map, &COMPANY_COLUMNS);

    let mut catalog = TemplateCatalog {
        columns,
        ..TemplateCatalog::default()
    };

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header row, CSV lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| {
            AppError::input(format!("Template parse error at line {line}: {e}"))
        })?;

        let Some(code) = get_field(&record, code_idx) else {
            continue;
        };
        let code = code.to_uppercase();

        if let Some(name_idx) = name_idx {
            if let Some(name) = get_field(&record, name_idx) {
                catalog
                    .aliases
                    .entry(name.to_lowercase())
                    .or_default()
                    .insert(code.clone());
            }
        }

        let org = OrgCodes {
            division: field_or_empty(&record, division_idx),
            department: field_or_empty(&record, department_idx),
            company: field_or_empty(&record, company_idx),
        };
        catalog.org.insert(code.clone(), org);
        catalog.codes.insert(code);
    }

    Ok(catalog)
}

fn field_or_empty(record: &csv::StringRecord, idx: Option<usize>) -> String {
    idx.and_then(|i| get_field(record, i))
        .unwrap_or("")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_csv(content: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "txm_template_{}_{}.csv",
            std::process::id(),
            content.len()
        ));
        let mut f = File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_codes_aliases_and_org() {
        let path = write_temp_csv(
            "Product Code,Product Name,Division Code,Department Code,Company Code\n\
             bwater,Bottled Water,D1,DEP1,C1\n\
             SNAX,Snack Box,D2,,C1\n\
             ,ignored,,,\n\
             bwater,Still Water,D1,DEP1,C1\n",
        );
        let catalog = read_template_catalog(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(
            catalog.columns,
            vec!["Product Code", "Product Name", "Division Code", "Department Code", "Company Code"]
        );
        assert!(catalog.contains_code("BWATER"));
        assert!(catalog.contains_code("SNAX"));
        assert_eq!(catalog.codes.len(), 2);

        // Both names map to the same upper-cased code.
        assert!(catalog.aliases["bottled water"].contains("BWATER"));
        assert!(catalog.aliases["still water"].contains("BWATER"));

        let org = catalog.org_for("BWATER");
        assert_eq!(org.division, "D1");
        assert_eq!(org.department, "DEP1");
        assert_eq!(org.company, "C1");

        // Missing optional field degrades to empty.
        assert_eq!(catalog.org_for("SNAX").department, "");
        // Unknown code degrades to all-empty org codes.
        assert_eq!(catalog.org_for("NOPE"), OrgCodes::default());
    }

    #[test]
    fn missing_code_column_is_fatal() {
        let path = write_temp_csv("Name,Division\nBottled Water,D1\n");
        let err = read_template_catalog(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = read_template_catalog(Path::new("/nonexistent/template.csv")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
