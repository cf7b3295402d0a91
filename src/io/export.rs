//! Export test rows as CSV in the template's column schema.
//!
//! The template's header row defines the output schema; each `TestRow` field
//! is mapped onto columns by case-insensitive keyword matching, the same way
//! operators name columns in practice ("Product Code", "Dest Postal Code",
//! "Expected Tax Rate", ...). Columns with no recognized keyword stay blank
//! so the output always matches the template shape exactly.

use std::fs::File;
use std::path::Path;

use crate::domain::{TemplateCatalog, TestRow};
use crate::error::AppError;

/// Write rows to a CSV file using the catalog's column schema.
pub fn write_rows_csv(path: &Path, rows: &[TestRow], catalog: &TemplateCatalog) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::input(format!("Failed to create output CSV '{}': {e}", path.display()))
    })?;
    let mut writer = csv::Writer::from_writer(file);

    writer
        .write_record(&catalog.columns)
        .map_err(|e| AppError::input(format!("Failed to write output header: {e}")))?;

    for row in rows {
        let record = render_row(row, &catalog.columns);
        writer
            .write_record(&record)
            .map_err(|e| AppError::input(format!("Failed to write output row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::input(format!("Failed to flush output CSV: {e}")))?;
    Ok(())
}

/// Render one row against a column schema.
pub fn render_row(row: &TestRow, columns: &[String]) -> Vec<String> {
    columns
        .iter()
        .map(|col| field_for_column(col, row).unwrap_or_default())
        .collect()
}

/// Resolve a template column name to a row field by keyword.
///
/// Checks are ordered most-specific first ("product class" before "product",
/// "line item" before "document number") so broader keywords cannot shadow
/// narrower ones.
fn field_for_column(column: &str, row: &TestRow) -> Option<String> {
    let lc = column.to_lowercase();
    let physical = lc.contains("phys") || lc.contains("origin");

    if lc.contains("class") {
        return Some(row.product_class_code.clone());
    }
    if (lc.contains("item") && lc.contains("number")) || lc.contains("line") {
        return Some(row.line_item_number.to_string());
    }
    if lc.contains("item") || lc.contains("product") || lc.contains("sku") {
        return Some(row.product_code.clone());
    }
    if lc.contains("company") {
        return Some(row.company_code.clone());
    }
    if lc.contains("department") {
        return Some(row.department_code.clone());
    }
    if lc.contains("main division") || lc.contains("state") || lc.contains("region") {
        return Some(if physical {
            row.phys_main_division.clone()
        } else {
            row.dest_main_division.clone()
        });
    }
    if lc.contains("division") {
        return Some(row.division_code.clone());
    }
    if lc.contains("postal") || lc.contains("zip") {
        return Some(if physical {
            row.phys_postal_code.clone()
        } else {
            row.dest_postal_code.clone()
        });
    }
    if lc.contains("country") {
        return Some(if physical {
            row.phys_country.clone()
        } else {
            row.dest_country.clone()
        });
    }
    if lc.contains("expected") || lc.contains("tax") {
        return Some(row.expected_value.clone().unwrap_or_default());
    }
    if lc.contains("date") {
        return Some(row.document_date.clone());
    }
    if let Some(n) = flex_slot(&lc) {
        return Some(
            match n {
                1 => &row.flex1,
                2 => &row.flex2,
                3 => &row.flex3,
                4 => &row.flex4,
                _ => &row.flex5,
            }
            .clone(),
        );
    }
    if lc.contains("price") || lc.contains("amount") {
        return Some(row.extended_price.clone());
    }
    if lc.contains("number") {
        return Some(row.document_number.to_string());
    }
    if lc.contains("transaction") {
        return Some(row.transaction_type.clone());
    }
    if lc.contains("message") {
        return Some(row.message_type.clone());
    }

    None
}

/// Flex slot number (1..=5) for columns like "Flex Field 3" / "flex3".
fn flex_slot(lc_column: &str) -> Option<u8> {
    if !lc_column.contains("flex") {
        return None;
    }
    lc_column
        .chars()
        .rev()
        .find(|c| c.is_ascii_digit())
        .and_then(|c| c.to_digit(10))
        .filter(|n| (1..=5).contains(n))
        .map(|n| n as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RowMetadata, RowProvenance};

    fn sample_row() -> TestRow {
        TestRow {
            document_number: 7,
            transaction_type: "SALE".to_string(),
            message_type: "INVOICE".to_string(),
            company_code: "C1".to_string(),
            division_code: "D1".to_string(),
            department_code: "DEP1".to_string(),
            line_item_number: 1,
            extended_price: "9.99".to_string(),
            flex1: "F1".to_string(),
            flex2: "F2".to_string(),
            flex3: String::new(),
            flex4: String::new(),
            flex5: "F5".to_string(),
            document_date: "2025-06-01".to_string(),
            dest_country: "US".to_string(),
            dest_main_division: "CA".to_string(),
            dest_postal_code: "94107".to_string(),
            phys_country: "US".to_string(),
            phys_main_division: "CA".to_string(),
            phys_postal_code: "94107".to_string(),
            product_class_code: "PC9".to_string(),
            product_code: "BWATER".to_string(),
            expected_value: Some("0.0875".to_string()),
            source: RowProvenance::default(),
            metadata: RowMetadata { confidence: 1.0 },
        }
    }

    #[test]
    fn maps_recognized_columns() {
        let row = sample_row();
        let columns: Vec<String> = [
            "Document Number",
            "Transaction Type",
            "Product Code",
            "Product Class Code",
            "Division Code",
            "Dest Postal Code",
            "Physical Origin Postal Code",
            "Dest Main Division",
            "Dest Country",
            "Expected Tax Rate",
            "Document Date",
            "Flex Field 2",
            "Extended Price",
            "Line Item Number",
            "Operator Notes",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let record = render_row(&row, &columns);
        assert_eq!(
            record,
            vec![
                "7", "SALE", "BWATER", "PC9", "D1", "94107", "94107", "CA", "US", "0.0875",
                "2025-06-01", "F2", "9.99", "1", ""
            ]
        );
    }

    #[test]
    fn unset_expected_value_renders_blank() {
        let mut row = sample_row();
        row.expected_value = None;
        let record = render_row(&row, &["Expected Tax Rate".to_string()]);
        assert_eq!(record, vec![""]);
    }

    #[test]
    fn flex_slot_parses_trailing_digit() {
        assert_eq!(flex_slot("flex field 3"), Some(3));
        assert_eq!(flex_slot("flex1"), Some(1));
        assert_eq!(flex_slot("flex field 9"), None);
        assert_eq!(flex_slot("reflexive"), None);
    }
}
