//! Row expansion: the cross-product of resolved products and destinations.
//!
//! Each (product, destination) combination becomes one `TestRow`. Products
//! carry exactly one division/department/company triple from the catalog, so
//! the organizational codes are looked up per product, not cross-multiplied.
//! Expansion order is product-major, destination-minor, and `document_number`
//! counts up from 1 in that order — the combination cap keeps a deterministic
//! prefix of exactly this sequence.

use crate::domain::{
    Destination, ExtractionFacts, GenConfig, RowMetadata, RowProvenance, TemplateCatalog, TestRow,
};
use crate::resolve::ResolvedProducts;

/// Expansion output: capped rows plus the counts the cap policy must surface.
#[derive(Debug, Clone)]
pub struct Expansion {
    pub rows: Vec<TestRow>,
    pub rows_before_cap: usize,
    pub rows_dropped: usize,
}

/// The document date driving every row of the run.
///
/// First `effective` date spec with a non-empty date, else the facts'
/// fallback date, else empty.
pub fn choose_document_date(facts: &ExtractionFacts) -> String {
    facts
        .date_specs
        .iter()
        .find(|d| d.kind == "effective" && !d.date.is_empty())
        .map(|d| d.date.clone())
        .unwrap_or_else(|| facts.fallback_date.clone())
}

/// Expand the full cross-product into test rows, applying the combination cap.
pub fn expand_rows(
    facts: &ExtractionFacts,
    products: &ResolvedProducts,
    destinations: &[Destination],
    catalog: &TemplateCatalog,
    config: &GenConfig,
) -> Expansion {
    let document_date = choose_document_date(facts);
    let product_class = facts
        .product_classes
        .first()
        .map(String::as_str)
        .unwrap_or("")
        .to_string();
    let provenance = RowProvenance {
        mapping_notes: products.notes.clone(),
    };
    let metadata = RowMetadata {
        confidence: facts.confidence,
    };
    let extended_price = format!("{:.2}", config.default_extended_price);

    let rows_before_cap = products.codes.len() * destinations.len();
    let capacity = rows_before_cap.min(config.max_combinations);
    let mut rows = Vec::with_capacity(capacity);
    let mut document_number: u32 = 0;

    'outer: for product in &products.codes {
        let org = catalog.org_for(product);
        for dest in destinations {
            if rows.len() >= config.max_combinations {
                break 'outer;
            }
            document_number += 1;
            rows.push(TestRow {
                document_number,
                transaction_type: "SALE".to_string(),
                message_type: "INVOICE".to_string(),
                company_code: org.company.clone(),
                division_code: org.division.clone(),
                department_code: org.department.clone(),
                line_item_number: 1,
                extended_price: extended_price.clone(),
                flex1: facts.flex(1).to_string(),
                flex2: facts.flex(2).to_string(),
                flex3: facts.flex(3).to_string(),
                flex4: facts.flex(4).to_string(),
                flex5: facts.flex(5).to_string(),
                document_date: document_date.clone(),
                dest_country: dest.country.clone(),
                dest_main_division: dest.region.clone(),
                dest_postal_code: dest.postal_code.clone(),
                phys_country: dest.country.clone(),
                phys_main_division: dest.region.clone(),
                phys_postal_code: dest.postal_code.clone(),
                product_class_code: product_class.clone(),
                product_code: product.clone(),
                expected_value: None,
                source: provenance.clone(),
                metadata: metadata.clone(),
            });
        }
    }

    let rows_dropped = rows_before_cap - rows.len();
    Expansion {
        rows,
        rows_before_cap,
        rows_dropped,
    }
}
