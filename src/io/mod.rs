//! Input/output helpers.
//!
//! - template catalog CSV ingest (`template`)
//! - geography reference CSV ingest (`geo`)
//! - extraction facts JSON ingest + validation (`facts`)
//! - test row CSV export in the template's schema (`export`)

pub mod export;
pub mod facts;
pub mod geo;
pub mod template;

pub use export::*;
pub use facts::*;
pub use geo::*;
pub use template::*;

use std::collections::HashMap;

use csv::StringRecord;

/// Map normalized header names to column indexes.
pub(crate) fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

pub(crate) fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header (e.g. "﻿zip"). If we don't strip it, schema validation will
    // incorrectly report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

/// First column index whose normalized header matches one of `names`, in
/// `names` priority order.
pub(crate) fn pick_column(header_map: &HashMap<String, usize>, names: &[&str]) -> Option<usize> {
    names.iter().find_map(|name| header_map.get(*name).copied())
}

pub(crate) fn get_field<'a>(record: &'a StringRecord, idx: usize) -> Option<&'a str> {
    record.get(idx).map(str::trim).filter(|s| !s.is_empty())
}
