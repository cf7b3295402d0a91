//! Product identifier resolution.
//!
//! Maps raw extracted identifiers (codes or free-text names) onto catalog
//! codes using an explicit priority list. Fallbacks are ordinary outcomes
//! here, so each identifier resolves to a tagged `MatchOutcome` rather than
//! punching through an error path.

use crate::domain::TemplateCatalog;

/// How a single identifier resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Upper-cased identifier is a known catalog code.
    ExactCode(String),
    /// Lower-cased identifier is a known product name/alias; an alias may
    /// denote several codes.
    Alias(Vec<String>),
    /// Identifier is a substring of an alias, or vice versa; union of all
    /// matching aliases' codes, de-duplicated, in lexicographic alias order.
    Substring(Vec<String>),
    /// Nothing matched; the configured default code stands in.
    Fallback(String),
}

/// Resolution output: de-duplicated codes plus per-identifier audit notes.
#[derive(Debug, Clone, Default)]
pub struct ResolvedProducts {
    /// Order-preserving, globally de-duplicated catalog codes.
    pub codes: Vec<String>,
    /// One note per non-blank identifier.
    pub notes: Vec<String>,
}

/// Resolve raw identifiers against the catalog.
///
/// Blank identifiers are skipped without producing codes or notes. Never
/// fails: unresolvable identifiers fall back to `default_code`.
pub fn resolve_products(
    identifiers: &[String],
    catalog: &TemplateCatalog,
    default_code: &str,
) -> ResolvedProducts {
    let mut out = ResolvedProducts::default();
    let mut seen = std::collections::HashSet::new();

    for raw in identifiers {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }

        let outcome = match_identifier(raw, catalog, default_code);
        out.notes.push(note_for(raw, &outcome, default_code));

        let codes = match outcome {
            MatchOutcome::ExactCode(code) | MatchOutcome::Fallback(code) => vec![code],
            MatchOutcome::Alias(codes) | MatchOutcome::Substring(codes) => codes,
        };
        for code in codes {
            if seen.insert(code.clone()) {
                out.codes.push(code);
            }
        }
    }

    out
}

/// Apply the resolution priority list to one identifier. First rule wins.
pub fn match_identifier(raw: &str, catalog: &TemplateCatalog, default_code: &str) -> MatchOutcome {
    let upper = raw.to_uppercase();
    if catalog.contains_code(&upper) {
        return MatchOutcome::ExactCode(upper);
    }

    let lower = raw.to_lowercase();
    if let Some(codes) = catalog.aliases.get(&lower) {
        return MatchOutcome::Alias(codes.iter().cloned().collect());
    }

    // Substring pass over all aliases. The catalog keeps aliases sorted, so
    // the match order (and the resulting code order) is deterministic.
    let mut matches = Vec::new();
    for (alias, codes) in &catalog.aliases {
        if alias.contains(&lower) || lower.contains(alias.as_str()) {
            for code in codes {
                if !matches.contains(code) {
                    matches.push(code.clone());
                }
            }
        }
    }
    if !matches.is_empty() {
        return MatchOutcome::Substring(matches);
    }

    MatchOutcome::Fallback(default_code.to_uppercase())
}

fn note_for(raw: &str, outcome: &MatchOutcome, default_code: &str) -> String {
    match outcome {
        MatchOutcome::ExactCode(code) => format!("Exact code match: {code}"),
        MatchOutcome::Alias(codes) => {
            format!("Name match for {raw} -> {}", codes.join(", "))
        }
        MatchOutcome::Substring(codes) => {
            format!("Substring matches for {raw} -> {}", codes.join(", "))
        }
        MatchOutcome::Fallback(_) => {
            format!("No match for {raw}, using default {default_code}")
        }
    }
}
