//! Jurisdiction resolution.
//!
//! Turns extracted states/postal codes into concrete destinations. The two
//! sources are not guaranteed consistent, so precedence is fixed: postal
//! codes win outright, states are only consulted when no postal codes were
//! extracted. Unknown values degrade to empty fields, never errors.

use crate::domain::{Destination, GeographyTable};

/// Resolve destinations from the extracted jurisdiction facts.
///
/// Branches, evaluated in order:
/// 1. postal codes present -> one destination per postal code;
/// 2. states present -> one destination per state, with the representative
///    postal code chosen by the table's declared tie-break (smallest postal
///    lexicographically) and the country taken from the matched row;
/// 3. neither -> a single all-empty destination ("all jurisdictions").
pub fn resolve_destinations(
    states: &[String],
    postal_codes: &[String],
    geo: &GeographyTable,
    default_country: &str,
) -> Vec<Destination> {
    if !postal_codes.is_empty() {
        return postal_codes
            .iter()
            .map(|postal| match geo.lookup_postal(postal) {
                Some(row) => Destination {
                    country: row.country.clone(),
                    region: row.region.clone(),
                    postal_code: postal.clone(),
                },
                None => Destination {
                    country: String::new(),
                    region: String::new(),
                    postal_code: postal.clone(),
                },
            })
            .collect();
    }

    if !states.is_empty() {
        return states
            .iter()
            .map(|state| match geo.representative_postal(state) {
                Some((postal, row)) => Destination {
                    country: row.country.clone(),
                    region: state.clone(),
                    postal_code: postal.to_string(),
                },
                None => Destination {
                    country: default_country.to_string(),
                    region: state.clone(),
                    postal_code: String::new(),
                },
            })
            .collect();
    }

    vec![Destination::default()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GeoRow;

    fn geo() -> GeographyTable {
        GeographyTable::from_rows(vec![
            ("94109".to_string(), GeoRow { region: "CA".to_string(), country: "US".to_string() }),
            ("94107".to_string(), GeoRow { region: "CA".to_string(), country: "US".to_string() }),
            ("10001".to_string(), GeoRow { region: "NY".to_string(), country: "US".to_string() }),
        ])
    }

    #[test]
    fn postal_codes_win_over_states() {
        let destinations = resolve_destinations(
            &["NY".to_string()],
            &["94107".to_string()],
            &geo(),
            "US",
        );
        assert_eq!(
            destinations,
            vec![Destination {
                country: "US".to_string(),
                region: "CA".to_string(),
                postal_code: "94107".to_string(),
            }]
        );
    }

    #[test]
    fn unknown_postal_degrades_to_empty_region() {
        let destinations = resolve_destinations(&[], &["99999".to_string()], &geo(), "US");
        assert_eq!(
            destinations,
            vec![Destination {
                country: String::new(),
                region: String::new(),
                postal_code: "99999".to_string(),
            }]
        );
    }

    #[test]
    fn state_branch_uses_smallest_postal() {
        let destinations = resolve_destinations(&["CA".to_string()], &[], &geo(), "US");
        assert_eq!(destinations.len(), 1);
        assert_eq!(destinations[0].postal_code, "94107");
        assert_eq!(destinations[0].region, "CA");
        assert_eq!(destinations[0].country, "US");
    }

    #[test]
    fn unknown_state_keeps_region_with_default_country() {
        let destinations = resolve_destinations(&["TX".to_string()], &[], &geo(), "US");
        assert_eq!(
            destinations,
            vec![Destination {
                country: "US".to_string(),
                region: "TX".to_string(),
                postal_code: String::new(),
            }]
        );
    }

    #[test]
    fn no_jurisdictions_yields_single_placeholder() {
        let destinations = resolve_destinations(&[], &[], &geo(), "US");
        assert_eq!(destinations, vec![Destination::default()]);
    }

    #[test]
    fn one_destination_per_input_in_order() {
        let destinations = resolve_destinations(
            &[],
            &["10001".to_string(), "94107".to_string(), "10001".to_string()],
            &geo(),
            "US",
        );
        let postals: Vec<&str> = destinations.iter().map(|d| d.postal_code.as_str()).collect();
        assert_eq!(postals, vec!["10001", "94107", "10001"]);
    }
}
