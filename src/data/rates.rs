//! Expected-rate lookup and enrichment.
//!
//! The external rate source exposes one batched operation: unique keys in,
//! key->value mapping out. The enrichment contract:
//!
//! - **at most one external call per run**, carrying only de-duplicated keys
//! - deterministic merge by recomputing each row's key
//! - lookup failure degrades to a no-op (rows keep unset expected values);
//!   this is the single point of partial failure in the pipeline

use std::collections::{BTreeMap, BTreeSet};

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::domain::{RateKey, TestRow};
use crate::error::AppError;

/// Batched rate lookup capability.
///
/// Implementations must treat the call as one round-trip; `enrich_rows` never
/// invokes it more than once per run.
pub trait RateSource {
    fn lookup_many(&self, keys: &BTreeSet<RateKey>) -> Result<BTreeMap<RateKey, String>, AppError>;
}

/// What enrichment did, for diagnostics.
#[derive(Debug, Clone, Default)]
pub struct EnrichOutcome {
    /// Unique keys carried by the batched call.
    pub unique_keys: usize,
    /// Rows whose expected value was set.
    pub matched_rows: usize,
    /// Present when the lookup failed and enrichment degraded to a no-op.
    pub note: Option<String>,
}

/// Enrich rows with expected values from the rate source.
///
/// Builds the key set, performs the single batched lookup, and merges results
/// back by key. Idempotent: re-running with the same source assigns the same
/// expected values.
pub fn enrich_rows(rows: &mut [TestRow], source: &dyn RateSource) -> EnrichOutcome {
    let keys: BTreeSet<RateKey> = rows.iter().map(RateKey::for_row).collect();
    if keys.is_empty() {
        return EnrichOutcome::default();
    }

    let results = match source.lookup_many(&keys) {
        Ok(results) => results,
        Err(e) => {
            return EnrichOutcome {
                unique_keys: keys.len(),
                matched_rows: 0,
                note: Some(format!("Rate lookup failed, expected values left unset: {e}")),
            };
        }
    };

    let mut matched_rows = 0;
    for row in rows.iter_mut() {
        if let Some(value) = results.get(&RateKey::for_row(row)) {
            row.expected_value = Some(value.clone());
            matched_rows += 1;
        }
    }

    EnrichOutcome {
        unique_keys: keys.len(),
        matched_rows,
        note: None,
    }
}

/// HTTP rate service client.
///
/// Posts the de-duplicated key list to a rate endpoint and reads back the
/// resolved entries. Credentials and endpoint come from the environment.
pub struct HttpRateClient {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct RateRequest<'a> {
    queries: Vec<&'a RateKey>,
}

#[derive(Debug, Deserialize)]
struct RateResponse {
    rates: Vec<RateEntry>,
}

/// One resolved entry from the rate service. Key fields echo the query so the
/// merge can recompute the composite key exactly.
#[derive(Debug, Deserialize)]
struct RateEntry {
    product_code: String,
    #[serde(default)]
    region: String,
    #[serde(default)]
    postal_code: String,
    #[serde(default)]
    date: String,
    rate: String,
}

impl HttpRateClient {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let base_url = std::env::var("RATE_API_URL")
            .map_err(|_| AppError::external("Missing RATE_API_URL in environment (.env)."))?;
        let api_key = std::env::var("RATE_API_KEY")
            .map_err(|_| AppError::external("Missing RATE_API_KEY in environment (.env)."))?;
        Ok(Self {
            client: Client::new(),
            base_url,
            api_key,
        })
    }
}

impl RateSource for HttpRateClient {
    fn lookup_many(&self, keys: &BTreeSet<RateKey>) -> Result<BTreeMap<RateKey, String>, AppError> {
        let request = RateRequest {
            queries: keys.iter().collect(),
        };

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| AppError::external(format!("Rate service request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::external(format!(
                "Rate service returned HTTP {}.",
                response.status()
            )));
        }

        let body: RateResponse = response
            .json()
            .map_err(|e| AppError::external(format!("Invalid rate service response: {e}")))?;

        let mut out = BTreeMap::new();
        for entry in body.rates {
            let key = RateKey {
                product_code: entry.product_code.to_uppercase(),
                region: entry.region.to_uppercase(),
                postal_code: entry.postal_code,
                date: entry.date,
            };
            out.insert(key, entry.rate);
        }
        Ok(out)
    }
}

/// In-memory rate source for offline runs and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticRateSource {
    rates: BTreeMap<RateKey, String>,
}

impl StaticRateSource {
    pub fn new(rates: BTreeMap<RateKey, String>) -> Self {
        Self { rates }
    }
}

impl RateSource for StaticRateSource {
    fn lookup_many(&self, keys: &BTreeSet<RateKey>) -> Result<BTreeMap<RateKey, String>, AppError> {
        Ok(keys
            .iter()
            .filter_map(|k| self.rates.get(k).map(|v| (k.clone(), v.clone())))
            .collect())
    }
}
