//! External data sources.
//!
//! - expected-rate lookup client + enrichment merge (`rates`)

pub mod rates;

pub use rates::*;
