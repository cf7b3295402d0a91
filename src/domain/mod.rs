//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the validated input boundary (`ExtractionFacts`, `DateSpec`)
//! - reference data (`TemplateCatalog`, `GeographyTable`)
//! - output records (`TestRow`, `Destination`, `RateKey`)
//! - run configuration and diagnostics (`GenConfig`, `RunDiagnostics`)

pub mod types;

pub use types::*;
