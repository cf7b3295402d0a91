//! Fuzzy resolution of extracted facts against reference data.
//!
//! - product identifiers -> catalog codes (`product`)
//! - states/postal codes -> destinations (`jurisdiction`)
//!
//! Both resolvers are total: absence of a match degrades to a documented
//! fallback plus a note, never an error.

pub mod jurisdiction;
pub mod product;

pub use jurisdiction::*;
pub use product::*;
