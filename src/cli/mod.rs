//! Command-line parsing for the test-matrix generator.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the resolution/expansion code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "txm", version, about = "Transactional tax test-matrix generator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Expand extraction facts into test rows, enrich expected rates, and
    /// write the matrix CSV.
    Generate(GenerateArgs),
    /// Same pipeline without the external rate lookup (expected values left
    /// blank). Useful for offline runs and dry runs.
    Expand(GenerateArgs),
    /// Load and summarize the template catalog and geography table.
    Inspect(InspectArgs),
}

/// Common options for `generate` and `expand`.
#[derive(Debug, Parser, Clone)]
pub struct GenerateArgs {
    /// Extraction facts JSON produced by the upstream extraction step.
    #[arg(long, value_name = "JSON")]
    pub facts: PathBuf,

    /// Template catalog CSV (falls back to $BCI_TEMPLATE_PATH).
    #[arg(long, value_name = "CSV")]
    pub template: Option<PathBuf>,

    /// Geography reference CSV (falls back to $GEO_TABLE_PATH).
    #[arg(long, value_name = "CSV")]
    pub geo: Option<PathBuf>,

    /// Output CSV path (defaults to <output-dir>/txm_<facts-stem>.csv).
    #[arg(long, value_name = "CSV")]
    pub out: Option<PathBuf>,

    /// Directory for generated files (falls back to $TXM_OUTPUT_DIR, then ./output).
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Product code substituted when an identifier cannot be resolved
    /// (falls back to $DEFAULT_PRODUCT).
    #[arg(long)]
    pub default_product: Option<String>,

    /// Extended price stamped on every generated row (falls back to $DEFAULT_EXT_PRICE).
    #[arg(long)]
    pub extended_price: Option<f64>,

    /// Maximum number of rows a single run may emit (falls back to $MAX_COMBINATIONS).
    #[arg(long)]
    pub max_combinations: Option<usize>,

    /// Country assumed for state-only jurisdictions with no geography match.
    #[arg(long, default_value = "US")]
    pub country: String,

    /// Write a JSON audit bundle into the output directory.
    #[arg(long)]
    pub audit: bool,
}

/// Options for `inspect`.
#[derive(Debug, Parser)]
pub struct InspectArgs {
    /// Template catalog CSV (falls back to $BCI_TEMPLATE_PATH).
    #[arg(long, value_name = "CSV")]
    pub template: Option<PathBuf>,

    /// Geography reference CSV (falls back to $GEO_TABLE_PATH).
    #[arg(long, value_name = "CSV")]
    pub geo: Option<PathBuf>,
}
