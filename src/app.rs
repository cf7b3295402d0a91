//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and resolves configuration (flags > env > defaults)
//! - runs the generation pipeline
//! - prints the run summary
//! - writes the output CSV and optional audit bundle

use std::path::PathBuf;

use chrono::Local;
use clap::Parser;

use crate::cli::{Command, GenerateArgs, InspectArgs};
use crate::data::{HttpRateClient, RateSource};
use crate::domain::GenConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `txm` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Generate(args) => handle_generate(args, EnrichMode::Rates),
        Command::Expand(args) => handle_generate(args, EnrichMode::Skip),
        Command::Inspect(args) => handle_inspect(args),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnrichMode {
    /// Perform the single batched rate lookup.
    Rates,
    /// Leave expected values unset (offline mode).
    Skip,
}

fn handle_generate(args: GenerateArgs, mode: EnrichMode) -> Result<(), AppError> {
    let config = gen_config_from_args(&args)?;
    let run_id = format!("run_{}", Local::now().format("%Y%m%d_%H%M%S"));

    // The rate client is optional by design: a misconfigured or unreachable
    // source degrades to rows without expected values, it never aborts.
    let client = match mode {
        EnrichMode::Rates => match HttpRateClient::from_env() {
            Ok(client) => Some(client),
            Err(e) => {
                eprintln!("(rate source unavailable: {e})");
                None
            }
        },
        EnrichMode::Skip => None,
    };
    let rates = client.as_ref().map(|c| c as &dyn RateSource);

    let run = pipeline::run_generation(&config, rates)?;

    println!("{}", crate::report::format_run_summary(&run, &config));

    let out_path = output_path(&config, &run_id)?;
    crate::io::write_rows_csv(&out_path, &run.rows, &run.catalog)?;
    println!("Wrote {} rows to {}", run.rows.len(), out_path.display());

    if config.write_audit {
        let audit_path = crate::debug::write_audit_bundle(&run, &config, &run_id)?;
        println!("Wrote audit bundle to {}", audit_path.display());
    }

    Ok(())
}

fn handle_inspect(args: InspectArgs) -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let template_path = resolve_path(args.template, "BCI_TEMPLATE_PATH", "--template")?;
    let geo_path = resolve_path(args.geo, "GEO_TABLE_PATH", "--geo")?;

    let catalog = crate::io::read_template_catalog(&template_path)?;
    let geo = crate::io::read_geography_table(&geo_path)?;

    println!("{}", crate::report::format_inspect_summary(&catalog, &geo));
    Ok(())
}

/// Resolve run configuration: CLI flags win, then environment, then defaults.
pub fn gen_config_from_args(args: &GenerateArgs) -> Result<GenConfig, AppError> {
    dotenvy::dotenv().ok();

    let template_path = resolve_path(args.template.clone(), "BCI_TEMPLATE_PATH", "--template")?;
    let geo_path = resolve_path(args.geo.clone(), "GEO_TABLE_PATH", "--geo")?;

    let output_dir = args
        .output_dir
        .clone()
        .or_else(|| std::env::var("TXM_OUTPUT_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("./output"));

    let default_product = args
        .default_product
        .clone()
        .or_else(|| std::env::var("DEFAULT_PRODUCT").ok())
        .unwrap_or_else(|| "BWATER".to_string());

    let default_extended_price = match args.extended_price {
        Some(price) => price,
        None => parse_env("DEFAULT_EXT_PRICE", 9.99)?,
    };

    let max_combinations = match args.max_combinations {
        Some(max) => max,
        None => parse_env("MAX_COMBINATIONS", 2000)?,
    };

    Ok(GenConfig {
        facts_path: args.facts.clone(),
        template_path,
        geo_path,
        out_path: args.out.clone(),
        output_dir,
        default_product,
        default_extended_price,
        max_combinations,
        default_country: args.country.clone(),
        write_audit: args.audit,
    })
}

fn resolve_path(flag: Option<PathBuf>, env_var: &str, flag_name: &str) -> Result<PathBuf, AppError> {
    flag.or_else(|| std::env::var(env_var).ok().map(PathBuf::from))
        .ok_or_else(|| {
            AppError::input(format!("Missing {flag_name} (or {env_var} in environment)."))
        })
}

fn parse_env<T: std::str::FromStr>(env_var: &str, default: T) -> Result<T, AppError> {
    match std::env::var(env_var) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| AppError::input(format!("Invalid {env_var} value: '{raw}'."))),
        Err(_) => Ok(default),
    }
}

/// Output CSV path: explicit `--out` wins, else `<output_dir>/txm_<stem>.csv`.
fn output_path(config: &GenConfig, run_id: &str) -> Result<PathBuf, AppError> {
    if let Some(path) = &config.out_path {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::input(format!("Failed to create output dir: {e}")))?;
        }
        return Ok(path.clone());
    }

    std::fs::create_dir_all(&config.output_dir)
        .map_err(|e| AppError::input(format!("Failed to create output dir: {e}")))?;

    let stem = config
        .facts_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| run_id.to_string());
    Ok(config.output_dir.join(format!("txm_{stem}.csv")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_derives_from_facts_stem() {
        let config = GenConfig {
            facts_path: PathBuf::from("/tmp/facts_123.json"),
            template_path: PathBuf::from("t.csv"),
            geo_path: PathBuf::from("g.csv"),
            out_path: None,
            output_dir: std::env::temp_dir().join(format!("txm_out_{}", std::process::id())),
            default_product: "BWATER".to_string(),
            default_extended_price: 9.99,
            max_combinations: 2000,
            default_country: "US".to_string(),
            write_audit: false,
        };

        let path = output_path(&config, "run_x").unwrap();
        std::fs::remove_dir_all(&config.output_dir).ok();
        assert!(path.ends_with("txm_facts_123.csv"));
    }

    #[test]
    fn explicit_out_path_wins() {
        let out = std::env::temp_dir().join("explicit_rows.csv");
        let config = GenConfig {
            facts_path: PathBuf::from("facts.json"),
            template_path: PathBuf::from("t.csv"),
            geo_path: PathBuf::from("g.csv"),
            out_path: Some(out.clone()),
            output_dir: PathBuf::from("./output"),
            default_product: "BWATER".to_string(),
            default_extended_price: 9.99,
            max_combinations: 2000,
            default_country: "US".to_string(),
            write_audit: false,
        };

        assert_eq!(output_path(&config, "run_x").unwrap(), out);
    }
}
