//! Quote Estimator
//!
//! Prices custom jewelry quotes from a JSON snapshot of the cost tables.
//! Requests are read as JSON from a file or stdin; results are printed as
//! JSON on stdout.

use clap::{Parser, Subcommand};
use core_config::Environment;
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_pricing::{EstimateRequest, GradeOption, PricingService};
use eyre::{Result, WrapErr};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tracing::info;

mod config;
mod estimator;
mod tables;

use config::Config;
use estimator::QuoteEstimator;
use tables::JsonFileTables;

#[derive(Parser)]
#[command(name = "quote-estimator")]
#[command(about = "Estimate custom jewelry prices from cost tables")]
struct Cli {
    /// Pricing tables JSON file. Defaults to PRICING_TABLES_PATH.
    #[arg(short, long, global = true)]
    tables: Option<PathBuf>,

    /// Print Prometheus metrics to stderr when done
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price the clarity/color named in the request
    Estimate {
        /// Request JSON file, or "-" for stdin
        #[arg(short, long, default_value = "-")]
        request: PathBuf,

        /// Include the full cost breakdown
        #[arg(short, long)]
        debug: bool,
    },

    /// Price several clarity/color options for the same piece
    Options {
        /// Request JSON file, or "-" for stdin
        #[arg(short, long, default_value = "-")]
        request: PathBuf,

        /// Option as CLARITY:COLOR, e.g. VS1:F. Repeat for more options.
        #[arg(short, long = "option", value_parser = parse_grade_option, required = true)]
        options: Vec<GradeOption>,

        /// Include the full cost breakdown for each option
        #[arg(short, long)]
        debug: bool,
    },

    /// Show the discount that applies to the request
    Discount {
        /// Request JSON file, or "-" for stdin
        #[arg(short, long, default_value = "-")]
        request: PathBuf,
    },
}

fn parse_grade_option(raw: &str) -> std::result::Result<GradeOption, String> {
    match raw.split_once(':') {
        Some((clarity, color)) if !clarity.trim().is_empty() && !color.trim().is_empty() => {
            Ok(GradeOption::new(clarity.trim(), color.trim()))
        }
        _ => Err(format!("expected CLARITY:COLOR, got '{raw}'")),
    }
}

async fn read_request(path: &Path) -> Result<EstimateRequest> {
    let raw = if path == Path::new("-") {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .wrap_err("Failed to read request from stdin")?;
        buf
    } else {
        tokio::fs::read_to_string(path)
            .await
            .wrap_err_with(|| format!("Failed to read request {}", path.display()))?
    };
    serde_json::from_str(&raw).wrap_err("Request is not valid JSON")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    let environment = Environment::from_env();
    init_tracing(&environment);

    let cli = Cli::parse();

    let metrics_enabled = cli.metrics || config.metrics_enabled;
    if metrics_enabled {
        observability::init_metrics();
    }

    let tables_path = cli.tables.unwrap_or(config.tables_path);
    info!(path = %tables_path.display(), "Using pricing tables");

    let repository = JsonFileTables::new(tables_path);
    let estimator = QuoteEstimator::new(PricingService::with_cache_config(
        repository,
        config.table_cache,
    ));

    match cli.command {
        Commands::Estimate { request, debug } => {
            let mut request = read_request(&request).await?;
            if debug {
                request.debug = Some(serde_json::Value::Bool(true));
            }
            print_json(&estimator.estimate(request).await?)?;
        }

        Commands::Options {
            request,
            options,
            debug,
        } => {
            let request = read_request(&request).await?;
            print_json(&estimator.options(request, &options, debug).await?)?;
        }

        Commands::Discount { request } => {
            let request = read_request(&request).await?;
            print_json(&estimator.discount(&request).await?)?;
        }
    }

    if metrics_enabled {
        eprintln!("{}", observability::render_metrics());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_grade_option() {
        let vs1 = parse_grade_option("VS1:F").unwrap();
        let padded = parse_grade_option(" si2 : h ").unwrap();
        assert_eq!(vs1, GradeOption::new("VS1", "F"));
        assert_eq!(padded, GradeOption::new("si2", "h"));
        assert!(parse_grade_option("VS1").is_err());
        assert!(parse_grade_option(":F").is_err());
    }

    #[test]
    fn test_options_command_collects_repeated_options() {
        let cli = Cli::try_parse_from([
            "quote-estimator",
            "--tables",
            "tables.json",
            "options",
            "--request",
            "ring.json",
            "-o",
            "VS1:F",
            "--option",
            "VVS2:E",
        ])
        .unwrap();

        assert_eq!(cli.tables, Some(PathBuf::from("tables.json")));
        match cli.command {
            Commands::Options { options, debug, .. } => {
                assert_eq!(options.len(), 2);
                assert_eq!(options[1], GradeOption::new("VVS2", "E"));
                assert!(!debug);
            }
            _ => panic!("expected options command"),
        }
    }

    #[tokio::test]
    async fn test_read_request_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ring.json");
        let body = r#"{ "metalWeight": 3, "clarity": "VS1", "color": "F" }"#;
        std::fs::write(&path, body).unwrap();

        let request = read_request(&path).await.unwrap();
        assert_eq!(request.metal_weight.as_deref(), Some("3"));
        assert_eq!(request.clarity(), "VS1");
    }
}
