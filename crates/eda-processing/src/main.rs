//! CLI entry point for the passenger-list EDA pipeline.

use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use eda_processing::{
    Pipeline, PipelineConfig, PipelineConfigBuilder, PreprocessingError, PreprocessingResult,
    ReportGenerator, completion_message,
};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Passenger-list cleaning and exploratory statistics",
    long_about = "Cleans a passenger-list CSV (median imputation, column pruning, \
                  de-duplication, IQR capping, category normalization), extracts \
                  exploratory statistics and writes the cleaned table.\n\n\
                  EXAMPLES:\n  \
                  # Defaults: data/test.csv -> output/cleaned_data.csv\n  \
                  eda-processing\n\n  \
                  # Explicit paths and a JSON report\n  \
                  eda-processing -i data/test.csv -o out/clean.csv -r out/report.json\n\n  \
                  # Machine-readable output\n  \
                  eda-processing --json | jq .statistics.skewness"
)]
struct Args {
    /// JSON configuration file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the CSV file to process
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Path the cleaned CSV is written to
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write a detailed JSON report to this path
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Multiplier k of the IQR fences [Q1 - k*IQR, Q3 + k*IQR]
    #[arg(long)]
    iqr_multiplier: Option<f64>,

    /// Output JSON to stdout instead of the completion line
    ///
    /// Disables all progress logs; only outputs the final JSON report.
    #[arg(long)]
    json: bool,

    /// Print a human-readable statistics digest before the completion line
    #[arg(short, long)]
    summary: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Merge the config file (if any) with command-line overrides.
fn build_config(args: &Args) -> PreprocessingResult<PipelineConfig> {
    let base = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            PipelineConfig::from_json_file(path)?
        }
        None => PipelineConfig::default(),
    };

    let mut builder = PipelineConfigBuilder::from_config(base);
    if let Some(ref input) = args.input {
        builder = builder.input_path(input);
    }
    if let Some(ref output) = args.output {
        builder = builder.output_path(output);
    }
    if let Some(ref report) = args.report {
        builder = builder.report_path(report);
    }
    if let Some(k) = args.iqr_multiplier {
        builder = builder.iqr_multiplier(k);
    }

    Ok(builder.build()?)
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load .env before the subscriber so RUST_LOG from it reaches EnvFilter
    dotenv().ok();

    init_logging(&args.log_level, args.quiet, args.json);

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => return handle_failure(e, args.json),
    };
    let input_file = config.input_path.display().to_string();
    let pipeline = match Pipeline::builder().config(config).build() {
        Ok(pipeline) => pipeline,
        Err(e) => return handle_failure(e.into(), args.json),
    };

    let result = match pipeline.run() {
        Ok(result) => result,
        Err(e) => return handle_failure(e, args.json),
    };

    let report = ReportGenerator::build_report(&input_file, &result);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if args.summary {
        print!("{}", ReportGenerator::render_summary(&report));
    }

    match &result.output_path {
        Some(path) => println!("{}", completion_message(&path.display().to_string())),
        None => println!("EDA completed; cleaned dataset kept in memory (save_to_disk is off)"),
    }

    Ok(())
}

/// Report a pipeline failure and exit non-zero.
///
/// With `--json` the error is printed to stdout as `{code, message}` so the
/// output stays machine-readable.
fn handle_failure(e: PreprocessingError, json_output: bool) -> Result<()> {
    if json_output {
        println!("{}", serde_json::to_string_pretty(&e)?);
        std::process::exit(1);
    }

    error!("Pipeline failed [{}]: {}", e.error_code(), e);
    Err(e.into())
}
