//! Command execution logic for the MITx processor CLI.
//!
//! Wires the pipeline together: load the source collections, run the mapping
//! engine, write the output entities, then print the anomaly tally. Any
//! fatal error aborts the run before the affected entity is written; output
//! files are meant to be loaded transactionally downstream.

use colored::Colorize;
use serde::Serialize;
use tracing::{debug, info};

use crate::app::mappings;
use crate::app::services::diagnostics::Diagnostics;
use crate::app::services::{mapping_engine, record_sink, record_source};
use crate::cli::args::{Args, ReportFormat};
use crate::constants::{INPUT_FILES, OUTPUT_FILES};
use crate::{Config, Error, Result};

/// Summary of a completed conversion run
#[derive(Debug, Default, Serialize)]
pub struct RunSummary {
    /// Number of output entities produced
    pub entities_produced: usize,
    /// Total records across all output entities
    pub records_produced: usize,
    /// Recoverable anomaly tally
    pub diagnostics: Diagnostics,
}

/// Main command runner for the MITx processor
pub fn run(args: Args) -> Result<RunSummary> {
    setup_logging(&args);

    info!("Starting MITx processor");
    debug!("Command line arguments: {:?}", args);

    args.validate()?;
    let config = args.to_config();
    config.validate()?;

    let summary = execute(&config)?;

    if !args.quiet {
        match args.report_format {
            ReportFormat::Human => print_report(&config, &summary),
            ReportFormat::Json => print_json_report(&summary)?,
        }
    }

    Ok(summary)
}

/// Run the full conversion pipeline for one configuration.
///
/// Kept free of logging setup and terminal reporting so tests can drive it
/// directly.
pub fn execute(config: &Config) -> Result<RunSummary> {
    let sources = record_source::load_collections(&config.source_dir, INPUT_FILES)?;
    info!("Loaded {} source collections", sources.len());

    let mut diagnostics = Diagnostics::new();
    let specs = mappings::entity_specs();
    let outputs = mapping_engine::run(&specs, &sources, &mut diagnostics)?;

    let records_produced = specs
        .iter()
        .map(|spec| outputs.get(spec.name).map(Vec::len).unwrap_or(0))
        .sum();

    if config.dry_run {
        info!("Dry run: skipping output writing");
    } else {
        record_sink::write_collections(&config.output_dir, OUTPUT_FILES, &outputs)?;
    }

    Ok(RunSummary {
        entities_produced: specs.len(),
        records_produced,
        diagnostics,
    })
}

/// Set up structured logging for the converter
fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mitx_processor={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    debug!("Logging initialized at level: {}", log_level);
}

/// Print the end-of-run report with the missing-field tally
fn print_report(config: &Config, summary: &RunSummary) {
    let headline = if config.dry_run {
        "Dry run complete".bold()
    } else {
        "Conversion complete".green().bold()
    };
    println!("{}", headline);
    println!("  Entities produced: {}", summary.entities_produced);
    println!("  Records produced:  {}", summary.records_produced);

    if summary.diagnostics.is_empty() {
        println!("  No missing-field anomalies");
    } else {
        println!(
            "  Missing-field anomalies: {}",
            summary.diagnostics.total().to_string().yellow()
        );
        for (field, count) in summary.diagnostics.iter() {
            println!("    {}: {}", field, count);
        }
    }
}

/// Print the end-of-run report as JSON for scripting
fn print_json_report(summary: &RunSummary) -> Result<()> {
    let rendered = serde_json::to_string_pretty(summary)
        .map_err(|e| Error::configuration(format!("failed to serialize report: {}", e)))?;
    println!("{}", rendered);
    Ok(())
}
