//! Command-line argument definitions for MITx processor
//!
//! This module defines the CLI interface using the clap derive API.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::{Config, Error, Result};

/// CLI arguments for the MITx data converter
///
/// Converts new-MITx course data exports into the canonical file set
/// consumed by the vismooc analytics pipeline.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "mitx-processor",
    version,
    about = "Convert new-MITx course data exports into vismooc analytics files",
    long_about = "Converts the new-MITx course data export files (course structure, grading, \
                  user/profile and forum data) into the canonical record set consumed by the \
                  vismooc pipe of MOOC-Learner-Curated. Outputs only the subset of fields the \
                  vismooc pipe requires; fields the exports do not carry are populated with nulls."
)]
pub struct Args {
    /// Input directory containing the new-MITx export files
    ///
    /// Must contain course_axis.json, course_item.json, chapter_grades.json,
    /// user_info_combo.json and forum.json.
    #[arg(
        short = 'i',
        long = "input",
        value_name = "PATH",
        help = "Input directory containing the new-MITx export files"
    )]
    pub input_dir: PathBuf,

    /// Output directory for the generated vismooc files
    #[arg(
        short = 'o',
        long = "output",
        value_name = "PATH",
        help = "Output directory for the generated vismooc files"
    )]
    pub output_dir: PathBuf,

    /// Run the full transformation without writing any output files
    #[arg(
        long = "dry-run",
        help = "Run the transformation and report anomalies without writing output"
    )]
    pub dry_run: bool,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Output format for the end-of-run report
    #[arg(
        long = "report-format",
        value_enum,
        default_value = "human",
        help = "Output format for the end-of-run report"
    )]
    pub report_format: ReportFormat,
}

/// Output format options for the end-of-run report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable output
    Human,
    /// JSON format for scripting
    Json,
}

impl Args {
    /// Validate the arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if !self.input_dir.exists() {
            return Err(Error::configuration(format!(
                "Input path does not exist: {}",
                self.input_dir.display()
            )));
        }

        if !self.input_dir.is_dir() {
            return Err(Error::configuration(format!(
                "Input path is not a directory: {}",
                self.input_dir.display()
            )));
        }

        Ok(())
    }

    /// Build the run configuration from the arguments
    pub fn to_config(&self) -> Config {
        let config = Config::new(&self.input_dir, &self.output_dir);
        if self.dry_run {
            config.with_dry_run()
        } else {
            config
        }
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }
}
