//! Configuration management and validation.
//!
//! Provides the runtime configuration for a conversion run: source and
//! destination directories plus processing switches.

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Configuration for one conversion run
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory containing the new-MITx export files
    pub source_dir: PathBuf,

    /// Directory the vismooc files are written to
    pub output_dir: PathBuf,

    /// Validate and report without writing output files
    pub dry_run: bool,
}

impl Config {
    /// Create a configuration for the given source and output directories
    pub fn new(source_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            dry_run: false,
        }
    }

    /// Enable dry-run mode
    pub fn with_dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Validate that both directories exist and are directories
    pub fn validate(&self) -> Result<()> {
        check_directory(&self.source_dir, "source directory")?;
        if !self.dry_run {
            check_directory(&self.output_dir, "output directory")?;
        }
        Ok(())
    }
}

fn check_directory(path: &Path, role: &str) -> Result<()> {
    if !path.exists() {
        return Err(Error::storage(
            path.display().to_string(),
            format!("{} does not exist", role),
        ));
    }
    if !path.is_dir() {
        return Err(Error::storage(
            path.display().to_string(),
            format!("{} is not a directory", role),
        ));
    }
    Ok(())
}
