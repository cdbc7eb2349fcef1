//! MITx Processor Library
//!
//! A Rust library for converting new-MITx course data exports (course
//! structure, grading, user/profile and forum files) into the canonical
//! record set consumed by the vismooc analytics pipeline.
//!
//! This library provides tools for:
//! - Loading named collections of newline-delimited JSON records
//! - Evaluating declarative mapping stages (direct copy, per-record
//!   computation, sibling-aware computation, whole-collection post-process)
//! - Merging partial stage outputs under strict shape and disjoint-key
//!   invariants
//! - Normalizing timestamps between per-entity textual formats
//! - Serializing output entities as line-delimited JSON or tab-separated
//!   bulk-load files
//! - Tallying recoverable missing-field anomalies for reporting

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod mappings;
    pub mod models;
    pub mod services {
        pub mod concatenator;
        pub mod diagnostics;
        pub mod mapping_engine;
        pub mod record_sink;
        pub mod record_source;
        pub mod stage_evaluator;
        pub mod timestamp;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{Collection, EntitySpec, Record, RecordSet, Stage};
pub use app::services::diagnostics::Diagnostics;
pub use config::Config;

/// Result type alias for the MITx processor
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for MITx record transformation
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Input or output directory missing or unusable
    #[error("Storage error: {path}: {message}")]
    Storage { path: String, message: String },

    /// An input line is not a valid JSON record
    #[error("Parse error in '{file}' at line {line}: {message}")]
    Parse {
        file: String,
        line: usize,
        message: String,
    },

    /// Stages for one entity produced differing record counts
    #[error(
        "Shape mismatch for entity '{entity}': stage 0 produced {expected} records, stage {stage} produced {found}"
    )]
    ShapeMismatch {
        entity: String,
        stage: usize,
        expected: usize,
        found: usize,
    },

    /// Two stages for one entity defined the same output field
    #[error(
        "Key collision for entity '{entity}': field '{field}' is produced by more than one stage"
    )]
    KeyCollision { entity: String, field: String },

    /// A timestamp value does not match its declared input format
    #[error("Timestamp '{value}' does not match format '{format}'")]
    TimestampFormat {
        value: String,
        format: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Mapping specification or argument error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// A required entity is absent from the produced collections
    #[error("Incomplete output: entity '{entity}' was not produced")]
    IncompleteOutput { entity: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a storage error for an unusable directory
    pub fn storage(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Storage {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a parse error for a malformed input line
    pub fn parse(file: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            line,
            message: message.into(),
        }
    }

    /// Create a shape mismatch error
    pub fn shape_mismatch(
        entity: impl Into<String>,
        stage: usize,
        expected: usize,
        found: usize,
    ) -> Self {
        Self::ShapeMismatch {
            entity: entity.into(),
            stage,
            expected,
            found,
        }
    }

    /// Create a key collision error
    pub fn key_collision(entity: impl Into<String>, field: impl Into<String>) -> Self {
        Self::KeyCollision {
            entity: entity.into(),
            field: field.into(),
        }
    }

    /// Create a timestamp format error
    pub fn timestamp_format(
        value: impl Into<String>,
        format: impl Into<String>,
        source: chrono::ParseError,
    ) -> Self {
        Self::TimestampFormat {
            value: value.into(),
            format: format.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an incomplete output error
    pub fn incomplete_output(entity: impl Into<String>) -> Self {
        Self::IncompleteOutput {
            entity: entity.into(),
        }
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}
