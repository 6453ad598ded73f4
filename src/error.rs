//! Error types for the three pipeline stages
//!
//! Each stage owns one error kind. Per-record data quality problems are never
//! errors: the transformer drops those records. Everything in here aborts the
//! whole run.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used by the stage traits
pub type Result<T, E = EtlError> = std::result::Result<T, E>;

/// Top-level error for a pipeline run
#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Error extracting data: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Error loading data: {0}")]
    Load(#[from] LoadError),
}

/// Failures while reading the delimited input file
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Missing required column '{column}' in {}", .path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("Column '{column}' appears more than once in {}", .path.display())]
    DuplicateColumn { path: PathBuf, column: String },

    #[error("Expected {expected} fields in line {line} of {}, saw {found}", .path.display())]
    MalformedRow {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },
}

/// Structural violations found by the transformer
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Duplicate customer IDs found: {}", .0.join(", "))]
    DuplicateCustomerIds(Vec<String>),
}

/// Failures while writing to the staging destination
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Invalid staging table name '{0}'")]
    InvalidTableName(String),

    #[error("Failed to connect to database: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("Failed to prepare table {table}: {source}")]
    Prepare {
        table: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Failed to insert batch {batch} into {table}: {source}")]
    Insert {
        table: String,
        batch: usize,
        #[source]
        source: sqlx::Error,
    },

    #[error("Failed to commit load into {table}: {source}")]
    Commit {
        table: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}
