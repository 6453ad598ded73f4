//! Source and destination endpoints for the pipeline
//!
//! This module handles all external I/O:
//! - Delimited customer file reading
//! - PostgreSQL staging table writes
//! - NDJSON output for dry runs

mod delimited;
mod ndjson;
mod staging;

pub use delimited::{DEFAULT_DELIMITER, DelimitedFileReader};
pub use ndjson::{NdjsonWriter, customer_to_json};
pub use staging::{
    MAX_BIND_PARAMETERS, StagingTableLoader, create_table_sql, insert_batch,
    qualified_table_name, quote_identifier, rows_per_batch,
};
