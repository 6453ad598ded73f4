//! Customer staging ETL
//!
//! Reads a delimited customer file, applies the validation and derivation
//! rules, and appends the result to a PostgreSQL staging table.

pub mod config;
pub mod error;
pub mod etl;
pub mod model;
pub mod storage;
pub mod transform;

// Re-exports for convenience
pub use error::{EtlError, ExtractionError, LoadError, ValidationError};
pub use etl::{Extractor, Loader, Pipeline, Transformer};
pub use model::{Customer, RawCustomer, Table};
pub use storage::{DelimitedFileReader, NdjsonWriter, StagingTableLoader};
pub use transform::CustomerTransformer;
