//! Loader trait for writing a table to a destination

use crate::error::Result;

/// Loader trait for writing a table to a destination
///
/// Implementors define where the records end up:
/// - Database staging tables
/// - NDJSON files
pub trait Loader: Send + Sync {
    /// The table type accepted
    type Input: Send;

    /// Write the table to the destination
    ///
    /// Returns the number of records written
    ///
    /// # Errors
    /// Returns a load error if the destination rejects the write
    fn load(&self, input: Self::Input) -> impl std::future::Future<Output = Result<usize>> + Send;
}
