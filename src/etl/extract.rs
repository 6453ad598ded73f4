//! Extractor trait for reading a table from a source

use crate::error::Result;

/// Extractor trait for producing a table from a source
///
/// Implementors decide where the records come from:
/// - Delimited files
/// - Fixtures in tests
///
/// # Example
/// ```no_run
/// use customer_etl::etl::Extractor;
/// use customer_etl::error::Result;
/// use customer_etl::model::{RawCustomer, Table};
///
/// struct Fixture;
///
/// impl Extractor for Fixture {
///     type Output = Table<RawCustomer>;
///
///     async fn extract(&self) -> Result<Self::Output> {
///         Ok(Table::new(vec![], vec![RawCustomer::default()]))
///     }
/// }
/// ```
pub trait Extractor: Send + Sync {
    /// The table type produced
    type Output: Send;

    /// Read everything from the source
    ///
    /// # Errors
    /// Returns an extraction error if the source is missing, unreadable or malformed
    fn extract(&self) -> impl std::future::Future<Output = Result<Self::Output>> + Send;
}
