//! Pipeline orchestration for ETL operations

use super::{Extractor, Loader, Transformer};
use crate::error::Result;

/// ETL Pipeline that runs Extract, Transform, and Load in sequence
///
/// # Type Parameters
/// - `E`: Extractor type
/// - `T`: Transformer type (must accept E::Output)
/// - `L`: Loader type (must accept T::Output)
///
/// Each stage hands ownership of its table to the next. A failure in any stage
/// stops the run before later stages execute, so a validation failure never
/// reaches the loader.
pub struct Pipeline<E, T, L> {
    extractor: E,
    transformer: T,
    loader: L,
}

impl<E, T, L> Pipeline<E, T, L>
where
    E: Extractor,
    T: Transformer<Input = E::Output>,
    L: Loader<Input = T::Output>,
{
    /// Create a new pipeline
    pub fn new(extractor: E, transformer: T, loader: L) -> Self {
        Self {
            extractor,
            transformer,
            loader,
        }
    }

    /// Run the complete ETL pipeline
    ///
    /// Steps:
    /// 1. Extract a table from the source
    /// 2. Transform it
    /// 3. Load the result to the destination
    ///
    /// Returns the number of records loaded
    ///
    /// # Errors
    /// Returns the first stage error encountered
    pub async fn run(&self) -> Result<usize> {
        log::info!("Starting ETL pipeline");

        log::debug!("Extracting from source...");
        let extracted = self.extractor.extract().await?;

        log::debug!("Transforming table...");
        let transformed = self.transformer.transform(extracted)?;

        log::debug!("Loading to destination...");
        let count = self.loader.load(transformed).await?;
        log::info!("Loaded {} record(s)", count);

        Ok(count)
    }
}
