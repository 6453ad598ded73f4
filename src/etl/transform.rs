//! Transformer trait for reshaping a table between stages

use crate::error::Result;

/// Transformer trait for turning one table into another
///
/// Implementors typically:
/// - Drop records that fail validation
/// - Coerce text into typed values
/// - Add derived fields
///
/// Transformers are synchronous and must not read ambient state such as the
/// wall clock; anything time dependent is injected at construction.
pub trait Transformer: Send + Sync {
    /// Table type consumed
    type Input: Send;

    /// Table type produced
    type Output: Send;

    /// Transform a whole table
    ///
    /// # Errors
    /// Returns a validation error if the table as a whole violates an invariant
    fn transform(&self, input: Self::Input) -> Result<Self::Output>;
}
