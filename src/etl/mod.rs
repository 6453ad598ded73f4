//! Core ETL (Extract, Transform, Load) abstractions
//!
//! Each stage is a trait so the pipeline can be assembled from real
//! file/database endpoints or from in-memory fixtures in tests.

mod extract;
mod load;
mod pipeline;
mod transform;

pub use extract::Extractor;
pub use load::Loader;
pub use pipeline::Pipeline;
pub use transform::Transformer;
