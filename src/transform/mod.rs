//! Transform implementations for customer tables

mod customer;
pub mod dates;

pub use customer::{CustomerTransformer, RECENCY_THRESHOLD_DAYS, days_between, derive_age};
