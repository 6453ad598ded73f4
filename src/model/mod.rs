//! Typed customer records and the table that carries them between stages

mod customer;
mod table;

pub use customer::{
    AGE, CUSTOMER_ID, Customer, DAYS_SINCE_LAST_CONSULTATION, DERIVED_COLUMNS, DOB,
    LAST_CONSULTED_DATE, OPEN_DATE, REQUIRED_COLUMNS, RawCustomer, TIMESTAMP_FORMAT,
};
pub use table::Table;
