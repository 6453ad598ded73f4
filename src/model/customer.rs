//! Customer records before and after transformation

use chrono::NaiveDateTime;

pub const CUSTOMER_ID: &str = "customer_id";
pub const DOB: &str = "dob";
pub const OPEN_DATE: &str = "open_date";
pub const LAST_CONSULTED_DATE: &str = "last_consulted_date";
pub const AGE: &str = "age";
pub const DAYS_SINCE_LAST_CONSULTATION: &str = "days_since_last_consultation";

/// Columns every input file must carry
pub const REQUIRED_COLUMNS: [&str; 4] = [CUSTOMER_ID, DOB, OPEN_DATE, LAST_CONSULTED_DATE];

/// Columns computed by the transformer
pub const DERIVED_COLUMNS: [&str; 2] = [AGE, DAYS_SINCE_LAST_CONSULTATION];

/// Format used when a parsed timestamp is written back out as text
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// One row as read from the input file
///
/// Every field is optional text; `None` means the source cell was null.
/// `passthrough` is aligned with [`Table::passthrough_columns`](super::Table::passthrough_columns).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCustomer {
    pub customer_id: Option<String>,
    pub dob: Option<String>,
    pub open_date: Option<String>,
    pub last_consulted_date: Option<String>,
    pub passthrough: Vec<Option<String>>,
}

/// One validated row ready for the staging table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub customer_id: String,
    pub dob: NaiveDateTime,
    pub open_date: NaiveDateTime,
    pub last_consulted_date: NaiveDateTime,
    pub age: i32,
    pub days_since_last_consultation: i64,
    pub passthrough: Vec<Option<String>>,
}

impl From<Customer> for RawCustomer {
    /// Render a customer back into raw text form, dropping derived fields
    fn from(customer: Customer) -> Self {
        let render = |dt: NaiveDateTime| Some(dt.format(TIMESTAMP_FORMAT).to_string());
        Self {
            customer_id: Some(customer.customer_id),
            dob: render(customer.dob),
            open_date: render(customer.open_date),
            last_consulted_date: render(customer.last_consulted_date),
            passthrough: customer.passthrough,
        }
    }
}
