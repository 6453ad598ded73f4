//! In-memory table passed between pipeline stages

use super::customer::{Customer, DERIVED_COLUMNS, RawCustomer, REQUIRED_COLUMNS};

/// An ordered sequence of records sharing one column schema
///
/// The named customer fields are typed on the record itself; any other input
/// columns travel as `passthrough` values in the order listed here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table<R> {
    passthrough_columns: Vec<String>,
    records: Vec<R>,
}

impl<R> Table<R> {
    pub fn new(passthrough_columns: Vec<String>, records: Vec<R>) -> Self {
        Self {
            passthrough_columns,
            records,
        }
    }

    pub fn passthrough_columns(&self) -> &[String] {
        &self.passthrough_columns
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Split into column names and records
    pub fn into_parts(self) -> (Vec<String>, Vec<R>) {
        (self.passthrough_columns, self.records)
    }
}

impl Table<RawCustomer> {
    /// Column names as they appeared in the input header
    pub fn column_names(&self) -> Vec<&str> {
        REQUIRED_COLUMNS
            .iter()
            .copied()
            .chain(self.passthrough_columns.iter().map(String::as_str))
            .collect()
    }
}

impl Table<Customer> {
    /// Column names of the staging schema, derived columns last
    pub fn column_names(&self) -> Vec<&str> {
        REQUIRED_COLUMNS
            .iter()
            .copied()
            .chain(self.passthrough_columns.iter().map(String::as_str))
            .chain(DERIVED_COLUMNS.iter().copied())
            .collect()
    }

    /// Turn a transformed table back into raw form so it can be transformed again
    pub fn into_raw(self) -> Table<RawCustomer> {
        Table {
            passthrough_columns: self.passthrough_columns,
            records: self.records.into_iter().map(RawCustomer::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staging_column_order() {
        let table: Table<Customer> = Table::new(vec!["name".to_string()], vec![]);
        assert_eq!(
            table.column_names(),
            vec![
                "customer_id",
                "dob",
                "open_date",
                "last_consulted_date",
                "name",
                "age",
                "days_since_last_consultation"
            ]
        );
        assert!(table.is_empty());
    }

    #[test]
    fn test_raw_column_names() {
        let table = Table::new(
            vec!["email".to_string()],
            vec![RawCustomer::default(), RawCustomer::default()],
        );
        assert_eq!(table.len(), 2);
        assert_eq!(table.column_names().len(), 5);
        assert_eq!(table.column_names()[4], "email");
    }
}
