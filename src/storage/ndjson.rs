//! NDJSON (Newline Delimited JSON) output for dry runs

use crate::error::{LoadError, Result};
use crate::etl::Loader;
use crate::model::{Customer, TIMESTAMP_FORMAT, Table};

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Render one customer as a JSON object keyed by staging column name
pub fn customer_to_json(columns: &[&str], customer: &Customer) -> Value {
    let timestamp = |dt: chrono::NaiveDateTime| Value::from(dt.format(TIMESTAMP_FORMAT).to_string());

    let mut values = vec![
        Value::from(customer.customer_id.as_str()),
        timestamp(customer.dob),
        timestamp(customer.open_date),
        timestamp(customer.last_consulted_date),
    ];
    values.extend(
        customer
            .passthrough
            .iter()
            .map(|v| v.as_deref().map_or(Value::Null, Value::from)),
    );
    values.push(Value::from(customer.age));
    values.push(Value::from(customer.days_since_last_consultation));

    let object: Map<String, Value> = columns
        .iter()
        .map(|c| c.to_string())
        .zip(values)
        .collect();
    Value::Object(object)
}

/// Write transformed customers to an NDJSON file instead of the database
pub struct NdjsonWriter {
    path: PathBuf,
}

impl NdjsonWriter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the table as NDJSON, replacing any existing file
    pub fn write(&self, customers: &Table<Customer>) -> std::result::Result<(), LoadError> {
        let columns = customers.column_names();
        let ndjson = customers
            .records()
            .iter()
            .map(|c| serde_json::to_string(&customer_to_json(&columns, c)))
            .collect::<std::result::Result<Vec<_>, _>>()?
            .join("\n");

        // Add trailing newline
        let content = if ndjson.is_empty() {
            String::new()
        } else {
            format!("{}\n", ndjson)
        };

        std::fs::write(&self.path, content).map_err(|source| LoadError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

impl Loader for NdjsonWriter {
    type Input = Table<Customer>;

    async fn load(&self, input: Self::Input) -> Result<usize> {
        self.write(&input)?;
        log::info!(
            "Wrote {} record(s) to {}",
            input.len(),
            self.path.display()
        );
        Ok(input.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_load_writes_one_line_per_record() {
        let temp = NamedTempFile::new().unwrap();
        let ts = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let customer = Customer {
            customer_id: "1".to_string(),
            dob: ts,
            open_date: ts,
            last_consulted_date: ts,
            age: 4,
            days_since_last_consultation: 40,
            passthrough: vec![None],
        };
        let table = Table::new(
            vec!["email".to_string()],
            vec![customer.clone(), Customer {
                customer_id: "2".to_string(),
                ..customer
            }],
        );

        let count = NdjsonWriter::new(temp.path()).load(table).await.unwrap();
        assert_eq!(count, 2);

        let content = std::fs::read_to_string(temp.path()).unwrap();
        let lines: Vec<Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            json!({
                "customer_id": "1",
                "dob": "2020-01-01 00:00:00",
                "open_date": "2020-01-01 00:00:00",
                "last_consulted_date": "2020-01-01 00:00:00",
                "email": null,
                "age": 4,
                "days_since_last_consultation": 40
            })
        );
        assert_eq!(lines[1]["customer_id"], "2");
    }

    #[test]
    fn test_write_empty_table() {
        let temp = NamedTempFile::new().unwrap();
        NdjsonWriter::new(temp.path())
            .write(&Table::new(vec![], vec![]))
            .unwrap();
        assert_eq!(std::fs::read_to_string(temp.path()).unwrap(), "");
    }
}
