//! Delimited text file reading

use crate::error::{ExtractionError, Result};
use crate::etl::Extractor;
use crate::model::{DERIVED_COLUMNS, RawCustomer, REQUIRED_COLUMNS, Table};

use csv::{ReaderBuilder, StringRecord};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Default field delimiter for customer files
pub const DEFAULT_DELIMITER: u8 = b'|';

/// Cell values read as null in addition to the empty string
const NULL_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn to_nullable(value: &str) -> Option<String> {
    if value.is_empty() || NULL_MARKERS.contains(&value) {
        None
    } else {
        Some(value.to_string())
    }
}

/// Where each header column lands in a [`RawCustomer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    CustomerId,
    Dob,
    OpenDate,
    LastConsultedDate,
    Passthrough(usize),
    Ignored,
}

/// Read a header-first delimited file into a customer table
pub struct DelimitedFileReader {
    path: PathBuf,
    delimiter: u8,
}

impl DelimitedFileReader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            delimiter: DEFAULT_DELIMITER,
        }
    }

    /// Set a custom field delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Map header names to record slots and collect passthrough column names
    ///
    /// Blank header cells, such as the one left by a trailing delimiter, are
    /// named `Unnamed: <position>`.
    fn plan_columns(&self, headers: &StringRecord) -> Result<(Vec<Slot>, Vec<String>)> {
        let mut seen = HashSet::new();
        let mut slots = Vec::with_capacity(headers.len());
        let mut passthrough = Vec::new();

        for (index, header) in headers.iter().enumerate() {
            let name = match header {
                "" => format!("Unnamed: {}", index),
                named => named.to_string(),
            };
            if !seen.insert(name.clone()) {
                return Err(ExtractionError::DuplicateColumn {
                    path: self.path.clone(),
                    column: name,
                }
                .into());
            }

            let slot = match name.as_str() {
                "customer_id" => Slot::CustomerId,
                "dob" => Slot::Dob,
                "open_date" => Slot::OpenDate,
                "last_consulted_date" => Slot::LastConsultedDate,
                derived if DERIVED_COLUMNS.contains(&derived) => {
                    log::warn!(
                        "Ignoring input column '{}', it is derived during transformation",
                        derived
                    );
                    Slot::Ignored
                }
                _ => {
                    passthrough.push(name.clone());
                    Slot::Passthrough(passthrough.len() - 1)
                }
            };
            slots.push(slot);
        }

        if let Some(column) = REQUIRED_COLUMNS.into_iter().find(|c| !seen.contains(*c)) {
            return Err(ExtractionError::MissingColumn {
                path: self.path.clone(),
                column,
            }
            .into());
        }

        Ok((slots, passthrough))
    }

    /// Read every record from the file
    pub fn read(&self) -> Result<Table<RawCustomer>> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .from_path(&self.path)
            .map_err(|source| ExtractionError::Open {
                path: self.path.clone(),
                source,
            })?;

        let headers = reader
            .headers()
            .map_err(|source| ExtractionError::Read {
                path: self.path.clone(),
                source,
            })?
            .clone();
        let (slots, passthrough_columns) = self.plan_columns(&headers)?;

        let mut records = Vec::new();
        for result in reader.records() {
            let row = result.map_err(|source| ExtractionError::Read {
                path: self.path.clone(),
                source,
            })?;

            if row.len() > slots.len() {
                return Err(ExtractionError::MalformedRow {
                    path: self.path.clone(),
                    line: row.position().map_or(0, |p| p.line()),
                    expected: slots.len(),
                    found: row.len(),
                }
                .into());
            }

            let mut record = RawCustomer {
                passthrough: vec![None; passthrough_columns.len()],
                ..Default::default()
            };
            // Short rows leave trailing columns null
            for (slot, value) in slots.iter().zip(row.iter()) {
                let value = to_nullable(value);
                match *slot {
                    Slot::CustomerId => record.customer_id = value,
                    Slot::Dob => record.dob = value,
                    Slot::OpenDate => record.open_date = value,
                    Slot::LastConsultedDate => record.last_consulted_date = value,
                    Slot::Passthrough(i) => record.passthrough[i] = value,
                    Slot::Ignored => {}
                }
            }
            records.push(record);
        }

        let table = Table::new(passthrough_columns, records);
        log::debug!(
            "Loaded {} rows x {} columns from {}",
            table.len(),
            headers.len(),
            self.path.display()
        );
        for record in table.records().iter().take(5) {
            log::debug!("{:?}", record);
        }

        Ok(table)
    }
}

impl Extractor for DelimitedFileReader {
    type Output = Table<RawCustomer>;

    async fn extract(&self) -> Result<Self::Output> {
        self.read()
    }
}
