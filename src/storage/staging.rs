//! PostgreSQL staging table loader
//!
//! Appends transformed customers with multi-row inserts. Every batch runs
//! inside one transaction, so a failed batch leaves the table untouched.

use crate::config::{DEFAULT_BATCH_SIZE, DatabaseConfig};
use crate::error::{LoadError, Result};
use crate::etl::Loader;
use crate::model::{
    AGE, CUSTOMER_ID, Customer, DAYS_SINCE_LAST_CONSULTATION, DOB, LAST_CONSULTED_DATE,
    OPEN_DATE, Table,
};

use regex::Regex;
use sqlx::{Connection, PgConnection, Postgres, QueryBuilder};
use std::sync::LazyLock;

/// PostgreSQL rejects statements with more bind parameters than this
pub const MAX_BIND_PARAMETERS: usize = 65_535;

static TABLE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$")
        .expect("table name pattern is valid")
});

/// Double-quote an identifier, doubling embedded quotes
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Validate and quote a possibly schema-qualified table name
pub fn qualified_table_name(name: &str) -> std::result::Result<String, LoadError> {
    if !TABLE_NAME.is_match(name) {
        return Err(LoadError::InvalidTableName(name.to_string()));
    }
    Ok(name
        .split('.')
        .map(quote_identifier)
        .collect::<Vec<_>>()
        .join("."))
}

/// Rows per statement, capped so one statement stays under the bind limit
pub fn rows_per_batch(batch_size: usize, column_count: usize) -> usize {
    let by_parameters = MAX_BIND_PARAMETERS / column_count.max(1);
    batch_size.min(by_parameters).max(1)
}

/// `CREATE TABLE IF NOT EXISTS` statement for the staging schema
pub fn create_table_sql(table: &str, customers: &Table<Customer>) -> String {
    let columns = customers
        .column_names()
        .into_iter()
        .map(|name| {
            let sql_type = match name {
                CUSTOMER_ID => "TEXT",
                DOB | OPEN_DATE | LAST_CONSULTED_DATE => "TIMESTAMP",
                AGE | DAYS_SINCE_LAST_CONSULTATION => "BIGINT",
                _ => "TEXT",
            };
            format!("{} {}", quote_identifier(name), sql_type)
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!("CREATE TABLE IF NOT EXISTS {} ({})", table, columns)
}

/// Build one multi-row insert for a slice of customers
pub fn insert_batch<'a>(
    table: &str,
    columns: &[&str],
    batch: &'a [Customer],
) -> QueryBuilder<'a, Postgres> {
    let column_list = columns
        .iter()
        .map(|name| quote_identifier(name))
        .collect::<Vec<_>>()
        .join(", ");

    let mut query_builder =
        QueryBuilder::new(format!("INSERT INTO {} ({}) ", table, column_list));

    query_builder.push_values(batch, |mut b, customer| {
        b.push_bind(customer.customer_id.as_str())
            .push_bind(customer.dob)
            .push_bind(customer.open_date)
            .push_bind(customer.last_consulted_date);
        for value in &customer.passthrough {
            b.push_bind(value.as_deref());
        }
        b.push_bind(i64::from(customer.age))
            .push_bind(customer.days_since_last_consultation);
    });

    query_builder
}

/// Loader appending customers to a PostgreSQL staging table
pub struct StagingTableLoader {
    database: DatabaseConfig,
    table: String,
    batch_size: usize,
}

impl StagingTableLoader {
    /// Create a loader for `table`, validating its name up front
    pub fn try_new(
        database: DatabaseConfig,
        table: &str,
    ) -> std::result::Result<Self, LoadError> {
        Ok(Self {
            database,
            table: qualified_table_name(table)?,
            batch_size: DEFAULT_BATCH_SIZE,
        })
    }

    /// Set the number of records per insert (default: 10 000)
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Quoted target table name
    pub fn table(&self) -> &str {
        &self.table
    }

    async fn write(
        &self,
        conn: &mut PgConnection,
        customers: &Table<Customer>,
    ) -> std::result::Result<usize, LoadError> {
        let columns = customers.column_names();
        let rows = rows_per_batch(self.batch_size, columns.len());

        let mut tx = conn.begin().await.map_err(LoadError::Connect)?;

        sqlx::query(&create_table_sql(&self.table, customers))
            .execute(&mut *tx)
            .await
            .map_err(|source| LoadError::Prepare {
                table: self.table.clone(),
                source,
            })?;

        let mut written = 0;
        for (index, batch) in customers.records().chunks(rows).enumerate() {
            insert_batch(&self.table, &columns, batch)
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|source| LoadError::Insert {
                    table: self.table.clone(),
                    batch: index + 1,
                    source,
                })?;

            written += batch.len();
            log::debug!(
                "Inserted batch {} ({} of {} records)",
                index + 1,
                written,
                customers.len()
            );
        }

        tx.commit().await.map_err(|source| LoadError::Commit {
            table: self.table.clone(),
            source,
        })?;

        Ok(written)
    }
}

impl Loader for StagingTableLoader {
    type Input = Table<Customer>;

    async fn load(&self, input: Self::Input) -> Result<usize> {
        if input.is_empty() {
            log::warn!("No records to load into {}", self.table);
            return Ok(0);
        }

        log::info!(
            "Connecting to {}",
            self.database.database().unwrap_or("database")
        );
        let mut conn = PgConnection::connect(self.database.url().as_str())
            .await
            .map_err(LoadError::Connect)?;

        let result = self.write(&mut conn, &input).await;

        if let Err(e) = conn.close().await {
            log::warn!("Failed to close database connection: {}", e);
        }

        let count = result?;
        log::info!("Appended {} record(s) to {}", count, self.table);
        Ok(count)
    }
}
