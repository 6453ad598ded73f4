//! Validation and derivation rules for customer tables
//!
//! The rules run in a fixed order and each one assumes the earlier filters
//! already ran:
//!
//! 1. Drop records missing `customer_id` or `dob`
//! 2. Coerce `open_date`, `last_consulted_date` and `dob` to timestamps
//! 3. Drop records where any of those dates failed to parse
//! 4. Derive `age` from the birth year
//! 5. Drop records with a negative age
//! 6. Derive `days_since_last_consultation`
//! 7. Keep records last consulted more than 30 days ago
//! 8. Fail the whole table if a `customer_id` repeats

use super::dates::parse_lenient;
use crate::error::{Result, ValidationError};
use crate::etl::Transformer;
use crate::model::{Customer, RawCustomer, Table};

use chrono::{Datelike, NaiveDateTime};
use std::collections::HashMap;

/// Records must be strictly older than this to survive the recency rule
pub const RECENCY_THRESHOLD_DAYS: i64 = 30;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Transformer applying the customer validation rules against a fixed `now`
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use customer_etl::etl::Transformer;
/// use customer_etl::model::{RawCustomer, Table};
/// use customer_etl::transform::CustomerTransformer;
///
/// let now = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let raw = RawCustomer {
///     customer_id: Some("1".to_string()),
///     dob: Some("1990-01-01".to_string()),
///     open_date: Some("2020-01-01".to_string()),
///     last_consulted_date: Some("2024-04-22".to_string()),
///     passthrough: vec![],
/// };
///
/// let output = CustomerTransformer::new(now)
///     .transform(Table::new(vec![], vec![raw]))
///     .unwrap();
/// assert_eq!(output.records()[0].age, 34);
/// assert_eq!(output.records()[0].days_since_last_consultation, 40);
/// ```
pub struct CustomerTransformer {
    now: NaiveDateTime,
}

impl CustomerTransformer {
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.now
    }
}

/// Record with its mandatory fields present
struct Identified {
    customer_id: String,
    dob: String,
    open_date: Option<String>,
    last_consulted_date: Option<String>,
    passthrough: Vec<Option<String>>,
}

/// Record after date coercion; `None` is the null-date sentinel
struct Coerced {
    customer_id: String,
    dob: Option<NaiveDateTime>,
    open_date: Option<NaiveDateTime>,
    last_consulted_date: Option<NaiveDateTime>,
    passthrough: Vec<Option<String>>,
}

/// Record whose three dates all parsed
struct Dated {
    customer_id: String,
    dob: NaiveDateTime,
    open_date: NaiveDateTime,
    last_consulted_date: NaiveDateTime,
    passthrough: Vec<Option<String>>,
}

fn identify(raw: RawCustomer) -> Option<Identified> {
    Some(Identified {
        customer_id: raw.customer_id?,
        dob: raw.dob?,
        open_date: raw.open_date,
        last_consulted_date: raw.last_consulted_date,
        passthrough: raw.passthrough,
    })
}

fn coerce_date(value: Option<&str>) -> Option<NaiveDateTime> {
    value.and_then(parse_lenient)
}

fn coerce(record: Identified) -> Coerced {
    Coerced {
        open_date: coerce_date(record.open_date.as_deref()),
        last_consulted_date: coerce_date(record.last_consulted_date.as_deref()),
        dob: coerce_date(Some(&record.dob)),
        customer_id: record.customer_id,
        passthrough: record.passthrough,
    }
}

fn require_dates(record: Coerced) -> Option<Dated> {
    Some(Dated {
        open_date: record.open_date?,
        last_consulted_date: record.last_consulted_date?,
        dob: record.dob?,
        customer_id: record.customer_id,
        passthrough: record.passthrough,
    })
}

/// Whole years between the birth year and the current year, `-1` when unknown
pub fn derive_age(now: NaiveDateTime, dob: Option<NaiveDateTime>) -> i32 {
    dob.map_or(-1, |dob| now.year() - dob.year())
}

/// Whole days elapsed since `since`, floored; negative for future dates
pub fn days_between(now: NaiveDateTime, since: NaiveDateTime) -> i64 {
    (now - since).num_milliseconds().div_euclid(MILLIS_PER_DAY)
}

fn find_duplicates(records: &[Customer]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        *counts.entry(record.customer_id.as_str()).or_default() += 1;
    }

    let mut duplicates: Vec<String> = counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(id, _)| id.to_string())
        .collect();
    duplicates.sort();
    duplicates
}

impl Transformer for CustomerTransformer {
    type Input = Table<RawCustomer>;
    type Output = Table<Customer>;

    fn transform(&self, input: Self::Input) -> Result<Self::Output> {
        let (passthrough_columns, records) = input.into_parts();
        log::debug!("Transforming {} record(s) as of {}", records.len(), self.now);

        let identified: Vec<Identified> = records.into_iter().filter_map(identify).collect();
        log::debug!(
            "{} record(s) after dropping missing mandatory fields",
            identified.len()
        );

        let coerced: Vec<Coerced> = identified.into_iter().map(coerce).collect();

        let dated: Vec<Dated> = coerced.into_iter().filter_map(require_dates).collect();
        log::debug!("{} record(s) after dropping invalid dates", dated.len());

        let aged: Vec<(Dated, i32)> = dated
            .into_iter()
            .map(|record| {
                let age = derive_age(self.now, Some(record.dob));
                (record, age)
            })
            .filter(|(_, age)| *age >= 0)
            .collect();
        log::debug!("{} record(s) after dropping negative ages", aged.len());

        let customers: Vec<Customer> = aged
            .into_iter()
            .map(|(record, age)| Customer {
                days_since_last_consultation: days_between(self.now, record.last_consulted_date),
                customer_id: record.customer_id,
                dob: record.dob,
                open_date: record.open_date,
                last_consulted_date: record.last_consulted_date,
                age,
                passthrough: record.passthrough,
            })
            .filter(|customer| customer.days_since_last_consultation > RECENCY_THRESHOLD_DAYS)
            .collect();
        log::debug!(
            "{} record(s) last consulted more than {} days ago",
            customers.len(),
            RECENCY_THRESHOLD_DAYS
        );

        let duplicates = find_duplicates(&customers);
        if !duplicates.is_empty() {
            return Err(ValidationError::DuplicateCustomerIds(duplicates).into());
        }

        log::info!("Transformed table has {} record(s)", customers.len());
        Ok(Table::new(passthrough_columns, customers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EtlError;
    use chrono::{Duration, NaiveDate};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn days_ago(days: i64) -> String {
        (now() - Duration::days(days)).format("%Y-%m-%d %H:%M:%S").to_string()
    }

    fn raw(id: &str, dob: &str, open: &str, last: &str) -> RawCustomer {
        let field = |v: &str| (!v.is_empty()).then(|| v.to_string());
        RawCustomer {
            customer_id: field(id),
            dob: field(dob),
            open_date: field(open),
            last_consulted_date: field(last),
            passthrough: vec![Some(format!("name-{}", id))],
        }
    }

    fn run(records: Vec<RawCustomer>) -> Result<Table<Customer>> {
        CustomerTransformer::new(now()).transform(Table::new(vec!["name".to_string()], records))
    }

    #[test]
    fn test_valid_record_survives() {
        let output = run(vec![raw("1", "1990-01-01", "2020-01-01", &days_ago(40))]).unwrap();

        assert_eq!(output.len(), 1);
        let customer = &output.records()[0];
        assert_eq!(customer.customer_id, "1");
        assert_eq!(customer.age, 2024 - 1990);
        assert_eq!(customer.days_since_last_consultation, 40);
        assert_eq!(customer.passthrough, vec![Some("name-1".to_string())]);
        assert_eq!(output.passthrough_columns(), ["name".to_string()]);
    }

    #[test]
    fn test_missing_mandatory_fields_dropped() {
        let output = run(vec![
            raw("1", "", "2020-01-01", &days_ago(40)),
            raw("", "1990-01-01", "2020-01-01", &days_ago(40)),
            raw("3", "1990-01-01", "2020-01-01", &days_ago(40)),
        ])
        .unwrap();

        assert_eq!(output.len(), 1);
        assert_eq!(output.records()[0].customer_id, "3");
    }

    #[test]
    fn test_unparseable_dates_dropped() {
        let output = run(vec![
            raw("1", "1990-01-01", "2020-01-01", "not-a-date"),
            raw("2", "1990-01-01", "", &days_ago(40)),
            raw("3", "   ", "2020-01-01", &days_ago(40)),
            raw("4", "1990-01-01", " 2020-01-01 ", &format!("  {}  ", days_ago(40))),
        ])
        .unwrap();

        assert_eq!(output.len(), 1);
        assert_eq!(output.records()[0].customer_id, "4");
    }

    #[test]
    fn test_future_birth_year_dropped() {
        let output = run(vec![
            raw("1", "2030-01-01", "2020-01-01", &days_ago(40)),
            raw("2", "2024-12-31", "2020-01-01", &days_ago(40)),
        ])
        .unwrap();

        assert_eq!(output.len(), 1);
        assert_eq!(output.records()[0].customer_id, "2");
        assert_eq!(output.records()[0].age, 0);
    }

    #[test]
    fn test_recency_threshold_is_strict() {
        let output = run(vec![
            raw("1", "1990-01-01", "2020-01-01", &days_ago(10)),
            raw("2", "1990-01-01", "2020-01-01", &days_ago(30)),
            raw("3", "1990-01-01", "2020-01-01", &days_ago(31)),
            raw("4", "1990-01-01", "2020-01-01", &days_ago(-5)),
        ])
        .unwrap();

        let ids: Vec<&str> = output
            .records()
            .iter()
            .map(|c| c.customer_id.as_str())
            .collect();
        assert_eq!(ids, vec!["3"]);
    }

    #[test]
    fn test_duplicate_ids_fail() {
        let err = run(vec![
            raw("7", "1990-01-01", "2020-01-01", &days_ago(40)),
            raw("7", "1985-05-05", "2021-01-01", &days_ago(50)),
            raw("8", "1985-05-05", "2021-01-01", &days_ago(50)),
        ])
        .unwrap_err();

        match err {
            EtlError::Validation(ValidationError::DuplicateCustomerIds(ids)) => {
                assert_eq!(ids, vec!["7".to_string()]);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_ids_compared_as_text() {
        let output = run(vec![
            raw("07", "1990-01-01", "2020-01-01", &days_ago(40)),
            raw("7", "1990-01-01", "2020-01-01", &days_ago(40)),
            raw(" 7", "1990-01-01", "2020-01-01", &days_ago(40)),
        ])
        .unwrap();

        let ids: Vec<_> = output.records().iter().map(|c| c.customer_id.as_str()).collect();
        assert_eq!(ids, ["07", "7", " 7"]);
    }

    #[test]
    fn test_duplicates_among_filtered_records_are_allowed() {
        let output = run(vec![
            raw("7", "1990-01-01", "2020-01-01", &days_ago(40)),
            raw("7", "1990-01-01", "2020-01-01", &days_ago(5)),
            raw("7", "1990-01-01", "garbage", &days_ago(40)),
        ])
        .unwrap();

        assert_eq!(output.len(), 1);
    }

    #[test]
    fn test_output_invariants_hold() {
        let dates = ["1990-01-01", "", "bad", "2099-01-01", "01/02/1970"];
        let lasts = [days_ago(0), days_ago(30), days_ago(31), days_ago(400), "x".to_string()];

        let mut records = Vec::new();
        let mut id = 0;
        for dob in dates {
            for open in dates {
                for last in &lasts {
                    id += 1;
                    records.push(raw(&id.to_string(), dob, open, last));
                }
            }
        }

        let output = run(records).unwrap();
        assert!(!output.is_empty());
        for customer in output.records() {
            assert!(customer.age >= 0);
            assert!(customer.days_since_last_consultation > RECENCY_THRESHOLD_DAYS);
            assert!(!customer.customer_id.is_empty());
        }
    }

    #[test]
    fn test_transform_is_idempotent() {
        let first = run(vec![
            raw("1", "1990-01-01", "2020-01-01", &days_ago(40)),
            raw("2", "1980-07-15 08:30:00", "2019-03-03", "2023-12-24 23:59:59.5"),
            raw("3", "1990-01-01", "2020-01-01", &days_ago(3)),
        ])
        .unwrap();
        assert_eq!(first.len(), 2);

        let second = CustomerTransformer::new(now())
            .transform(first.clone().into_raw())
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_derive_age_unknown() {
        assert_eq!(derive_age(now(), None), -1);
    }

    #[test]
    fn test_days_between_floors() {
        let half_day_ahead = now() + Duration::hours(12);
        assert_eq!(days_between(now(), half_day_ahead), -1);

        let almost_two_days = now() - Duration::hours(47);
        assert_eq!(days_between(now(), almost_two_days), 1);
    }
}
