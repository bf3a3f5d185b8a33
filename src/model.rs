//! Data structures describing the input and output of a report run.
//!
//! The types in this module form a serialization-friendly model of the
//! library service payload and of the aggregated figures that end up on the
//! report page. They intentionally avoid referencing the rendering crate so
//! the values can be produced, inspected and tested without a PDF backend.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Month, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::SelectionError;

/// Number of week buckets per month. Days 29..=31 fold into the last bucket.
pub const WEEKS_PER_MONTH: usize = 4;

/// A borrow event with an optional return event, as delivered by the library service.
///
/// Dates are accepted as plain ISO dates, naive date-times, or RFC 3339
/// timestamps. Timestamps carrying an offset are normalised to UTC before the
/// calendar date is taken. Any other fields present in the payload are ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    #[serde(deserialize_with = "deserialize_date")]
    borrowed_date: NaiveDate,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    returned_date: Option<NaiveDate>,
}

impl TransactionRecord {
    /// Creates a record for an item that has not been returned yet.
    pub fn borrowed(borrowed_date: NaiveDate) -> Self {
        Self {
            borrowed_date,
            returned_date: None,
        }
    }

    /// Sets the return date and returns the updated record.
    pub fn with_returned(mut self, returned_date: impl Into<Option<NaiveDate>>) -> Self {
        self.returned_date = returned_date.into();
        self
    }

    /// Returns the day the item was borrowed.
    pub fn borrowed_date(&self) -> NaiveDate {
        self.borrowed_date
    }

    /// Returns the day the item came back, if it did.
    pub fn returned_date(&self) -> Option<NaiveDate> {
        self.returned_date
    }
}

const NAIVE_DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Offset forms that RFC 3339 rejects because the seconds are missing.
const SHORT_OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M%:z", "%Y-%m-%dT%H:%M%z"];

fn parse_naive_date_time(value: &str) -> Option<NaiveDateTime> {
    NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

/// Parses the date formats emitted by the library service.
pub fn parse_service_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.with_timezone(&Utc).date_naive());
    }

    // `...T10:00Z` is already UTC.
    if let Some(utc) = value.strip_suffix('Z').or_else(|| value.strip_suffix('z')) {
        return parse_naive_date_time(utc).map(|naive| naive.date());
    }

    for format in SHORT_OFFSET_FORMATS {
        if let Ok(timestamp) = DateTime::parse_from_str(value, format) {
            return Some(timestamp.with_timezone(&Utc).date_naive());
        }
    }

    if let Some(naive) = parse_naive_date_time(value) {
        return Some(naive.date());
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_service_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{}'", raw)))
}

fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_service_date(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{}'", raw))),
    }
}

/// The month and year a report covers.
///
/// Months are zero-based (`0` is January) to match the aggregation window
/// arithmetic; use [`ReportSelection::month_name`] for display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportSelection {
    month: u32,
    year: i32,
}

impl ReportSelection {
    /// Creates a selection, rejecting month indices outside `0..=11`.
    pub fn new(month: u32, year: i32) -> Result<Self, SelectionError> {
        if month > 11 {
            return Err(SelectionError::MonthOutOfRange(month));
        }
        Ok(Self { month, year })
    }

    /// Creates a selection from a month given as a name (`March`, `mar`) or a
    /// one-based number (`3`).
    pub fn parse(month: &str, year: i32) -> Result<Self, SelectionError> {
        let month = parse_month(month)?;
        Self::new(month, year)
    }

    /// Zero-based month index.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Calendar year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// English name of the selected month.
    pub fn month_name(&self) -> &'static str {
        u8::try_from(self.month + 1)
            .ok()
            .and_then(|number| Month::try_from(number).ok())
            .map(|month| month.name())
            .unwrap_or("Unknown")
    }

    /// Indicates whether `date` falls inside the selected month and year.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.month0() == self.month && date.year() == self.year
    }

    /// File name offered for the rendered report.
    pub fn file_name(&self) -> String {
        format!("library-report-{}-{}.pdf", self.month_name(), self.year)
    }
}

impl fmt::Display for ReportSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month_name(), self.year)
    }
}

fn parse_month(value: &str) -> Result<u32, SelectionError> {
    let trimmed = value.trim();

    if let Ok(number) = trimmed.parse::<u32>() {
        return match number {
            1..=12 => Ok(number - 1),
            _ => Err(SelectionError::UnknownMonth(value.to_owned())),
        };
    }

    Month::from_str(trimmed)
        .map(|month| month.number_from_month() - 1)
        .map_err(|_| SelectionError::UnknownMonth(value.to_owned()))
}

/// Borrow and return counts per week bucket for one selected month.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct WeeklyStats {
    pub borrowed: [u32; WEEKS_PER_MONTH],
    pub returned: [u32; WEEKS_PER_MONTH],
}

impl WeeklyStats {
    /// Borrowed minus returned for a zero-based week index.
    pub fn net(&self, week: usize) -> i64 {
        i64::from(self.borrowed[week]) - i64::from(self.returned[week])
    }

    /// Items borrowed across all four weeks.
    pub fn total_borrowed(&self) -> u64 {
        self.borrowed.iter().map(|&count| u64::from(count)).sum()
    }

    /// Items returned across all four weeks.
    pub fn total_returned(&self) -> u64 {
        self.returned.iter().map(|&count| u64::from(count)).sum()
    }

    /// Borrowed minus returned across the whole month.
    pub fn total_net(&self) -> i64 {
        self.total_borrowed() as i64 - self.total_returned() as i64
    }

    /// The four data rows in display order.
    pub fn rows(&self) -> [StatsRow; WEEKS_PER_MONTH] {
        std::array::from_fn(|week| StatsRow {
            label: format!("Week {}", week + 1),
            borrowed: u64::from(self.borrowed[week]),
            returned: u64::from(self.returned[week]),
            net: self.net(week),
        })
    }

    /// The summary row placed below the weekly rows.
    pub fn totals(&self) -> StatsRow {
        StatsRow {
            label: "Total".to_owned(),
            borrowed: self.total_borrowed(),
            returned: self.total_returned(),
            net: self.total_net(),
        }
    }
}

/// A single table row: a label with its borrowed, returned and net figures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatsRow {
    pub label: String,
    pub borrowed: u64,
    pub returned: u64,
    pub net: i64,
}
