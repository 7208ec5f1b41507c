//! Per-series observation table and response normalization.
//!
//! A FRED observation record looks like:
//!
//! ```text
//! {"realtime_start":"2024-05-01","realtime_end":"2024-05-01","date":"2024-04-01","value":"3.9"}
//! ```
//!
//! Normalization keeps `date` as the row key, renames `value` to the series
//! display name, drops rows whose value is not numeric (FRED uses `"."` for
//! missing observations) and drops every `realtime*` metadata column.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Column-name prefix of metadata fields emitted by the API.
pub const REALTIME_PREFIX: &str = "realtime";

/// Date format used by the API and by the output file.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// True for metadata columns that never reach a table.
pub fn is_metadata_column(name: &str) -> bool {
    name.starts_with(REALTIME_PREFIX)
}

/// Parse an observation value. Accepts JSON strings and numbers; anything
/// without a digit (`"."`, `""`, `"NaN"`) is rejected, and so is a number
/// whose magnitude exceeds [`Decimal::MAX`] (about 7.9e28).
pub fn parse_value(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if !text.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn parse_date(value: &Value) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.as_str()?.trim(), DATE_FORMAT).ok()
}

/// A single named value column keyed by date. Dates are unique and iterate
/// in ascending order.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesTable {
    name: String,
    values: BTreeMap<NaiveDate, Decimal>,
}

impl SeriesTable {
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: BTreeMap::new(),
        }
    }

    /// Build a table from already-parsed points. Later duplicates are ignored.
    pub fn from_points(
        name: impl Into<String>,
        points: impl IntoIterator<Item = (NaiveDate, Decimal)>,
    ) -> Self {
        let mut table = Self::empty(name);
        for (date, value) in points {
            table.values.entry(date).or_insert(value);
        }
        table
    }

    /// Normalize raw observation records into a table named `name`.
    pub fn from_records(name: &str, records: &[Map<String, Value>]) -> Self {
        let mut table = Self::empty(name);
        if is_metadata_column(name) {
            tracing::debug!(series = name, "display name is a metadata column, dropping");
            return table;
        }

        let mut dropped = 0usize;
        let mut duplicates = 0usize;
        for record in records {
            let date = record.get("date").and_then(parse_date);
            let value = record.get("value").and_then(parse_value);
            match (date, value) {
                (Some(date), Some(value)) => {
                    if table.values.contains_key(&date) {
                        duplicates += 1;
                    } else {
                        table.values.insert(date, value);
                    }
                }
                _ => dropped += 1,
            }
        }

        if dropped > 0 || duplicates > 0 {
            tracing::debug!(series = name, dropped, duplicates, "skipped observation rows");
        }
        table
    }

    /// Display name, also the column header.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, date: NaiveDate) -> Option<Decimal> {
        self.values.get(&date).copied()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.values.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, Decimal)> + '_ {
        self.values.iter().map(|(d, v)| (*d, *v))
    }

    /// First and last observation date.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.values.keys().next()?;
        let last = self.values.keys().next_back()?;
        Some((*first, *last))
    }
}
