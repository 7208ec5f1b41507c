//! Date-aligned merge of per-series tables.
//!
//! Given tables for several series, build one table on the union of their
//! dates. A series without an observation on a date gets an empty cell; no
//! values are filled in.

use super::table::{is_metadata_column, SeriesTable};
use crate::series::SeriesDescriptor;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashMap};

/// One output row: a date and one cell per column.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRow {
    pub date: NaiveDate,
    pub values: Vec<Option<Decimal>>,
}

/// Outer join of all series tables on date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedTable {
    /// Column names in configured series order.
    pub columns: Vec<String>,
    /// Rows sorted ascending by date. Each row has `columns.len()` cells.
    pub rows: Vec<MergedRow>,
}

impl MergedTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell lookup by date and column name.
    pub fn value(&self, date: NaiveDate, column: &str) -> Option<Decimal> {
        let col = self.column_index(column)?;
        let row = self
            .rows
            .binary_search_by_key(&date, |r| r.date)
            .ok()
            .map(|i| &self.rows[i])?;
        row.values[col]
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.rows.iter().map(|r| r.date)
    }
}

/// Merge tables into one date-aligned table.
///
/// Columns follow `order`, keeping only series that have a non-empty table.
/// Tables whose name is not in `order`, or that are metadata columns, are
/// dropped. The result does not depend on the order of `tables`. If two
/// tables share a name the first one is used.
pub fn merge_tables(tables: Vec<SeriesTable>, order: &[SeriesDescriptor]) -> MergedTable {
    let mut by_name: HashMap<String, SeriesTable> = HashMap::new();
    for table in tables {
        if table.is_empty() || is_metadata_column(table.name()) {
            continue;
        }
        by_name.entry(table.name().to_string()).or_insert(table);
    }

    let mut columns: Vec<String> = Vec::new();
    for series in order {
        if by_name.contains_key(&series.name) && !columns.contains(&series.name) {
            columns.push(series.name.clone());
        }
    }

    let selected: Vec<&SeriesTable> = columns.iter().map(|c| &by_name[c]).collect();

    // Collect the union of all dates
    let all_dates: BTreeSet<NaiveDate> = selected.iter().flat_map(|t| t.dates()).collect();

    let rows = all_dates
        .into_iter()
        .map(|date| MergedRow {
            date,
            values: selected.iter().map(|t| t.get(date)).collect(),
        })
        .collect();

    MergedTable { columns, rows }
}
