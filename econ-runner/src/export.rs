//! CSV export of merged and per-series tables.
//!
//! The merged file is `economic_indicators.csv` with a leading `date` column
//! followed by one column per series. Per-series intermediates are
//! `<display name>.csv` in the same directory and are removed after a
//! successful merged write.
//!
//! All writes go to a `.tmp` sibling first and are renamed into place, so a
//! failed run never leaves a truncated output file behind. Existing files
//! are overwritten.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use econ_core::data::table::DATE_FORMAT;
use econ_core::data::{MergedTable, SeriesTable};

/// Extension shared by the merged file and per-series intermediates.
pub const FILE_EXTENSION: &str = "csv";

/// File name of the merged output.
pub const MERGED_FILE_NAME: &str = "economic_indicators.csv";

/// Header of the leading key column.
pub const DATE_COLUMN: &str = "date";

// ─── CSV rendering ──────────────────────────────────────────────────

/// Render the merged table as CSV. Missing cells are empty.
pub fn merged_csv(table: &MergedTable) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = Vec::with_capacity(table.columns.len() + 1);
    header.push(DATE_COLUMN);
    header.extend(table.columns.iter().map(String::as_str));
    wtr.write_record(&header)?;

    for row in &table.rows {
        let mut record = Vec::with_capacity(row.values.len() + 1);
        record.push(row.date.format(DATE_FORMAT).to_string());
        record.extend(
            row.values
                .iter()
                .map(|v| v.map(|d| d.to_string()).unwrap_or_default()),
        );
        wtr.write_record(&record)?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Render a single series as a two-column CSV.
pub fn series_csv(table: &SeriesTable) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([DATE_COLUMN, table.name()])?;
    for (date, value) in table.iter() {
        wtr.write_record([date.format(DATE_FORMAT).to_string(), value.to_string()])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── File output ────────────────────────────────────────────────────

/// File name of the per-series intermediate for `name`. Path separators in
/// the display name are replaced so the file stays inside the output dir.
pub fn series_file_name(name: &str) -> String {
    let safe: String = name
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!("{safe}.{FILE_EXTENSION}")
}

/// Path of the per-series intermediate file for `name`.
pub fn series_file_path(output_dir: &Path, name: &str) -> PathBuf {
    output_dir.join(series_file_name(name))
}

/// True when two file names would refer to the same file on a
/// case-insensitive file system.
pub fn same_file_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Write `contents` to `path`, creating parent directories as needed.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output dir: {}", parent.display()))?;
    }

    let mut tmp: OsString = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    std::fs::write(&tmp, contents)
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        anyhow::Error::new(e).context(format!("failed to move output into {}", path.display()))
    })?;
    Ok(())
}

/// Save the merged table as `<output_dir>/economic_indicators.csv`.
///
/// Returns the path of the written file.
pub fn save_merged(table: &MergedTable, output_dir: &Path) -> Result<PathBuf> {
    let path = output_dir.join(MERGED_FILE_NAME);
    write_atomic(&path, &merged_csv(table)?)?;
    tracing::info!(path = %path.display(), rows = table.rows.len(), "merged table written");
    Ok(path)
}

/// Save one series as `<output_dir>/<display name>.csv`.
pub fn save_series(table: &SeriesTable, output_dir: &Path) -> Result<PathBuf> {
    let path = series_file_path(output_dir, table.name());
    write_atomic(&path, &series_csv(table)?)?;
    tracing::debug!(path = %path.display(), "series file written");
    Ok(path)
}

/// Delete leftover per-series files for `names`. Missing files are skipped
/// and a failed removal is only logged. The merged output is never removed,
/// even when a name maps onto it. Returns the paths that were removed.
pub fn remove_series_files<S: AsRef<str>>(output_dir: &Path, names: &[S]) -> Vec<PathBuf> {
    let mut removed = Vec::new();
    for name in names {
        let file_name = series_file_name(name.as_ref());
        if same_file_name(&file_name, MERGED_FILE_NAME) {
            tracing::warn!(series = name.as_ref(), "series file name collides with merged output, skipping");
            continue;
        }
        let path = output_dir.join(file_name);
        if !path.exists() {
            continue;
        }
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "series file removed");
                removed.push(path);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove series file");
            }
        }
    }
    removed
}
