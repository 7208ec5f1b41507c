//! Fetch, merge and write: the collection pipeline entry point.

use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use econ_core::data::{merge_tables, FetchError, FetchProgress, FredClient, SeriesSource};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ConfigError, EmptyPolicy, PipelineConfig};
use crate::dispatch::dispatch_all;
use crate::export;

/// Errors that end a run. Per-series fetch failures are not among them;
/// they are reported in [`RunSummary::failed`].
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to create FRED client: {0}")]
    Client(#[from] FetchError),

    #[error("failed to start fetch workers: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("no series returned data ({failed} failed, {empty} empty)")]
    NoData { failed: usize, empty: usize },

    #[error("export failed: {0:#}")]
    Export(anyhow::Error),
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Path of the merged output file.
    pub output_path: PathBuf,
    pub row_count: usize,
    /// Output columns after `date`, in configured order.
    pub columns: Vec<String>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    /// Series that yielded data, in completion order.
    pub succeeded: Vec<String>,
    /// Series that returned no numeric observations.
    pub empty: Vec<String>,
    /// `(display name, error)` for each failed series.
    pub failed: Vec<(String, String)>,
    /// BLAKE3 hex digest of the written file.
    pub output_hash: String,
}

impl RunSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty() && self.empty.is_empty()
    }
}

/// Run the pipeline against the FRED endpoint named in `config`.
pub fn run_pipeline(
    config: &PipelineConfig,
    progress: &dyn FetchProgress,
) -> Result<RunSummary, PipelineError> {
    config.validate()?;
    let client = FredClient::with_endpoint(config.api_key()?, &config.endpoint, config.timeout())?;
    run_with_source(config, &client, progress)
}

/// Run the pipeline against any series source.
///
/// 1. Fetch every configured series in parallel.
/// 2. Merge the non-empty tables on date.
/// 3. Write `economic_indicators.csv` and remove per-series leftovers.
pub fn run_with_source(
    config: &PipelineConfig,
    source: &dyn SeriesSource,
    progress: &dyn FetchProgress,
) -> Result<RunSummary, PipelineError> {
    config.validate()?;
    let output_dir = config.output_dir.as_path();

    tracing::info!(
        series = config.series.len(),
        workers = config.max_workers,
        output_dir = %output_dir.display(),
        "collecting series"
    );

    let outcome = dispatch_all(
        source,
        &config.series,
        config.max_workers,
        progress,
        |table| {
            if config.write_series_files {
                if let Err(e) = export::save_series(table, output_dir) {
                    tracing::warn!(series = table.name(), error = %format!("{e:#}"), "failed to write series file");
                }
            }
        },
    )?;

    if !outcome.any_data() {
        match config.empty_policy {
            EmptyPolicy::Fail => {
                return Err(PipelineError::NoData {
                    failed: outcome.failed.len(),
                    empty: outcome.empty.len(),
                })
            }
            EmptyPolicy::WriteEmpty => {
                tracing::warn!("no series returned data, writing an empty table");
            }
        }
    }

    let merged = merge_tables(outcome.tables, &config.series);

    let output_path = export::save_merged(&merged, output_dir).map_err(PipelineError::Export)?;
    export::remove_series_files(output_dir, &outcome.succeeded);

    let bytes = std::fs::read(&output_path)
        .with_context(|| format!("failed to read back {}", output_path.display()))
        .map_err(PipelineError::Export)?;
    let output_hash = blake3::hash(&bytes).to_hex().to_string();

    Ok(RunSummary {
        output_path,
        row_count: merged.rows.len(),
        first_date: merged.rows.first().map(|r| r.date),
        last_date: merged.rows.last().map(|r| r.date),
        columns: merged.columns,
        succeeded: outcome.succeeded,
        empty: outcome.empty,
        failed: outcome
            .failed
            .into_iter()
            .map(|(s, e)| (s.name, e.to_string()))
            .collect(),
        output_hash,
    })
}
