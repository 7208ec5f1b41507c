//! Series source trait, fetch errors and progress callbacks.
//!
//! The SeriesSource trait abstracts over where observations come from so the
//! dispatcher can run against the FRED client in production and a stub in tests.

use super::table::SeriesTable;
use crate::series::SeriesDescriptor;
use thiserror::Error;

/// Why a single series produced no table.
///
/// None of these are fatal for a run: the series is logged and dropped.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("HTTP {status}{}", .message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
    Status {
        status: u16,
        message: Option<String>,
    },

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("fetch task panicked: {0}")]
    Panicked(String),
}

/// A source of normalized series tables.
pub trait SeriesSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Fetch and normalize one series. An `Ok` table may be empty when the
    /// series has no numeric observations.
    fn fetch(&self, series: &SeriesDescriptor) -> Result<SeriesTable, FetchError>;
}

/// How one dispatched series ended.
#[derive(Debug)]
pub enum FetchOutcome<'a> {
    Loaded { rows: usize },
    Empty,
    Failed(&'a FetchError),
}

/// Progress callback for multi-series fetches. Callbacks arrive in
/// completion order from a single consumer thread.
pub trait FetchProgress {
    /// Called when a series fetch completes. `completed` counts from 1.
    fn on_complete(
        &self,
        series: &SeriesDescriptor,
        completed: usize,
        total: usize,
        outcome: FetchOutcome<'_>,
    );

    /// Called when every dispatched series has completed.
    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Progress reporter that emits tracing events.
pub struct LogProgress;

impl FetchProgress for LogProgress {
    fn on_complete(
        &self,
        series: &SeriesDescriptor,
        completed: usize,
        total: usize,
        outcome: FetchOutcome<'_>,
    ) {
        match outcome {
            FetchOutcome::Loaded { rows } => tracing::info!(
                series = %series.name,
                id = %series.id,
                rows,
                "[{completed}/{total}] series loaded"
            ),
            FetchOutcome::Empty => tracing::warn!(
                series = %series.name,
                id = %series.id,
                "[{completed}/{total}] series returned no numeric observations"
            ),
            FetchOutcome::Failed(e) => tracing::error!(
                series = %series.name,
                id = %series.id,
                error = %e,
                "[{completed}/{total}] series fetch failed"
            ),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        tracing::info!(succeeded, failed, total, "fetch complete");
    }
}

/// Progress reporter that stays silent.
pub struct NoProgress;

impl FetchProgress for NoProgress {
    fn on_complete(&self, _: &SeriesDescriptor, _: usize, _: usize, _: FetchOutcome<'_>) {}

    fn on_batch_complete(&self, _: usize, _: usize, _: usize) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_includes_api_message() {
        let e = FetchError::Status {
            status: 400,
            message: Some("Bad Request. Variable api_key is not set.".into()),
        };
        assert_eq!(
            e.to_string(),
            "HTTP 400: Bad Request. Variable api_key is not set."
        );
    }

    #[test]
    fn status_error_without_message() {
        let e = FetchError::Status {
            status: 500,
            message: None,
        };
        assert_eq!(e.to_string(), "HTTP 500");
    }
}
