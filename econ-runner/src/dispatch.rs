//! Parallel series dispatch.
//!
//! Every configured series becomes one task on a private, bounded rayon pool
//! (not the global one). Tasks send their result over a channel; the calling
//! thread is the only consumer and drains completions in the order they
//! finish, so the collected tables need no locking. A failing or panicking
//! fetch is recorded and never affects its siblings.

use econ_core::data::{FetchError, FetchOutcome, FetchProgress, SeriesSource, SeriesTable};
use econ_core::SeriesDescriptor;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;

/// What came back from one dispatch round.
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    /// Non-empty tables, in completion order.
    pub tables: Vec<SeriesTable>,
    /// Display names of series that yielded data, in completion order.
    pub succeeded: Vec<String>,
    /// Series that returned a table with no numeric observations.
    pub empty: Vec<String>,
    /// Series whose fetch failed.
    pub failed: Vec<(SeriesDescriptor, FetchError)>,
}

impl DispatchOutcome {
    pub fn any_data(&self) -> bool {
        !self.tables.is_empty()
    }
}

/// Fetch every series on at most `max_workers` threads.
///
/// `on_table` runs on the calling thread for each non-empty table as soon as
/// it arrives.
pub fn dispatch_all<F>(
    source: &dyn SeriesSource,
    series: &[SeriesDescriptor],
    max_workers: usize,
    progress: &dyn FetchProgress,
    mut on_table: F,
) -> Result<DispatchOutcome, rayon::ThreadPoolBuildError>
where
    F: FnMut(&SeriesTable),
{
    let total = series.len();
    let threads = max_workers.max(1).min(total.max(1));
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("econ-fetch-{i}"))
        .build()?;

    tracing::debug!(source = source.name(), series = total, threads, "dispatching fetches");

    let (tx, rx) = mpsc::channel::<(usize, Result<SeriesTable, FetchError>)>();
    let mut outcome = DispatchOutcome::default();

    pool.in_place_scope(|scope| {
        for (index, descriptor) in series.iter().enumerate() {
            let tx = tx.clone();
            scope.spawn(move |_| {
                let result = fetch_isolated(source, descriptor);
                // The receiver outlives the scope; a send cannot fail here.
                let _ = tx.send((index, result));
            });
        }
        drop(tx);

        for (done, (index, result)) in rx.iter().enumerate() {
            let descriptor = &series[index];
            let completed = done + 1;
            match result {
                Ok(table) if !table.is_empty() => {
                    progress.on_complete(
                        descriptor,
                        completed,
                        total,
                        FetchOutcome::Loaded { rows: table.len() },
                    );
                    on_table(&table);
                    outcome.succeeded.push(descriptor.name.clone());
                    outcome.tables.push(table);
                }
                Ok(_) => {
                    progress.on_complete(descriptor, completed, total, FetchOutcome::Empty);
                    outcome.empty.push(descriptor.name.clone());
                }
                Err(e) => {
                    progress.on_complete(descriptor, completed, total, FetchOutcome::Failed(&e));
                    outcome.failed.push((descriptor.clone(), e));
                }
            }
        }
    });

    progress.on_batch_complete(outcome.succeeded.len(), total - outcome.succeeded.len(), total);
    Ok(outcome)
}

/// Run one fetch, turning a panic into a [`FetchError::Panicked`].
fn fetch_isolated(
    source: &dyn SeriesSource,
    series: &SeriesDescriptor,
) -> Result<SeriesTable, FetchError> {
    match panic::catch_unwind(AssertUnwindSafe(|| source.fetch(series))) {
        Ok(result) => result,
        Err(payload) => {
            let msg = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(FetchError::Panicked(msg))
        }
    }
}
