//! Series fetching, normalization and merging

pub mod fred;
pub mod merge;
pub mod provider;
pub mod table;

pub use fred::FredClient;
pub use merge::{merge_tables, MergedRow, MergedTable};
pub use provider::{FetchError, FetchOutcome, FetchProgress, LogProgress, NoProgress, SeriesSource};
pub use table::SeriesTable;
