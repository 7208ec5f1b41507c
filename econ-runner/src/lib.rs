//! Econ Runner: collection pipeline orchestration.
//!
//! This crate builds on `econ-core` to provide:
//! - Explicit pipeline configuration (TOML, env override for the API key)
//! - Parallel dispatch of series fetches on a bounded worker pool
//! - CSV export of the merged table and cleanup of per-series files
//! - The `run_pipeline` entry point and its run summary

pub mod config;
pub mod dispatch;
pub mod export;
pub mod pipeline;

pub use config::{ConfigError, EmptyPolicy, PipelineConfig, API_KEY_ENV};
pub use dispatch::{dispatch_all, DispatchOutcome};
pub use export::{save_merged, MERGED_FILE_NAME};
pub use pipeline::{run_pipeline, run_with_source, PipelineError, RunSummary};
