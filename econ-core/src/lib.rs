//! Econ Core: series descriptors, the FRED fetcher, and the date-aligned merge.
//!
//! This crate contains the data side of the indicator collector:
//! - Series descriptors and the built-in indicator catalog
//! - Per-series observation tables and response normalization
//! - The FRED observations client behind the `SeriesSource` trait
//! - Outer join of series tables on date

pub mod data;
pub mod series;

pub use series::{default_catalog, SeriesDescriptor};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: types handed across dispatcher threads are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<SeriesDescriptor>();
        require_sync::<SeriesDescriptor>();
        require_send::<data::SeriesTable>();
        require_sync::<data::SeriesTable>();
        require_send::<data::FetchError>();
        require_sync::<data::FetchError>();
        require_send::<data::FredClient>();
        require_sync::<data::FredClient>();
        require_send::<data::MergedTable>();
        require_sync::<data::MergedTable>();
    }

    /// The source trait must be usable as a shared trait object from worker threads.
    #[test]
    fn series_source_is_object_safe_and_shareable() {
        fn _check(source: &dyn data::SeriesSource, series: &SeriesDescriptor) {
            fn require_sync<T: Sync + ?Sized>(_: &T) {}
            require_sync(source);
            let _ = source.fetch(series);
        }
    }
}
