//! End-to-end pipeline runs against a mock FRED server.

use econ_core::data::NoProgress;
use econ_core::SeriesDescriptor;
use econ_runner::{run_pipeline, PipelineConfig, MERGED_FILE_NAME};
use httpmock::prelude::*;
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;

const PATH: &str = "/fred/series/observations";

fn observations(points: &[(&str, &str)]) -> Value {
    let obs: Vec<Value> = points
        .iter()
        .map(|(date, value)| {
            json!({
                "realtime_start": "2024-06-01",
                "realtime_end": "2024-06-01",
                "date": date,
                "value": value,
            })
        })
        .collect();
    json!({ "realtime_start": "2024-06-01", "observations": obs })
}

fn mock_series(server: &MockServer, id: &str, points: &[(&str, &str)], delay_ms: u64) {
    let body = observations(points);
    server.mock(|when, then| {
        when.method(GET).path(PATH).query_param("series_id", id);
        then.status(200)
            .delay(Duration::from_millis(delay_ms))
            .json_body(body);
    });
}

fn config(server: &MockServer, dir: &Path, series: &[(&str, &str)]) -> PipelineConfig {
    PipelineConfig {
        api_key: Some("test-key".into()),
        endpoint: server.url(PATH),
        output_dir: dir.join("out"),
        series: series
            .iter()
            .map(|(id, name)| SeriesDescriptor::new(*id, *name))
            .collect(),
        ..PipelineConfig::default()
    }
}

#[test]
fn http_500_series_is_omitted_and_run_succeeds() {
    let server = MockServer::start();
    mock_series(&server, "A", &[("2020-01-01", "1.5"), ("2020-02-01", "1.6")], 0);
    mock_series(&server, "B", &[("2020-01-01", "200")], 0);
    server.mock(|when, then| {
        when.method(GET).path(PATH).query_param("series_id", "X");
        then.status(500);
    });

    let tmp = tempfile::tempdir().unwrap();
    let cfg = config(&server, tmp.path(), &[("A", "Alpha"), ("X", "Broken"), ("B", "Beta")]);

    let summary = run_pipeline(&cfg, &NoProgress).unwrap();

    assert_eq!(summary.columns, vec!["Alpha", "Beta"]);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].0, "Broken");

    let text = std::fs::read_to_string(tmp.path().join("out").join(MERGED_FILE_NAME)).unwrap();
    assert_eq!(text, "date,Alpha,Beta\n2020-01-01,1.5,200\n2020-02-01,1.6,\n");
}

#[test]
fn disjoint_ranges_merge_into_four_rows() {
    let server = MockServer::start();
    mock_series(&server, "A", &[("2020-01-01", "1"), ("2020-01-02", "2")], 0);
    mock_series(&server, "B", &[("2020-01-03", "3"), ("2020-01-04", "4")], 0);

    let tmp = tempfile::tempdir().unwrap();
    let cfg = config(&server, tmp.path(), &[("A", "A"), ("B", "B")]);

    let summary = run_pipeline(&cfg, &NoProgress).unwrap();
    assert_eq!(summary.row_count, 4);

    let text = std::fs::read_to_string(&summary.output_path).unwrap();
    assert_eq!(
        text,
        "date,A,B\n2020-01-01,1,\n2020-01-02,2,\n2020-01-03,,3\n2020-01-04,,4\n"
    );
}

#[test]
fn column_order_ignores_completion_order() {
    let server = MockServer::start();
    // The first configured series answers last.
    mock_series(&server, "SLOW", &[("2021-01-01", "1")], 400);
    mock_series(&server, "MID", &[("2021-01-01", "2")], 150);
    mock_series(&server, "FAST", &[("2021-01-01", "3")], 0);

    let tmp = tempfile::tempdir().unwrap();
    let cfg = config(
        &server,
        tmp.path(),
        &[("SLOW", "slow"), ("MID", "mid"), ("FAST", "fast")],
    );

    let summary = run_pipeline(&cfg, &NoProgress).unwrap();

    assert_eq!(summary.succeeded.first().map(String::as_str), Some("fast"));
    assert_eq!(summary.columns, vec!["slow", "mid", "fast"]);
    let text = std::fs::read_to_string(&summary.output_path).unwrap();
    assert_eq!(text, "date,slow,mid,fast\n2021-01-01,1,2,3\n");
}

#[test]
fn realtime_columns_never_reach_the_output() {
    let server = MockServer::start();
    mock_series(&server, "A", &[("2020-01-01", "1")], 0);

    let tmp = tempfile::tempdir().unwrap();
    let cfg = config(&server, tmp.path(), &[("A", "A")]);

    let summary = run_pipeline(&cfg, &NoProgress).unwrap();
    let text = std::fs::read_to_string(&summary.output_path).unwrap();
    let header = text.lines().next().unwrap();
    assert_eq!(header, "date,A");
    assert!(!text.contains("realtime"));
}

#[test]
fn repeated_runs_are_byte_identical() {
    let server = MockServer::start();
    mock_series(&server, "A", &[("2020-01-01", "1.10"), ("2020-03-01", ".")], 30);
    mock_series(&server, "B", &[("2020-02-01", "7"), ("2020-01-01", "6")], 0);
    mock_series(&server, "C", &[("2019-12-01", "-2.5")], 10);

    let tmp = tempfile::tempdir().unwrap();
    let cfg = config(&server, tmp.path(), &[("A", "A"), ("B", "B"), ("C", "C")]);

    let first = run_pipeline(&cfg, &NoProgress).unwrap();
    let first_bytes = std::fs::read(&first.output_path).unwrap();
    let second = run_pipeline(&cfg, &NoProgress).unwrap();
    let second_bytes = std::fs::read(&second.output_path).unwrap();

    assert_eq!(first_bytes, second_bytes);
    assert_eq!(first.output_hash, second.output_hash);
    assert_eq!(first.output_hash.len(), 64);
}

#[test]
fn total_outage_writes_header_only_file() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(PATH);
        then.status(503);
    });

    let tmp = tempfile::tempdir().unwrap();
    let cfg = config(&server, tmp.path(), &[("A", "A"), ("B", "B")]);

    let summary = run_pipeline(&cfg, &NoProgress).unwrap();

    assert_eq!(summary.failed.len(), 2);
    assert_eq!(std::fs::read_to_string(&summary.output_path).unwrap(), "date\n");
}

#[test]
fn leftover_series_files_are_removed() {
    let server = MockServer::start();
    mock_series(&server, "A", &[("2020-01-01", "1")], 0);
    server.mock(|when, then| {
        when.method(GET).path(PATH).query_param("series_id", "X");
        then.status(500);
    });

    let tmp = tempfile::tempdir().unwrap();
    let cfg = config(&server, tmp.path(), &[("A", "Alpha"), ("X", "Broken")]);
    let out = tmp.path().join("out");
    std::fs::create_dir_all(&out).unwrap();
    std::fs::write(out.join("Alpha.csv"), "stale").unwrap();
    std::fs::write(out.join("Broken.csv"), "stale").unwrap();

    run_pipeline(&cfg, &NoProgress).unwrap();

    // Only successfully fetched series are cleaned up.
    assert!(!out.join("Alpha.csv").exists());
    assert!(out.join("Broken.csv").exists());
    assert!(out.join(MERGED_FILE_NAME).exists());
}
