//! FRED series observations client.
//!
//! Issues one `GET /fred/series/observations` per series and normalizes the
//! JSON body into a [`SeriesTable`]. There are no retries: a failed series is
//! reported to the caller and dropped from the run.

use super::provider::{FetchError, SeriesSource};
use super::table::SeriesTable;
use crate::series::SeriesDescriptor;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;

/// Public observations endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.stlouisfed.org/fred/series/observations";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Successful observations response. Only `observations` is read; FRED also
/// sends paging and unit fields.
#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<Map<String, Value>>,
}

/// Error body FRED returns alongside 4xx statuses.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error_message: Option<String>,
}

/// Blocking FRED client.
pub struct FredClient {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
}

impl FredClient {
    /// Client against the public endpoint with the default timeout.
    pub fn new(api_key: impl Into<String>) -> Result<Self, FetchError> {
        Self::with_endpoint(api_key, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT)
    }

    pub fn with_endpoint(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("econ-indicators/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Query parameters for one series.
    fn query<'a>(&'a self, series_id: &'a str) -> [(&'static str, &'a str); 3] {
        [
            ("series_id", series_id),
            ("api_key", self.api_key.as_str()),
            ("file_type", "json"),
        ]
    }

    fn fetch_series(&self, series: &SeriesDescriptor) -> Result<SeriesTable, FetchError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&self.query(&series.id))
            .send()
            // The URL carries the API key; keep it out of error messages.
            .map_err(|e| FetchError::Request(e.without_url().to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| FetchError::Request(e.without_url().to_string()))?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        parse_observations(&series.name, &body)
    }
}

/// Parse a successful observations body into a table named `name`.
pub fn parse_observations(name: &str, body: &str) -> Result<SeriesTable, FetchError> {
    let resp: ObservationsResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;
    Ok(SeriesTable::from_records(name, &resp.observations))
}

/// Extract FRED's `error_message`, if the body carries one.
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|e| e.error_message)
}

impl SeriesSource for FredClient {
    fn name(&self) -> &str {
        "fred"
    }

    fn fetch(&self, series: &SeriesDescriptor) -> Result<SeriesTable, FetchError> {
        self.fetch_series(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "realtime_start": "2024-06-01",
        "realtime_end": "2024-06-01",
        "observation_start": "1600-01-01",
        "observation_end": "9999-12-31",
        "units": "lin",
        "count": 3,
        "offset": 0,
        "limit": 100000,
        "observations": [
            {"realtime_start": "2024-06-01", "realtime_end": "2024-06-01", "date": "2024-01-01", "value": "3.7"},
            {"realtime_start": "2024-06-01", "realtime_end": "2024-06-01", "date": "2024-02-01", "value": "."},
            {"realtime_start": "2024-06-01", "realtime_end": "2024-06-01", "date": "2024-03-01", "value": "3.8"}
        ]
    }"#;

    #[test]
    fn parses_observations_body() {
        let table = parse_observations("unemployment Ratio", BODY).unwrap();
        assert_eq!(table.name(), "unemployment Ratio");
        assert_eq!(table.len(), 2);
        let dates: Vec<String> = table.dates().map(|d| d.to_string()).collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-03-01"]);
    }

    #[test]
    fn missing_observations_is_decode_error() {
        let err = parse_observations("X", r#"{"count": 0}"#).unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)), "got {err:?}");
    }

    #[test]
    fn non_json_body_is_decode_error() {
        let err = parse_observations("X", "<html>maintenance</html>").unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn error_message_read_from_fred_error_body() {
        let body = r#"{"error_code":400,"error_message":"Bad Request.  The series does not exist."}"#;
        assert_eq!(
            error_message(body).as_deref(),
            Some("Bad Request.  The series does not exist.")
        );
        assert_eq!(error_message("Internal Server Error"), None);
    }

    #[test]
    fn query_carries_series_key_and_format() {
        let client = FredClient::new("secret").unwrap();
        assert_eq!(
            client.query("UNRATE"),
            [
                ("series_id", "UNRATE"),
                ("api_key", "secret"),
                ("file_type", "json")
            ]
        );
        assert_eq!(client.endpoint(), DEFAULT_ENDPOINT);
    }
}
