/// USGS NWIS gage-height client.
///
/// Handles URL construction and JSON response parsing for two USGS Water
/// Services endpoints:
///   https://waterservices.usgs.gov/nwis/iv/  — latest instantaneous value
///   https://waterservices.usgs.gov/nwis/dv/  — daily values over a date range
///
/// Both return WaterML rendered as JSON. See `fixtures.rs` for annotated
/// examples of the response structure.
///
/// Parsing is strict and returns `UpstreamError`; the `GageHistorySource`
/// implementation on `UsgsClient` absorbs those errors so that one station's
/// outage shows up as absent data instead of failing the refresh.

use chrono::{DateTime, Days, Local, NaiveDate};
use serde::Deserialize;
use std::time::Duration;

use crate::config::MonitorConfig;
use crate::logging::{self, Component};
use crate::model::{CurrentGage, HistoryPoint, PARAM_GAGE_HEIGHT, UpstreamError};

// ---------------------------------------------------------------------------
// Source contract
// ---------------------------------------------------------------------------

/// Where station readings come from.
///
/// Implementations must not fail: an unreachable or unusable upstream is
/// reported as `CurrentGage::default()` / an empty history.
pub trait GageHistorySource: Send + Sync {
    /// Latest gage height and its observation time.
    fn fetch_current(&self, site: &str) -> CurrentGage;

    /// Daily gage heights over the trailing `window_days`, ordered by date.
    fn fetch_history(&self, site: &str, window_days: u32) -> Vec<HistoryPoint>;
}

// ---------------------------------------------------------------------------
// Serde structures for WaterML JSON deserialization
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct WaterMlResponse {
    value: ValueWrapper,
}

#[derive(Deserialize)]
struct ValueWrapper {
    #[serde(rename = "timeSeries", default)]
    time_series: Vec<TimeSeries>,
}

#[derive(Deserialize)]
struct TimeSeries {
    variable: Variable,
    #[serde(default)]
    values: Vec<Values>,
}

#[derive(Deserialize)]
struct Variable {
    #[serde(rename = "variableCode", default)]
    variable_code: Vec<VariableCode>,
    #[serde(rename = "noDataValue")]
    no_data_value: Option<f64>,
}

#[derive(Deserialize)]
struct VariableCode {
    value: String,
}

#[derive(Deserialize)]
struct Values {
    #[serde(default)]
    value: Vec<ValueEntry>,
}

#[derive(Deserialize)]
struct ValueEntry {
    value: Option<String>, // USGS returns as string, occasionally null
    #[serde(rename = "dateTime", default)]
    date_time: String,
}

impl TimeSeries {
    fn parameter_code(&self) -> Option<&str> {
        self.variable.variable_code.first().map(|c| c.value.as_str())
    }

    /// Parses an entry's value, rejecting null, empty, unparseable,
    /// non-finite and sentinel values.
    fn measurement(&self, entry: &ValueEntry) -> Option<f64> {
        let raw = entry.value.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        let value: f64 = raw.parse().ok()?;
        if !value.is_finite() {
            return None;
        }
        if let Some(no_data) = self.variable.no_data_value {
            if (value - no_data).abs() < 0.1 {
                return None;
            }
        }
        Some(value)
    }
}

// ---------------------------------------------------------------------------
// URL construction
// ---------------------------------------------------------------------------

const IV_BASE_URL: &str = "https://waterservices.usgs.gov/nwis/iv/";
const DV_BASE_URL: &str = "https://waterservices.usgs.gov/nwis/dv/";

/// Builds a USGS IV API URL for the most recent value of the given
/// parameters at the given sites.
///
/// # Example
/// ```
/// use flowatch_service::ingest::usgs::build_iv_url;
/// use flowatch_service::model::PARAM_GAGE_HEIGHT;
///
/// let url = build_iv_url(&["01104500"], &[PARAM_GAGE_HEIGHT]);
/// assert!(url.contains("sites=01104500"));
/// ```
pub fn build_iv_url(sites: &[&str], param_codes: &[&str]) -> String {
    format!(
        "{}?format=json&sites={}&parameterCd={}",
        IV_BASE_URL,
        sites.join(","),
        param_codes.join(",")
    )
}

/// Builds a USGS Daily Values (DV) API URL for the given sites, parameters
/// and inclusive date range (YYYY-MM-DD).
///
/// # Example
/// ```
/// use flowatch_service::ingest::usgs::build_dv_url;
/// use flowatch_service::model::PARAM_GAGE_HEIGHT;
///
/// let url = build_dv_url(&["01103500"], &[PARAM_GAGE_HEIGHT], "2024-04-01", "2024-05-01");
/// assert!(url.contains("startDT=2024-04-01"));
/// ```
pub fn build_dv_url(sites: &[&str], param_codes: &[&str], start_date: &str, end_date: &str) -> String {
    format!(
        "{}?format=json&sites={}&parameterCd={}&startDT={}&endDT={}",
        DV_BASE_URL,
        sites.join(","),
        param_codes.join(","),
        start_date,
        end_date
    )
}

/// Date range covering the trailing `window_days` up to and including `today`.
pub fn history_range(today: NaiveDate, window_days: u32) -> (NaiveDate, NaiveDate) {
    let start = today
        .checked_sub_days(Days::new(u64::from(window_days)))
        .unwrap_or(NaiveDate::MIN);
    (start, today)
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

fn parse_envelope(json: &str) -> Result<WaterMlResponse, UpstreamError> {
    serde_json::from_str(json)
        .map_err(|e| UpstreamError::Malformed(format!("JSON deserialization failed: {}", e)))
}

/// Parses an IV response into the latest reading of `param_code`.
///
/// The last entry of the matching series is the current reading. A series
/// that is empty or whose latest entry is null or the sentinel yields an
/// absent reading rather than an error. An observation time that is not
/// RFC 3339 is dropped while the height is kept.
///
/// # Errors
/// - `UpstreamError::Malformed` — not a WaterML JSON envelope.
/// - `UpstreamError::MissingVariable` — no series for `param_code`.
pub fn parse_current_response(json: &str, param_code: &str) -> Result<CurrentGage, UpstreamError> {
    let response = parse_envelope(json)?;

    let series = response
        .value
        .time_series
        .iter()
        .find(|s| s.parameter_code() == Some(param_code))
        .ok_or_else(|| UpstreamError::MissingVariable(param_code.to_string()))?;

    let Some(latest) = series.values.first().and_then(|v| v.value.last()) else {
        return Ok(CurrentGage::default());
    };

    let Some(height_ft) = series.measurement(latest) else {
        return Ok(CurrentGage::default());
    };

    Ok(CurrentGage {
        height_ft: Some(height_ft),
        observed_at: DateTime::parse_from_rfc3339(&latest.date_time).ok(),
    })
}

/// Parses a DV response into every usable daily value of `param_code`,
/// ordered by date.
///
/// Entries with a null, empty, unparseable or sentinel value, or with an
/// undated timestamp, are skipped. The date is the `YYYY-MM-DD` prefix of
/// `dateTime`.
///
/// # Errors
/// - `UpstreamError::Malformed` — not a WaterML JSON envelope.
/// - `UpstreamError::MissingVariable` — no series for `param_code`.
pub fn parse_history_response(json: &str, param_code: &str) -> Result<Vec<HistoryPoint>, UpstreamError> {
    let response = parse_envelope(json)?;

    let mut matched = false;
    let mut history = Vec::new();

    for series in response
        .value
        .time_series
        .iter()
        .filter(|s| s.parameter_code() == Some(param_code))
    {
        matched = true;
        for entry in series.values.iter().flat_map(|v| v.value.iter()) {
            let Some(value) = series.measurement(entry) else {
                continue;
            };
            let day = entry.date_time.split('T').next().unwrap_or_default();
            let Ok(date) = NaiveDate::parse_from_str(day, "%Y-%m-%d") else {
                continue;
            };
            history.push(HistoryPoint { date, value });
        }
    }

    if !matched {
        return Err(UpstreamError::MissingVariable(param_code.to_string()));
    }

    history.sort_by_key(|p| p.date);
    Ok(history)
}

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

/// Blocking USGS client with separate timeouts for the two endpoints.
#[derive(Clone)]
pub struct UsgsClient {
    http: reqwest::blocking::Client,
    current_timeout: Duration,
    history_timeout: Duration,
}

impl UsgsClient {
    pub fn new(current_timeout: Duration, history_timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("flowatch_service/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            current_timeout,
            history_timeout,
        })
    }

    pub fn from_config(monitor: &MonitorConfig) -> Result<Self, reqwest::Error> {
        Self::new(monitor.current_timeout(), monitor.history_timeout())
    }

    fn get_body(&self, url: &str, timeout: Duration) -> Result<String, UpstreamError> {
        let response = self
            .http
            .get(url)
            .timeout(timeout)
            .send()
            .map_err(|e| UpstreamError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::HttpStatus(status.as_u16()));
        }

        response
            .text()
            .map_err(|e| UpstreamError::Unavailable(e.to_string()))
    }

    pub fn try_fetch_current(&self, site: &str) -> Result<CurrentGage, UpstreamError> {
        let url = build_iv_url(&[site], &[PARAM_GAGE_HEIGHT]);
        let body = self.get_body(&url, self.current_timeout)?;
        parse_current_response(&body, PARAM_GAGE_HEIGHT)
    }

    pub fn try_fetch_history(
        &self,
        site: &str,
        window_days: u32,
        today: NaiveDate,
    ) -> Result<Vec<HistoryPoint>, UpstreamError> {
        let (start, end) = history_range(today, window_days);
        let url = build_dv_url(
            &[site],
            &[PARAM_GAGE_HEIGHT],
            &start.format("%Y-%m-%d").to_string(),
            &end.format("%Y-%m-%d").to_string(),
        );
        let body = self.get_body(&url, self.history_timeout)?;
        parse_history_response(&body, PARAM_GAGE_HEIGHT)
    }
}

impl GageHistorySource for UsgsClient {
    fn fetch_current(&self, site: &str) -> CurrentGage {
        match self.try_fetch_current(site) {
            Ok(current) => current,
            Err(e) => {
                logging::log_upstream_failure(site, "current gage fetch", &e);
                CurrentGage::default()
            }
        }
    }

    fn fetch_history(&self, site: &str, window_days: u32) -> Vec<HistoryPoint> {
        let today = Local::now().date_naive();
        match self.try_fetch_history(site, window_days, today) {
            Ok(history) => {
                logging::debug(
                    Component::Usgs,
                    Some(site),
                    &format!("{} daily values over {} days", history.len(), window_days),
                );
                history
            }
            Err(e) => {
                logging::log_upstream_failure(site, "history fetch", &e);
                Vec::new()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::fixtures::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // --- URL construction ---------------------------------------------------

    #[test]
    fn test_build_iv_url_targets_iv_endpoint_with_json_format() {
        let url = build_iv_url(&["01104500"], &[PARAM_GAGE_HEIGHT]);
        assert!(
            url.contains("waterservices.usgs.gov/nwis/iv/"),
            "must target the IV endpoint, got: {}",
            url
        );
        assert!(url.contains("format=json"), "must request JSON format");
        assert!(url.contains("parameterCd=00065"), "must request gage height");
    }

    #[test]
    fn test_build_iv_url_uses_comma_separated_sites() {
        let url = build_iv_url(&["01104500", "01103500"], &[PARAM_GAGE_HEIGHT]);
        assert!(url.contains("sites=01104500,01103500"), "got: {}", url);
    }

    #[test]
    fn test_build_dv_url_includes_date_range() {
        let url = build_dv_url(&["01103500"], &[PARAM_GAGE_HEIGHT], "2024-04-01", "2024-05-01");
        assert!(url.contains("waterservices.usgs.gov/nwis/dv/"));
        assert!(url.contains("startDT=2024-04-01"), "must include start date");
        assert!(url.contains("endDT=2024-05-01"), "must include end date");
        assert!(url.contains("sites=01103500"));
    }

    #[test]
    fn test_history_range_spans_window() {
        let (start, end) = history_range(date(2024, 5, 31), 30);
        assert_eq!(start, date(2024, 5, 1));
        assert_eq!(end, date(2024, 5, 31));
    }

    #[test]
    fn test_history_range_saturates_instead_of_overflowing() {
        let (start, end) = history_range(date(2024, 5, 31), u32::MAX);
        assert_eq!(start, NaiveDate::MIN);
        assert_eq!(end, date(2024, 5, 31));
    }

    // --- Current reading ----------------------------------------------------

    #[test]
    fn test_current_takes_last_gage_height_entry() {
        let current = parse_current_response(fixture_waltham_iv_json(), PARAM_GAGE_HEIGHT)
            .expect("valid fixture should parse");

        let height = current.height_ft.expect("height should be present");
        assert!((height - 3.12).abs() < 1e-9, "expected 3.12 ft, got {}", height);

        let observed = current.observed_at.expect("time should be present");
        assert_eq!(observed.to_rfc3339(), "2024-05-01T10:15:00-04:00");
    }

    #[test]
    fn test_current_ignores_discharge_series() {
        let current = parse_current_response(fixture_waltham_iv_json(), PARAM_GAGE_HEIGHT).unwrap();
        assert_ne!(current.height_ft, Some(412.0), "must not pick up discharge");
    }

    #[test]
    fn test_current_missing_variable() {
        let result = parse_current_response(fixture_discharge_only_json(), PARAM_GAGE_HEIGHT);
        assert_eq!(result, Err(UpstreamError::MissingVariable("00065".to_string())));
    }

    #[test]
    fn test_current_sentinel_is_absent() {
        let current = parse_current_response(fixture_sentinel_iv_json(), PARAM_GAGE_HEIGHT).unwrap();
        assert_eq!(current, CurrentGage::default());
    }

    #[test]
    fn test_current_non_finite_is_absent() {
        for raw in ["NaN", "inf", "-Infinity"] {
            let json = fixture_sentinel_iv_json().replace(r#""value": "-999999""#, &format!(r#""value": "{}""#, raw));
            let current = parse_current_response(&json, PARAM_GAGE_HEIGHT).unwrap();
            assert_eq!(current.height_ft, None, "{} must not count as a reading", raw);
        }
    }

    #[test]
    fn test_current_empty_values_is_absent() {
        let current = parse_current_response(fixture_empty_values_json(), PARAM_GAGE_HEIGHT).unwrap();
        assert_eq!(current, CurrentGage::default());
    }

    #[test]
    fn test_current_malformed_json() {
        let result = parse_current_response("{ this is not valid json }}}", PARAM_GAGE_HEIGHT);
        assert!(matches!(result, Err(UpstreamError::Malformed(_))), "got {:?}", result);
    }

    #[test]
    fn test_current_empty_body() {
        let result = parse_current_response("", PARAM_GAGE_HEIGHT);
        assert!(matches!(result, Err(UpstreamError::Malformed(_))));
    }

    #[test]
    fn test_current_unparseable_time_keeps_height() {
        let json = fixture_waltham_iv_json().replace("2024-05-01T10:15:00.000-04:00", "yesterday");
        let current = parse_current_response(&json, PARAM_GAGE_HEIGHT).unwrap();
        assert!(current.height_ft.is_some());
        assert!(current.observed_at.is_none());
    }

    // --- History ------------------------------------------------------------

    #[test]
    fn test_history_skips_null_empty_and_sentinel() {
        let history = parse_history_response(fixture_dover_dv_json(), PARAM_GAGE_HEIGHT)
            .expect("valid fixture should parse");

        let values: Vec<f64> = history.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![2.0, 2.4, 1.8]);
    }

    #[test]
    fn test_history_is_ordered_by_date() {
        let history = parse_history_response(fixture_dover_dv_json(), PARAM_GAGE_HEIGHT).unwrap();
        let dates: Vec<NaiveDate> = history.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![date(2024, 5, 1), date(2024, 5, 2), date(2024, 5, 4)]);
    }

    #[test]
    fn test_history_missing_variable() {
        let result = parse_history_response(fixture_discharge_only_json(), PARAM_GAGE_HEIGHT);
        assert!(matches!(result, Err(UpstreamError::MissingVariable(_))));
    }

    #[test]
    fn test_history_empty_series_is_empty_not_error() {
        let history = parse_history_response(fixture_empty_values_json(), PARAM_GAGE_HEIGHT).unwrap();
        assert!(history.is_empty());
    }

    #[test]
    fn test_history_empty_time_series_array() {
        let json = r#"{ "value": { "timeSeries": [] } }"#;
        let result = parse_history_response(json, PARAM_GAGE_HEIGHT);
        assert!(matches!(result, Err(UpstreamError::MissingVariable(_))));
    }

    // --- Absorbing client ---------------------------------------------------

    #[test]
    fn test_unreachable_upstream_is_absorbed() {
        // Nothing listens on port 9 of the loopback; connect fails fast.
        let client = UsgsClient::new(Duration::from_millis(500), Duration::from_millis(500)).unwrap();
        let err = client.get_body("http://127.0.0.1:9/nwis/iv/", Duration::from_millis(500));
        assert!(
            matches!(err, Err(UpstreamError::Unavailable(_)) | Err(UpstreamError::HttpStatus(_))),
            "got {:?}",
            err
        );
    }
}
