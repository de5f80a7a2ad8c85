/// Core data types for the venue flood watch service.
///
/// This module defines the shared domain model imported by all other modules:
/// stations, venues, subscribers, per-cycle readings and the error types
/// surfaced at module boundaries. It performs no I/O.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Parameter codes
// ---------------------------------------------------------------------------

/// USGS parameter code for gage height (stage), in feet.
pub const PARAM_GAGE_HEIGHT: &str = "00065";

// ---------------------------------------------------------------------------
// Configured entities
// ---------------------------------------------------------------------------

/// A monitored USGS gauge station. Fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    /// 8-digit USGS site code.
    pub site: String,
    pub name: String,
    pub city: String,
    pub lat: f64,
    pub lon: f64,
}

/// A point of interest whose subscribers follow the nearest station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: String,
    pub name: String,
    pub address: String,
    pub lat: f64,
    pub lon: f64,
}

/// Someone registered for alerts at one venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscriber {
    pub name: Option<String>,
    pub email: String,
}

// ---------------------------------------------------------------------------
// Readings
// ---------------------------------------------------------------------------

/// One daily mean gage height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Latest instantaneous gage height as reported upstream.
/// Both fields are `None` when the fetch failed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurrentGage {
    pub height_ft: Option<f64>,
    pub observed_at: Option<DateTime<FixedOffset>>,
}

/// Discrete flood risk for a station relative to its own recent median.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Unknown,
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Medium and high risk trigger subscriber notification.
    pub fn is_elevated(self) -> bool {
        matches!(self, RiskLevel::Medium | RiskLevel::High)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Unknown => "unknown",
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything computed for one station in one refresh cycle.
///
/// Built in full and then published; never mutated field by field.
#[derive(Debug, Clone, PartialEq)]
pub struct StationReading {
    pub current_height_ft: Option<f64>,
    pub observed_at: Option<DateTime<FixedOffset>>,
    pub history: Vec<HistoryPoint>,
    pub median_height_ft: Option<f64>,
    pub risk: RiskLevel,
}

impl StationReading {
    /// Reading reported for a station that has not been (or could not be) fetched.
    pub fn unknown() -> Self {
        StationReading {
            current_height_ft: None,
            observed_at: None,
            history: Vec::new(),
            median_height_ft: None,
            risk: RiskLevel::Unknown,
        }
    }
}

/// Station listing row, using the field names the web client consumes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationSummary {
    pub site: String,
    pub name: String,
    pub city: String,
    pub lat: f64,
    pub lon: f64,
    pub gage_height_ft: Option<f64>,
    pub time: Option<DateTime<FixedOffset>>,
    pub median_30d: Option<f64>,
    pub history_30d: Vec<HistoryPoint>,
    pub risk: RiskLevel,
}

impl StationSummary {
    pub fn new(station: &Station, reading: &StationReading) -> Self {
        StationSummary {
            site: station.site.clone(),
            name: station.name.clone(),
            city: station.city.clone(),
            lat: station.lat,
            lon: station.lon,
            gage_height_ft: reading.current_height_ft,
            time: reading.observed_at,
            median_30d: reading.median_height_ft,
            history_30d: reading.history.clone(),
            risk: reading.risk,
        }
    }
}

/// Emitted once per cycle for each venue whose governing station is elevated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationEvent {
    pub venue_id: String,
    pub venue_name: String,
    pub station_site: String,
    pub risk: RiskLevel,
    pub subscriber_count: usize,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Failures talking to or decoding the USGS water services.
///
/// These never leave the ingest layer; they are logged and turned into
/// absent/empty readings.
#[derive(Debug, Error, PartialEq)]
pub enum UpstreamError {
    /// Transport failure or timeout.
    #[error("upstream unavailable: {0}")]
    Unavailable(String),
    /// Non-2xx HTTP response.
    #[error("HTTP error: {0}")]
    HttpStatus(u16),
    /// Body was not the expected WaterML JSON envelope.
    #[error("malformed response: {0}")]
    Malformed(String),
    /// Response parsed but carried no series for the requested parameter.
    #[error("no {0} series in response")]
    MissingVariable(String),
}

/// Errors surfaced to callers of `subscribe`.
#[derive(Debug, Error, PartialEq)]
pub enum SubscriptionError {
    #[error("invalid subscription input: {0}")]
    InvalidInput(String),
    #[error("unknown venue: {0}")]
    UnknownVenue(String),
}

/// Deployment errors. Fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("no stations configured")]
    EmptyStationSet,
    #[error("duplicate station site code: {0}")]
    DuplicateStation(String),
    #[error("duplicate venue id: {0}")]
    DuplicateVenue(String),
    #[error("invalid risk thresholds: low margin {low} ft must not exceed high margin {high} ft")]
    InvalidThresholds { low: f64, high: f64 },
    #[error("invalid setting {name}: {reason}")]
    InvalidSetting { name: &'static str, reason: String },
}
