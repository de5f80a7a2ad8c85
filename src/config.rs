/// Service configuration loader - parses flowatch.toml
///
/// Keeps the station list, venue list and tuning knobs (history window,
/// risk margins, refresh period, fetch timeouts) out of the code so a
/// deployment can be adjusted without recompiling.

use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::alert::risk::RiskThresholds;
use crate::model::{ConfigError, Station, Venue};

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "flowatch.toml";

/// Longest accepted history window (about ten years of daily values).
pub const MAX_HISTORY_WINDOW_DAYS: u32 = 3650;

/// Polling and fetch settings. Every field may be omitted from the file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Trailing window of daily values used for the median (days).
    pub history_window_days: u32,
    /// Scheduler period (seconds).
    pub refresh_period_secs: u64,
    /// Timeout for the instantaneous-value request (seconds).
    pub current_timeout_secs: u64,
    /// Timeout for the daily-value request (seconds).
    pub history_timeout_secs: u64,
    /// Upper bound on concurrent station fetches.
    pub max_workers: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            history_window_days: 30,
            refresh_period_secs: 60,
            current_timeout_secs: 10,
            history_timeout_secs: 15,
            max_workers: 8,
        }
    }
}

impl MonitorConfig {
    pub fn refresh_period(&self) -> Duration {
        Duration::from_secs(self.refresh_period_secs)
    }

    pub fn current_timeout(&self) -> Duration {
        Duration::from_secs(self.current_timeout_secs)
    }

    pub fn history_timeout(&self) -> Duration {
        Duration::from_secs(self.history_timeout_secs)
    }
}

/// Fully validated service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub risk: RiskThresholds,
    #[serde(rename = "station", default)]
    pub stations: Vec<Station>,
    #[serde(rename = "venue", default)]
    pub venues: Vec<Venue>,
}

impl Default for ServiceConfig {
    /// The Charles River deployment: five USGS gauges between Dover and the
    /// New Charles River Dam, and the two sailing venues on the basin.
    fn default() -> Self {
        let station = |site: &str, name: &str, lat: f64, lon: f64, city: &str| Station {
            site: site.to_string(),
            name: name.to_string(),
            city: city.to_string(),
            lat,
            lon,
        };
        let venue = |id: &str, name: &str, lat: f64, lon: f64, address: &str| Venue {
            id: id.to_string(),
            name: name.to_string(),
            address: address.to_string(),
            lat,
            lon,
        };

        Self {
            monitor: MonitorConfig::default(),
            risk: RiskThresholds::default(),
            stations: vec![
                station("01103500", "Charles River at Dover", 42.256209, -71.260055, "Dover"),
                station("01104500", "Charles River at Waltham", 42.372319, -71.233667, "Waltham"),
                station("01104705", "Charles River at First St (Cambridge)", 42.362222, -71.078611, "Cambridge"),
                station("01104710", "Charles River @ Museum of Science (Boston)", 42.365931, -71.070051, "Boston"),
                station("01104715", "Charles River at New Charles River Dam (Boston)", 42.368889, -71.061667, "Boston"),
            ],
            venues: vec![
                venue("cbi", "Community Boating, Inc. (CBI)", 42.3599, -71.0731, "21 David G Mugar Way, Boston, MA"),
                venue("mit_sailing", "MIT Sailing Pavilion", 42.3573, -71.0953, "134 Memorial Dr, Cambridge, MA"),
            ],
        }
    }
}

impl ServiceConfig {
    /// Parses and validates configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: ServiceConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the deployment invariants the rest of the service relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stations.is_empty() {
            return Err(ConfigError::EmptyStationSet);
        }

        let mut seen = HashSet::new();
        for station in &self.stations {
            if !seen.insert(station.site.as_str()) {
                return Err(ConfigError::DuplicateStation(station.site.clone()));
            }
        }

        let mut seen = HashSet::new();
        for venue in &self.venues {
            if !seen.insert(venue.id.as_str()) {
                return Err(ConfigError::DuplicateVenue(venue.id.clone()));
            }
        }

        self.risk.validate()?;

        let m = &self.monitor;
        if m.history_window_days == 0 {
            return Err(invalid("history_window_days", "must be at least 1 day"));
        }
        if m.history_window_days > MAX_HISTORY_WINDOW_DAYS {
            return Err(invalid(
                "history_window_days",
                &format!("must be at most {} days", MAX_HISTORY_WINDOW_DAYS),
            ));
        }
        if m.refresh_period_secs == 0 {
            return Err(invalid("refresh_period_secs", "must be at least 1 second"));
        }
        if m.current_timeout_secs == 0 || m.history_timeout_secs == 0 {
            return Err(invalid("fetch timeouts", "must be at least 1 second"));
        }
        if m.max_workers == 0 {
            return Err(invalid("max_workers", "must be at least 1"));
        }

        Ok(())
    }

    pub fn find_venue(&self, venue_id: &str) -> Option<&Venue> {
        self.venues.iter().find(|v| v.id == venue_id)
    }
}

fn invalid(name: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidSetting {
        name,
        reason: reason.to_string(),
    }
}

/// Loads and validates the configuration file at `path`.
///
/// Any error here is a deployment problem; callers should treat it as fatal.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ServiceConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;

    ServiceConfig::from_toml_str(&contents)
}
