/// Station registry: the fixed list of monitored gauges and their latest
/// computed readings.
///
/// `refresh_all` fetches every station in parallel on a worker pool, builds a
/// complete `StationReading` per station and then publishes the whole set in
/// a single swap. Readers holding an older `Snapshot` keep a consistent view;
/// nobody ever sees a cycle that is only partly applied.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::mpsc;
use std::sync::{Arc, RwLock};
use threadpool::ThreadPool;

use crate::alert::risk::{self, RiskThresholds};
use crate::analysis::stats;
use crate::ingest::usgs::GageHistorySource;
use crate::logging::{self, Component};
use crate::model::{ConfigError, Station, StationReading, StationSummary};

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Readings for every configured station as of one completed refresh.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// `None` until the first refresh completes.
    pub refreshed_at: Option<DateTime<Utc>>,
    readings: HashMap<String, StationReading>,
}

impl Snapshot {
    fn initial(stations: &[Station]) -> Self {
        Snapshot {
            refreshed_at: None,
            readings: stations
                .iter()
                .map(|s| (s.site.clone(), StationReading::unknown()))
                .collect(),
        }
    }

    pub fn get(&self, site: &str) -> Option<&StationReading> {
        self.readings.get(site)
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &StationReading)> {
        self.readings.iter()
    }
}

// ---------------------------------------------------------------------------
// Refresh settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct RefreshSettings {
    pub history_window_days: u32,
    pub thresholds: RiskThresholds,
    pub max_workers: usize,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            history_window_days: 30,
            thresholds: RiskThresholds::default(),
            max_workers: 8,
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

pub struct StationRegistry {
    stations: Arc<[Station]>,
    source: Arc<dyn GageHistorySource>,
    settings: RefreshSettings,
    current: RwLock<Arc<Snapshot>>,
}

impl StationRegistry {
    /// Creates a registry whose stations all report `unknown` until the
    /// first refresh.
    ///
    /// # Errors
    /// `ConfigError::EmptyStationSet` if `stations` is empty.
    pub fn new(
        stations: Vec<Station>,
        source: Arc<dyn GageHistorySource>,
        settings: RefreshSettings,
    ) -> Result<Self, ConfigError> {
        if stations.is_empty() {
            return Err(ConfigError::EmptyStationSet);
        }

        let initial = Snapshot::initial(&stations);
        Ok(Self {
            stations: stations.into(),
            source,
            settings,
            current: RwLock::new(Arc::new(initial)),
        })
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    /// The most recently completed snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        let guard = self.current.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    /// Station listing in configuration order, joined with the latest readings.
    pub fn summaries(&self) -> Vec<StationSummary> {
        let snapshot = self.snapshot();
        let unknown = StationReading::unknown();
        self.stations
            .iter()
            .map(|s| StationSummary::new(s, snapshot.get(&s.site).unwrap_or(&unknown)))
            .collect()
    }

    /// Refreshes every station and publishes the new snapshot.
    ///
    /// Stations are fetched concurrently; the call returns only after every
    /// station has been attempted. A station whose worker dies without
    /// reporting is published as `unknown`.
    pub fn refresh_all(&self) -> Arc<Snapshot> {
        let workers = self.settings.max_workers.clamp(1, self.stations.len());
        let pool = ThreadPool::with_name("station-refresh".to_string(), workers);
        let (tx, rx) = mpsc::channel();

        for station in self.stations.iter() {
            let tx = tx.clone();
            let source = Arc::clone(&self.source);
            let site = station.site.clone();
            let settings = self.settings;

            pool.execute(move || {
                let reading = compute_reading(source.as_ref(), &site, &settings);
                // Receiver outlives every job; a send error only means the
                // refresh was abandoned.
                let _ = tx.send((site, reading));
            });
        }
        drop(tx);

        let mut readings: HashMap<String, StationReading> = rx.iter().collect();

        for station in self.stations.iter() {
            if !readings.contains_key(&station.site) {
                logging::error(
                    Component::Registry,
                    Some(&station.site),
                    "refresh worker did not report; publishing unknown reading",
                );
                readings.insert(station.site.clone(), StationReading::unknown());
            }
        }

        let snapshot = Arc::new(Snapshot {
            refreshed_at: Some(Utc::now()),
            readings,
        });

        let mut guard = self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::clone(&snapshot);
        snapshot
    }
}

/// Fetches, summarizes and classifies a single station.
pub fn compute_reading(
    source: &dyn GageHistorySource,
    site: &str,
    settings: &RefreshSettings,
) -> StationReading {
    let current = source.fetch_current(site);
    let history = source.fetch_history(site, settings.history_window_days);
    let median = stats::history_median(&history);
    let risk = risk::classify(current.height_ft, median, &settings.thresholds);

    logging::debug(
        Component::Registry,
        Some(site),
        &format!(
            "current={:?} median={:?} days={} risk={}",
            current.height_ft,
            median,
            history.len(),
            risk
        ),
    );

    StationReading {
        current_height_ft: current.height_ft,
        observed_at: current.observed_at,
        history,
        median_height_ft: median,
        risk,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
