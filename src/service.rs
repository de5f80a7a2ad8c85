/// Core service boundary.
///
/// `FloodWatch` wires the registries together from a validated
/// configuration and exposes the operations the HTTP layer serves:
/// station listing, venue listing, subscribe, and the subscription dump.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::alert::notify::Notifier;
use crate::config::ServiceConfig;
use crate::daemon::NotificationScheduler;
use crate::ingest::usgs::GageHistorySource;
use crate::model::{ConfigError, StationSummary, Subscriber, SubscriptionError, Venue};
use crate::stations::{RefreshSettings, StationRegistry};
use crate::subscriptions::SubscriptionRegistry;

#[derive(Clone)]
pub struct FloodWatch {
    config: Arc<ServiceConfig>,
    stations: Arc<StationRegistry>,
    subscriptions: Arc<SubscriptionRegistry>,
}

impl FloodWatch {
    /// Validates `config` and builds the registries around `source`.
    pub fn new(config: ServiceConfig, source: Arc<dyn GageHistorySource>) -> Result<Self, ConfigError> {
        config.validate()?;

        let settings = RefreshSettings {
            history_window_days: config.monitor.history_window_days,
            thresholds: config.risk,
            max_workers: config.monitor.max_workers,
        };
        let stations = StationRegistry::new(config.stations.clone(), source, settings)?;
        let subscriptions = SubscriptionRegistry::new(&config.venues);

        Ok(Self {
            config: Arc::new(config),
            stations: Arc::new(stations),
            subscriptions: Arc::new(subscriptions),
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn station_registry(&self) -> &Arc<StationRegistry> {
        &self.stations
    }

    /// Builds the background scheduler sharing this service's registries.
    pub fn scheduler(&self, notifier: Arc<dyn Notifier>) -> NotificationScheduler {
        NotificationScheduler::new(
            self.config.venues.clone(),
            Arc::clone(&self.stations),
            Arc::clone(&self.subscriptions),
            notifier,
            self.config.monitor.refresh_period(),
        )
    }

    /// Every configured station with its latest reading, in configuration
    /// order. Stations whose fetch failed stay listed with `risk: unknown`.
    pub fn list_stations(&self) -> Vec<StationSummary> {
        self.stations.summaries()
    }

    pub fn list_venues(&self) -> Vec<Venue> {
        self.config.venues.clone()
    }

    pub fn subscribe(
        &self,
        venue_id: &str,
        name: Option<&str>,
        email: &str,
    ) -> Result<String, SubscriptionError> {
        self.subscriptions.subscribe(venue_id, name, email)
    }

    pub fn list_subscribers(&self, venue_id: &str) -> Vec<Subscriber> {
        self.subscriptions.list_subscribers(venue_id)
    }

    /// Diagnostic dump of all subscriptions. Unrestricted.
    pub fn list_subscriptions(&self) -> BTreeMap<String, Vec<Subscriber>> {
        self.subscriptions.list_all()
    }
}
