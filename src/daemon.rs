/// Notification scheduler: the service's recurring background loop.
///
/// Each cycle:
/// 1. Refreshes every station in process (fetch, median, classify)
/// 2. Matches each venue to its nearest station
/// 3. Emits one notification per venue whose station is at medium or high
///    risk and that has at least one subscriber
///
/// Then waits out the rest of the period. A venue whose matching or
/// delivery fails (including a panicking notifier) is logged and counted,
/// and the remaining venues are still handled in the same cycle.

use chrono::{DateTime, Utc};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crate::alert::notify::Notifier;
use crate::logging::{self, Component};
use crate::model::{NotificationEvent, RiskLevel, StationReading, Venue};
use crate::proximity;
use crate::stations::{Snapshot, StationRegistry};
use crate::subscriptions::SubscriptionRegistry;

// ---------------------------------------------------------------------------
// Cycle report
// ---------------------------------------------------------------------------

/// What one cycle did.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub stations_refreshed: usize,
    pub stations_unknown: usize,
    pub venue_errors: usize,
    pub events: Vec<NotificationEvent>,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

pub struct NotificationScheduler {
    venues: Vec<Venue>,
    stations: Arc<StationRegistry>,
    subscriptions: Arc<SubscriptionRegistry>,
    notifier: Arc<dyn Notifier>,
    period: Duration,
}

impl NotificationScheduler {
    pub fn new(
        venues: Vec<Venue>,
        stations: Arc<StationRegistry>,
        subscriptions: Arc<SubscriptionRegistry>,
        notifier: Arc<dyn Notifier>,
        period: Duration,
    ) -> Self {
        Self {
            venues,
            stations,
            subscriptions,
            notifier,
            period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Runs one refresh-and-notify cycle.
    pub fn run_cycle(&self) -> CycleReport {
        let started_at = Utc::now();
        let snapshot = self.stations.refresh_all();

        let stations_unknown = snapshot
            .iter()
            .filter(|(_, r)| r.risk == RiskLevel::Unknown)
            .count();

        let mut events = Vec::new();
        let mut venue_errors = 0;
        let unknown = StationReading::unknown();

        for venue in &self.venues {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.check_venue(venue, &snapshot, &unknown)));
            match outcome {
                Ok(Ok(Some(event))) => events.push(event),
                Ok(Ok(None)) => {}
                Ok(Err(message)) => {
                    logging::error(Component::Scheduler, Some(&venue.id), &message);
                    venue_errors += 1;
                }
                Err(_) => {
                    logging::error(Component::Scheduler, Some(&venue.id), "notification panicked; skipping venue");
                    venue_errors += 1;
                }
            }
        }

        CycleReport {
            started_at,
            stations_refreshed: snapshot.len(),
            stations_unknown,
            venue_errors,
            events,
        }
    }

    /// Matches one venue to its station and notifies its subscribers if the
    /// station is elevated. Returns the event that was delivered, if any.
    fn check_venue(
        &self,
        venue: &Venue,
        snapshot: &Snapshot,
        unknown: &StationReading,
    ) -> Result<Option<NotificationEvent>, String> {
        let station = proximity::nearest_station(venue, self.stations.stations()).map_err(|e| e.to_string())?;

        let risk = snapshot.get(&station.site).unwrap_or(unknown).risk;
        if !risk.is_elevated() {
            return Ok(None);
        }

        let subscribers = self.subscriptions.list_subscribers(&venue.id);
        if subscribers.is_empty() {
            logging::debug(
                Component::Scheduler,
                Some(&venue.id),
                &format!("risk={} at {} but no subscribers", risk, station.site),
            );
            return Ok(None);
        }

        let event = NotificationEvent {
            venue_id: venue.id.clone(),
            venue_name: venue.name.clone(),
            station_site: station.site.clone(),
            risk,
            subscriber_count: subscribers.len(),
        };
        self.notifier.notify(&event, &subscribers);
        Ok(Some(event))
    }

    /// Runs cycles until a shutdown signal arrives (or its sender is dropped).
    ///
    /// The signal is only observed between cycles, so a cycle in progress
    /// always completes. Returns the number of cycles run.
    pub fn run(&self, shutdown: &Receiver<()>) -> usize {
        logging::info(
            Component::Scheduler,
            None,
            &format!(
                "Starting scheduler: {} stations, {} venues, period {}s",
                self.stations.stations().len(),
                self.venues.len(),
                self.period.as_secs()
            ),
        );

        let mut cycles = 0;
        loop {
            let start = Instant::now();

            match panic::catch_unwind(AssertUnwindSafe(|| self.run_cycle())) {
                Ok(report) => {
                    let message = format!(
                        "Cycle complete: {} stations ({} unknown), {} notifications",
                        report.stations_refreshed,
                        report.stations_unknown,
                        report.events.len()
                    );
                    logging::info(Component::Scheduler, None, &message);
                }
                Err(_) => {
                    logging::error(Component::Scheduler, None, "cycle aborted by panic; continuing");
                }
            }
            cycles += 1;

            // Sleep until next period, waking early on shutdown
            let wait = self.period.saturating_sub(start.elapsed());
            match shutdown.recv_timeout(wait) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {}
            }
        }

        logging::info(Component::Scheduler, None, &format!("Scheduler stopped after {} cycles", cycles));
        cycles
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
