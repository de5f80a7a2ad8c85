/// flowatch_service: river gage flood-risk watch for waterfront venues.
///
/// # Module structure
///
/// ```text
/// flowatch_service
/// ├── model         — shared data types (Station, Venue, StationReading, RiskLevel, errors)
/// ├── config        — service configuration loader (flowatch.toml)
/// ├── logging       — structured console/file logging
/// ├── ingest
/// │   ├── usgs      — USGS NWIS IV/DV API: URLs, JSON parsing, HTTP client
/// │   └── fixtures (test only) — representative API response payloads
/// ├── analysis
/// │   └── stats     — median of daily history
/// ├── alert
/// │   ├── risk      — current-vs-median risk classification
/// │   └── notify    — notification delivery contract + logging stub
/// ├── stations      — station registry with atomic per-cycle snapshots
/// ├── proximity     — nearest-station matching for venues
/// ├── subscriptions — per-venue subscriber registry
/// ├── daemon        — recurring refresh-and-notify scheduler
/// ├── service       — core boundary (list stations/venues, subscribe)
/// └── endpoint      — JSON HTTP API over the service
/// ```

pub mod alert;
pub mod analysis;
pub mod config;
pub mod daemon;
pub mod endpoint;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod proximity;
pub mod service;
pub mod stations;
pub mod subscriptions;
