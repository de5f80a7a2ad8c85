/// Venue-to-station proximity matching.
///
/// Each venue is governed by the single nearest monitored station, measured
/// as great-circle distance (spherical law of cosines, mean Earth radius).

use crate::model::{ConfigError, Station, Venue};

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometers between two points given in degrees.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let delta_lambda = (lon2 - lon1).to_radians();

    // Rounding can push the cosine just past 1.0 for coincident points.
    let cos_angle = phi1.sin() * phi2.sin() + phi1.cos() * phi2.cos() * delta_lambda.cos();
    cos_angle.clamp(-1.0, 1.0).acos() * EARTH_RADIUS_KM
}

/// Returns the station closest to `venue`. Ties go to the station listed first.
///
/// # Errors
/// `ConfigError::EmptyStationSet` if `stations` is empty.
pub fn nearest_station<'a>(venue: &Venue, stations: &'a [Station]) -> Result<&'a Station, ConfigError> {
    let mut best: Option<(&Station, f64)> = None;

    for station in stations {
        let d = distance_km(venue.lat, venue.lon, station.lat, station.lon);
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((station, d)),
        }
    }

    best.map(|(s, _)| s).ok_or(ConfigError::EmptyStationSet)
}
