/// Data analysis for the venue flood watch service.
///
/// Submodules:
/// - `stats` — summary statistics over a station's daily history.

pub mod stats;
