/// Upstream data acquisition.
///
/// - `usgs`     — USGS NWIS IV/DV API: URL construction, JSON parsing, HTTP client
/// - `fixtures` (test only) — representative API response payloads

pub mod usgs;

#[cfg(test)]
pub(crate) mod fixtures;
