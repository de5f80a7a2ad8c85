/// Risk evaluation and subscriber notification.
///
/// Submodules:
/// - `risk`   — current-vs-median flood risk classification.
/// - `notify` — the delivery contract for elevated-risk notifications.

pub mod notify;
pub mod risk;
