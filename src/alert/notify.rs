/// Notification delivery.
///
/// Delivery is best effort: one call per qualifying venue per cycle, no
/// acknowledgment and no retry. The shipped notifier only logs; an e-mail or
/// SMS transport plugs in by implementing `Notifier`.

use crate::logging::{self, Component};
use crate::model::{NotificationEvent, Subscriber};

/// Delivery channel for elevated-risk notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: &NotificationEvent, subscribers: &[Subscriber]);
}

/// Writes each notification to the service log instead of sending it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: &NotificationEvent, subscribers: &[Subscriber]) {
        logging::warn(
            Component::Notify,
            Some(&event.venue_id),
            &format_notification(event, subscribers.len()),
        );
    }
}

pub fn format_notification(event: &NotificationEvent, recipients: usize) -> String {
    format!(
        "Venue {} risk={} (station {}). Notifying {} subscribers.",
        event.venue_name, event.risk, event.station_site, recipients
    )
}
