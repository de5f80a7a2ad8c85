/// In-memory subscriber registry, keyed by venue id.
///
/// The key set is fixed at construction from the configured venues; a
/// subscribe call can only append to an existing venue's list. There is no
/// deduplication and no removal.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use crate::model::{Subscriber, SubscriptionError, Venue};

pub struct SubscriptionRegistry {
    by_venue: RwLock<HashMap<String, Vec<Subscriber>>>,
}

impl SubscriptionRegistry {
    pub fn new(venues: &[Venue]) -> Self {
        let by_venue = venues.iter().map(|v| (v.id.clone(), Vec::new())).collect();
        Self {
            by_venue: RwLock::new(by_venue),
        }
    }

    /// Registers `email` for alerts at `venue_id`, returning the venue id.
    ///
    /// # Errors
    /// - `SubscriptionError::InvalidInput` — venue id or email missing/blank.
    /// - `SubscriptionError::UnknownVenue` — venue id is not configured.
    pub fn subscribe(
        &self,
        venue_id: &str,
        name: Option<&str>,
        email: &str,
    ) -> Result<String, SubscriptionError> {
        let email = email.trim();
        if venue_id.is_empty() || email.is_empty() {
            return Err(SubscriptionError::InvalidInput(
                "venue_id and email required".to_string(),
            ));
        }

        let mut by_venue = self.by_venue.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        let list = by_venue
            .get_mut(venue_id)
            .ok_or_else(|| SubscriptionError::UnknownVenue(venue_id.to_string()))?;

        list.push(Subscriber {
            name: name.map(str::trim).filter(|n| !n.is_empty()).map(String::from),
            email: email.to_string(),
        });

        Ok(venue_id.to_string())
    }

    /// Subscribers for one venue; empty for unknown venues.
    pub fn list_subscribers(&self, venue_id: &str) -> Vec<Subscriber> {
        let by_venue = self.by_venue.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        by_venue.get(venue_id).cloned().unwrap_or_default()
    }

    /// Every venue's subscribers, ordered by venue id.
    pub fn list_all(&self) -> BTreeMap<String, Vec<Subscriber>> {
        let by_venue = self.by_venue.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        by_venue.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}
