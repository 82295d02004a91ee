use crate::ports::{SubscriptionStore, TimeProvider};
use crate::types::preferences::{Preferences, PreferencesPatch};
use crate::types::push::{PushEndpoint, Subscription, SubscriptionId};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// Process-lifetime registry. Each endpoint's shard lock is held for the
/// whole read-merge-write of a mutation, so concurrent edits to one endpoint
/// serialize while different endpoints proceed in parallel.
#[derive(Debug)]
pub struct InMemoryRegistry<T> {
    entries: DashMap<String, Subscription>,
    time: T,
}

impl<T: TimeProvider> InMemoryRegistry<T> {
    pub fn new(time: T) -> Self {
        Self {
            entries: DashMap::new(),
            time,
        }
    }
}

impl<T: TimeProvider> SubscriptionStore for InMemoryRegistry<T> {
    fn upsert(
        &self,
        endpoint: PushEndpoint,
        patch: &PreferencesPatch,
        client_metadata: Option<String>,
    ) -> Subscription {
        let created_at = self.time.now();
        match self.entries.entry(endpoint.endpoint.clone()) {
            Entry::Occupied(mut occupied) => {
                let preferences = occupied.get().preferences.merged(patch);
                let subscription =
                    Subscription::new(endpoint, preferences, created_at, client_metadata);
                occupied.insert(subscription.clone());
                subscription
            }
            Entry::Vacant(vacant) => {
                let preferences = Preferences::default().merged(patch);
                let subscription =
                    Subscription::new(endpoint, preferences, created_at, client_metadata);
                vacant.insert(subscription.clone());
                subscription
            }
        }
    }

    fn remove(&self, endpoint: &str) -> bool {
        self.entries.remove(endpoint).is_some()
    }

    fn remove_if(&self, endpoint: &str, id: &SubscriptionId) -> bool {
        self.entries
            .remove_if(endpoint, |_, subscription| subscription.id == *id)
            .is_some()
    }

    fn update_preferences(&self, endpoint: &str, patch: &PreferencesPatch) -> bool {
        match self.entries.get_mut(endpoint) {
            Some(mut subscription) => {
                subscription.preferences.apply(patch);
                true
            }
            None => false,
        }
    }

    fn find(&self, endpoint: &str) -> Option<Subscription> {
        self.entries.get(endpoint).map(|entry| entry.value().clone())
    }

    fn find_by_id(&self, id: &SubscriptionId) -> Option<Subscription> {
        self.entries
            .iter()
            .find(|entry| entry.value().id == *id)
            .map(|entry| entry.value().clone())
    }

    fn all(&self) -> Vec<Subscription> {
        self.entries
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
