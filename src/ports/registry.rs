use crate::types::preferences::PreferencesPatch;
use crate::types::push::{PushEndpoint, Subscription, SubscriptionId};

/// Keyed store of push endpoints. At most one subscription exists per
/// endpoint, and mutations on the same endpoint never interleave.
pub trait SubscriptionStore: Send + Sync + 'static {
    /// Replaces any subscription for the same endpoint with a fresh one whose
    /// preferences are the previous (or default) preferences with `patch`
    /// merged on top.
    fn upsert(
        &self,
        endpoint: PushEndpoint,
        patch: &PreferencesPatch,
        client_metadata: Option<String>,
    ) -> Subscription;

    /// Returns whether anything was removed.
    fn remove(&self, endpoint: &str) -> bool;

    /// Removes the endpoint only while it still holds subscription `id`; a
    /// re-registration in the meantime is left alone.
    fn remove_if(&self, endpoint: &str, id: &SubscriptionId) -> bool;

    /// Returns false, and creates nothing, when the endpoint is unknown.
    fn update_preferences(&self, endpoint: &str, patch: &PreferencesPatch) -> bool;

    fn find(&self, endpoint: &str) -> Option<Subscription>;

    fn find_by_id(&self, id: &SubscriptionId) -> Option<Subscription>;

    /// Snapshot in no particular order.
    fn all(&self) -> Vec<Subscription>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
