use crate::types::worker::{CachedResponse, RequestKey};

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

type Generation = HashMap<RequestKey, CachedResponse>;

/// Named cache generations. A lost write only costs freshness, so a poisoned
/// lock is recovered rather than propagated.
#[derive(Debug, Default)]
pub struct CacheStorage {
    generations: Mutex<HashMap<String, Generation>>,
}

impl CacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Generation>> {
        self.generations.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates the generation if it does not exist yet.
    pub fn open(&self, generation: &str) {
        self.lock().entry(generation.to_string()).or_default();
    }

    pub fn put(&self, generation: &str, key: RequestKey, response: CachedResponse) {
        self.lock()
            .entry(generation.to_string())
            .or_default()
            .insert(key, response);
    }

    pub fn lookup(&self, generation: &str, key: &RequestKey) -> Option<CachedResponse> {
        self.lock()
            .get(generation)
            .and_then(|entries| entries.get(key))
            .cloned()
    }

    pub fn generations(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn delete(&self, generation: &str) -> bool {
        self.lock().remove(generation).is_some()
    }

    pub fn entry_count(&self, generation: &str) -> usize {
        self.lock().get(generation).map_or(0, HashMap::len)
    }
}
