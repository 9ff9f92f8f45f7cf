use crate::resolution::Resolution;
use crate::subscription::{ConfigKey, Subscription};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

/// The thread-safe registry of active subscriptions. Insertion order is the
/// tie-break order the synchronizer uses when multiple packets share a
/// slice's `end_time`; `add`/`remove` are guarded by a lock, and iteration
/// takes a snapshot so a mid-iteration `remove` can never invalidate an
/// in-progress walk.
pub struct SubscriptionCollection {
    entries: Mutex<Vec<(ConfigKey, Arc<Mutex<Subscription>>)>>,
    fill_forward_resolution_nanos: Arc<AtomicI64>,
}

impl SubscriptionCollection {
    pub fn new() -> Self {
        SubscriptionCollection { entries: Mutex::new(Vec::new()), fill_forward_resolution_nanos: Arc::new(AtomicI64::new(0)) }
    }

    /// The shared atomic the fill-forward enumerator stage reads from. Share
    /// this `Arc` with every subscription's `FillForwardEnumerator` so a
    /// recompute here is visible mid-run without re-wiring the stack.
    pub fn fill_forward_resolution_handle(&self) -> Arc<AtomicI64> {
        self.fill_forward_resolution_nanos.clone()
    }

    /// Inserts in registry order (append), keyed by config equality. Returns
    /// `false` without inserting if an entry with the same key is already
    /// present.
    pub fn add(&self, subscription: Subscription) -> bool {
        let key = subscription.config.registry_key();
        let mut entries = self.entries.lock().unwrap();
        if entries.iter().any(|(k, _)| *k == key) {
            return false;
        }
        entries.push((key, Arc::new(Mutex::new(subscription))));
        drop(entries);
        self.recompute_fill_forward_resolution();
        true
    }

    /// Idempotent: the second call for an already-removed config returns
    /// `false` rather than panicking.
    pub fn remove(&self, key: &ConfigKey) -> bool {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|(k, _)| k != key);
        let removed = entries.len() < before;
        drop(entries);
        if removed {
            self.recompute_fill_forward_resolution();
        }
        removed
    }

    /// A copy-on-iterate snapshot in registry (insertion) order — the
    /// contract the synchronizer relies on for slice tie-breaking.
    pub fn snapshot(&self) -> Vec<Arc<Mutex<Subscription>>> {
        self.entries.lock().unwrap().iter().map(|(_, s)| s.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `min({ r : r = config.resolution, r != tick, !config.is_internal_feed })`
    /// recomputed after every add/remove, stored as nanoseconds (0 meaning
    /// "no eligible subscription yet").
    fn recompute_fill_forward_resolution(&self) {
        let entries = self.entries.lock().unwrap();
        let min = entries
            .iter()
            .filter_map(|(key, sub)| {
                let resolution: Resolution = key.3;
                let is_internal = key.7;
                if resolution.is_tick() || is_internal {
                    return None;
                }
                let _ = sub;
                Some(resolution.increment())
            })
            .min();
        let nanos = min.and_then(|d| d.num_nanoseconds()).unwrap_or(0);
        self.fill_forward_resolution_nanos.store(nanos, Ordering::Relaxed);
    }
}

impl Default for SubscriptionCollection {
    fn default() -> Self {
        Self::new()
    }
}
