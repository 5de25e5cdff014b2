//! Bounded delivery-id deduplication (spec.md §4.8 step 2), shared across
//! every handler thread behind a `Mutex`.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

/// Default bound from spec.md §4.8 ("e.g. 10,000 entries").
pub const DEFAULT_CAPACITY: usize = 10_000;

pub struct DeliveryDedupe {
    seen: Mutex<LruCache<String, ()>>,
}

impl DeliveryDedupe {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(1).unwrap());
        Self {
            seen: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Returns `true` if `delivery_id` has already been recorded (the
    /// caller should ACK without reprocessing). Otherwise records it and
    /// returns `false`.
    pub fn check_and_insert(&self, delivery_id: &str) -> bool {
        let mut seen = self.seen.lock().unwrap();
        if seen.contains(delivery_id) {
            true
        } else {
            seen.put(delivery_id.to_string(), ());
            false
        }
    }
}

impl Default for DeliveryDedupe {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
