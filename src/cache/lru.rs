//! LRU Tracker Module
//!
//! Tracks key recency for capacity eviction: when a store exceeds its entry
//! bound, the least recently used key goes first.

use std::collections::VecDeque;

use crate::cache::key::CacheKey;

// == LRU Tracker ==
/// Key recency order for one store.
///
/// Front = most recently used, back = least recently used.
#[derive(Debug, Default)]
pub struct LruTracker {
    order: VecDeque<CacheKey>,
}

impl LruTracker {
    // == Constructor ==
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Touch ==
    /// Marks a key as just used, moving it to the front. Unknown keys are
    /// inserted at the front.
    pub fn touch(&mut self, key: &CacheKey) {
        self.remove(key);
        self.order.push_front(key.clone());
    }

    // == Remove ==
    /// Drops a key from the tracker. No-op for unknown keys.
    pub fn remove(&mut self, key: &CacheKey) {
        self.order.retain(|k| k != key);
    }

    // == Evict Oldest ==
    /// Removes and returns the least recently used key, if any.
    pub fn evict_oldest(&mut self) -> Option<CacheKey> {
        self.order.pop_back()
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::key::KeyPart;

    fn key(n: u64) -> CacheKey {
        CacheKey::Single(KeyPart::Uint(n))
    }

    #[test]
    fn test_oldest_is_first_inserted() {
        let mut lru = LruTracker::new();
        lru.touch(&key(1));
        lru.touch(&key(2));
        lru.touch(&key(3));

        assert_eq!(lru.len(), 3);
        assert_eq!(lru.evict_oldest(), Some(key(1)));
    }

    #[test]
    fn test_touch_moves_key_to_front() {
        let mut lru = LruTracker::new();
        lru.touch(&key(1));
        lru.touch(&key(2));
        lru.touch(&key(3));

        lru.touch(&key(1));

        assert_eq!(lru.evict_oldest(), Some(key(2)));
        assert_eq!(lru.evict_oldest(), Some(key(3)));
        assert_eq!(lru.evict_oldest(), Some(key(1)));
    }

    #[test]
    fn test_touch_is_idempotent_on_length() {
        let mut lru = LruTracker::new();
        lru.touch(&key(1));
        lru.touch(&key(1));
        lru.touch(&key(1));

        assert_eq!(lru.len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut lru = LruTracker::new();
        lru.touch(&key(1));
        lru.touch(&key(2));

        lru.remove(&key(1));
        assert_eq!(lru.len(), 1);
        assert_eq!(lru.evict_oldest(), Some(key(2)));
    }

    #[test]
    fn test_remove_unknown_key_is_noop() {
        let mut lru = LruTracker::new();
        lru.touch(&key(1));
        lru.remove(&key(9));
        assert_eq!(lru.len(), 1);
    }

    #[test]
    fn test_evict_empty() {
        let mut lru = LruTracker::new();
        assert_eq!(lru.evict_oldest(), None);
        assert!(lru.is_empty());
    }
}
