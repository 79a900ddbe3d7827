//! Insertion-ordered entity store.

use std::hash::Hash;
use std::num::NonZeroUsize;

use lru::LruCache;

/// Keyed store that keeps entries in insertion order and, when bounded,
/// evicts the oldest-inserted entry on overflow.
///
/// Lookups never reorder entries: the backing `LruCache` is only touched
/// through `peek`/`peek_mut`/`contains`, so recency equals insertion time.
#[derive(Debug)]
pub struct EntityCache<K: Hash + Eq, V> {
    inner: LruCache<K, V>,
    bounded: bool,
}

impl<K: Hash + Eq, V> EntityCache<K, V> {
    /// Creates a cache holding at most `capacity` entries. Zero means unbounded.
    #[must_use]
    pub fn bounded(capacity: usize) -> Self {
        NonZeroUsize::new(capacity).map_or_else(Self::unbounded, |cap| Self {
            inner: LruCache::new(cap),
            bounded: true,
        })
    }

    /// Creates a cache without a size limit.
    #[must_use]
    pub fn unbounded() -> Self {
        Self {
            inner: LruCache::unbounded(),
            bounded: false,
        }
    }

    /// Maximum number of entries, or `None` when unbounded.
    #[must_use]
    pub fn capacity(&self) -> Option<usize> {
        self.bounded.then(|| self.inner.cap().get())
    }

    /// Looks up `key` without touching eviction order.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.inner.peek(key)
    }

    /// Mutable lookup, also order-neutral.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.inner.peek_mut(key)
    }

    /// Returns true if `key` is cached.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.inner.contains(key)
    }

    /// Inserts `value` under `key`.
    ///
    /// An existing entry is replaced in place and keeps its position. Returns
    /// the entry evicted to make room, if any.
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(slot) = self.inner.peek_mut(&key) {
            *slot = value;
            return None;
        }
        self.inner.push(key, value)
    }

    /// Removes and returns the entry for `key`.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.inner.pop(key)
    }

    /// Removes every entry for which `keep` returns false.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        K: Clone,
        F: FnMut(&K, &V) -> bool,
    {
        let doomed: Vec<K> = self
            .inner
            .iter()
            .filter(|(k, v)| !keep(k, v))
            .map(|(k, _)| k.clone())
            .collect();

        for key in doomed {
            self.inner.pop(&key);
        }
    }

    /// Iterates entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.inner.iter().rev()
    }

    /// Iterates values from oldest to newest.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }

    /// Most recently inserted entry.
    #[must_use]
    pub fn newest(&self) -> Option<(&K, &V)> {
        self.inner.iter().next()
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<K: Hash + Eq, V> Default for EntityCache<K, V> {
    fn default() -> Self {
        Self::unbounded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut cache = EntityCache::bounded(4);
        cache.insert(1_u64, "one");

        assert_eq!(cache.get(&1), Some(&"one"));
        assert!(cache.contains(&1));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_evicts_oldest_inserted_first() {
        let mut cache = EntityCache::bounded(3);
        assert!(cache.insert(1_u64, 'a').is_none());
        assert!(cache.insert(2, 'b').is_none());
        assert!(cache.insert(3, 'c').is_none());

        let evicted = cache.insert(4, 'd');

        assert_eq!(evicted, Some((1, 'a')));
        assert_eq!(cache.len(), 3);
        assert!(!cache.contains(&1));
        assert_eq!(cache.values().copied().collect::<Vec<_>>(), vec!['b', 'c', 'd']);
    }

    #[test]
    fn test_reads_do_not_reorder() {
        let mut cache = EntityCache::bounded(2);
        cache.insert(1_u64, 'a');
        cache.insert(2, 'b');

        let _ = cache.get(&1);
        let _ = cache.get_mut(&1);
        cache.insert(3, 'c');

        assert!(!cache.contains(&1));
        assert!(cache.contains(&2));
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut cache = EntityCache::bounded(2);
        cache.insert(1_u64, 'a');
        cache.insert(2, 'b');
        assert!(cache.insert(1, 'z').is_none());

        let evicted = cache.insert(3, 'c');
        assert_eq!(evicted, Some((1, 'z')));
    }

    #[test]
    fn test_zero_capacity_is_unbounded() {
        let mut cache = EntityCache::bounded(0);
        for i in 0..1000_u64 {
            cache.insert(i, i);
        }
        assert_eq!(cache.len(), 1000);
        assert_eq!(cache.capacity(), None);
    }

    #[test]
    fn test_retain_and_newest() {
        let mut cache = EntityCache::unbounded();
        for i in 1..=6_u64 {
            cache.insert(i, i * 10);
        }
        cache.retain(|k, _| k % 2 == 0);

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.newest(), Some((&6, &60)));
        assert_eq!(cache.remove(&4), Some(40));
    }
}
