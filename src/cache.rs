//! Bounded cache of resolved grammars keyed by filename
//!
//! Uses the 2Q discipline: keys seen once live in a small `recent` queue,
//! keys hit again are promoted to `frequent`, and keys recently evicted from
//! `recent` are remembered in a `ghost` list so that their next insert goes
//! straight to `frequent`. One-off filenames therefore can't flush the
//! entries that are revisited often.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::sync::{Mutex, PoisonError};

use crate::error::{HighlightError, Result};
use crate::syntax::GrammarHandle;

/// Default number of cached filenames
pub const DEFAULT_CAPACITY: usize = 512;

/// Share of capacity reserved for keys seen once
const RECENT_RATIO: f64 = 0.25;
/// Size of the ghost list relative to capacity
const GHOST_RATIO: f64 = 0.50;

/// Least-recently-used queue with O(log n) touch and eviction
#[derive(Debug)]
struct LruQueue<K, V> {
    entries: HashMap<K, (V, u64)>,
    order: BTreeMap<u64, K>,
    clock: u64,
}

impl<K: Hash + Eq + Clone, V> LruQueue<K, V> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: BTreeMap::new(),
            clock: 0,
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Mark as most recently used and return the value
    fn touch<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let stamp = self.tick();
        let (owned_key, old_stamp) = {
            let (stored_key, (_, old)) = self.entries.get_key_value(key)?;
            (stored_key.clone(), *old)
        };
        self.order.remove(&old_stamp);
        self.order.insert(stamp, owned_key);
        let entry = self.entries.get_mut(key)?;
        entry.1 = stamp;
        Some(&entry.0)
    }

    /// Insert or replace as most recently used
    fn insert(&mut self, key: K, value: V) {
        let stamp = self.tick();
        if let Some((_, old_stamp)) = self.entries.insert(key.clone(), (value, stamp)) {
            self.order.remove(&old_stamp);
        }
        self.order.insert(stamp, key);
    }

    fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let (value, stamp) = self.entries.remove(key)?;
        self.order.remove(&stamp);
        Some(value)
    }

    /// Drop and return the least recently used entry
    fn pop_oldest(&mut self) -> Option<(K, V)> {
        let (_, key) = self.order.pop_first()?;
        let (value, _) = self.entries.remove(&key)?;
        Some((key, value))
    }
}

/// Unsynchronized 2Q cache
#[derive(Debug)]
struct TwoQueue<K, V> {
    capacity: usize,
    recent_capacity: usize,
    ghost_capacity: usize,
    recent: LruQueue<K, V>,
    frequent: LruQueue<K, V>,
    ghost: LruQueue<K, ()>,
}

impl<K: Hash + Eq + Clone, V: Clone> TwoQueue<K, V> {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            recent_capacity: (capacity as f64 * RECENT_RATIO) as usize,
            ghost_capacity: (capacity as f64 * GHOST_RATIO) as usize,
            recent: LruQueue::new(),
            frequent: LruQueue::new(),
            ghost: LruQueue::new(),
        }
    }

    fn len(&self) -> usize {
        self.recent.len() + self.frequent.len()
    }

    fn get<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if let Some(value) = self.frequent.touch(key) {
            return Some(value.clone());
        }

        // Second hit: promote
        let stored_key = self.recent.entries.get_key_value(key)?.0.clone();
        let value = self.recent.remove(key)?;
        self.frequent.insert(stored_key, value.clone());
        Some(value)
    }

    fn put(&mut self, key: K, value: V) {
        if self.frequent.contains(&key) {
            self.frequent.insert(key, value);
            return;
        }

        if self.recent.contains(&key) {
            self.recent.remove(&key);
            self.frequent.insert(key, value);
            return;
        }

        if self.ghost.contains(&key) {
            self.ensure_space(true);
            self.ghost.remove(&key);
            self.frequent.insert(key, value);
            return;
        }

        self.ensure_space(false);
        self.recent.insert(key, value);
    }

    /// Evict one entry if the cache is full
    fn ensure_space(&mut self, ghost_hit: bool) {
        if self.len() < self.capacity {
            return;
        }

        let recent_len = self.recent.len();
        let evict_recent = recent_len > 0
            && (recent_len > self.recent_capacity
                || (recent_len == self.recent_capacity && !ghost_hit));

        if evict_recent {
            if let Some((key, _)) = self.recent.pop_oldest() {
                self.ghost.insert(key, ());
                if self.ghost.len() > self.ghost_capacity {
                    self.ghost.pop_oldest();
                }
            }
        } else if self.frequent.pop_oldest().is_none() {
            self.recent.pop_oldest();
        }
    }
}

/// Thread-safe bounded cache from filename to resolved grammar
#[derive(Debug)]
pub struct LexerCache {
    inner: Mutex<TwoQueue<String, GrammarHandle>>,
    capacity: usize,
}

impl LexerCache {
    /// Create a cache holding at most `capacity` filenames.
    ///
    /// A zero capacity is a configuration error.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(HighlightError::Initialization(
                "lexer cache capacity must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            inner: Mutex::new(TwoQueue::new(capacity)),
            capacity,
        })
    }

    pub fn get(&self, filename: &str) -> Option<GrammarHandle> {
        self.lock().get(filename)
    }

    pub fn put(&self, filename: impl Into<String>, grammar: GrammarHandle) {
        self.lock().put(filename.into(), grammar);
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TwoQueue<String, GrammarHandle>> {
        // Every operation leaves the queues consistent before it can panic
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn grammar(name: &str) -> GrammarHandle {
        GrammarHandle::new(name)
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        assert!(matches!(
            LexerCache::new(0),
            Err(HighlightError::Initialization(_))
        ));
    }

    #[test]
    fn test_get_after_put() {
        let cache = LexerCache::new(4).unwrap();
        assert!(cache.get("a.rs").is_none());
        cache.put("a.rs", grammar("Rust"));
        assert_eq!(cache.get("a.rs"), Some(grammar("Rust")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_put_replaces_value() {
        let cache = LexerCache::new(4).unwrap();
        cache.put("x", grammar("Rust"));
        cache.put("x", grammar("Go"));
        assert_eq!(cache.get("x"), Some(grammar("Go")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let cache = LexerCache::new(8).unwrap();
        for i in 0..100 {
            cache.put(format!("file{}.rs", i), grammar("Rust"));
            assert!(cache.len() <= 8);
        }
        assert_eq!(cache.len(), 8);
    }

    #[test]
    fn test_frequent_entries_survive_one_off_scan() {
        let cache = LexerCache::new(8).unwrap();
        cache.put("hot.rs", grammar("Rust"));
        // Second access promotes to the frequent queue
        assert!(cache.get("hot.rs").is_some());

        for i in 0..50 {
            cache.put(format!("once{}.py", i), grammar("Python"));
        }

        assert_eq!(cache.get("hot.rs"), Some(grammar("Rust")));
    }

    #[test]
    fn test_ghost_hit_goes_to_frequent() {
        let mut queue: TwoQueue<String, u32> = TwoQueue::new(4);
        // recent_capacity is 1, so a second insert evicts "a" into the ghost list
        queue.put("a".into(), 1);
        for key in ["b", "c", "d", "e"] {
            queue.put(key.into(), 0);
        }
        assert!(!queue.recent.contains("a"));
        assert!(queue.ghost.contains("a"));

        queue.put("a".into(), 2);
        assert!(queue.frequent.contains("a"));
        assert!(!queue.ghost.contains("a"));
        assert_eq!(queue.get("a"), Some(2));
    }

    #[test]
    fn test_lru_queue_order() {
        let mut queue: LruQueue<&str, u32> = LruQueue::new();
        queue.insert("a", 1);
        queue.insert("b", 2);
        queue.insert("c", 3);
        queue.touch("a");

        assert_eq!(queue.pop_oldest(), Some(("b", 2)));
        assert_eq!(queue.pop_oldest(), Some(("c", 3)));
        assert_eq!(queue.pop_oldest(), Some(("a", 1)));
        assert_eq!(queue.pop_oldest(), None);
    }

    #[test]
    fn test_concurrent_access() {
        let cache = Arc::new(LexerCache::new(64).unwrap());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..200 {
                        let key = format!("t{}-{}.rs", t, i % 20);
                        cache.put(key.clone(), grammar("Rust"));
                        let _ = cache.get(&key);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert!(cache.len() <= cache.capacity());
    }
}
