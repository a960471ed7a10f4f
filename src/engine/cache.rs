// Bounded insertion-ordered cache — the oldest inserted entry is evicted first.

use std::borrow::Borrow;
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// Result of inserting into a [`FifoCache`].
#[derive(Debug, PartialEq, Eq)]
pub enum Insertion<K, V> {
    /// The entry was added. Carries the key evicted to make room, if any.
    Inserted { evicted: Option<K> },
    /// The key was already present; the existing value is kept and returned.
    AlreadyPresent(V),
}

/// A map with at most `capacity` entries and FIFO eviction.
///
/// Lookups never change the eviction order.
pub struct FifoCache<K, V> {
    entries: HashMap<K, V>,
    order: VecDeque<K>,
    capacity: usize,
}

impl<K, V> FifoCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an empty cache.
    ///
    /// # Panics
    /// If `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "FifoCache capacity must be > 0");
        Self {
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).cloned()
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Insert `value` under `key`, evicting the earliest inserted entry when full.
    ///
    /// Inserting a key that is already present keeps the first value; the
    /// order and contents are left untouched.
    pub fn insert(&mut self, key: K, value: V) -> Insertion<K, V> {
        if let Some(existing) = self.entries.get(&key) {
            return Insertion::AlreadyPresent(existing.clone());
        }

        let evicted = if self.entries.len() >= self.capacity {
            self.order.pop_front().inspect(|oldest| {
                self.entries.remove(oldest);
            })
        } else {
            None
        };

        self.order.push_back(key.clone());
        self.entries.insert(key, value);

        debug_assert!(
            self.entries.len() <= self.capacity && self.entries.len() == self.order.len(),
            "fifo cache invariant violated: {} entries, {} ordered, capacity {}",
            self.entries.len(),
            self.order.len(),
            self.capacity
        );

        Insertion::Inserted { evicted }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Keys from oldest to newest insertion.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.order.iter()
    }
}
