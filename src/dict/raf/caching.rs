//! Caching decorator over a random-access element source.
//!
//! Two policies:
//! - bounded LRU, for entry lists that may be large;
//! - eager full materialization, for index lists that are assumed small and
//!   must never re-read the file after load.
//!
//! The cache is the only shared mutable state in this crate besides the file
//! handle itself; it is guarded by the same mutex discipline, so `get` is
//! safe to call from multiple threads but may block on both the cache lock
//! and file I/O.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use log::trace;

use crate::dict::types::error::{DictError, Result};

use super::RandomAccess;

/// Bounded least-recently-used cache keyed by list position.
///
/// Recency is a monotone tick; the `order` map yields the coldest entry in
/// O(log n) without unsafe list splicing.
struct LruCache<T> {
    capacity: usize,
    tick: u64,
    entries: HashMap<usize, (u64, T)>,
    order: BTreeMap<u64, usize>,
}

impl<T: Clone> LruCache<T> {
    fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            tick: 0,
            entries: HashMap::new(),
            order: BTreeMap::new(),
        }
    }

    fn touch(&mut self, index: usize) {
        let old = match self.entries.get(&index) {
            Some((stamp, _)) => *stamp,
            None => return,
        };
        self.order.remove(&old);
        self.tick += 1;
        self.order.insert(self.tick, index);
        if let Some(slot) = self.entries.get_mut(&index) {
            slot.0 = self.tick;
        }
    }

    fn get(&mut self, index: usize) -> Option<T> {
        if !self.entries.contains_key(&index) {
            return None;
        }
        self.touch(index);
        self.entries.get(&index).map(|(_, value)| value.clone())
    }

    fn insert(&mut self, index: usize, value: T) {
        if let Some((stamp, _)) = self.entries.remove(&index) {
            self.order.remove(&stamp);
        }
        if self.entries.len() >= self.capacity {
            if let Some((_, victim)) = self.order.pop_first() {
                self.entries.remove(&victim);
                trace!("evicting element {} from cache", victim);
            }
        }
        self.tick += 1;
        self.order.insert(self.tick, index);
        self.entries.insert(index, (self.tick, value));
    }

    fn remove(&mut self, index: usize) {
        if let Some((stamp, _)) = self.entries.remove(&index) {
            self.order.remove(&stamp);
        }
    }
}

enum Policy<T> {
    Lru(LruCache<T>),
    Eager(Vec<T>),
}

/// A read-through cache over any [`RandomAccess`] source.
pub struct CachingList<T, L> {
    backing: L,
    policy: Mutex<Policy<T>>,
}

impl<T: Clone, L: RandomAccess<T>> CachingList<T, L> {
    /// Wrap `backing` with a bounded LRU of the given capacity.
    pub fn new(backing: L, capacity: usize) -> Self {
        Self {
            backing,
            policy: Mutex::new(Policy::Lru(LruCache::new(capacity))),
        }
    }

    /// Wrap `backing` and materialize every element immediately.
    ///
    /// After this returns, `get` never consults the backing source again.
    pub fn fully_cached(backing: L) -> Result<Self> {
        let mut values = Vec::with_capacity(backing.len());
        for index in 0..backing.len() {
            values.push(backing.fetch(index)?);
        }
        Ok(Self {
            backing,
            policy: Mutex::new(Policy::Eager(values)),
        })
    }

    pub fn len(&self) -> usize {
        self.backing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backing.is_empty()
    }

    /// Return the element at `index`, consulting the cache first.
    ///
    /// A miss delegates to the backing source and may block on file I/O.
    pub fn get(&self, index: usize) -> Result<T> {
        let len = self.len();
        if index >= len {
            return Err(DictError::OutOfRange { index, len });
        }
        let mut policy = self.policy.lock().map_err(|_| DictError::LockPoisoned)?;
        match &mut *policy {
            Policy::Eager(values) => Ok(values[index].clone()),
            Policy::Lru(cache) => {
                if let Some(hit) = cache.get(index) {
                    trace!("cache hit for element {}", index);
                    return Ok(hit);
                }
                trace!("cache miss for element {}", index);
                let value = self.backing.fetch(index)?;
                cache.insert(index, value.clone());
                Ok(value)
            }
        }
    }

    /// Drop (LRU) or refresh (eager) the cached slot for `index`.
    ///
    /// Callers that mutate the backing list in editing workflows must call
    /// this, or `get` will serve stale values.
    pub fn invalidate(&self, index: usize) -> Result<()> {
        let len = self.len();
        if index >= len {
            return Err(DictError::OutOfRange { index, len });
        }
        let mut policy = self.policy.lock().map_err(|_| DictError::LockPoisoned)?;
        match &mut *policy {
            Policy::Lru(cache) => {
                cache.remove(index);
                Ok(())
            }
            Policy::Eager(values) => {
                values[index] = self.backing.fetch(index)?;
                Ok(())
            }
        }
    }

    /// Iterate every element in position order through the cache.
    pub fn iter(&self) -> impl Iterator<Item = Result<T>> + '_ {
        (0..self.len()).map(move |index| self.get(index))
    }
}
