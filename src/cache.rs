use std::cell::Cell;

use crate::handle::Handle;
use crate::utils::MyHash;

struct Entry<K, V> {
    key: K,
    value: V,
}

/// Direct-mapped computed table.
///
/// Each key hashes to exactly one slot and a new result overwrites whatever occupied it, so
/// memory stays at `2^bits` entries no matter how many operations run. Keys are stored in
/// full: a hit is only reported for an equal key.
pub struct Cache<K, V> {
    data: Vec<Option<Entry<K, V>>>,
    bitmask: u64,
    hits: Cell<usize>,
    misses: Cell<usize>,
}

impl<K, V> Cache<K, V> {
    /// Create a new table of size `2^bits`.
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 31, "Bits should be in the range 0..=31");

        let size = 1 << bits;
        let bitmask = (size - 1) as u64;

        Self {
            data: std::iter::repeat_with(|| None).take(size).collect(),
            bitmask,
            hits: Cell::new(0),
            misses: Cell::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Get the number of cache hits.
    pub fn hits(&self) -> usize {
        self.hits.get()
    }
    /// Get the number of cache misses.
    pub fn misses(&self) -> usize {
        self.misses.get()
    }

    /// Drop every entry. Statistics are kept.
    pub fn clear(&mut self) {
        self.data.fill_with(|| None);
    }

    fn index(&self, key: &K) -> usize
    where
        K: MyHash,
    {
        (key.hash() & self.bitmask) as usize
    }

    /// Get the cached result.
    pub fn get(&self, key: &K) -> Option<V>
    where
        K: MyHash + Eq,
        V: Copy,
    {
        match &self.data[self.index(key)] {
            Some(entry) if &entry.key == key => {
                self.hits.set(self.hits.get() + 1);
                Some(entry.value)
            }
            _ => {
                self.misses.set(self.misses.get() + 1);
                None
            }
        }
    }

    /// Insert a result into the cache.
    pub fn insert(&mut self, key: K, value: V)
    where
        K: MyHash,
    {
        let index = self.index(&key);
        self.data[index] = Some(Entry { key, value });
    }
}

impl MyHash for Handle {
    fn hash(&self) -> u64 {
        // Spread consecutive handles over the table.
        (self.get() as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15) >> 16
    }
}
