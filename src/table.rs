//! Unique table: node storage with reverse lookup.
//!
//! Values are stored in a vector and addressed by index; the first [`RESERVED`] indices
//! are never handed out (they belong to the terminals). Every value is also linked into a
//! hash bucket chain, so looking a value up by content is a walk over one short chain.

use std::ops::Index;

use crate::utils::MyHash;

/// Number of leading indices that are never allocated.
pub const RESERVED: usize = 2;

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    /// Next index in the bucket chain, `0` for the end.
    next: usize,
}

#[derive(Debug, Clone)]
pub struct Table<T> {
    data: Vec<Entry<T>>,
    buckets: Vec<usize>,
    bitmask: u64,
}

impl<T> Table<T> {
    /// Create a new table with `2^bits` buckets.
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 31, "Bucket bits should be in the range 0..=31");
        let size = 1 << bits;
        Self {
            data: Vec::new(),
            buckets: vec![0; size],
            bitmask: (size - 1) as u64,
        }
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    /// Get the value at the given index.
    ///
    /// # Panics
    ///
    /// Panics if nothing is stored at `index`.
    pub fn value(&self, index: usize) -> &T {
        match index.checked_sub(RESERVED).and_then(|i| self.data.get(i)) {
            Some(entry) => &entry.value,
            None => panic!("Index {} is not in the table", index),
        }
    }

    /// Get the value at the given index, if any.
    pub fn get(&self, index: usize) -> Option<&T> {
        index
            .checked_sub(RESERVED)
            .and_then(|i| self.data.get(i))
            .map(|entry| &entry.value)
    }

    /// Index of the next value in the same bucket, `0` for the end of the chain.
    pub fn next(&self, index: usize) -> usize {
        self.data[index - RESERVED].next
    }

    /// Iterate over `(index, value)` pairs in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        self.data
            .iter()
            .enumerate()
            .map(|(i, entry)| (i + RESERVED, &entry.value))
    }
}

impl<T> Table<T>
where
    T: MyHash + Eq,
{
    fn bucket_index(&self, value: &T) -> usize {
        (value.hash() & self.bitmask) as usize
    }

    /// Find the index of an equal value.
    pub fn find(&self, value: &T) -> Option<usize> {
        let mut index = self.buckets[self.bucket_index(value)];
        while index != 0 {
            let entry = &self.data[index - RESERVED];
            if &entry.value == value {
                return Some(index);
            }
            index = entry.next;
        }
        None
    }

    /// Put a value into the table and return its index.
    ///
    /// The flag is `true` if the value was not present before.
    pub fn put(&mut self, value: T) -> (usize, bool) {
        if let Some(index) = self.find(&value) {
            return (index, false);
        }

        if self.data.len() >= 2 * self.buckets.len() {
            self.grow();
        }

        let bucket_index = self.bucket_index(&value);
        let index = self.data.len() + RESERVED;
        self.data.push(Entry {
            value,
            next: self.buckets[bucket_index],
        });
        self.buckets[bucket_index] = index;
        (index, true)
    }

    /// Double the number of buckets and relink every chain.
    fn grow(&mut self) {
        let size = 2 * self.buckets.len();
        self.buckets = vec![0; size];
        self.bitmask = (size - 1) as u64;
        for i in 0..self.data.len() {
            let bucket_index = self.bucket_index(&self.data[i].value);
            self.data[i].next = self.buckets[bucket_index];
            self.buckets[bucket_index] = i + RESERVED;
        }
    }
}

impl<T> Index<usize> for Table<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        self.value(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
    struct Item(i32);

    impl MyHash for Item {
        fn hash(&self) -> u64 {
            self.0.unsigned_abs() as u64
        }
    }

    #[test]
    fn test_put() {
        let mut table = Table::new(2);
        let (index1, new1) = table.put(Item(5));
        let (index2, new2) = table.put(Item(-5));
        assert!(new1 && new2);
        assert_eq!(index1, RESERVED);
        assert_ne!(index1, index2);
        assert_eq!(table[index1], Item(5));
        assert_eq!(table[index2], Item(-5));
        // Same bucket: the newer value heads the chain.
        assert_eq!(table.next(index2), index1);
        assert_eq!(table.next(index1), 0);
    }

    #[test]
    fn test_put_existing() {
        let mut table = Table::new(2);
        let (index, _) = table.put(Item(3));
        assert_eq!(table.put(Item(3)), (index, false));
        assert_eq!(table.len(), 1);
        assert_eq!(table.find(&Item(3)), Some(index));
        assert_eq!(table.find(&Item(4)), None);
    }

    #[test]
    fn test_grow_keeps_values() {
        let mut table = Table::new(0);
        let indices: Vec<usize> = (0..100).map(|i| table.put(Item(i)).0).collect();
        assert!(table.num_buckets() > 1);
        for (i, &index) in indices.iter().enumerate() {
            assert_eq!(table.find(&Item(i as i32)), Some(index));
            assert_eq!(table[index], Item(i as i32));
        }
        assert_eq!(table.iter().count(), 100);
    }

    #[test]
    fn test_reserved_indices() {
        let mut table = Table::new(2);
        table.put(Item(1));
        assert_eq!(table.get(0), None);
        assert_eq!(table.get(1), None);
        assert_eq!(table.get(RESERVED), Some(&Item(1)));
    }

    #[test]
    #[should_panic(expected = "is not in the table")]
    fn test_value_out_of_range() {
        let table = Table::<Item>::new(2);
        table.value(1);
    }
}
