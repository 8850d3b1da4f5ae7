//! Reference-counted timestamp registry shared by element timestamp sets.

use super::map::{CompactIndex, TimestampMap};
use crate::error::Result;

/// A [`TimestampMap`] whose indices are freed once nobody references them.
#[derive(Debug, Default)]
pub struct TimestampIndexStore {
    map: TimestampMap,
    counts: Vec<u32>,
}

impl TimestampIndexStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one reference to `timestamp`, allocating its index on first use.
    pub fn add(&mut self, timestamp: f64) -> Result<CompactIndex> {
        let index = self.map.get_timestamp_index(timestamp)?;
        let slot = index as usize;
        if slot >= self.counts.len() {
            self.counts.resize(slot + 1, 0);
        }
        self.counts[slot] += 1;
        Ok(index)
    }

    /// Drops one reference; the index is freed when the count reaches zero.
    pub fn release(&mut self, timestamp: f64) -> Option<CompactIndex> {
        let index = self.map.index_of(timestamp)?;
        let count = &mut self.counts[index as usize];
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.map.free_timestamp(timestamp);
        }
        Some(index)
    }

    pub fn reference_count(&self, timestamp: f64) -> u32 {
        self.map
            .index_of(timestamp)
            .and_then(|i| self.counts.get(i as usize).copied())
            .unwrap_or(0)
    }

    pub fn map(&self) -> &TimestampMap {
        &self.map
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.counts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_release_frees_index() {
        let mut store = TimestampIndexStore::new();
        let a = store.add(5.0).unwrap();
        let b = store.add(5.0).unwrap();
        assert_eq!(a, b);
        assert_eq!(store.reference_count(5.0), 2);

        assert_eq!(store.release(5.0), Some(a));
        assert!(store.map().contains(5.0));

        assert_eq!(store.release(5.0), Some(a));
        assert!(!store.map().contains(5.0));
        assert_eq!(store.reference_count(5.0), 0);

        // Freed slot is reused.
        assert_eq!(store.add(7.0).unwrap(), a);
        assert_eq!(store.reference_count(7.0), 1);
    }

    #[test]
    fn test_release_unknown_is_noop() {
        let mut store = TimestampIndexStore::new();
        assert_eq!(store.release(1.0), None);
        assert!(store.is_empty());
    }
}
