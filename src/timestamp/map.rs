//! Bidirectional timestamp to compact-index registry.
//!
//! Raw `f64` timestamps never leave this module as comparison keys: everything
//! else in the crate works with dense `CompactIndex` values handed out here.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

use attrstore_types::Interval;

use crate::error::{AttrError, Result};

/// Dense, reusable integer standing in for a timestamp.
pub type CompactIndex = u32;

/// Largest number of compact indices a single map may hand out.
pub const MAX_COMPACT_INDEX: CompactIndex = i32::MAX as CompactIndex;

/// Totally ordered timestamp key. `-0.0` is folded into `0.0`; only finite
/// timestamps can be stored.
#[derive(Debug, Clone, Copy)]
struct TimestampKey(f64);

impl TimestampKey {
    fn new(timestamp: f64) -> Result<Self> {
        if !timestamp.is_finite() {
            return Err(AttrError::InvalidTimestamp(timestamp));
        }
        Ok(Self(timestamp + 0.0))
    }
}

impl PartialEq for TimestampKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TimestampKey {}

impl PartialOrd for TimestampKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimestampKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Sorted registry mapping timestamps to compact indices.
///
/// Indices are dense apart from the garbage set; a freed index is reused
/// (smallest first) before the map grows.
#[derive(Debug, Clone, Default)]
pub struct TimestampMap {
    timestamps: BTreeMap<TimestampKey, CompactIndex>,
    /// Inverse lookup; freed slots hold `None`.
    inverse: Vec<Option<f64>>,
    garbage: BTreeSet<CompactIndex>,
}

impl TimestampMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index for `timestamp`, allocating one if it is unseen.
    pub fn get_timestamp_index(&mut self, timestamp: f64) -> Result<CompactIndex> {
        let key = TimestampKey::new(timestamp)?;
        if let Some(index) = self.timestamps.get(&key) {
            return Ok(*index);
        }

        let index = match self.garbage.pop_first() {
            Some(index) => {
                self.inverse[index as usize] = Some(key.0);
                index
            }
            None => {
                let index = self.inverse.len() as CompactIndex;
                if index >= MAX_COMPACT_INDEX {
                    return Err(AttrError::CapacityExceeded(MAX_COMPACT_INDEX as usize));
                }
                self.inverse.push(Some(key.0));
                index
            }
        };
        self.timestamps.insert(key, index);
        log::trace!("allocated compact index {} for timestamp {}", index, key.0);
        Ok(index)
    }

    /// Non-allocating lookup.
    pub fn index_of(&self, timestamp: f64) -> Option<CompactIndex> {
        let key = TimestampKey::new(timestamp).ok()?;
        self.timestamps.get(&key).copied()
    }

    pub fn contains(&self, timestamp: f64) -> bool {
        self.index_of(timestamp).is_some()
    }

    /// Indices of every known timestamp inside `interval`, in chronological order.
    pub fn get_timestamp_indices(&self, interval: &Interval) -> Vec<CompactIndex> {
        if interval.is_empty() || !(interval.low() <= interval.high()) {
            return Vec::new();
        }
        let low = TimestampKey(interval.low() + 0.0);
        let high = TimestampKey(interval.high() + 0.0);
        let start = if interval.is_low_excluded() {
            Bound::Excluded(low)
        } else {
            Bound::Included(low)
        };
        let end = if interval.is_high_excluded() {
            Bound::Excluded(high)
        } else {
            Bound::Included(high)
        };
        self.timestamps
            .range((start, end))
            .map(|(_, index)| *index)
            .collect()
    }

    pub fn timestamp(&self, index: CompactIndex) -> Option<f64> {
        self.inverse.get(index as usize).copied().flatten()
    }

    /// Inverse lookup; indices that were never allocated (or are freed) are skipped.
    pub fn get_timestamps(&self, indices: &[CompactIndex]) -> Vec<f64> {
        indices.iter().filter_map(|i| self.timestamp(*i)).collect()
    }

    /// Frees the index of `timestamp` into the garbage set.
    pub fn free_timestamp(&mut self, timestamp: f64) -> Option<CompactIndex> {
        let key = TimestampKey::new(timestamp).ok()?;
        let index = self.timestamps.remove(&key)?;
        self.inverse[index as usize] = None;
        self.garbage.insert(index);
        log::trace!("freed compact index {} for timestamp {}", index, key.0);
        Some(index)
    }

    /// Number of index slots ever handed out, freed ones included.
    pub fn length(&self) -> usize {
        self.inverse.len()
    }

    /// Number of live timestamps.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn garbage(&self) -> impl Iterator<Item = CompactIndex> + '_ {
        self.garbage.iter().copied()
    }

    /// Live `(timestamp, index)` pairs in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, CompactIndex)> + '_ {
        self.timestamps.iter().map(|(k, i)| (k.0, *i))
    }

    pub fn clear(&mut self) {
        self.timestamps.clear();
        self.inverse.clear();
        self.garbage.clear();
    }

    /// Rebuilds a map from its serialized parts, checking they are consistent.
    pub(crate) fn from_parts(
        length: usize,
        timestamps: &[f64],
        indices: &[CompactIndex],
        garbage: &[CompactIndex],
    ) -> Result<Self> {
        if timestamps.len() != indices.len() {
            return Err(AttrError::InvalidFormat(
                "timestamp map arrays differ in length".into(),
            ));
        }
        if timestamps.len() + garbage.len() != length {
            return Err(AttrError::InvalidFormat(
                "timestamp map length does not match its contents".into(),
            ));
        }

        let mut map = TimestampMap {
            timestamps: BTreeMap::new(),
            inverse: vec![None; length],
            garbage: BTreeSet::new(),
        };
        for (timestamp, index) in timestamps.iter().zip(indices) {
            let key = TimestampKey::new(*timestamp)?;
            let slot = map
                .inverse
                .get_mut(*index as usize)
                .ok_or_else(|| AttrError::InvalidFormat(format!("index {} out of range", index)))?;
            if slot.is_some() || map.timestamps.insert(key, *index).is_some() {
                return Err(AttrError::InvalidFormat(format!(
                    "duplicate timestamp entry {}",
                    timestamp
                )));
            }
            *slot = Some(key.0);
        }
        for index in garbage {
            match map.inverse.get(*index as usize) {
                Some(None) if map.garbage.insert(*index) => {}
                _ => {
                    return Err(AttrError::InvalidFormat(format!(
                        "invalid garbage index {}",
                        index
                    )));
                }
            }
        }
        Ok(map)
    }
}
