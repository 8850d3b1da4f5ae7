//! Per-column change counters.
//!
//! Every successful attribute mutation bumps the column's counter once. The
//! counter wraps to zero at the store's configured limit and advances an epoch;
//! the store then sends an explicit reset event to registered observers.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::Column;

/// Point-in-time reading of a [`ColumnVersion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VersionStamp {
    pub epoch: u32,
    pub version: u32,
}

impl VersionStamp {
    fn pack(self) -> u64 {
        ((self.epoch as u64) << 32) | self.version as u64
    }

    fn unpack(raw: u64) -> Self {
        Self {
            epoch: (raw >> 32) as u32,
            version: raw as u32,
        }
    }
}

/// Wrapping change counter with an epoch, updated atomically as a pair.
#[derive(Debug, Default)]
pub struct ColumnVersion {
    state: AtomicU64,
}

impl ColumnVersion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> VersionStamp {
        VersionStamp::unpack(self.state.load(Ordering::Acquire))
    }

    /// Increments the counter. Returns the new epoch when the counter wrapped.
    pub fn bump(&self, limit: u32) -> Option<u32> {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            let stamp = VersionStamp::unpack(current);
            let (next, wrapped) = if stamp.version.saturating_add(1) >= limit {
                let epoch = stamp.epoch.wrapping_add(1);
                (VersionStamp { epoch, version: 0 }, Some(epoch))
            } else {
                let version = stamp.version + 1;
                (VersionStamp { epoch: stamp.epoch, version }, None)
            };
            match self.state.compare_exchange_weak(
                current,
                next.pack(),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return wrapped,
                Err(actual) => current = actual,
            }
        }
    }
}

/// Receives explicit events from a column store.
pub trait ColumnObserver: Send + Sync {
    /// Called after `column`'s version counter wrapped into `epoch`. Cached
    /// baselines for that column must be reset.
    fn on_version_reset(&self, column: &str, epoch: u32);
}

/// Remembers a column version and reports whether it moved since.
#[derive(Debug, Clone)]
pub struct ColumnWatch {
    column: Arc<Column>,
    seen: VersionStamp,
}

impl ColumnWatch {
    pub(crate) fn new(column: Arc<Column>) -> Self {
        let seen = column.version();
        Self { column, seen }
    }

    pub fn column(&self) -> &Arc<Column> {
        &self.column
    }

    /// True if the column changed since the last call (or since creation).
    /// An epoch reset always counts as a change.
    pub fn has_changed(&mut self) -> bool {
        let now = self.column.version();
        let changed = now != self.seen;
        self.seen = now;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_increments() {
        let version = ColumnVersion::new();
        assert_eq!(version.bump(100), None);
        assert_eq!(version.bump(100), None);
        assert_eq!(
            version.current(),
            VersionStamp {
                epoch: 0,
                version: 2
            }
        );
    }

    #[test]
    fn test_wraps_into_new_epoch() {
        let version = ColumnVersion::new();
        assert_eq!(version.bump(3), None);
        assert_eq!(version.bump(3), None);
        assert_eq!(version.bump(3), Some(1));
        assert_eq!(
            version.current(),
            VersionStamp {
                epoch: 1,
                version: 0
            }
        );
        assert_eq!(version.bump(3), None);
    }

    #[test]
    fn test_concurrent_bumps_are_not_lost() {
        let version = Arc::new(ColumnVersion::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let version = version.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        version.bump(u32::MAX);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(version.current().version, 8000);
    }
}
