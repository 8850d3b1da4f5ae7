//! Time indexing: timestamp registries and per-element time series.

pub mod index_store;
pub mod map;
pub mod value_set;
pub mod values;

pub use index_store::TimestampIndexStore;
pub use map::{CompactIndex, TimestampMap};
pub use value_set::{TemporalValue, TimestampValueSet};
pub use values::TimestampValues;
