//! Binary encoding and snapshot persistence.
//!
//! - [`codec`]: tag-prefixed encoder/decoder for values, columns, timestamp
//!   maps, value sets, whole stores and elements
//! - `snapshot`: atomic snapshot files (requires the `snapshot` feature)

pub mod codec;
#[cfg(feature = "snapshot")]
pub mod snapshot;

pub use codec::{Decoder, Encoder, decode_element, decode_store, encode_element, encode_store};
#[cfg(feature = "snapshot")]
pub use snapshot::{SnapshotConfig, SnapshotFile};
