//! Columnar, schema-typed, time-varying attribute storage for graph elements.
//!
//! ```rust
//! use attrstore::prelude::*;
//!
//! let store = StoreBuilder::new(ElementClass::Node)
//!     .column(Column::builder("age", TypeTag::Scalar(ValueType::Int)).build()?)
//!     .column(
//!         Column::builder("score", TypeTag::Timestamped(ValueType::Double))
//!             .estimator(Estimator::Average)
//!             .build()?,
//!     )
//!     .build()?;
//!
//! let node = Element::new(store.clone(), "n1");
//! node.set_attribute("age", Some(Value::Int(42)))?;
//! node.set_attribute_at("score", Some(Value::Double(1.0)), 2000.0)?;
//! node.set_attribute_at("score", Some(Value::Double(3.0)), 2001.0)?;
//!
//! let window = Interval::new(2000.0, 2001.0).unwrap();
//! assert_eq!(node.get_value("age")?, Some(Value::Int(42)));
//! assert_eq!(node.get_attribute_in("score", &window)?, Some(Value::Double(2.0)));
//! # Ok::<(), attrstore::AttrError>(())
//! ```

pub mod builder;
pub mod column;
pub mod compute;
pub mod config;
pub mod element;
pub mod error;
pub mod storage;
pub mod timestamp;

pub use builder::StoreBuilder;
#[cfg(feature = "snapshot")]
pub use builder::OpenedStore;
pub use column::{
    Column, ColumnBuilder, ColumnKey, ColumnObserver, ColumnStore, ColumnVersion, ColumnWatch,
    DenseIndex, ID_COLUMN, LABEL_COLUMN, MAX_COLUMNS, TIMESET_COLUMN, VersionStamp,
};
pub use config::Config;
pub use element::{AttributeValue, Element};
pub use error::{AttrError, ErrorKind, Result};

pub use attrstore_types::{
    ColumnOrigin, ElementClass, Estimator, Interval, InvalidRange, TypeTag, Value, ValueType,
};

pub use timestamp::{
    CompactIndex, TemporalValue, TimestampIndexStore, TimestampMap, TimestampValueSet,
    TimestampValues,
};

pub use storage::{decode_element, decode_store, encode_element, encode_store};
#[cfg(feature = "snapshot")]
pub use storage::{SnapshotConfig, SnapshotFile};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{AttrError, Result, StoreBuilder};

    pub use crate::{AttributeValue, Column, ColumnKey, ColumnStore, Config, Element};

    pub use attrstore_types::{
        ColumnOrigin, ElementClass, Estimator, Interval, TypeTag, Value, ValueType,
    };

    #[cfg(feature = "snapshot")]
    pub use crate::SnapshotFile;
}
