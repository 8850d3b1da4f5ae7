//! # attrstore-types
//!
//! Core value, interval and schema types for the attrstore attribute engine.
//!
//! This crate provides the leaf types shared by every layer of the engine:
//!
//! - **Intervals**: `Interval`, a closed or half-open numeric range with a total
//!   left/overlap/right ordering
//! - **Aggregation**: `Estimator`, the policies used to reduce time-indexed values
//! - **Values**: `ValueType`, `TypeTag` and the scalar `Value` union
//! - **Schema metadata**: `ColumnOrigin` and `ElementClass`
//!
//! All types are serializable with Serde.
//!
//! ## Examples
//!
//! ```rust
//! use attrstore_types::interval::Interval;
//! use std::cmp::Ordering;
//!
//! let morning = Interval::new(6.0, 12.0).unwrap();
//! let evening = Interval::new(18.0, 23.0).unwrap();
//! assert_eq!(morning.compare_to(&evening), Ordering::Less);
//! ```

pub mod estimator;
pub mod interval;
pub mod schema;
pub mod value;

pub use estimator::Estimator;
pub use interval::{Interval, InvalidRange};
pub use schema::{ColumnOrigin, ElementClass};
pub use value::{TypeTag, Value, ValueType};
