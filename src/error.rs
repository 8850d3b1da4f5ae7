//! Error types for attrstore.
//!
//! Every failure is reported synchronously to the caller. Missing data is not
//! an error: lookups return `Option` instead.

use attrstore_types::{Estimator, InvalidRange, ValueType};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AttrError>;

/// Broad category of an [`AttrError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller used the schema incorrectly.
    Schema,
    /// A fixed capacity would be exceeded.
    Capacity,
    /// A feature is disabled on this store.
    Unavailable,
    /// Malformed literal text.
    Parse,
    /// Malformed or incompatible binary data.
    Serialization,
    Io,
}

#[derive(Error, Debug)]
pub enum AttrError {
    #[error(transparent)]
    InvalidRange(#[from] InvalidRange),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(f64),

    #[error("estimator {estimator} is not supported for {value_type} values")]
    UnsupportedAggregation {
        estimator: Estimator,
        value_type: ValueType,
    },

    #[error("null values cannot be stored at a timestamp, remove the value instead")]
    NullValue,

    #[error("column '{0}' already exists")]
    DuplicateColumn(String),

    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("invalid column: {0}")]
    InvalidColumn(String),

    #[error("column '{0}' is indexed but the store has no index support")]
    IndexingUnsupported(String),

    #[error("column '{0}' is not dynamic")]
    NotDynamic(String),

    #[error("estimator {estimator} is not supported by column '{column}'")]
    UnsupportedEstimator { column: String, estimator: Estimator },

    #[error("column capacity of {0} exceeded")]
    CapacityExceeded(usize),

    #[error("column '{0}' is read-only")]
    ReadOnlyColumn(String),

    #[error("column '{0}' is built-in and cannot be removed")]
    ProtectedColumn(String),

    #[error("column '{0}' does not belong to this store")]
    ColumnMismatch(String),

    #[error("type mismatch on column '{column}': expected {expected}, found {found}")]
    TypeMismatch {
        column: String,
        expected: String,
        found: String,
    },

    #[error("timestamp support is disabled on this store")]
    TimestampStoreUnavailable,

    #[error("cannot load into a non-empty store")]
    StoreNotEmpty,

    #[error("unknown type tag {0}")]
    UnknownTypeTag(u8),

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("invalid format: {0}")]
    InvalidFormat(String),

    #[error("parse error at '{input}': {reason}")]
    Parse { input: String, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AttrError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AttrError::CapacityExceeded(_) => ErrorKind::Capacity,
            AttrError::TimestampStoreUnavailable | AttrError::IndexingUnsupported(_) => {
                ErrorKind::Unavailable
            }
            AttrError::Parse { .. } => ErrorKind::Parse,
            AttrError::StoreNotEmpty
            | AttrError::UnknownTypeTag(_)
            | AttrError::UnexpectedEof
            | AttrError::InvalidFormat(_) => ErrorKind::Serialization,
            AttrError::Io(_) => ErrorKind::Io,
            _ => ErrorKind::Schema,
        }
    }

    pub(crate) fn parse(input: impl Into<String>, reason: impl Into<String>) -> Self {
        AttrError::Parse {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn type_mismatch(
        column: &str,
        expected: impl ToString,
        found: impl ToString,
    ) -> Self {
        AttrError::TypeMismatch {
            column: column.to_string(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}
