//! Column schema: definitions, the per-class registry and change tracking.
//!
//! A [`Column`] is created detached and becomes live when a [`ColumnStore`]
//! registers it and assigns its dense index. Removing it from the store frees
//! the index and detaches the column for good.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use attrstore_types::{ColumnOrigin, Estimator, TypeTag, Value, ValueType};
use parking_lot::RwLock;
use uuid::Uuid;

use crate::error::{AttrError, Result};
use crate::timestamp::TimestampValues;

mod store;
mod version;

pub use store::{
    ColumnStore, ID_COLUMN, ID_INDEX, LABEL_COLUMN, LABEL_INDEX, MAX_COLUMNS, TIMESET_COLUMN,
    TIMESET_INDEX,
};
pub(crate) use store::StoreImage;
pub use version::{ColumnObserver, ColumnVersion, ColumnWatch, VersionStamp};

/// Dense slot of a column inside its store.
pub type DenseIndex = u16;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Attachment {
    pub(crate) store: Option<Uuid>,
    pub(crate) index: Option<DenseIndex>,
}

/// A typed attribute column.
///
/// Equality and hashing use `(id, type_tag)` only.
#[derive(Debug)]
pub struct Column {
    id: String,
    title: String,
    type_tag: TypeTag,
    default_value: Option<Value>,
    origin: ColumnOrigin,
    indexed: bool,
    read_only: bool,
    estimator: RwLock<Option<Estimator>>,
    attachment: RwLock<Attachment>,
    version: ColumnVersion,
}

impl Column {
    /// Start building a column with the given id and declared type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use attrstore::{Column, TypeTag, Value, ValueType};
    ///
    /// let age = Column::builder("age", TypeTag::Scalar(ValueType::Int))
    ///     .title("Age")
    ///     .default_value(Value::Int(0))
    ///     .build()?;
    /// assert!(age.dense_index().is_none());
    /// # Ok::<(), attrstore::AttrError>(())
    /// ```
    pub fn builder(id: impl Into<String>, type_tag: TypeTag) -> ColumnBuilder {
        ColumnBuilder::new(id.into(), type_tag)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn type_tag(&self) -> TypeTag {
        self.type_tag
    }

    /// Primitive kind held by the column; `None` for the timestamp-set column.
    pub fn value_type(&self) -> Option<ValueType> {
        self.type_tag.value_type()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    pub fn origin(&self) -> ColumnOrigin {
        self.origin
    }

    pub fn is_indexed(&self) -> bool {
        self.indexed
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn is_dynamic(&self) -> bool {
        self.type_tag.is_dynamic()
    }

    pub fn is_property(&self) -> bool {
        self.origin == ColumnOrigin::Property
    }

    /// Dense index while registered, `None` when detached.
    pub fn dense_index(&self) -> Option<DenseIndex> {
        self.attachment.read().index
    }

    pub fn estimator(&self) -> Option<Estimator> {
        *self.estimator.read()
    }

    pub fn version(&self) -> VersionStamp {
        self.version.current()
    }

    /// Starts watching this column for mutations.
    pub fn watch(self: &Arc<Self>) -> ColumnWatch {
        ColumnWatch::new(self.clone())
    }

    pub(crate) fn attachment(&self) -> Attachment {
        *self.attachment.read()
    }

    pub(crate) fn attach(&self, store: Uuid, index: DenseIndex) {
        *self.attachment.write() = Attachment {
            store: Some(store),
            index: Some(index),
        };
    }

    pub(crate) fn detach(&self) {
        *self.attachment.write() = Attachment::default();
    }

    pub(crate) fn set_estimator_unchecked(&self, estimator: Option<Estimator>) {
        *self.estimator.write() = estimator;
    }

    pub(crate) fn version_counter(&self) -> &ColumnVersion {
        &self.version
    }

    /// Whether the column's value set type accepts `estimator`.
    pub(crate) fn supports_estimator(&self, estimator: Estimator) -> bool {
        match (self.type_tag, self.value_type()) {
            (TypeTag::Timestamped(_), Some(vt)) => TimestampValues::new(vt).is_supported(estimator),
            _ => false,
        }
    }
}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.type_tag == other.type_tag
    }
}

impl Eq for Column {}

impl Hash for Column {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.type_tag.hash(state);
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.type_tag)
    }
}

/// Builder for [`Column`].
#[derive(Debug, Clone)]
pub struct ColumnBuilder {
    id: String,
    type_tag: TypeTag,
    title: Option<String>,
    default_value: Option<Value>,
    origin: ColumnOrigin,
    indexed: bool,
    read_only: bool,
    estimator: Option<Estimator>,
}

impl ColumnBuilder {
    fn new(id: String, type_tag: TypeTag) -> Self {
        Self {
            id,
            type_tag,
            title: None,
            default_value: None,
            origin: ColumnOrigin::Data,
            indexed: false,
            read_only: false,
            estimator: None,
        }
    }

    /// Human-readable title; defaults to the id.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn origin(mut self, origin: ColumnOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn indexed(mut self, indexed: bool) -> Self {
        self.indexed = indexed;
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn estimator(mut self, estimator: Estimator) -> Self {
        self.estimator = Some(estimator);
        self
    }

    pub fn build(self) -> Result<Column> {
        if self.id.trim().is_empty() {
            return Err(AttrError::InvalidColumn("column id cannot be empty".into()));
        }

        if let Some(default) = &self.default_value {
            match self.type_tag.value_type() {
                Some(vt) if vt == default.value_type() => {}
                Some(vt) => return Err(AttrError::type_mismatch(&self.id, vt, default.value_type())),
                None => {
                    return Err(AttrError::InvalidColumn(format!(
                        "column '{}' cannot have a default value",
                        self.id
                    )));
                }
            }
        }

        let column = Column {
            title: self.title.unwrap_or_else(|| self.id.clone()),
            id: self.id,
            type_tag: self.type_tag,
            default_value: self.default_value,
            origin: self.origin,
            indexed: self.indexed,
            read_only: self.read_only,
            estimator: RwLock::new(None),
            attachment: RwLock::new(Attachment::default()),
            version: ColumnVersion::new(),
        };

        if let Some(estimator) = self.estimator {
            if !column.is_dynamic() {
                return Err(AttrError::NotDynamic(column.id));
            }
            if !column.supports_estimator(estimator) {
                return Err(AttrError::UnsupportedEstimator {
                    column: column.id,
                    estimator,
                });
            }
            column.set_estimator_unchecked(Some(estimator));
        }

        Ok(column)
    }
}

/// How an attribute operation names its column.
#[derive(Debug, Clone, Copy)]
pub enum ColumnKey<'a> {
    Id(&'a str),
    Column(&'a Arc<Column>),
}

impl<'a> From<&'a str> for ColumnKey<'a> {
    fn from(id: &'a str) -> Self {
        ColumnKey::Id(id)
    }
}

impl<'a> From<&'a String> for ColumnKey<'a> {
    fn from(id: &'a String) -> Self {
        ColumnKey::Id(id.as_str())
    }
}

impl<'a> From<&'a Arc<Column>> for ColumnKey<'a> {
    fn from(column: &'a Arc<Column>) -> Self {
        ColumnKey::Column(column)
    }
}
