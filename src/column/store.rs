//! Per-element-class column registry.
//!
//! The store assigns dense indices to columns, owns the per-column
//! [`TimestampMap`]s of dynamic columns and the reference-counted registry
//! behind element timestamp sets. All of it sits behind one `RwLock`:
//! structural changes and timestamp allocation take it exclusively, lookups
//! share it.

use std::collections::BTreeSet;
use std::sync::Arc;

use attrstore_types::{ColumnOrigin, ElementClass, Estimator, Interval, TypeTag, ValueType};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use uuid::Uuid;

use super::{Column, ColumnKey, ColumnObserver, DenseIndex};
use crate::config::Config;
use crate::error::{AttrError, Result};
use crate::timestamp::{CompactIndex, TimestampIndexStore, TimestampMap};

/// Largest number of live columns a store can hold, built-ins included.
pub const MAX_COLUMNS: usize = 65534;

pub const ID_COLUMN: &str = "id";
pub const LABEL_COLUMN: &str = "label";
pub const TIMESET_COLUMN: &str = "timeset";

pub const ID_INDEX: DenseIndex = 0;
pub const LABEL_INDEX: DenseIndex = 1;
pub const TIMESET_INDEX: DenseIndex = 2;

pub(crate) const BUILTIN_COUNT: usize = 3;

#[derive(Debug, Default)]
struct StoreInner {
    /// Slot per dense index; `None` for freed slots.
    columns: Vec<Option<Arc<Column>>>,
    ids: FxHashMap<String, DenseIndex>,
    garbage: BTreeSet<DenseIndex>,
    timestamp_maps: FxHashMap<DenseIndex, TimestampMap>,
    element_timestamps: TimestampIndexStore,
}

impl StoreInner {
    fn live(&self) -> usize {
        self.ids.len()
    }

    fn column_at(&self, index: DenseIndex) -> Option<&Arc<Column>> {
        self.columns.get(index as usize).and_then(Option::as_ref)
    }

    fn insert_at(&mut self, index: DenseIndex, column: Arc<Column>) {
        let slot = index as usize;
        if slot >= self.columns.len() {
            self.columns.resize(slot + 1, None);
        }
        self.ids.insert(column.id().to_string(), index);
        if column.is_dynamic() {
            self.timestamp_maps.insert(index, TimestampMap::new());
        }
        self.columns[slot] = Some(column);
    }
}

/// Flat copy of a store's user schema, used by the codec.
#[derive(Debug)]
pub(crate) struct StoreImage {
    pub(crate) class: ElementClass,
    pub(crate) slot_count: usize,
    /// User columns with their dense indices.
    pub(crate) columns: Vec<(DenseIndex, Arc<Column>)>,
    pub(crate) garbage: Vec<DenseIndex>,
    pub(crate) timestamp_maps: Vec<(DenseIndex, TimestampMap)>,
}

/// Registry of the columns describing one class of graph element.
pub struct ColumnStore {
    id: Uuid,
    class: ElementClass,
    config: Config,
    inner: RwLock<StoreInner>,
    observers: RwLock<Vec<Arc<dyn ColumnObserver>>>,
}

impl std::fmt::Debug for ColumnStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnStore")
            .field("id", &self.id)
            .field("class", &self.class)
            .field("config", &self.config)
            .field("size", &self.size())
            .finish()
    }
}

impl ColumnStore {
    /// Creates a store holding only the built-in columns.
    pub fn new(class: ElementClass, config: Config) -> Result<Self> {
        let config = config.checked()?;
        let store = Self {
            id: Uuid::new_v4(),
            class,
            config,
            inner: RwLock::new(StoreInner::default()),
            observers: RwLock::new(Vec::new()),
        };

        {
            let mut inner = store.inner.write();
            for (index, column) in store.builtin_columns()?.into_iter().enumerate() {
                let column = Arc::new(column);
                column.attach(store.id, index as DenseIndex);
                inner.insert_at(index as DenseIndex, column);
            }
        }
        log::debug!("created {} column store {}", class, store.id);
        Ok(store)
    }

    fn builtin_columns(&self) -> Result<[Column; BUILTIN_COUNT]> {
        Ok([
            Column::builder(ID_COLUMN, TypeTag::Scalar(ValueType::String))
                .title("Id")
                .origin(ColumnOrigin::Property)
                .indexed(self.config.indexing)
                .read_only(true)
                .build()?,
            Column::builder(LABEL_COLUMN, TypeTag::Scalar(ValueType::String))
                .title("Label")
                .origin(ColumnOrigin::Property)
                .build()?,
            Column::builder(TIMESET_COLUMN, TypeTag::TimestampSet)
                .title("Timestamp Set")
                .origin(ColumnOrigin::Property)
                .read_only(true)
                .build()?,
        ])
    }

    /// Unique identity of this store instance.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn class(&self) -> ElementClass {
        self.class
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn has_timestamps(&self) -> bool {
        self.config.timestamps
    }

    /// Registers `column` and assigns its dense index.
    ///
    /// The smallest freed index is reused before the store grows.
    pub fn add_column(&self, column: Column) -> Result<Arc<Column>> {
        let mut inner = self.inner.write();

        if inner.ids.contains_key(column.id()) {
            return Err(AttrError::DuplicateColumn(column.id().to_string()));
        }
        if column.is_indexed() && !self.config.indexing {
            return Err(AttrError::IndexingUnsupported(column.id().to_string()));
        }
        if column.type_tag() == TypeTag::TimestampSet {
            return Err(AttrError::InvalidColumn(format!(
                "column '{}' cannot use the reserved timestamp set type",
                column.id()
            )));
        }

        let index = match inner.garbage.first().copied() {
            Some(index) => index,
            None if inner.columns.len() < MAX_COLUMNS => inner.columns.len() as DenseIndex,
            None => return Err(AttrError::CapacityExceeded(MAX_COLUMNS)),
        };
        inner.garbage.remove(&index);

        let column = Arc::new(column);
        column.attach(self.id, index);
        inner.insert_at(index, column.clone());

        log::debug!(
            "added column '{}' ({}) at index {}",
            column.id(),
            column.type_tag(),
            index
        );
        Ok(column)
    }

    /// Unregisters a column, freeing its dense index and detaching it.
    pub fn remove_column<'a>(&self, key: impl Into<ColumnKey<'a>>) -> Result<Arc<Column>> {
        let mut inner = self.inner.write();
        let index = Self::locate(&inner, self.id, key.into())?;
        if (index as usize) < BUILTIN_COUNT {
            let id = inner
                .column_at(index)
                .map(|c| c.id().to_string())
                .unwrap_or_default();
            return Err(AttrError::ProtectedColumn(id));
        }

        let column = inner.columns[index as usize]
            .take()
            .ok_or_else(|| AttrError::UnknownColumn(format!("#{}", index)))?;
        inner.ids.remove(column.id());
        inner.timestamp_maps.remove(&index);
        inner.garbage.insert(index);
        column.detach();

        log::debug!("removed column '{}' from index {}", column.id(), index);
        Ok(column)
    }

    pub fn get_column(&self, id: &str) -> Option<Arc<Column>> {
        let inner = self.inner.read();
        inner
            .ids
            .get(id)
            .and_then(|index| inner.column_at(*index))
            .cloned()
    }

    pub fn has_column(&self, id: &str) -> bool {
        self.inner.read().ids.contains_key(id)
    }

    pub fn get_column_by_index(&self, index: DenseIndex) -> Option<Arc<Column>> {
        self.inner.read().column_at(index).cloned()
    }

    /// Live columns in dense index order.
    pub fn to_array(&self) -> Vec<Arc<Column>> {
        self.inner.read().columns.iter().flatten().cloned().collect()
    }

    pub fn column_ids(&self) -> Vec<String> {
        self.inner
            .read()
            .columns
            .iter()
            .flatten()
            .map(|c| c.id().to_string())
            .collect()
    }

    /// Number of live columns, built-ins included.
    pub fn size(&self) -> usize {
        self.inner.read().live()
    }

    /// Sets or clears the estimator used by interval reads on a dynamic column.
    pub fn set_estimator<'a>(
        &self,
        key: impl Into<ColumnKey<'a>>,
        estimator: Option<Estimator>,
    ) -> Result<()> {
        let inner = self.inner.write();
        let column = self.resolve_locked(&inner, key.into())?;
        if !column.is_dynamic() {
            return Err(AttrError::NotDynamic(column.id().to_string()));
        }
        if let Some(estimator) = estimator
            && !column.supports_estimator(estimator)
        {
            return Err(AttrError::UnsupportedEstimator {
                column: column.id().to_string(),
                estimator,
            });
        }
        column.set_estimator_unchecked(estimator);
        log::debug!("estimator of column '{}' set to {:?}", column.id(), estimator);
        Ok(())
    }

    pub fn get_estimator<'a>(&self, key: impl Into<ColumnKey<'a>>) -> Result<Option<Estimator>> {
        let column = self.resolve(key)?;
        if !column.is_dynamic() {
            return Err(AttrError::NotDynamic(column.id().to_string()));
        }
        Ok(column.estimator())
    }

    /// Fails with `ColumnMismatch` unless `column` is the object registered
    /// in this store at its dense index.
    pub fn check_column(&self, column: &Column) -> Result<()> {
        let inner = self.inner.read();
        Self::check_locked(&inner, self.id, column)
    }

    /// Registers an observer for explicit column events.
    pub fn register_observer(&self, observer: Arc<dyn ColumnObserver>) {
        self.observers.write().push(observer);
    }

    /// Compact indices of every timestamp of `column` inside `interval`, in
    /// chronological order.
    pub fn timestamp_indices<'a>(
        &self,
        key: impl Into<ColumnKey<'a>>,
        interval: &Interval,
    ) -> Result<Vec<CompactIndex>> {
        self.require_timestamps()?;
        let inner = self.inner.read();
        let index = Self::locate(&inner, self.id, key.into())?;
        Ok(inner
            .timestamp_maps
            .get(&index)
            .map(|map| map.get_timestamp_indices(interval))
            .unwrap_or_default())
    }

    /// Number of compact index slots handed out for `column`.
    pub fn timestamp_map_len<'a>(&self, key: impl Into<ColumnKey<'a>>) -> Result<usize> {
        let inner = self.inner.read();
        let index = Self::locate(&inner, self.id, key.into())?;
        Ok(inner
            .timestamp_maps
            .get(&index)
            .map(TimestampMap::length)
            .unwrap_or(0))
    }

    /// Number of elements currently holding `timestamp` in their timestamp set.
    pub fn timestamp_reference_count(&self, timestamp: f64) -> u32 {
        self.inner.read().element_timestamps.reference_count(timestamp)
    }

    pub(crate) fn require_timestamps(&self) -> Result<()> {
        if self.config.timestamps {
            Ok(())
        } else {
            Err(AttrError::TimestampStoreUnavailable)
        }
    }

    pub(crate) fn resolve<'a>(&self, key: impl Into<ColumnKey<'a>>) -> Result<Arc<Column>> {
        let inner = self.inner.read();
        self.resolve_locked(&inner, key.into())
    }

    fn resolve_locked(&self, inner: &StoreInner, key: ColumnKey<'_>) -> Result<Arc<Column>> {
        let index = Self::locate(inner, self.id, key)?;
        inner
            .column_at(index)
            .cloned()
            .ok_or_else(|| AttrError::UnknownColumn(format!("#{}", index)))
    }

    fn locate(inner: &StoreInner, store: Uuid, key: ColumnKey<'_>) -> Result<DenseIndex> {
        match key {
            ColumnKey::Id(id) => inner
                .ids
                .get(id)
                .copied()
                .ok_or_else(|| AttrError::UnknownColumn(id.to_string())),
            ColumnKey::Column(column) => {
                Self::check_locked(inner, store, column)?;
                column
                    .dense_index()
                    .ok_or_else(|| AttrError::ColumnMismatch(column.id().to_string()))
            }
        }
    }

    fn check_locked(inner: &StoreInner, store: Uuid, column: &Column) -> Result<()> {
        let attachment = column.attachment();
        let registered = match (attachment.store, attachment.index) {
            (Some(owner), Some(index)) if owner == store => inner
                .column_at(index)
                .is_some_and(|c| std::ptr::eq(Arc::as_ptr(c), column)),
            _ => false,
        };
        if registered {
            Ok(())
        } else {
            Err(AttrError::ColumnMismatch(column.id().to_string()))
        }
    }

    /// Compact index of `timestamp` in the map of `column`, allocated on first use.
    pub(crate) fn timestamp_index(&self, column: &Column, timestamp: f64) -> Result<CompactIndex> {
        let mut inner = self.inner.write();
        Self::check_locked(&inner, self.id, column)?;
        let index = column
            .dense_index()
            .ok_or_else(|| AttrError::ColumnMismatch(column.id().to_string()))?;
        inner
            .timestamp_maps
            .get_mut(&index)
            .ok_or_else(|| AttrError::NotDynamic(column.id().to_string()))?
            .get_timestamp_index(timestamp)
    }

    /// Non-allocating counterpart of [`Self::timestamp_index`].
    pub(crate) fn find_timestamp_index(&self, column: &Column, timestamp: f64) -> Option<CompactIndex> {
        let inner = self.inner.read();
        let index = column.dense_index()?;
        inner.timestamp_maps.get(&index)?.index_of(timestamp)
    }

    /// Pairs each compact index with its timestamp in the map of `column`.
    pub(crate) fn resolve_timestamps(
        &self,
        column: &Column,
        indices: &[CompactIndex],
    ) -> Vec<(CompactIndex, f64)> {
        let inner = self.inner.read();
        let Some(map) = column
            .dense_index()
            .and_then(|index| inner.timestamp_maps.get(&index))
        else {
            return Vec::new();
        };
        indices
            .iter()
            .filter_map(|i| map.timestamp(*i).map(|ts| (*i, ts)))
            .collect()
    }

    pub(crate) fn acquire_element_timestamp(&self, timestamp: f64) -> Result<CompactIndex> {
        self.inner.write().element_timestamps.add(timestamp)
    }

    pub(crate) fn release_element_timestamp(&self, timestamp: f64) -> Option<CompactIndex> {
        self.inner.write().element_timestamps.release(timestamp)
    }

    pub(crate) fn release_element_timestamps(&self, timestamps: &[f64]) {
        let mut inner = self.inner.write();
        for timestamp in timestamps {
            inner.element_timestamps.release(*timestamp);
        }
    }

    pub(crate) fn element_timestamps_of(&self, indices: &[CompactIndex]) -> Vec<f64> {
        self.inner.read().element_timestamps.map().get_timestamps(indices)
    }

    pub(crate) fn find_element_timestamp(&self, timestamp: f64) -> Option<CompactIndex> {
        self.inner.read().element_timestamps.map().index_of(timestamp)
    }

    /// Bumps the column's version once; on a wrap, observers get a reset event.
    pub(crate) fn record_mutation(&self, column: &Column) {
        let Some(epoch) = column.version_counter().bump(self.config.version_limit) else {
            return;
        };
        log::warn!(
            "version counter of column '{}' wrapped, entering epoch {}",
            column.id(),
            epoch
        );
        for observer in self.observers.read().iter() {
            observer.on_version_reset(column.id(), epoch);
        }
    }

    /// Copies the user schema and its timestamp maps.
    pub(crate) fn export(&self) -> StoreImage {
        let inner = self.inner.read();
        let columns = inner
            .columns
            .iter()
            .enumerate()
            .skip(BUILTIN_COUNT)
            .filter_map(|(i, c)| c.as_ref().map(|c| (i as DenseIndex, c.clone())))
            .collect();
        let mut timestamp_maps: Vec<_> = inner
            .timestamp_maps
            .iter()
            .map(|(i, m)| (*i, m.clone()))
            .collect();
        timestamp_maps.sort_by_key(|(i, _)| *i);
        StoreImage {
            class: self.class,
            slot_count: inner.columns.len(),
            columns,
            garbage: inner.garbage.iter().copied().collect(),
            timestamp_maps,
        }
    }

    /// Installs a decoded schema into this store, which must hold nothing
    /// beyond its built-in columns. Nothing changes unless every check passes.
    pub(crate) fn install(&self, image: StoreImage) -> Result<()> {
        let mut inner = self.inner.write();
        let untouched = inner.live() == BUILTIN_COUNT
            && inner.columns.len() == BUILTIN_COUNT
            && inner.timestamp_maps.values().all(TimestampMap::is_empty)
            && inner.element_timestamps.is_empty();
        if !untouched {
            return Err(AttrError::StoreNotEmpty);
        }
        if image.class != self.class {
            return Err(AttrError::InvalidFormat(format!(
                "snapshot holds {} columns, store is for {}",
                image.class, self.class
            )));
        }
        if image.slot_count < BUILTIN_COUNT || image.slot_count > MAX_COLUMNS {
            return Err(AttrError::InvalidFormat(format!(
                "invalid column slot count {}",
                image.slot_count
            )));
        }

        let mut taken = vec![false; image.slot_count];
        taken[..BUILTIN_COUNT].fill(true);
        let mut claim = |index: DenseIndex| -> Result<()> {
            match taken.get_mut(index as usize) {
                Some(slot) if !*slot => {
                    *slot = true;
                    Ok(())
                }
                _ => Err(AttrError::InvalidFormat(format!(
                    "dense index {} is out of range or used twice",
                    index
                ))),
            }
        };
        for (index, column) in &image.columns {
            claim(*index)?;
            if inner.ids.contains_key(column.id())
                || image.columns.iter().filter(|(_, c)| c.id() == column.id()).count() > 1
            {
                return Err(AttrError::DuplicateColumn(column.id().to_string()));
            }
            if column.is_indexed() && !self.config.indexing {
                return Err(AttrError::IndexingUnsupported(column.id().to_string()));
            }
        }
        for index in &image.garbage {
            claim(*index)?;
        }
        if image.columns.len() + image.garbage.len() + BUILTIN_COUNT != image.slot_count {
            return Err(AttrError::InvalidFormat(
                "column slots and garbage do not cover the store".into(),
            ));
        }
        for (index, _) in &image.timestamp_maps {
            let dynamic = image
                .columns
                .iter()
                .any(|(i, c)| i == index && c.is_dynamic());
            if !dynamic {
                return Err(AttrError::InvalidFormat(format!(
                    "timestamp map for non-dynamic slot {}",
                    index
                )));
            }
        }

        let column_count = image.columns.len();
        for (index, column) in image.columns {
            column.attach(self.id, index);
            inner.insert_at(index, column);
        }
        inner.columns.resize(image.slot_count, None);
        inner.garbage = image.garbage.into_iter().collect();
        for (index, map) in image.timestamp_maps {
            inner.timestamp_maps.insert(index, map);
        }

        log::debug!(
            "loaded {} columns into {} column store {}",
            column_count,
            self.class,
            self.id
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attrstore_types::Value;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn store() -> ColumnStore {
        ColumnStore::new(ElementClass::Node, Config::default()).unwrap()
    }

    fn int_column(id: &str) -> Column {
        Column::builder(id, TypeTag::Scalar(ValueType::Int))
            .build()
            .unwrap()
    }

    #[test]
    fn test_builtins_present() {
        let store = store();
        assert_eq!(store.size(), BUILTIN_COUNT);
        assert_eq!(store.column_ids(), vec!["id", "label", "timeset"]);
        let id = store.get_column(ID_COLUMN).unwrap();
        assert!(id.is_read_only());
        assert!(id.is_property());
        assert_eq!(id.dense_index(), Some(ID_INDEX));
        assert!(matches!(
            store.remove_column(LABEL_COLUMN),
            Err(AttrError::ProtectedColumn(_))
        ));
    }

    #[test]
    fn test_add_and_lookup() {
        let store = store();
        let age = Column::builder("age", TypeTag::Scalar(ValueType::Int))
            .default_value(Value::Int(1))
            .build()
            .unwrap();
        let age = store.add_column(age).unwrap();
        assert_eq!(age.dense_index(), Some(3));
        assert!(store.has_column("age"));
        assert_eq!(store.get_column_by_index(3).unwrap().id(), "age");
        assert_eq!(store.size(), 4);
        assert!(matches!(
            store.add_column(int_column("age")),
            Err(AttrError::DuplicateColumn(_))
        ));
    }

    #[test]
    fn test_reuses_smallest_freed_index() {
        let store = store();
        let a = store.add_column(int_column("a")).unwrap();
        let b = store.add_column(int_column("b")).unwrap();
        let _c = store.add_column(int_column("c")).unwrap();

        store.remove_column(&b).unwrap();
        store.remove_column("a").unwrap();
        assert!(a.dense_index().is_none());
        assert!(b.dense_index().is_none());
        assert_eq!(store.size(), 4);

        assert_eq!(store.add_column(int_column("d")).unwrap().dense_index(), Some(3));
        assert_eq!(store.add_column(int_column("e")).unwrap().dense_index(), Some(4));
        assert_eq!(store.add_column(int_column("f")).unwrap().dense_index(), Some(6));
    }

    #[test]
    fn test_removed_column_is_rejected() {
        let store = store();
        let a = store.add_column(int_column("a")).unwrap();
        store.remove_column(&a).unwrap();
        assert!(matches!(store.check_column(&a), Err(AttrError::ColumnMismatch(_))));
        assert!(matches!(store.remove_column(&a), Err(AttrError::ColumnMismatch(_))));
        assert!(matches!(store.remove_column("a"), Err(AttrError::UnknownColumn(_))));
    }

    #[test]
    fn test_foreign_column_with_same_id_is_rejected() {
        let first = store();
        let second = store();
        let mine = first.add_column(int_column("x")).unwrap();
        second.add_column(int_column("x")).unwrap();
        assert!(first.check_column(&mine).is_ok());
        assert!(matches!(second.check_column(&mine), Err(AttrError::ColumnMismatch(_))));
    }

    #[test]
    fn test_indexing_unsupported() {
        let store =
            ColumnStore::new(ElementClass::Edge, Config::default().with_indexing(false)).unwrap();
        let column = Column::builder("w", TypeTag::Scalar(ValueType::Double))
            .indexed(true)
            .build()
            .unwrap();
        assert!(matches!(
            store.add_column(column),
            Err(AttrError::IndexingUnsupported(_))
        ));
        assert_eq!(store.size(), BUILTIN_COUNT);
    }

    #[test]
    fn test_estimator_rules() {
        let store = store();
        store.add_column(int_column("age")).unwrap();
        store
            .add_column(
                Column::builder("name", TypeTag::Timestamped(ValueType::String))
                    .build()
                    .unwrap(),
            )
            .unwrap();
        let weight = store
            .add_column(
                Column::builder("weight", TypeTag::Timestamped(ValueType::Double))
                    .build()
                    .unwrap(),
            )
            .unwrap();

        assert!(matches!(
            store.set_estimator("age", Some(Estimator::Max)),
            Err(AttrError::NotDynamic(_))
        ));
        assert!(matches!(
            store.set_estimator("name", Some(Estimator::Median)),
            Err(AttrError::UnsupportedEstimator { .. })
        ));
        store.set_estimator(&weight, Some(Estimator::Median)).unwrap();
        assert_eq!(store.get_estimator("weight").unwrap(), Some(Estimator::Median));
        store.set_estimator("weight", None).unwrap();
        assert_eq!(weight.estimator(), None);
    }

    #[test]
    fn test_timestamp_maps_follow_columns() {
        let store = store();
        let series = store
            .add_column(
                Column::builder("s", TypeTag::Timestamped(ValueType::Int))
                    .build()
                    .unwrap(),
            )
            .unwrap();
        let i2 = store.timestamp_index(&series, 2.0).unwrap();
        let i1 = store.timestamp_index(&series, 1.0).unwrap();
        assert_eq!(store.timestamp_index(&series, 2.0).unwrap(), i2);
        assert_eq!(store.timestamp_map_len(&series).unwrap(), 2);
        assert_eq!(
            store.timestamp_indices("s", &Interval::all()).unwrap(),
            vec![i1, i2]
        );
        assert_eq!(store.find_timestamp_index(&series, 3.0), None);

        let age = store.add_column(int_column("age")).unwrap();
        assert!(matches!(
            store.timestamp_index(&age, 1.0),
            Err(AttrError::NotDynamic(_))
        ));
    }

    #[test]
    fn test_wrap_notifies_observers() {
        struct Counter(AtomicU32);
        impl ColumnObserver for Counter {
            fn on_version_reset(&self, _column: &str, epoch: u32) {
                self.0.store(epoch, Ordering::SeqCst);
            }
        }

        let store =
            ColumnStore::new(ElementClass::Node, Config::default().with_version_limit(2)).unwrap();
        let counter = Arc::new(Counter(AtomicU32::new(0)));
        store.register_observer(counter.clone());
        let age = store.add_column(int_column("age")).unwrap();

        store.record_mutation(&age);
        assert_eq!(counter.0.load(Ordering::SeqCst), 0);
        store.record_mutation(&age);
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
        assert_eq!(age.version().epoch, 1);
        assert_eq!(age.version().version, 0);
    }
}
