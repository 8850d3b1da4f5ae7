//! Graph elements and their attribute slots.
//!
//! An [`Element`] keeps one optional slot per dense column index of its
//! [`ColumnStore`]. Static columns hold a single [`Value`]; dynamic columns
//! hold a [`TimestampValues`] series keyed by the column's compact timestamp
//! indices. Every successful mutation bumps the column's version exactly once.
//!
//! Locking: an element's slots sit behind their own mutex. When both locks are
//! needed the element lock is taken first, then the store lock.

use std::collections::BTreeSet;
use std::sync::Arc;

use attrstore_types::{Estimator, Interval, TypeTag, Value, ValueType};
use parking_lot::Mutex;

use crate::column::{
    Column, ColumnKey, ColumnStore, DenseIndex, ID_INDEX, LABEL_COLUMN, TIMESET_INDEX,
};
use crate::error::{AttrError, Result};
use crate::timestamp::{CompactIndex, TimestampValues};

/// Value read back from an attribute slot.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Scalar(Value),
    /// `(timestamp, value)` pairs in chronological order.
    Series(Vec<(f64, Value)>),
    /// Sorted element timestamps.
    Timestamps(Vec<f64>),
}

impl AttributeValue {
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            AttributeValue::Scalar(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_scalar(self) -> Option<Value> {
        match self {
            AttributeValue::Scalar(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum SlotData {
    Scalar(Value),
    Series(TimestampValues),
}

#[derive(Debug)]
struct Slot {
    /// Column the data was written for. A slot whose column was removed from
    /// the store (and whose index may have been reused) is treated as empty.
    column: Arc<Column>,
    data: SlotData,
}

#[derive(Debug, Default)]
struct ElementData {
    slots: Vec<Option<Slot>>,
    timestamps: BTreeSet<CompactIndex>,
}

impl ElementData {
    fn slot(&self, column: &Arc<Column>) -> Option<&SlotData> {
        let index = column.dense_index()? as usize;
        match self.slots.get(index) {
            Some(Some(slot)) if Arc::ptr_eq(&slot.column, column) => Some(&slot.data),
            _ => None,
        }
    }

    fn slot_mut(&mut self, column: &Arc<Column>) -> Option<&mut SlotData> {
        let index = column.dense_index()? as usize;
        match self.slots.get_mut(index) {
            Some(Some(slot)) if Arc::ptr_eq(&slot.column, column) => Some(&mut slot.data),
            _ => None,
        }
    }

    fn take(&mut self, column: &Arc<Column>) -> Option<SlotData> {
        let index = column.dense_index()? as usize;
        let slot = self.slots.get_mut(index)?;
        if slot.as_ref().is_some_and(|s| Arc::ptr_eq(&s.column, column)) {
            slot.take().map(|s| s.data)
        } else {
            None
        }
    }

    fn put(&mut self, column: &Arc<Column>, data: SlotData) -> Result<()> {
        let index = column
            .dense_index()
            .ok_or_else(|| AttrError::ColumnMismatch(column.id().to_string()))?
            as usize;
        if index >= self.slots.len() {
            self.slots.resize_with(index + 1, || None);
        }
        self.slots[index] = Some(Slot {
            column: column.clone(),
            data,
        });
        Ok(())
    }
}

/// Slot contents handed to and from the codec.
#[derive(Debug, Clone)]
pub(crate) struct ElementImage {
    pub(crate) slots: Vec<Option<SlotData>>,
    pub(crate) timestamps: Vec<f64>,
}

/// A node or edge carrying attribute values for the columns of its store.
pub struct Element {
    id: String,
    store: Arc<ColumnStore>,
    data: Mutex<ElementData>,
}

impl std::fmt::Debug for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Element")
            .field("id", &self.id)
            .field("class", &self.store.class())
            .finish()
    }
}

impl Element {
    /// Creates an element attached to `store`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use attrstore::{Column, ColumnStore, Config, Element, ElementClass, TypeTag, Value, ValueType};
    ///
    /// let store = Arc::new(ColumnStore::new(ElementClass::Node, Config::default())?);
    /// store.add_column(Column::builder("age", TypeTag::Scalar(ValueType::Int)).build()?)?;
    ///
    /// let node = Element::new(store.clone(), "n1");
    /// node.set_attribute("age", Some(Value::Int(42)))?;
    /// assert_eq!(node.get_value("age")?, Some(Value::Int(42)));
    /// # Ok::<(), attrstore::AttrError>(())
    /// ```
    pub fn new(store: Arc<ColumnStore>, id: impl Into<String>) -> Self {
        let id = id.into();
        let mut data = ElementData::default();
        if let Some(column) = store.get_column_by_index(ID_INDEX) {
            data.slots.resize_with(ID_INDEX as usize + 1, || None);
            data.slots[ID_INDEX as usize] = Some(Slot {
                column,
                data: SlotData::Scalar(Value::String(id.clone())),
            });
        }
        Self {
            id,
            store,
            data: Mutex::new(data),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn store(&self) -> &Arc<ColumnStore> {
        &self.store
    }

    pub fn label(&self) -> Option<String> {
        self.get_value(LABEL_COLUMN)
            .ok()
            .flatten()
            .and_then(|v| v.as_str().map(str::to_string))
    }

    pub fn set_label(&self, label: Option<&str>) -> Result<()> {
        self.set_attribute(LABEL_COLUMN, label.map(Value::from))
    }

    /// Current value of a column, falling back to the column default.
    pub fn get_attribute<'a>(&self, key: impl Into<ColumnKey<'a>>) -> Result<Option<AttributeValue>> {
        let column = self.store.resolve(key)?;
        if column.type_tag() == TypeTag::TimestampSet {
            let timestamps = self.timestamps();
            return Ok((!timestamps.is_empty()).then_some(AttributeValue::Timestamps(timestamps)));
        }

        let data = self.data.lock();
        let value = match data.slot(&column) {
            Some(SlotData::Scalar(value)) => AttributeValue::Scalar(value.clone()),
            Some(SlotData::Series(series)) => AttributeValue::Series(self.series_pairs(&column, series)),
            None => return Ok(column.default_value().cloned().map(AttributeValue::Scalar)),
        };
        Ok(Some(value))
    }

    /// Scalar shortcut for [`Self::get_attribute`]; series and timestamp
    /// sets read as `None`.
    pub fn get_value<'a>(&self, key: impl Into<ColumnKey<'a>>) -> Result<Option<Value>> {
        Ok(self.get_attribute(key)?.and_then(AttributeValue::into_scalar))
    }

    /// Value of a dynamic column at one timestamp, or the column default.
    pub fn get_attribute_at<'a>(
        &self,
        key: impl Into<ColumnKey<'a>>,
        timestamp: f64,
    ) -> Result<Option<Value>> {
        self.store.require_timestamps()?;
        let column = self.dynamic_column(key)?;
        if !timestamp.is_finite() {
            return Err(AttrError::InvalidTimestamp(timestamp));
        }

        let found = self
            .store
            .find_timestamp_index(&column, timestamp)
            .and_then(|index| match self.data.lock().slot(&column) {
                Some(SlotData::Series(series)) => series.get(index),
                _ => None,
            });
        Ok(found.or_else(|| column.default_value().cloned()))
    }

    /// Aggregates the values of a dynamic column recorded inside `interval`
    /// with the column estimator (`First` when none is set).
    ///
    /// Returns `None` when no value falls in the interval.
    pub fn get_attribute_in<'a>(
        &self,
        key: impl Into<ColumnKey<'a>>,
        interval: &Interval,
    ) -> Result<Option<Value>> {
        self.store.require_timestamps()?;
        let column = self.dynamic_column(key)?;
        let estimator = column.estimator().unwrap_or(Estimator::First);
        let indices = self.store.timestamp_indices(&column, interval)?;

        match self.data.lock().slot(&column) {
            Some(SlotData::Series(series)) => series.aggregate(&indices, estimator),
            _ => Ok(None),
        }
    }

    /// Sets a static value. `None` clears the slot back to the column default.
    pub fn set_attribute<'a>(
        &self,
        key: impl Into<ColumnKey<'a>>,
        value: Option<Value>,
    ) -> Result<()> {
        let column = self.writable_column(key)?;
        match value {
            None => {
                self.data.lock().take(&column);
            }
            Some(value) => {
                let expected = match column.type_tag() {
                    TypeTag::Scalar(vt) => vt,
                    tag => return Err(AttrError::type_mismatch(column.id(), tag, value.value_type())),
                };
                if value.value_type() != expected {
                    return Err(AttrError::type_mismatch(
                        column.id(),
                        expected,
                        value.value_type(),
                    ));
                }
                self.data.lock().put(&column, SlotData::Scalar(value))?;
            }
        }
        self.store.record_mutation(&column);
        Ok(())
    }

    /// Records `value` at `timestamp` on a dynamic column.
    pub fn set_attribute_at<'a>(
        &self,
        key: impl Into<ColumnKey<'a>>,
        value: Option<Value>,
        timestamp: f64,
    ) -> Result<()> {
        let column = self.writable_column(key)?;
        self.store.require_timestamps()?;
        let value_type = Self::require_dynamic(&column)?;
        let value = value.ok_or(AttrError::NullValue)?;
        if value.value_type() != value_type {
            return Err(AttrError::type_mismatch(column.id(), value_type, value.value_type()));
        }
        let index = self.store.timestamp_index(&column, timestamp)?;

        let mut data = self.data.lock();
        if !matches!(data.slot(&column), Some(SlotData::Series(_))) {
            data.put(&column, SlotData::Series(TimestampValues::new(value_type)))?;
        }
        let Some(SlotData::Series(series)) = data.slot_mut(&column) else {
            return Err(AttrError::ColumnMismatch(column.id().to_string()));
        };
        series
            .put(index, value)
            .map_err(|v| AttrError::type_mismatch(column.id(), value_type, v.value_type()))?;
        drop(data);

        self.store.record_mutation(&column);
        Ok(())
    }

    /// Replaces the whole series of a dynamic column.
    pub fn set_series<'a>(
        &self,
        key: impl Into<ColumnKey<'a>>,
        points: &[(f64, Value)],
    ) -> Result<()> {
        let column = self.writable_column(key)?;
        self.store.require_timestamps()?;
        let value_type = Self::require_dynamic(&column)?;
        for (timestamp, value) in points {
            if !timestamp.is_finite() {
                return Err(AttrError::InvalidTimestamp(*timestamp));
            }
            if value.value_type() != value_type {
                return Err(AttrError::type_mismatch(column.id(), value_type, value.value_type()));
            }
        }

        let mut series = TimestampValues::new(value_type);
        for (timestamp, value) in points {
            let index = self.store.timestamp_index(&column, *timestamp)?;
            series
                .put(index, value.clone())
                .map_err(|v| AttrError::type_mismatch(column.id(), value_type, v.value_type()))?;
        }
        self.data.lock().put(&column, SlotData::Series(series))?;

        self.store.record_mutation(&column);
        Ok(())
    }

    /// Clears a slot, returning what it held. Always counts as a mutation.
    pub fn remove_attribute<'a>(
        &self,
        key: impl Into<ColumnKey<'a>>,
    ) -> Result<Option<AttributeValue>> {
        let column = self.writable_column(key)?;
        let previous = self.data.lock().take(&column);
        let previous = previous.map(|data| match data {
            SlotData::Scalar(value) => AttributeValue::Scalar(value),
            SlotData::Series(series) => AttributeValue::Series(self.series_pairs(&column, &series)),
        });
        self.store.record_mutation(&column);
        Ok(previous)
    }

    /// Removes the value recorded at `timestamp`; absent values are a no-op.
    pub fn remove_attribute_at<'a>(
        &self,
        key: impl Into<ColumnKey<'a>>,
        timestamp: f64,
    ) -> Result<Option<Value>> {
        let column = self.writable_column(key)?;
        self.store.require_timestamps()?;
        Self::require_dynamic(&column)?;

        let removed = self
            .store
            .find_timestamp_index(&column, timestamp)
            .and_then(|index| match self.data.lock().slot_mut(&column) {
                Some(SlotData::Series(series)) => series.remove(index),
                _ => None,
            });
        self.store.record_mutation(&column);
        Ok(removed)
    }

    /// Ids of every column of the owning store.
    pub fn attribute_keys(&self) -> Vec<String> {
        self.store.column_ids()
    }

    /// Adds `timestamp` to the element timestamp set. Returns false if it
    /// was already there.
    pub fn add_timestamp(&self, timestamp: f64) -> Result<bool> {
        self.store.require_timestamps()?;
        let mut data = self.data.lock();
        if let Some(index) = self.store.find_element_timestamp(timestamp)
            && data.timestamps.contains(&index)
        {
            return Ok(false);
        }
        let index = self.store.acquire_element_timestamp(timestamp)?;
        data.timestamps.insert(index);
        drop(data);

        self.record_timestamp_change();
        Ok(true)
    }

    /// Removes `timestamp` from the element timestamp set. Returns false if
    /// it was not there.
    pub fn remove_timestamp(&self, timestamp: f64) -> Result<bool> {
        self.store.require_timestamps()?;
        let mut data = self.data.lock();
        let Some(index) = self.store.find_element_timestamp(timestamp) else {
            return Ok(false);
        };
        if !data.timestamps.remove(&index) {
            return Ok(false);
        }
        self.store.release_element_timestamp(timestamp);
        drop(data);

        self.record_timestamp_change();
        Ok(true)
    }

    pub fn has_timestamp(&self, timestamp: f64) -> bool {
        let data = self.data.lock();
        self.store
            .find_element_timestamp(timestamp)
            .is_some_and(|index| data.timestamps.contains(&index))
    }

    /// Element timestamps in ascending order.
    pub fn timestamps(&self) -> Vec<f64> {
        let indices: Vec<_> = self.data.lock().timestamps.iter().copied().collect();
        let mut timestamps = self.store.element_timestamps_of(&indices);
        timestamps.sort_by(f64::total_cmp);
        timestamps
    }

    fn record_timestamp_change(&self) {
        if let Some(timeset) = self.store.get_column_by_index(TIMESET_INDEX) {
            self.store.record_mutation(&timeset);
        }
    }

    fn writable_column<'a>(&self, key: impl Into<ColumnKey<'a>>) -> Result<Arc<Column>> {
        let column = self.store.resolve(key)?;
        if column.is_read_only() {
            return Err(AttrError::ReadOnlyColumn(column.id().to_string()));
        }
        Ok(column)
    }

    fn dynamic_column<'a>(&self, key: impl Into<ColumnKey<'a>>) -> Result<Arc<Column>> {
        let column = self.store.resolve(key)?;
        Self::require_dynamic(&column)?;
        Ok(column)
    }

    fn require_dynamic(column: &Column) -> Result<ValueType> {
        match column.type_tag() {
            TypeTag::Timestamped(vt) => Ok(vt),
            _ => Err(AttrError::NotDynamic(column.id().to_string())),
        }
    }

    fn series_pairs(&self, column: &Column, series: &TimestampValues) -> Vec<(f64, Value)> {
        let resolved = self.store.resolve_timestamps(column, series.indices());
        let mut pairs: Vec<(f64, Value)> = resolved
            .into_iter()
            .filter_map(|(index, ts)| series.get(index).map(|v| (ts, v)))
            .collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        pairs
    }

    /// Copies the live slots for the codec.
    pub(crate) fn export(&self) -> ElementImage {
        let data = self.data.lock();
        let mut slots: Vec<Option<SlotData>> = Vec::with_capacity(data.slots.len());
        for column in self.store.to_array() {
            let Some(index) = column.dense_index() else {
                continue;
            };
            let index = index as usize;
            if index >= slots.len() {
                slots.resize(index + 1, None);
            }
            slots[index] = data.slot(&column).cloned();
        }
        drop(data);

        ElementImage {
            slots,
            timestamps: self.timestamps(),
        }
    }

    /// Rebuilds an element from decoded slots, checking them against the store.
    pub(crate) fn from_image(store: Arc<ColumnStore>, image: ElementImage) -> Result<Self> {
        let mut data = ElementData::default();
        let mut id = None;
        for (index, slot) in image.slots.into_iter().enumerate() {
            let Some(slot) = slot else { continue };
            let dense = DenseIndex::try_from(index)
                .map_err(|_| AttrError::InvalidFormat(format!("slot {} out of range", index)))?;
            let column = store
                .get_column_by_index(dense)
                .ok_or_else(|| AttrError::InvalidFormat(format!("no column at slot {}", index)))?;
            match (&slot, column.type_tag()) {
                (SlotData::Scalar(value), TypeTag::Scalar(vt)) if value.value_type() == vt => {
                    if index == ID_INDEX as usize {
                        id = value.as_str().map(str::to_string);
                    }
                }
                (SlotData::Series(series), TypeTag::Timestamped(vt))
                    if series.value_type() == vt =>
                {
                    let known = store.resolve_timestamps(&column, series.indices()).len();
                    if known != series.len() {
                        return Err(AttrError::InvalidFormat(format!(
                            "series of column '{}' references unknown timestamps",
                            column.id()
                        )));
                    }
                }
                _ => {
                    return Err(AttrError::InvalidFormat(format!(
                        "slot {} does not match column '{}'",
                        index,
                        column.id()
                    )));
                }
            }
            data.put(&column, slot)?;
        }

        let id = id.ok_or_else(|| AttrError::InvalidFormat("element without id".into()))?;
        let element = Self {
            id,
            store,
            data: Mutex::new(data),
        };
        for timestamp in image.timestamps {
            element.add_timestamp(timestamp)?;
        }
        Ok(element)
    }
}

impl Drop for Element {
    fn drop(&mut self) {
        let indices: Vec<_> = self.data.get_mut().timestamps.iter().copied().collect();
        if indices.is_empty() {
            return;
        }
        let timestamps = self.store.element_timestamps_of(&indices);
        self.store.release_element_timestamps(&timestamps);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use attrstore_types::ElementClass;

    fn store() -> Arc<ColumnStore> {
        let store = ColumnStore::new(ElementClass::Node, Config::default()).unwrap();
        store
            .add_column(
                Column::builder("age", TypeTag::Scalar(ValueType::Int))
                    .default_value(Value::Int(-1))
                    .build()
                    .unwrap(),
            )
            .unwrap();
        store
            .add_column(
                Column::builder("score", TypeTag::Timestamped(ValueType::Byte))
                    .build()
                    .unwrap(),
            )
            .unwrap();
        Arc::new(store)
    }

    #[test]
    fn test_default_until_set() {
        let store = store();
        let node = Element::new(store, "n1");
        assert_eq!(node.get_value("age").unwrap(), Some(Value::Int(-1)));
        node.set_attribute("age", Some(Value::Int(7))).unwrap();
        assert_eq!(node.get_value("age").unwrap(), Some(Value::Int(7)));
        node.set_attribute("age", None).unwrap();
        assert_eq!(node.get_value("age").unwrap(), Some(Value::Int(-1)));
        assert_eq!(node.get_value("id").unwrap(), Some(Value::from("n1")));
    }

    #[test]
    fn test_type_guard_leaves_value() {
        let store = store();
        let node = Element::new(store.clone(), "n1");
        node.set_attribute("age", Some(Value::Int(3))).unwrap();
        let before = store.get_column("age").unwrap().version();

        let err = node.set_attribute("age", Some(Value::from("x"))).unwrap_err();
        assert!(matches!(err, AttrError::TypeMismatch { .. }));
        assert_eq!(node.get_value("age").unwrap(), Some(Value::Int(3)));
        assert_eq!(store.get_column("age").unwrap().version(), before);
    }

    #[test]
    fn test_read_only_id() {
        let node = Element::new(store(), "n1");
        assert!(matches!(
            node.set_attribute("id", Some(Value::from("n2"))),
            Err(AttrError::ReadOnlyColumn(_))
        ));
        assert!(matches!(node.remove_attribute("id"), Err(AttrError::ReadOnlyColumn(_))));
        assert_eq!(node.id(), "n1");
    }

    #[test]
    fn test_numeric_series_aggregation() {
        let store = store();
        let node = Element::new(store.clone(), "n1");
        for (ts, v) in [(1.0, 12), (2.0, 45), (6.0, -31), (7.0, 64)] {
            node.set_attribute_at("score", Some(Value::Byte(v)), ts).unwrap();
        }
        let all = Interval::new(0.0, 10.0).unwrap();

        assert_eq!(node.get_attribute_in("score", &all).unwrap(), Some(Value::Byte(12)));
        store.set_estimator("score", Some(Estimator::Sum)).unwrap();
        assert_eq!(node.get_attribute_in("score", &all).unwrap(), Some(Value::Byte(90)));
        store.set_estimator("score", Some(Estimator::Min)).unwrap();
        assert_eq!(node.get_attribute_in("score", &all).unwrap(), Some(Value::Byte(-31)));
        store.set_estimator("score", Some(Estimator::Average)).unwrap();
        assert_eq!(node.get_attribute_in("score", &all).unwrap(), Some(Value::Double(22.5)));

        let empty = Interval::new(20.0, 30.0).unwrap();
        assert_eq!(node.get_attribute_in("score", &empty).unwrap(), None);
    }

    #[test]
    fn test_point_reads_and_removal() {
        let node = Element::new(store(), "n1");
        node.set_attribute_at("score", Some(Value::Byte(5)), 2.0).unwrap();
        assert_eq!(node.get_attribute_at("score", 2.0).unwrap(), Some(Value::Byte(5)));
        assert_eq!(node.get_attribute_at("score", 3.0).unwrap(), None);

        assert_eq!(node.remove_attribute_at("score", 2.0).unwrap(), Some(Value::Byte(5)));
        assert_eq!(node.remove_attribute_at("score", 2.0).unwrap(), None);
        assert_eq!(node.get_attribute_at("score", 2.0).unwrap(), None);
    }

    #[test]
    fn test_dynamic_rules() {
        let node = Element::new(store(), "n1");
        assert!(matches!(
            node.set_attribute_at("age", Some(Value::Int(1)), 1.0),
            Err(AttrError::NotDynamic(_))
        ));
        assert!(matches!(
            node.set_attribute_at("score", None, 1.0),
            Err(AttrError::NullValue)
        ));
        assert!(matches!(
            node.set_attribute("score", Some(Value::Byte(1))),
            Err(AttrError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_series_read_back_in_time_order() {
        let node = Element::new(store(), "n1");
        node.set_series(
            "score",
            &[(6.0, Value::Byte(3)), (1.0, Value::Byte(1)), (2.0, Value::Byte(2))],
        )
        .unwrap();
        assert_eq!(
            node.get_attribute("score").unwrap(),
            Some(AttributeValue::Series(vec![
                (1.0, Value::Byte(1)),
                (2.0, Value::Byte(2)),
                (6.0, Value::Byte(3)),
            ]))
        );
    }

    #[test]
    fn test_removed_column_slot_is_not_inherited() {
        let store = store();
        let node = Element::new(store.clone(), "n1");
        node.set_attribute("age", Some(Value::Int(9))).unwrap();
        store.remove_column("age").unwrap();
        let reused = store
            .add_column(
                Column::builder("height", TypeTag::Scalar(ValueType::Int))
                    .build()
                    .unwrap(),
            )
            .unwrap();
        assert_eq!(reused.dense_index(), Some(3));
        assert_eq!(node.get_value("height").unwrap(), None);
    }

    #[test]
    fn test_timestamps_are_reference_counted() {
        let store = store();
        let a = Element::new(store.clone(), "a");
        let b = Element::new(store.clone(), "b");
        assert!(a.add_timestamp(1.0).unwrap());
        assert!(!a.add_timestamp(1.0).unwrap());
        assert!(b.add_timestamp(1.0).unwrap());
        assert_eq!(store.timestamp_reference_count(1.0), 2);

        assert!(a.remove_timestamp(1.0).unwrap());
        assert!(!a.has_timestamp(1.0));
        assert!(b.has_timestamp(1.0));
        drop(b);
        assert_eq!(store.timestamp_reference_count(1.0), 0);
    }

    #[test]
    fn test_timestamps_disabled() {
        let store = Arc::new(
            ColumnStore::new(ElementClass::Node, Config::default().with_timestamps(false)).unwrap(),
        );
        store
            .add_column(
                Column::builder("s", TypeTag::Timestamped(ValueType::Int))
                    .build()
                    .unwrap(),
            )
            .unwrap();
        let node = Element::new(store, "n1");
        assert!(matches!(
            node.get_attribute_at("s", 1.0),
            Err(AttrError::TimestampStoreUnavailable)
        ));
        assert!(matches!(
            node.add_timestamp(1.0),
            Err(AttrError::TimestampStoreUnavailable)
        ));
    }
}
