//! Runtime-typed wrapper over the generic value sets.
//!
//! Columns pick their primitive kind at runtime, so elements store one
//! [`TimestampValues`] per dynamic column and dispatch into the matching
//! [`TimestampValueSet`].

use attrstore_types::{Estimator, Value, ValueType};

use super::map::CompactIndex;
use super::value_set::{TemporalValue, TimestampValueSet};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub enum TimestampValues {
    Bool(TimestampValueSet<bool>),
    Byte(TimestampValueSet<i8>),
    Char(TimestampValueSet<char>),
    Short(TimestampValueSet<i16>),
    Int(TimestampValueSet<i32>),
    Long(TimestampValueSet<i64>),
    Float(TimestampValueSet<f32>),
    Double(TimestampValueSet<f64>),
    String(TimestampValueSet<String>),
}

macro_rules! dispatch {
    ($self:expr, $set:ident => $body:expr) => {
        match $self {
            TimestampValues::Bool($set) => $body,
            TimestampValues::Byte($set) => $body,
            TimestampValues::Char($set) => $body,
            TimestampValues::Short($set) => $body,
            TimestampValues::Int($set) => $body,
            TimestampValues::Long($set) => $body,
            TimestampValues::Float($set) => $body,
            TimestampValues::Double($set) => $body,
            TimestampValues::String($set) => $body,
        }
    };
}

fn put_typed<T: TemporalValue>(
    set: &mut TimestampValueSet<T>,
    index: CompactIndex,
    value: Value,
) -> std::result::Result<Option<Value>, Value> {
    let value = T::from_value(value)?;
    Ok(set.put(index, value).map(T::into_value))
}

impl TimestampValues {
    /// Creates the empty value set matching `value_type`.
    pub fn new(value_type: ValueType) -> Self {
        match value_type {
            ValueType::Bool => TimestampValues::Bool(TimestampValueSet::new()),
            ValueType::Byte => TimestampValues::Byte(TimestampValueSet::new()),
            ValueType::Char => TimestampValues::Char(TimestampValueSet::new()),
            ValueType::Short => TimestampValues::Short(TimestampValueSet::new()),
            ValueType::Int => TimestampValues::Int(TimestampValueSet::new()),
            ValueType::Long => TimestampValues::Long(TimestampValueSet::new()),
            ValueType::Float => TimestampValues::Float(TimestampValueSet::new()),
            ValueType::Double => TimestampValues::Double(TimestampValueSet::new()),
            ValueType::String => TimestampValues::String(TimestampValueSet::new()),
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            TimestampValues::Bool(_) => ValueType::Bool,
            TimestampValues::Byte(_) => ValueType::Byte,
            TimestampValues::Char(_) => ValueType::Char,
            TimestampValues::Short(_) => ValueType::Short,
            TimestampValues::Int(_) => ValueType::Int,
            TimestampValues::Long(_) => ValueType::Long,
            TimestampValues::Float(_) => ValueType::Float,
            TimestampValues::Double(_) => ValueType::Double,
            TimestampValues::String(_) => ValueType::String,
        }
    }

    pub fn is_supported(&self, estimator: Estimator) -> bool {
        dispatch!(self, set => set.is_supported(estimator))
    }

    /// Stores `value` at `index`. A value of the wrong kind is handed back.
    pub fn put(
        &mut self,
        index: CompactIndex,
        value: Value,
    ) -> std::result::Result<Option<Value>, Value> {
        dispatch!(self, set => put_typed(set, index, value))
    }

    pub fn remove(&mut self, index: CompactIndex) -> Option<Value> {
        dispatch!(self, set => set.remove(index).map(TemporalValue::into_value))
    }

    pub fn get(&self, index: CompactIndex) -> Option<Value> {
        dispatch!(self, set => set.get(index).cloned().map(TemporalValue::into_value))
    }

    pub fn contains(&self, index: CompactIndex) -> bool {
        dispatch!(self, set => set.contains(index))
    }

    pub fn aggregate(&self, indices: &[CompactIndex], estimator: Estimator) -> Result<Option<Value>> {
        dispatch!(self, set => set.aggregate(indices, estimator))
    }

    pub fn len(&self) -> usize {
        dispatch!(self, set => set.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn indices(&self) -> &[CompactIndex] {
        dispatch!(self, set => set.indices())
    }

    /// Stored values in index order.
    pub fn values(&self) -> Vec<Value> {
        dispatch!(self, set => set.values().iter().cloned().map(TemporalValue::into_value).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = (CompactIndex, Value)> + '_ {
        self.indices().iter().copied().zip(self.values())
    }

    pub fn clear(&mut self) {
        dispatch!(self, set => set.clear())
    }

    /// Rebuilds a set of `value_type` from serialized arrays.
    pub(crate) fn from_parts(
        value_type: ValueType,
        indices: Vec<CompactIndex>,
        values: Vec<Value>,
    ) -> Result<Self> {
        fn typed<T: TemporalValue>(
            indices: Vec<CompactIndex>,
            values: Vec<Value>,
        ) -> Result<TimestampValueSet<T>> {
            let values = values
                .into_iter()
                .map(T::from_value)
                .collect::<std::result::Result<Vec<T>, Value>>()
                .map_err(|v| {
                    crate::error::AttrError::InvalidFormat(format!(
                        "expected {} value, found {}",
                        T::VALUE_TYPE,
                        v.value_type()
                    ))
                })?;
            TimestampValueSet::from_parts(indices, values)
        }

        Ok(match value_type {
            ValueType::Bool => TimestampValues::Bool(typed(indices, values)?),
            ValueType::Byte => TimestampValues::Byte(typed(indices, values)?),
            ValueType::Char => TimestampValues::Char(typed(indices, values)?),
            ValueType::Short => TimestampValues::Short(typed(indices, values)?),
            ValueType::Int => TimestampValues::Int(typed(indices, values)?),
            ValueType::Long => TimestampValues::Long(typed(indices, values)?),
            ValueType::Float => TimestampValues::Float(typed(indices, values)?),
            ValueType::Double => TimestampValues::Double(typed(indices, values)?),
            ValueType::String => TimestampValues::String(typed(indices, values)?),
        })
    }
}
