//! Sparse, sorted, per-element time series.
//!
//! One generic container serves every primitive kind; what differs between
//! kinds (supported estimators and how they reduce) lives in [`TemporalValue`].

use attrstore_types::{Estimator, Value, ValueType};
use smallvec::SmallVec;

use super::map::CompactIndex;
use crate::compute::estimator as reducers;
use crate::error::{AttrError, Result};

/// A primitive that can be stored in a [`TimestampValueSet`].
pub trait TemporalValue: Clone + PartialEq + std::fmt::Debug + Send + Sync + 'static {
    const VALUE_TYPE: ValueType;

    fn supports(estimator: Estimator) -> bool;

    /// Reduces a non-empty slice with a supported, non-positional estimator.
    fn reduce(values: &[Self], estimator: Estimator) -> Option<Value>;

    fn into_value(self) -> Value;

    fn from_value(value: Value) -> std::result::Result<Self, Value>;
}

macro_rules! impl_temporal_numeric {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl TemporalValue for $ty {
                const VALUE_TYPE: ValueType = ValueType::$variant;

                fn supports(_estimator: Estimator) -> bool {
                    true
                }

                fn reduce(values: &[Self], estimator: Estimator) -> Option<Value> {
                    match estimator {
                        Estimator::First => reducers::first(values).map(Value::$variant),
                        Estimator::Last => reducers::last(values).map(Value::$variant),
                        Estimator::Min => reducers::min(values).map(Value::$variant),
                        Estimator::Max => reducers::max(values).map(Value::$variant),
                        Estimator::Sum => reducers::sum(values).map(Value::$variant),
                        Estimator::Average => reducers::average(values).map(Value::Double),
                        Estimator::Median => reducers::median(values).map(Value::Double),
                    }
                }

                fn into_value(self) -> Value {
                    Value::$variant(self)
                }

                fn from_value(value: Value) -> std::result::Result<Self, Value> {
                    match value {
                        Value::$variant(v) => Ok(v),
                        other => Err(other),
                    }
                }
            }
        )*
    };
}

impl_temporal_numeric! {
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
}

impl TemporalValue for bool {
    const VALUE_TYPE: ValueType = ValueType::Bool;

    fn supports(estimator: Estimator) -> bool {
        matches!(
            estimator,
            Estimator::First | Estimator::Last | Estimator::Min | Estimator::Max
        )
    }

    fn reduce(values: &[Self], estimator: Estimator) -> Option<Value> {
        match estimator {
            Estimator::First => values.first().map(|v| Value::Bool(*v)),
            Estimator::Last => values.last().map(|v| Value::Bool(*v)),
            // MIN is false as soon as any false is present, MAX true as soon as any true is.
            Estimator::Min => Some(Value::Bool(!values.contains(&false))),
            Estimator::Max => Some(Value::Bool(values.contains(&true))),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::Bool(v) => Ok(v),
            other => Err(other),
        }
    }
}

impl TemporalValue for char {
    const VALUE_TYPE: ValueType = ValueType::Char;

    fn supports(estimator: Estimator) -> bool {
        !estimator.is_numeric()
    }

    fn reduce(values: &[Self], estimator: Estimator) -> Option<Value> {
        match estimator {
            Estimator::First => reducers::first(values).map(Value::Char),
            Estimator::Last => reducers::last(values).map(Value::Char),
            Estimator::Min => reducers::min(values).map(Value::Char),
            Estimator::Max => reducers::max(values).map(Value::Char),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Char(self)
    }

    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::Char(v) => Ok(v),
            other => Err(other),
        }
    }
}

impl TemporalValue for String {
    const VALUE_TYPE: ValueType = ValueType::String;

    fn supports(estimator: Estimator) -> bool {
        matches!(estimator, Estimator::First | Estimator::Last)
    }

    fn reduce(values: &[Self], estimator: Estimator) -> Option<Value> {
        match estimator {
            Estimator::First => reducers::first(values).map(Value::String),
            Estimator::Last => reducers::last(values).map(Value::String),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::String(self)
    }

    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::String(v) => Ok(v),
            other => Err(other),
        }
    }
}

/// Sorted `compact index -> value` container for one (element, column) pair.
///
/// The two parallel arrays grow by exactly one slot per insertion: temporal
/// attributes are typically sparse, so no geometric over-allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct TimestampValueSet<T> {
    indices: Vec<CompactIndex>,
    values: Vec<T>,
}

impl<T> Default for TimestampValueSet<T> {
    fn default() -> Self {
        Self {
            indices: Vec::new(),
            values: Vec::new(),
        }
    }
}

impl<T: TemporalValue> TimestampValueSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_supported(&self, estimator: Estimator) -> bool {
        T::supports(estimator)
    }

    /// Stores `value` at `index`, returning the value it replaced.
    pub fn put(&mut self, index: CompactIndex, value: T) -> Option<T> {
        match self.indices.binary_search(&index) {
            Ok(position) => Some(std::mem::replace(&mut self.values[position], value)),
            Err(position) => {
                if self.indices.len() == self.indices.capacity() {
                    self.indices.reserve_exact(1);
                }
                if self.values.len() == self.values.capacity() {
                    self.values.reserve_exact(1);
                }
                self.indices.insert(position, index);
                self.values.insert(position, value);
                None
            }
        }
    }

    /// Removes the value at `index`. Unknown indices are a silent no-op.
    pub fn remove(&mut self, index: CompactIndex) -> Option<T> {
        let position = self.indices.binary_search(&index).ok()?;
        self.indices.remove(position);
        Some(self.values.remove(position))
    }

    pub fn get(&self, index: CompactIndex) -> Option<&T> {
        self.indices
            .binary_search(&index)
            .ok()
            .map(|position| &self.values[position])
    }

    pub fn get_or<'a>(&'a self, index: CompactIndex, default: &'a T) -> &'a T {
        self.get(index).unwrap_or(default)
    }

    pub fn contains(&self, index: CompactIndex) -> bool {
        self.indices.binary_search(&index).is_ok()
    }

    /// Reduces the values stored at `indices` with `estimator`.
    ///
    /// Indices absent from the set are skipped; `Ok(None)` means none of them
    /// were present. `First`/`Last` follow the order of `indices`.
    pub fn aggregate(
        &self,
        indices: &[CompactIndex],
        estimator: Estimator,
    ) -> Result<Option<Value>> {
        if !T::supports(estimator) {
            return Err(AttrError::UnsupportedAggregation {
                estimator,
                value_type: T::VALUE_TYPE,
            });
        }

        let picked: SmallVec<[T; 16]> = indices
            .iter()
            .filter_map(|index| self.get(*index).cloned())
            .collect();
        if picked.is_empty() {
            return Ok(None);
        }
        Ok(T::reduce(&picked, estimator))
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn indices(&self) -> &[CompactIndex] {
        &self.indices
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (CompactIndex, &T)> + '_ {
        self.indices.iter().copied().zip(self.values.iter())
    }

    pub fn clear(&mut self) {
        self.indices = Vec::new();
        self.values = Vec::new();
    }

    /// Rebuilds a set from serialized arrays; indices must be strictly increasing.
    pub(crate) fn from_parts(indices: Vec<CompactIndex>, values: Vec<T>) -> Result<Self> {
        if indices.len() != values.len() {
            return Err(AttrError::InvalidFormat(
                "value set arrays differ in length".into(),
            ));
        }
        if indices.windows(2).any(|w| w[0] >= w[1]) {
            return Err(AttrError::InvalidFormat(
                "value set indices are not strictly increasing".into(),
            ));
        }
        Ok(Self { indices, values })
    }
}
