use serde::{Deserialize, Serialize};
use std::fmt;

/// Primitive kind of a stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Bool,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
}

impl ValueType {
    pub const ALL: [ValueType; 9] = [
        ValueType::Bool,
        ValueType::Byte,
        ValueType::Char,
        ValueType::Short,
        ValueType::Int,
        ValueType::Long,
        ValueType::Float,
        ValueType::Double,
        ValueType::String,
    ];

    pub fn code(&self) -> u8 {
        match self {
            ValueType::Bool => 0,
            ValueType::Byte => 1,
            ValueType::Char => 2,
            ValueType::Short => 3,
            ValueType::Int => 4,
            ValueType::Long => 5,
            ValueType::Float => 6,
            ValueType::Double => 7,
            ValueType::String => 8,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ValueType::Byte
                | ValueType::Short
                | ValueType::Int
                | ValueType::Long
                | ValueType::Float
                | ValueType::Double
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Bool => "bool",
            ValueType::Byte => "byte",
            ValueType::Char => "char",
            ValueType::Short => "short",
            ValueType::Int => "int",
            ValueType::Long => "long",
            ValueType::Float => "float",
            ValueType::Double => "double",
            ValueType::String => "string",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared type of a column.
///
/// `Timestamped` columns hold a time-varying series of the given primitive kind
/// and are the only "dynamic" columns. `TimestampSet` is reserved for the
/// built-in per-element set of timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeTag {
    Scalar(ValueType),
    Timestamped(ValueType),
    TimestampSet,
}

impl TypeTag {
    pub fn is_dynamic(&self) -> bool {
        matches!(self, TypeTag::Timestamped(_))
    }

    /// Primitive kind of the values held by the column, if any.
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            TypeTag::Scalar(vt) | TypeTag::Timestamped(vt) => Some(*vt),
            TypeTag::TimestampSet => None,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            TypeTag::Scalar(vt) => vt.code(),
            TypeTag::Timestamped(vt) => 16 + vt.code(),
            TypeTag::TimestampSet => 32,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0..=15 => ValueType::from_code(code).map(TypeTag::Scalar),
            16..=31 => ValueType::from_code(code - 16).map(TypeTag::Timestamped),
            32 => Some(TypeTag::TimestampSet),
            _ => None,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Scalar(vt) => write!(f, "{}", vt),
            TypeTag::Timestamped(vt) => write!(f, "timestamp<{}>", vt),
            TypeTag::TimestampSet => f.write_str("timestamp_set"),
        }
    }
}

/// A single scalar attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Byte(i8),
    Char(char),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Bool(_) => ValueType::Bool,
            Value::Byte(_) => ValueType::Byte,
            Value::Char(_) => ValueType::Char,
            Value::Short(_) => ValueType::Short,
            Value::Int(_) => ValueType::Int,
            Value::Long(_) => ValueType::Long,
            Value::Float(_) => ValueType::Float,
            Value::Double(_) => ValueType::Double,
            Value::String(_) => ValueType::String,
        }
    }

    /// Numeric view of the value, `None` for non-numeric kinds.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Byte(v) => Some(*v as f64),
            Value::Short(v) => Some(*v as f64),
            Value::Int(v) => Some(*v as f64),
            Value::Long(v) => Some(*v as f64),
            Value::Float(v) => Some(*v as f64),
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer view of the value, `None` for non-integer kinds.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Byte(v) => Some(*v as i64),
            Value::Short(v) => Some(*v as i64),
            Value::Int(v) => Some(*v as i64),
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::Byte(v) => write!(f, "{}", v),
            Value::Char(v) => write!(f, "{}", v),
            Value::Short(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{:?}", v),
            Value::Double(v) => write!(f, "{:?}", v),
            Value::String(v) => f.write_str(v),
        }
    }
}

macro_rules! impl_from_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

impl_from_primitive! {
    bool => Bool,
    i8 => Byte,
    char => Char,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    String => String,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tag_codes() {
        for vt in ValueType::ALL {
            assert_eq!(TypeTag::from_code(TypeTag::Scalar(vt).code()), Some(TypeTag::Scalar(vt)));
            assert_eq!(
                TypeTag::from_code(TypeTag::Timestamped(vt).code()),
                Some(TypeTag::Timestamped(vt))
            );
        }
        assert_eq!(TypeTag::from_code(32), Some(TypeTag::TimestampSet));
        assert_eq!(TypeTag::from_code(9), None);
        assert_eq!(TypeTag::from_code(40), None);
    }

    #[test]
    fn test_dynamic_flag() {
        assert!(TypeTag::Timestamped(ValueType::Int).is_dynamic());
        assert!(!TypeTag::Scalar(ValueType::Int).is_dynamic());
        assert!(!TypeTag::TimestampSet.is_dynamic());
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(Value::from(12i8).value_type(), ValueType::Byte);
        assert_eq!(Value::from("x"), Value::String("x".into()));
        assert_eq!(Value::Short(-4).as_i64(), Some(-4));
        assert_eq!(Value::Float(1.5).as_f64(), Some(1.5));
        assert_eq!(Value::Bool(true).as_f64(), None);
    }
}
