use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a column comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnOrigin {
    /// User or import defined data.
    #[default]
    Data,
    /// Built-in structural property such as `id` or `label`.
    Property,
    /// Value computed or owned by another component.
    Delegate,
}

impl ColumnOrigin {
    pub fn code(&self) -> u8 {
        match self {
            ColumnOrigin::Data => 0,
            ColumnOrigin::Property => 1,
            ColumnOrigin::Delegate => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(ColumnOrigin::Data),
            1 => Some(ColumnOrigin::Property),
            2 => Some(ColumnOrigin::Delegate),
            _ => None,
        }
    }
}

/// The class of graph element a column store describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementClass {
    Node,
    Edge,
}

impl ElementClass {
    pub fn code(&self) -> u8 {
        match self {
            ElementClass::Node => 0,
            ElementClass::Edge => 1,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(ElementClass::Node),
            1 => Some(ElementClass::Edge),
            _ => None,
        }
    }
}

impl fmt::Display for ElementClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementClass::Node => f.write_str("node"),
            ElementClass::Edge => f.write_str("edge"),
        }
    }
}
