use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Aggregation policy used to reduce several time-indexed values into one.
///
/// `First` and `Last` are positional: they pick the first or last value in the
/// order the indices are supplied, which is chronological when the indices come
/// from a timestamp range query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Estimator {
    First,
    Last,
    Min,
    Max,
    Average,
    Sum,
    Median,
}

impl Estimator {
    pub const ALL: [Estimator; 7] = [
        Estimator::First,
        Estimator::Last,
        Estimator::Min,
        Estimator::Max,
        Estimator::Average,
        Estimator::Sum,
        Estimator::Median,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Estimator::First => "FIRST",
            Estimator::Last => "LAST",
            Estimator::Min => "MIN",
            Estimator::Max => "MAX",
            Estimator::Average => "AVERAGE",
            Estimator::Sum => "SUM",
            Estimator::Median => "MEDIAN",
        }
    }

    /// Stable numeric code used by the binary format.
    pub fn code(&self) -> u8 {
        match self {
            Estimator::First => 0,
            Estimator::Last => 1,
            Estimator::Min => 2,
            Estimator::Max => 3,
            Estimator::Average => 4,
            Estimator::Sum => 5,
            Estimator::Median => 6,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// Whether the estimator only makes sense on numeric values.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Estimator::Average | Estimator::Sum | Estimator::Median
        )
    }
}

impl fmt::Display for Estimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Estimator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| format!("unknown estimator '{}'", s))
    }
}
