use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Error returned when an interval would have `low > high` or a NaN bound.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("invalid interval range: low {low} is greater than high {high}")]
pub struct InvalidRange {
    pub low: f64,
    pub high: f64,
}

/// An immutable numeric range with optionally excluded bounds.
///
/// Two intervals are ordered by trichotomy: one lies entirely to the left of
/// the other, entirely to the right, or they overlap. Touching bounds count as
/// an overlap unless one of the touching bounds is excluded.
///
/// Equality is structural: `[1, 2]` and `[1, 2)` are different intervals even
/// though `compare_to` reports them as overlapping.
///
/// # Examples
///
/// ```
/// use attrstore_types::interval::Interval;
/// use std::cmp::Ordering;
///
/// let a = Interval::with_bounds(1.0, 2.0, false, true).unwrap(); // [1, 2)
/// let b = Interval::new(2.0, 3.0).unwrap(); // [2, 3]
/// assert_eq!(a.compare_to(&b), Ordering::Less);
///
/// let c = Interval::new(1.0, 2.0).unwrap();
/// assert_ne!(a, c);
/// assert_eq!(c.compare_to(&b), Ordering::Equal);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawInterval")]
pub struct Interval {
    low: f64,
    high: f64,
    low_excluded: bool,
    high_excluded: bool,
}

impl Interval {
    /// Create a closed interval `[low, high]`.
    pub fn new(low: f64, high: f64) -> Result<Self, InvalidRange> {
        Self::with_bounds(low, high, false, false)
    }

    /// Create an interval with explicit bound exclusion flags.
    pub fn with_bounds(
        low: f64,
        high: f64,
        low_excluded: bool,
        high_excluded: bool,
    ) -> Result<Self, InvalidRange> {
        // Also rejects NaN on either side.
        if !(low <= high) {
            return Err(InvalidRange { low, high });
        }
        Ok(Self {
            low,
            high,
            low_excluded,
            high_excluded,
        })
    }

    /// The closed interval covering every finite and infinite timestamp.
    pub const fn all() -> Self {
        Self {
            low: f64::NEG_INFINITY,
            high: f64::INFINITY,
            low_excluded: false,
            high_excluded: false,
        }
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn is_low_excluded(&self) -> bool {
        self.low_excluded
    }

    pub fn is_high_excluded(&self) -> bool {
        self.high_excluded
    }

    /// Returns `Less` if `self` lies entirely left of `other`, `Greater` if it
    /// lies entirely right, and `Equal` when the two overlap.
    pub fn compare_to(&self, other: &Interval) -> Ordering {
        if self.high < other.low
            || (self.high == other.low && (self.high_excluded || other.low_excluded))
        {
            Ordering::Less
        } else if self.low > other.high
            || (self.low == other.high && (self.low_excluded || other.high_excluded))
        {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        self.compare_to(other) == Ordering::Equal
    }

    /// Whether `timestamp` falls inside the interval, honouring excluded bounds.
    pub fn contains(&self, timestamp: f64) -> bool {
        let above_low = if self.low_excluded {
            timestamp > self.low
        } else {
            timestamp >= self.low
        };
        let below_high = if self.high_excluded {
            timestamp < self.high
        } else {
            timestamp <= self.high
        };
        above_low && below_high
    }

    /// True when no timestamp can satisfy the bounds, e.g. `(1, 1]`.
    pub fn is_empty(&self) -> bool {
        self.low == self.high && (self.low_excluded || self.high_excluded)
    }
}

/// Unchecked wire form of [`Interval`]; bounds are validated on conversion.
#[derive(Deserialize)]
struct RawInterval {
    low: f64,
    high: f64,
    low_excluded: bool,
    high_excluded: bool,
}

impl TryFrom<RawInterval> for Interval {
    type Error = InvalidRange;

    fn try_from(raw: RawInterval) -> Result<Self, Self::Error> {
        Interval::with_bounds(raw.low, raw.high, raw.low_excluded, raw.high_excluded)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:?}, {:?}{}",
            if self.low_excluded { '(' } else { '[' },
            self.low,
            self.high,
            if self.high_excluded { ')' } else { ']' }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_inverted_bounds() {
        let err = Interval::new(3.0, 1.0).unwrap_err();
        assert_eq!(err.low, 3.0);
        assert_eq!(err.high, 1.0);
        assert!(Interval::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_equality_includes_exclusion_flags() {
        let closed = Interval::new(1.0, 2.0).unwrap();
        let half_open = Interval::with_bounds(1.0, 2.0, false, true).unwrap();
        assert_ne!(closed, half_open);
        assert_eq!(closed, Interval::new(1.0, 2.0).unwrap());
    }

    #[test]
    fn test_trichotomy() {
        let a = Interval::new(1.0, 2.0).unwrap();
        let b = Interval::new(3.0, 4.0).unwrap();
        assert_eq!(a.compare_to(&b), Ordering::Less);
        assert_eq!(b.compare_to(&a), Ordering::Greater);
        assert_eq!(a.compare_to(&a), Ordering::Equal);

        let wide = Interval::new(0.0, 10.0).unwrap();
        assert_eq!(a.compare_to(&wide), Ordering::Equal);
    }

    #[test]
    fn test_touching_bounds() {
        let left = Interval::new(1.0, 2.0).unwrap();
        let right = Interval::new(2.0, 3.0).unwrap();
        assert!(left.overlaps(&right));

        let right_open = Interval::with_bounds(2.0, 3.0, true, false).unwrap();
        assert_eq!(left.compare_to(&right_open), Ordering::Less);
        assert_eq!(right_open.compare_to(&left), Ordering::Greater);
    }

    #[test]
    fn test_contains() {
        let interval = Interval::with_bounds(1.0, 2.0, true, false).unwrap();
        assert!(!interval.contains(1.0));
        assert!(interval.contains(1.5));
        assert!(interval.contains(2.0));
        assert!(Interval::all().contains(f64::INFINITY));
    }

    #[test]
    fn test_deserialize_validates_bounds() {
        let interval = Interval::with_bounds(1.0, 2.0, true, false).unwrap();
        let json = serde_json::to_string(&interval).unwrap();
        assert_eq!(serde_json::from_str::<Interval>(&json).unwrap(), interval);

        let inverted = r#"{"low":5.0,"high":1.0,"low_excluded":false,"high_excluded":false}"#;
        let err = serde_json::from_str::<Interval>(inverted).unwrap_err();
        assert!(err.to_string().contains("invalid interval range"));
    }

    #[test]
    fn test_display() {
        let interval = Interval::with_bounds(1.0, 2.5, true, false).unwrap();
        assert_eq!(interval.to_string(), "(1.0, 2.5]");
    }
}
