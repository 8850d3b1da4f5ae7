//! Pure reducers used by the estimators.
//!
//! Every reducer returns `None` on empty input so callers can tell "no data"
//! apart from a genuine zero. Sums are accumulated exactly (128-bit integers,
//! or error-free float partials) and only rounded once at the end, so the result
//! never depends on the order values were inserted in.

/// Numeric primitive that can be summed exactly and narrowed back.
pub trait Numeric: Copy + PartialOrd {
    fn to_f64(self) -> f64;

    /// Exact sum narrowed to `Self`. Integer sums wrap like a narrowing cast.
    fn exact_sum(values: &[Self]) -> Self;

    /// Exact sum correctly rounded to `f64`.
    fn exact_total(values: &[Self]) -> f64;
}

macro_rules! impl_numeric_integer {
    ($($ty:ty),*) => {
        $(
            impl Numeric for $ty {
                fn to_f64(self) -> f64 {
                    self as f64
                }

                fn exact_sum(values: &[Self]) -> Self {
                    values.iter().map(|v| *v as i128).sum::<i128>() as $ty
                }

                fn exact_total(values: &[Self]) -> f64 {
                    values.iter().map(|v| *v as i128).sum::<i128>() as f64
                }
            }
        )*
    };
}

impl_numeric_integer!(i8, i16, i32, i64);

impl Numeric for f32 {
    fn to_f64(self) -> f64 {
        self as f64
    }

    fn exact_sum(values: &[Self]) -> Self {
        exact_f64_sum(values.iter().map(|v| *v as f64)) as f32
    }

    fn exact_total(values: &[Self]) -> f64 {
        exact_f64_sum(values.iter().map(|v| *v as f64))
    }
}

impl Numeric for f64 {
    fn to_f64(self) -> f64 {
        self
    }

    fn exact_sum(values: &[Self]) -> Self {
        exact_f64_sum(values.iter().copied())
    }

    fn exact_total(values: &[Self]) -> f64 {
        exact_f64_sum(values.iter().copied())
    }
}

pub fn first<T: Clone>(values: &[T]) -> Option<T> {
    values.first().cloned()
}

pub fn last<T: Clone>(values: &[T]) -> Option<T> {
    values.last().cloned()
}

/// Smallest value in a single pass. NaN entries never replace a candidate.
pub fn min<T: PartialOrd + Copy>(values: &[T]) -> Option<T> {
    let (head, tail) = values.split_first()?;
    Some(
        tail.iter()
            .fold(*head, |acc, v| if *v < acc { *v } else { acc }),
    )
}

pub fn max<T: PartialOrd + Copy>(values: &[T]) -> Option<T> {
    let (head, tail) = values.split_first()?;
    Some(
        tail.iter()
            .fold(*head, |acc, v| if *v > acc { *v } else { acc }),
    )
}

pub fn sum<T: Numeric>(values: &[T]) -> Option<T> {
    if values.is_empty() {
        return None;
    }
    Some(T::exact_sum(values))
}

pub fn average<T: Numeric>(values: &[T]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(T::exact_total(values) / values.len() as f64)
}

/// Middle value, or the mean of the two middle values for even lengths.
pub fn median<T: Numeric>(values: &[T]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted: Vec<f64> = values.iter().map(|v| v.to_f64()).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some(exact_f64_sum([sorted[mid - 1], sorted[mid]]) / 2.0)
    }
}

/// Correctly rounded sum of `f64` values using Shewchuk's error-free partials.
pub fn exact_f64_sum(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut partials: Vec<f64> = Vec::new();
    let mut special = 0.0_f64;
    let mut has_special = false;

    for value in values {
        if !value.is_finite() {
            special += value;
            has_special = true;
            continue;
        }

        let mut x = value;
        let mut kept = 0;
        for j in 0..partials.len() {
            let mut y = partials[j];
            if x.abs() < y.abs() {
                std::mem::swap(&mut x, &mut y);
            }
            let hi = x + y;
            let lo = y - (hi - x);
            if lo != 0.0 {
                partials[kept] = lo;
                kept += 1;
            }
            x = hi;
        }
        partials.truncate(kept);
        partials.push(x);
    }

    if has_special {
        return special;
    }

    let Some(mut n) = partials.len().checked_sub(1) else {
        return 0.0;
    };
    let mut hi = partials[n];
    let mut lo = 0.0;
    while n > 0 {
        let x = hi;
        n -= 1;
        let y = partials[n];
        hi = x + y;
        let rounded = hi - x;
        lo = y - rounded;
        if lo != 0.0 {
            break;
        }
    }

    // Half-way case: round towards the remaining partials.
    if n > 0 && ((lo < 0.0 && partials[n - 1] < 0.0) || (lo > 0.0 && partials[n - 1] > 0.0)) {
        let y = lo * 2.0;
        let x = hi + y;
        if y == x - hi {
            hi = x;
        }
    }
    hi
}
