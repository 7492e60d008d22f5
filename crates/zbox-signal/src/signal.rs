use crate::value::{Tolerance, Value};
use crate::SignalError;
use approx::{AbsDiffEq, RelativeEq};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Index, RangeInclusive};

static ZERO: Value = Value::ZERO;

/// Sparse discrete-time signal over the integers.
///
/// Only explicitly provided samples are stored. Every other index reads as zero, including
/// indices far outside the stored range. The stored range `[min_index, max_index]` is fixed at
/// construction: a stored sample whose value is zero still counts towards it.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(transparent))]
pub struct SparseSignal {
    samples: BTreeMap<i64, Value>,
}

impl SparseSignal {
    /// Builds a signal from `(index, value)` pairs.
    ///
    /// Fails with [`SignalError::DuplicateIndex`] when an index is given twice.
    pub fn new<V: Into<Value>>(pairs: impl IntoIterator<Item = (i64, V)>) -> Result<Self, SignalError> {
        let mut samples = BTreeMap::new();
        for (n, v) in pairs {
            match samples.entry(n) {
                Entry::Vacant(entry) => {
                    entry.insert(v.into());
                }
                Entry::Occupied(_) => return Err(SignalError::DuplicateIndex(n)),
            }
        }
        Ok(Self { samples })
    }

    /// Builds a signal from loosely shaped rows, as read from a table or a matrix.
    ///
    /// Every row must hold exactly two entries, the first being an integer-valued index.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, SignalError> {
        let pairs = rows
            .iter()
            .enumerate()
            .map(|(row, r)| match *r.as_ref() {
                [index, value] => parse_index(row, index).map(|n| (n, value)),
                ref other => Err(SignalError::Shape { row, len: other.len() }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(pairs)
    }

    /// Builds a signal holding `values` at consecutive indices starting from `start`.
    ///
    /// Values that would land past `i64::MAX` are dropped.
    pub fn from_dense<V: Into<Value>>(start: i64, values: impl IntoIterator<Item = V>) -> Self {
        let samples = values
            .into_iter()
            .scan(Some(start), |next, v| {
                let n = (*next)?;
                *next = n.checked_add(1);
                Some((n, v.into()))
            })
            .collect();
        Self { samples }
    }

    /// The signal without any stored sample.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Unit impulse located at index `at`.
    pub fn impulse(at: i64) -> Self {
        Self::from_dense(at, [1.0])
    }

    /// Unit samples over the given index range.
    pub fn step(range: RangeInclusive<i64>) -> Self {
        Self {
            samples: range.map(|n| (n, Value::Real(1.0))).collect(),
        }
    }

    /// Number of explicitly stored samples. Gaps in the stored range are not counted.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the signal stores no sample at all.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Lowest stored index, `None` for the empty signal.
    pub fn min_index(&self) -> Option<i64> {
        self.samples.keys().next().copied()
    }

    /// Highest stored index, `None` for the empty signal.
    pub fn max_index(&self) -> Option<i64> {
        self.samples.keys().next_back().copied()
    }

    /// The stored index range, inclusive. The range is empty for the empty signal.
    #[allow(clippy::reversed_empty_ranges)]
    pub fn range(&self) -> RangeInclusive<i64> {
        match (self.min_index(), self.max_index()) {
            (Some(min), Some(max)) => min..=max,
            _ => 1..=0,
        }
    }

    /// Sample at index `n`, zero when not stored.
    pub fn get(&self, n: i64) -> Value {
        self.samples.get(&n).copied().unwrap_or_default()
    }

    /// Whether the sample at `n` was explicitly provided.
    pub fn contains(&self, n: i64) -> bool {
        self.samples.contains_key(&n)
    }

    /// Every index of the stored range, including the ones holding implicit zeros.
    pub fn keys(&self) -> Vec<i64> {
        self.range().collect()
    }

    /// Samples over the stored range, implicit zeros included.
    pub fn values(&self) -> Vec<Value> {
        self.range().map(|n| self.get(n)).collect()
    }

    /// Iterates over the explicitly stored samples, in index order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, Value)> + '_ {
        self.samples.iter().map(|(&n, &v)| (n, v))
    }

    /// Whether every stored sample is real.
    pub fn is_real(&self) -> bool {
        self.samples.values().all(Value::is_real)
    }

    /// Compares both signals over the union of their stored ranges, with the given tolerance.
    pub fn approx_eq_with(&self, other: &Self, tolerance: Tolerance) -> bool {
        crate::ops::union_range(self, other).all(|n| tolerance.matches(&self.get(n), &other.get(n)))
    }
}

fn parse_index(row: usize, value: f64) -> Result<i64, SignalError> {
    // Beyond 2^53 an f64 cannot tell neighbouring integers apart anyway.
    const LIMIT: f64 = 9_007_199_254_740_992.0;
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= LIMIT {
        Ok(value as i64)
    } else {
        Err(SignalError::NonIntegerIndex { row, value })
    }
}

impl Index<i64> for SparseSignal {
    type Output = Value;

    fn index(&self, n: i64) -> &Self::Output {
        self.samples.get(&n).unwrap_or(&ZERO)
    }
}

impl FromIterator<(i64, Value)> for SparseSignal {
    /// Collects pairs into a signal. Later duplicates overwrite earlier ones.
    fn from_iter<I: IntoIterator<Item = (i64, Value)>>(iter: I) -> Self {
        Self {
            samples: iter.into_iter().collect(),
        }
    }
}

impl PartialEq for SparseSignal {
    fn eq(&self, other: &Self) -> bool {
        self.approx_eq_with(other, Tolerance::default())
    }
}

impl AbsDiffEq for SparseSignal {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        crate::ops::union_range(self, other).all(|n| self.get(n).abs_diff_eq(&other.get(n), epsilon))
    }
}

impl RelativeEq for SparseSignal {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: Self::Epsilon, max_relative: Self::Epsilon) -> bool {
        self.approx_eq_with(other, Tolerance { epsilon, max_relative })
    }
}

impl fmt::Display for SparseSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return writeln!(f, "(empty)");
        }
        for n in self.range() {
            writeln!(f, "{n}: {}", self.get(n))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;
    use rstest::rstest;

    #[test]
    fn construction_tracks_range() {
        let x = SparseSignal::new([(3, 1.0), (-2, 4.0), (7, 0.0)]).unwrap();
        assert_eq!(x.len(), 3);
        assert_eq!(x.min_index(), Some(-2));
        assert_eq!(x.max_index(), Some(7));
        assert_eq!(x.range(), -2..=7);
        assert!(x.contains(7));
        assert!(!x.contains(0));
    }

    #[test]
    fn gaps_are_not_counted() {
        let x = SparseSignal::new([(0, 1.0), (5, 2.0)]).unwrap();
        assert_eq!(x.len(), 2);
        assert!(x.len() < x.keys().len());
    }

    #[test]
    fn duplicate_index_is_rejected() {
        let err = SparseSignal::new([(1, 1.0), (2, 2.0), (1, 3.0)]).unwrap_err();
        assert_eq!(err, SignalError::DuplicateIndex(1));
    }

    #[test]
    fn empty_signal() {
        let x = SparseSignal::empty();
        assert!(x.is_empty());
        assert_eq!(x.len(), 0);
        assert_eq!(x.min_index(), None);
        assert_eq!(x.max_index(), None);
        assert_eq!(x.range().count(), 0);
        assert!(x.keys().is_empty());
        assert!(x.values().is_empty());
        assert_eq!(x[0], Value::ZERO);
    }

    #[rstest]
    #[case(-1000)]
    #[case(-1)]
    #[case(4)]
    #[case(i64::MAX)]
    #[case(i64::MIN)]
    fn zero_fill_outside_range(#[case] n: i64) {
        let x = SparseSignal::from_dense(0, [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(x[n], Value::ZERO);
        assert_eq!(x.get(n), Value::ZERO);
    }

    #[test]
    fn dense_samples_at_index_bounds() {
        let top = SparseSignal::from_dense(i64::MAX - 1, [1.0, 2.0]);
        assert_eq!(top.range(), i64::MAX - 1..=i64::MAX);
        assert_eq!(top[i64::MAX], Value::from(2.0));
        let bottom = SparseSignal::from_dense(i64::MIN, [3.0]);
        assert_eq!(bottom.min_index(), Some(i64::MIN));
        assert_eq!(SparseSignal::impulse(i64::MAX).len(), 1);
        // Nothing fits past the last index
        assert_eq!(SparseSignal::from_dense(i64::MAX, [1.0, 2.0, 3.0]).len(), 1);
    }

    #[test]
    fn keys_and_values_fill_gaps() {
        let x = SparseSignal::new([(-1, 2.0), (2, 5.0)]).unwrap();
        assert_eq!(x.keys(), vec![-1, 0, 1, 2]);
        assert_eq!(
            x.values(),
            vec![Value::from(2.0), Value::ZERO, Value::ZERO, Value::from(5.0)]
        );
    }

    #[test]
    fn from_rows_accepts_pairs() {
        let x = SparseSignal::from_rows(&[[0.0, 1.0], [1.0, 3.0], [2.0, -3.0]]).unwrap();
        assert_eq!(x, SparseSignal::from_dense(0, [1.0, 3.0, -3.0]));

        let none: [[f64; 2]; 0] = [];
        assert!(SparseSignal::from_rows(&none).unwrap().is_empty());
    }

    #[test]
    fn from_rows_checks_shape() {
        let rows: Vec<Vec<f64>> = vec![vec![0.0, 1.0], vec![1.0, 2.0, 3.0]];
        assert_eq!(
            SparseSignal::from_rows(&rows).unwrap_err(),
            SignalError::Shape { row: 1, len: 3 }
        );
    }

    #[rstest]
    #[case(0.5)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    #[case(1e300)]
    fn from_rows_checks_index(#[case] index: f64) {
        let err = SparseSignal::from_rows(&[[index, 1.0]]).unwrap_err();
        assert!(matches!(err, SignalError::NonIntegerIndex { row: 0, .. }));
    }

    #[test]
    fn equality_is_tolerant() {
        let x = SparseSignal::from_dense(0, [1.0, 2.0]);
        let y = SparseSignal::from_dense(0, [1.0 + 1e-12, 2.0 - 1e-12]);
        assert_eq!(x, y);
        assert_ne!(x, SparseSignal::from_dense(0, [1.0, 2.1]));
    }

    #[test]
    fn equality_ignores_explicit_zeros() {
        let x = SparseSignal::new([(0, 1.0), (3, 0.0)]).unwrap();
        let y = SparseSignal::from_dense(0, [1.0]);
        assert_eq!(x, y);
        assert_eq!(y, x);
        assert_eq!(SparseSignal::empty(), SparseSignal::from_dense(5, [0.0, 0.0]));
        assert_eq!(SparseSignal::empty(), SparseSignal::empty());
    }

    #[test]
    fn equality_across_representations() {
        let x = SparseSignal::from_dense(0, [1.0, -2.0]);
        let y = SparseSignal::from_dense(0, [Complex64::new(1.0, 0.0), Complex64::new(-2.0, 1e-15)]);
        assert!(!y.is_real());
        assert_eq!(x, y);
    }

    #[test]
    fn approx_traits() {
        let x = SparseSignal::from_dense(0, [1.0, 2.0]);
        let y = SparseSignal::from_dense(0, [1.001, 2.0]);
        approx::assert_relative_eq!(x, y, epsilon = 1e-2);
        approx::assert_abs_diff_ne!(x, y, epsilon = 1e-6);
    }

    #[test]
    fn impulse_and_step() {
        assert_eq!(SparseSignal::impulse(2).keys(), vec![2]);
        assert_eq!(SparseSignal::impulse(2)[2], Value::from(1.0));
        let u = SparseSignal::step(0..=3);
        assert_eq!(u.len(), 4);
        assert!(u.values().iter().all(|v| *v == Value::from(1.0)));
    }

    #[test]
    fn display() {
        let x = SparseSignal::new([(-1, 1.5), (1, -2.0)]).unwrap();
        insta::assert_snapshot!(x.to_string().trim_end(), @r"
        -1: 1.5
        0: 0
        1: -2
        ");
        assert_eq!(SparseSignal::empty().to_string(), "(empty)\n");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_round_trip() {
        let x = SparseSignal::new([(-1, Value::from(1.5)), (2, Value::from(Complex64::new(0.0, 1.0)))]).unwrap();
        let json = serde_json::to_string(&x).unwrap();
        let back: SparseSignal = serde_json::from_str(&json).unwrap();
        assert_eq!(back, x);
        assert_eq!(back.len(), 2);
    }
}
