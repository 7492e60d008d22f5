#![warn(missing_docs)]
//! Sparse discrete-time signals.
//!
//! A [`SparseSignal`] is a partial map from integer sample indices to values, read as a total
//! function by filling every missing index with zero. Signals are immutable; every operation
//! returns a new signal.
//!
//! # Example
//!
//! ```rust
//! use zbox_signal::SparseSignal;
//!
//! let x = SparseSignal::new([(0, 1.0), (1, 3.0), (2, -3.0)]).unwrap();
//! let y = SparseSignal::new([(-3, 1.0), (-2, 1.0), (-1, 3.0)]).unwrap();
//! let sum = &x + &y;
//!
//! assert_eq!(sum.keys(), vec![-3, -2, -1, 0, 1, 2]);
//! assert_eq!(sum, SparseSignal::from_dense(-3, [1.0, 1.0, 3.0, 1.0, 3.0, -3.0]));
//! assert_eq!(x[10], zbox_signal::Value::from(0.0));
//! ```
use thiserror::Error;

mod ops;
mod signal;
mod value;

pub use ops::Operand;
pub use signal::SparseSignal;
pub use value::{Tolerance, Value};

/// Errors raised while building or combining signals.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SignalError {
    /// An input row is not an `(index, value)` pair.
    #[error("Row {row} has {len} entries, expected an (index, value) pair")]
    Shape {
        /// Position of the offending row.
        row: usize,
        /// Number of entries found in that row.
        len: usize,
    },
    /// An input row holds an index which is not an integer.
    #[error("Index {value} in row {row} is not an integer")]
    NonIntegerIndex {
        /// Position of the offending row.
        row: usize,
        /// Index value found in that row.
        value: f64,
    },
    /// The same index was provided more than once.
    #[error("Index {0} appears more than once")]
    DuplicateIndex(i64),
    /// The multiplication operand is neither a scalar nor a signal.
    #[error("Cannot multiply a signal by {kind}: expected a scalar or a signal")]
    TypeKind {
        /// Description of the rejected operand.
        kind: &'static str,
    },
    /// A result would hold samples at indices that do not fit in an `i64`.
    #[error("Resulting index range overflows: {start} + {offset} is out of bounds")]
    IndexOverflow {
        /// Index the offset is applied to.
        start: i64,
        /// Offset which pushes the index out of bounds.
        offset: i64,
    },
}
