//! Numeric building blocks for discrete-time LTI systems.
//!
//! Everything here works on dense coefficient or sample slices. The sparse, index-aware
//! containers live in `zbox-signal`, and the transfer-function object in `zbox-filters`.
use az::CastFrom;
use num_traits::Float;
use numeric_literals::replace_float_literals;

mod convolve;
mod error;
mod lfilter;
pub mod poly;
pub mod residue;
pub mod root_eq;

pub use convolve::convolve;
pub use error::MathError;
pub use lfilter::lfilter;

/// Converts a gain in decibels to a linear amplitude ratio.
#[replace_float_literals(T::cast_from(literal))]
pub fn db_to_linear<T: Float + CastFrom<f64>>(db: T) -> T {
    T::powf(10.0, db / 20.0)
}

/// Converts a linear amplitude ratio to decibels. Zero maps to negative infinity.
#[replace_float_literals(T::cast_from(literal))]
pub fn linear_to_db<T: Float + CastFrom<f64>>(linear: T) -> T {
    20.0 * linear.log10()
}

/// Returns `num` evenly spaced samples over the closed interval `[start, stop]`.
///
/// A single sample yields `[start]`, zero samples yield an empty vector. The last sample is
/// exactly `stop`, regardless of rounding in the step.
///
/// # Example
///
/// ```rust
/// use zbox_math::linspace;
///
/// assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
/// assert_eq!(linspace(2.0, 3.0, 1), vec![2.0]);
/// ```
pub fn linspace<T: Float + CastFrom<usize>>(start: T, stop: T, num: usize) -> Vec<T> {
    match num {
        0 => vec![],
        1 => vec![start],
        _ => {
            let step = (stop - start) / T::cast_from(num - 1);
            (0..num)
                .map(|i| if i == num - 1 { stop } else { start + step * T::cast_from(i) })
                .collect()
        }
    }
}
