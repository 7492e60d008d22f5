use num_traits::Zero;
use std::ops;

/// Full discrete linear convolution of two dense sequences.
///
/// The output has `a.len() + v.len() - 1` samples, or none when either input is empty.
///
/// # Example
///
/// ```rust
/// use zbox_math::convolve;
///
/// let a = [1., 2., 3.];
/// let v = [0., 1., 0.5];
/// assert_eq!(convolve(&a, &v), vec![0., 1., 2.5, 4., 1.5]);
/// ```
#[profiling::function]
pub fn convolve<T>(a: &[T], v: &[T]) -> Vec<T>
where
    T: Copy + Zero + ops::Mul<Output = T>,
{
    if a.is_empty() || v.is_empty() {
        return vec![];
    }
    let mut out = vec![T::zero(); a.len() + v.len() - 1];
    for (i, &ai) in a.iter().enumerate() {
        for (j, &vj) in v.iter().enumerate() {
            out[i + j] = out[i + j] + ai * vj;
        }
    }
    out
}
