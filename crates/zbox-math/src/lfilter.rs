use crate::MathError;
use num_traits::Num;

/// Filter `x` with the rational transfer function `b(z^-1) / a(z^-1)`.
///
/// Direct form II transposed implementation of the difference equation
///
/// ```text
/// a0·y[n] = Σ b_i·x[n-i] − Σ_{i≥1} a_i·y[n-i]
/// ```
///
/// starting from rest (zero initial conditions). Both coefficient vectors are normalized by
/// `a[0]`; the output has the same length as `x`. Works for real and complex samples alike, as
/// long as the coefficients share the sample type.
///
/// # Errors
///
/// Fails when either coefficient slice is empty, or when `a[0]` is zero.
///
/// # Example
///
/// ```rust
/// use zbox_math::lfilter;
///
/// let b = [5., 4., 1., 2.];
/// let a = [1.];
/// let x = [1., 2., 3., 4., 3., 5., 6.];
/// let y = lfilter(&b, &a, &x).unwrap();
/// assert_eq!(y, vec![5., 14., 24., 36., 38., 47., 61.]);
/// ```
#[profiling::function]
pub fn lfilter<T: Copy + Num>(b: &[T], a: &[T], x: &[T]) -> Result<Vec<T>, MathError> {
    if b.is_empty() {
        return Err(MathError::EmptyInput { arg: "b" });
    }
    let Some(&a0) = a.first() else {
        return Err(MathError::EmptyInput { arg: "a" });
    };
    if a0.is_zero() {
        return Err(MathError::LeadingZero { arg: "a" });
    }

    let order = a.len().max(b.len());
    let coeff = |c: &[T], i: usize| c.get(i).map_or_else(T::zero, |&v| v / a0);
    let b = (0..order).map(|i| coeff(b, i)).collect::<Vec<_>>();
    let a = (0..order).map(|i| coeff(a, i)).collect::<Vec<_>>();
    log::trace!("lfilter: order {}, {} samples", order - 1, x.len());

    let mut state = vec![T::zero(); order - 1];
    let y = x
        .iter()
        .map(|&xn| {
            let yn = b[0] * xn + state.first().copied().unwrap_or_else(T::zero);
            for k in 0..state.len() {
                let next = state.get(k + 1).copied().unwrap_or_else(T::zero);
                state[k] = b[k + 1] * xn + next - a[k + 1] * yn;
            }
            yn
        })
        .collect();
    Ok(y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use num_complex::Complex64;
    use rstest::rstest;

    /// Direct evaluation of the difference equation, for cross-checking.
    fn difference_equation(b: &[f64], a: &[f64], x: &[f64]) -> Vec<f64> {
        let mut y = vec![0.0; x.len()];
        for n in 0..x.len() {
            let mut acc = 0.0;
            for (i, &bi) in b.iter().enumerate() {
                if n >= i {
                    acc += bi * x[n - i];
                }
            }
            for (i, &ai) in a.iter().enumerate().skip(1) {
                if n >= i {
                    acc -= ai * y[n - i];
                }
            }
            y[n] = acc / a[0];
        }
        y
    }

    #[test]
    fn accumulator() {
        let y = lfilter(&[1.0], &[1.0, -1.0], &[1.0, 1.0, 1.0]).unwrap();
        assert_eq!(y, vec![1.0, 2.0, 3.0]);
    }

    #[rstest]
    #[case(&[1.0], &[1.0, -2.0, 10.0])]
    #[case(&[0.5, -0.25, 2.0, 1.0], &[2.0, 0.3])]
    #[case(&[3.0, 1.0], &[-1.5, 0.4, 0.1, 0.2, -0.05])]
    #[case(&[1.0, 2.0, 4.0, 6.0], &[1.0, -1.0, 2.0, -3.0, 5.0])]
    fn matches_difference_equation(#[case] b: &[f64], #[case] a: &[f64]) {
        let x = [1.0, -3.0, 0.0, 0.5, 2.0, 0.0, 0.0, -1.0, 4.0, 0.25];
        let actual = lfilter(b, a, &x).unwrap();
        let expected = difference_equation(b, a, &x);
        for (actual, expected) in actual.iter().zip(&expected) {
            assert_relative_eq!(actual, expected, epsilon = 1e-9, max_relative = 1e-9);
        }
    }

    #[test]
    fn complex_samples() {
        let b = [Complex64::from(1.0)];
        let a = [Complex64::from(1.0), Complex64::from(-0.5)];
        let x = [Complex64::new(0.0, 2.0), Complex64::from(0.0)];
        let y = lfilter(&b, &a, &x).unwrap();
        assert_eq!(y, vec![Complex64::new(0.0, 2.0), Complex64::new(0.0, 1.0)]);
    }

    #[test]
    fn empty_signal_gives_empty_output() {
        assert!(lfilter(&[1.0], &[1.0, 0.5], &[]).unwrap().is_empty());
    }

    #[test]
    fn rejects_degenerate_coefficients() {
        assert_eq!(
            lfilter(&[1.0], &[0.0, 1.0], &[1.0]).unwrap_err(),
            MathError::LeadingZero { arg: "a" }
        );
        assert_eq!(lfilter::<f64>(&[], &[1.0], &[1.0]).unwrap_err(), MathError::EmptyInput { arg: "b" });
        assert_eq!(lfilter::<f64>(&[1.0], &[], &[1.0]).unwrap_err(), MathError::EmptyInput { arg: "a" });
    }
}
