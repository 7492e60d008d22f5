//! Dense polynomials, stored with ascending powers.
//!
//! Transfer functions are written in powers of `w = z^-1`, so `[b0, b1, b2]` reads
//! `b0 + b1 z^-1 + b2 z^-2`. The same coefficient list, read in *descending* powers of `z`,
//! is the polynomial whose roots are the poles (or zeros) of the filter; [`roots`] takes it in
//! that form.
use crate::root_eq::nr::NewtonRaphson;
use crate::root_eq::Differentiable;
use crate::MathError;
use nalgebra::DMatrix;
use num_complex::{Complex, Complex64, ComplexFloat};
use num_traits::{Num, Zero};
use std::iter::Sum;

/// Polynomial with coefficients in ascending powers of its variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial<T> {
    coeffs: Vec<T>,
}

impl<T> Polynomial<T> {
    pub fn new(coeffs: impl Into<Vec<T>>) -> Self {
        Self {
            coeffs: coeffs.into(),
        }
    }

    pub fn coefficients(&self) -> &[T] {
        &self.coeffs
    }

    pub fn into_coefficients(self) -> Vec<T> {
        self.coeffs
    }

    /// Number of stored coefficients, including any trailing zeros.
    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Polynomial<U> {
        Polynomial::new(self.coeffs.iter().map(f).collect::<Vec<_>>())
    }
}

impl<T: Copy + Num> Polynomial<T> {
    pub fn zero() -> Self {
        Self::new(vec![])
    }

    pub fn one() -> Self {
        Self::new(vec![T::one()])
    }

    /// Drops trailing zero coefficients. The zero polynomial ends up with no coefficients.
    pub fn trim(mut self) -> Self {
        while self.coeffs.last().is_some_and(|c| c.is_zero()) {
            self.coeffs.pop();
        }
        self
    }

    /// Degree of the polynomial, `None` for the zero polynomial.
    pub fn degree(&self) -> Option<usize> {
        self.coeffs.iter().rposition(|c| !c.is_zero())
    }

    pub fn is_zero(&self) -> bool {
        self.degree().is_none()
    }

    /// Evaluates the polynomial at `x` with Horner's scheme.
    pub fn eval(&self, x: T) -> T {
        self.coeffs.iter().rev().fold(T::zero(), |acc, &c| acc * x + c)
    }

    pub fn derivative(&self) -> Self {
        let mut k = T::zero();
        let coeffs = self
            .coeffs
            .iter()
            .skip(1)
            .map(|&c| {
                k = k + T::one();
                c * k
            })
            .collect::<Vec<_>>();
        Self::new(coeffs)
    }

    pub fn scale(&self, factor: T) -> Self {
        self.map(|&c| c * factor)
    }

    pub fn mul(&self, other: &Self) -> Self {
        if self.is_empty() || other.is_empty() {
            return Self::zero();
        }
        let mut out = vec![T::zero(); self.len() + other.len() - 1];
        for (i, &a) in self.coeffs.iter().enumerate() {
            for (j, &b) in other.coeffs.iter().enumerate() {
                out[i + j] = out[i + j] + a * b;
            }
        }
        Self::new(out)
    }

    pub fn pow(&self, exp: usize) -> Self {
        (0..exp).fold(Self::one(), |acc, _| acc.mul(self))
    }

    /// Euclidean division, returning `(quotient, remainder)` with
    /// `deg(remainder) < deg(divisor)`. Both results are trimmed.
    pub fn div_rem(&self, divisor: &Self) -> Result<(Self, Self), MathError> {
        let divisor = divisor.clone().trim();
        let Some(&lead) = divisor.coeffs.last() else {
            return Err(MathError::EmptyInput { arg: "divisor" });
        };
        let dn = divisor.len() - 1;
        let numerator = self.clone().trim();
        if numerator.len() < divisor.len() {
            return Ok((Self::zero(), numerator));
        }

        let mut rem = numerator.coeffs;
        let mut quot = vec![T::zero(); rem.len() - dn];
        for k in (0..quot.len()).rev() {
            let q = rem[k + dn] / lead;
            quot[k] = q;
            for (j, &d) in divisor.coeffs.iter().enumerate() {
                rem[k + j] = rem[k + j] - q * d;
            }
        }
        rem.truncate(dn);
        Ok((Self::new(quot).trim(), Self::new(rem).trim()))
    }
}

impl<T: Copy> Polynomial<T> {
    /// Evaluates `Σ c_i z^-i`, i.e. the polynomial at `w = 1/z`.
    ///
    /// Nothing is guarded: `z = 0` yields non-finite values as soon as a non-constant term is
    /// present.
    pub fn eval_inverse<Z>(&self, z: Z) -> Z
    where
        T: Into<Z>,
        Z: ComplexFloat + Sum,
    {
        self.coeffs
            .iter()
            .enumerate()
            .map(|(i, &c)| c.into() * z.powi(-(i as i32)))
            .sum()
    }
}

impl<T: Copy + Num> Differentiable for Polynomial<T> {
    type Scalar = T;

    fn eval(&self, x: T) -> T {
        Polynomial::eval(self, x)
    }

    fn derivative(&self, x: T) -> T {
        self.eval_with_derivative(x).1
    }

    fn eval_with_derivative(&self, x: T) -> (T, T) {
        self.coeffs
            .iter()
            .rev()
            .fold((T::zero(), T::zero()), |(p, dp), &c| (p * x + c, dp * x + p))
    }
}

/// Builds the companion matrix of a polynomial given in descending powers: first row
/// `-a_i / a_0`, ones on the sub-diagonal.
pub fn companion(coeffs: &[f64]) -> Result<DMatrix<f64>, MathError> {
    let Some(&a0) = coeffs.first() else {
        return Err(MathError::EmptyInput { arg: "coeffs" });
    };
    if a0.is_zero() {
        return Err(MathError::LeadingZero { arg: "coeffs" });
    }
    let m = coeffs.len() - 1;
    Ok(DMatrix::from_fn(m, m, |row, col| {
        if row == 0 {
            -coeffs[col + 1] / a0
        } else if row == col + 1 {
            1.0
        } else {
            0.0
        }
    }))
}

/// Unrefined complex roots of a real polynomial given in descending powers: the eigenvalues of
/// its companion matrix.
pub fn companion_roots(coeffs: &[f64]) -> Result<Vec<Complex64>, MathError> {
    let matrix = companion(coeffs)?;
    if matrix.nrows() == 0 {
        return Ok(vec![]);
    }
    Ok(matrix.complex_eigenvalues().iter().copied().collect())
}

/// Refines a root estimate of `polynomial` with Newton-Raphson, keeping the estimate when the
/// solver does not converge.
pub fn polish_root(polynomial: &Polynomial<Complex64>, guess: Complex64, polish: &NewtonRaphson<f64>) -> Complex64 {
    let result = polish.solve(polynomial, guess);
    if result.converged(polish.max_iterations) {
        result.value
    } else {
        log::warn!("Root polishing did not converge from {guess}, keeping the eigenvalue estimate");
        guess
    }
}

/// Complex roots of a real polynomial given in descending powers.
///
/// The roots are the eigenvalues of the companion matrix, each polished with a few
/// Newton-Raphson steps on the original polynomial. Repeated roots converge poorly and usually
/// keep their eigenvalue estimate.
pub fn roots(coeffs: &[f64], polish: &NewtonRaphson<f64>) -> Result<Vec<Complex64>, MathError> {
    let estimates = companion_roots(coeffs)?;
    let polynomial = descending_to_complex(coeffs);
    let roots = estimates
        .into_iter()
        .map(|guess| polish_root(&polynomial, guess, polish))
        .collect::<Vec<_>>();
    log::trace!("Found {} roots of a degree {} polynomial", roots.len(), coeffs.len().saturating_sub(1));
    Ok(roots)
}

/// Reverses descending real coefficients into an ascending complex polynomial.
pub fn descending_to_complex(coeffs: &[f64]) -> Polynomial<Complex64> {
    Polynomial::new(coeffs.iter().rev().map(|&c| Complex::from(c)).collect::<Vec<_>>())
}
