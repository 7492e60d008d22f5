use crate::impulse::{ImpulseResponse, RealCoercion, Symbol};
use crate::response::FrequencyResponse;
use crate::FilterError;
use nalgebra::DMatrix;
use num_complex::Complex64;
use zbox_math::poly::{roots, Polynomial};
use zbox_math::residue::{residuez, PartialFractions};
use zbox_math::root_eq::nr::NewtonRaphson;
use zbox_math::{lfilter, linspace, MathError};
use zbox_signal::{SparseSignal, Value};

/// Discrete-time LTI system given by its rational transfer function
/// `H(z) = b(z^-1) / a(z^-1)`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Coefficients")
)]
pub struct RationalFilter {
    b: Vec<f64>,
    a: Vec<f64>,
}

/// Unchecked wire form of [`RationalFilter`], validated through [`RationalFilter::new`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct Coefficients {
    b: Vec<f64>,
    a: Vec<f64>,
}

#[cfg(feature = "serde")]
impl TryFrom<Coefficients> for RationalFilter {
    type Error = FilterError;

    fn try_from(Coefficients { b, a }: Coefficients) -> Result<Self, Self::Error> {
        Self::new(b, a)
    }
}

impl RationalFilter {
    /// Creates a filter from its numerator and denominator coefficients, in ascending powers
    /// of `z^-1`.
    ///
    /// Both lists need at least one coefficient. A zero `a[0]` is accepted here, but makes
    /// filtering and inverse transforms fail with [`FilterError::DegenerateCoefficient`].
    pub fn new(b: impl Into<Vec<f64>>, a: impl Into<Vec<f64>>) -> Result<Self, FilterError> {
        let (b, a) = (b.into(), a.into());
        if b.is_empty() {
            return Err(FilterError::shape("b", "expected at least one coefficient"));
        }
        if a.is_empty() {
            return Err(FilterError::shape("a", "expected at least one coefficient"));
        }
        Ok(Self { b, a })
    }

    /// Creates a filter from coefficient matrices, which must be row or column vectors.
    pub fn from_matrices(b: &DMatrix<f64>, a: &DMatrix<f64>) -> Result<Self, FilterError> {
        Self::new(vector("b", b)?, vector("a", a)?)
    }

    /// Numerator coefficients.
    pub fn numerator(&self) -> &[f64] {
        &self.b
    }

    /// Denominator coefficients.
    pub fn denominator(&self) -> &[f64] {
        &self.a
    }

    /// The inverse system `a(z^-1) / b(z^-1)`.
    pub fn inverse(&self) -> Self {
        Self {
            b: self.a.clone(),
            a: self.b.clone(),
        }
    }

    /// Evaluates `H(z)`.
    ///
    /// Nothing is guarded: `z = 0`, or a zero of the denominator, gives infinite or NaN values.
    pub fn eval(&self, z: Complex64) -> Complex64 {
        let num: Complex64 = Polynomial::<f64>::new(self.b.as_slice()).eval_inverse(z);
        let den: Complex64 = Polynomial::<f64>::new(self.a.as_slice()).eval_inverse(z);
        num / den
    }

    /// Runs the filter over `x`, starting from rest.
    ///
    /// The input is densified over its stored range, and the output covers exactly that range:
    /// `y[n]` lines up with `x[n]`. Real signals are filtered with real arithmetic, complex ones
    /// with complex arithmetic.
    #[profiling::function]
    pub fn filter(&self, x: &SparseSignal) -> Result<SparseSignal, FilterError> {
        self.check_leading()?;
        let Some(start) = x.min_index() else {
            return Ok(SparseSignal::empty());
        };
        let values = x.values();
        let y: Vec<Value> = if x.is_real() {
            let dense = values.iter().map(Value::re).collect::<Vec<_>>();
            lfilter(&self.b, &self.a, &dense)?.into_iter().map(Value::Real).collect()
        } else {
            let complex = |c: &[f64]| c.iter().copied().map(Complex64::from).collect::<Vec<_>>();
            let dense = values.iter().map(Value::to_complex).collect::<Vec<_>>();
            lfilter(&complex(&self.b), &complex(&self.a), &dense)?
                .into_iter()
                .map(Value::Complex)
                .collect()
        };
        Ok(SparseSignal::from_dense(start, y))
    }

    /// Partial-fraction expansion of the transfer function.
    pub fn partial_fractions(&self) -> Result<PartialFractions, FilterError> {
        self.check_leading()?;
        residuez(&self.b, &self.a).map_err(|err| match err {
            MathError::LeadingZero { .. } => FilterError::DegenerateCoefficient,
            other => other.into(),
        })
    }

    /// Closed-form inverse z-transform, together with the variable it is expressed over.
    ///
    /// # Example
    ///
    /// ```rust
    /// use zbox_filters::RationalFilter;
    ///
    /// let filter = RationalFilter::new([1.0], [1.0, -0.5]).unwrap();
    /// let (h, n) = filter.iztrans().unwrap();
    /// let h3 = h.subs(&n, 3).unwrap();
    /// assert!((h3.re - 0.125).abs() < 1e-12);
    /// ```
    pub fn iztrans(&self) -> Result<(ImpulseResponse, Symbol), FilterError> {
        let pf = self.partial_fractions()?;
        log::debug!(
            "Inverse z-transform: {} pole terms, {} direct terms",
            pf.poles.len(),
            pf.direct.len()
        );
        let response = ImpulseResponse::from_partial_fractions(&pf);
        let variable = response.variable().clone();
        Ok((response, variable))
    }

    /// Impulse response sampled over the half-open index range `[range[0], range[1])`.
    ///
    /// Fails with [`FilterError::Shape`] unless `range` holds exactly two indices.
    pub fn iztrans_range(&self, range: &[i64]) -> Result<SparseSignal, FilterError> {
        self.iztrans_range_with(range, RealCoercion::default())
    }

    /// Same as [`Self::iztrans_range`], with explicit control over real coercion of the
    /// samples.
    pub fn iztrans_range_with(&self, range: &[i64], coercion: RealCoercion) -> Result<SparseSignal, FilterError> {
        let &[start, stop] = range else {
            return Err(FilterError::shape(
                "range",
                format!("expected (start, stop), got {} elements", range.len()),
            ));
        };
        let (response, _) = self.iztrans()?;
        Ok(response.to_signal(start..stop, coercion))
    }

    /// Impulse response over the half-open index range `[range[0], range[1])`.
    ///
    /// Alias of [`Self::iztrans_range`].
    pub fn impz(&self, range: &[i64]) -> Result<SparseSignal, FilterError> {
        self.iztrans_range(range)
    }

    /// Frequency response over `num` evenly spaced angular frequencies covering
    /// `[range[0], range[1]]`, both ends included.
    ///
    /// Fails with [`FilterError::Shape`] unless `range` holds exactly two frequencies.
    #[profiling::function]
    pub fn frequency_response(&self, range: &[f64], num: usize) -> Result<FrequencyResponse, FilterError> {
        let &[start, stop] = range else {
            return Err(FilterError::shape(
                "range",
                format!("expected (start, stop), got {} elements", range.len()),
            ));
        };
        let omega = linspace(start, stop, num);
        let h = omega
            .iter()
            .map(|&w| self.eval(Complex64::from_polar(1.0, w)))
            .collect();
        Ok(FrequencyResponse { omega, h })
    }

    /// Magnitude of the frequency response, along with the sampled angular frequencies.
    ///
    /// Use [`crate::DEFAULT_FREQZ_POINTS`] for `num` when there is no better choice.
    pub fn freqz(&self, range: &[f64], num: usize) -> Result<(Vec<f64>, Vec<f64>), FilterError> {
        let response = self.frequency_response(range, num)?;
        Ok((response.magnitude(), response.omega))
    }

    /// Poles of the system, that is the roots of `z^m a(z^-1)`.
    pub fn poles(&self) -> Result<Vec<Complex64>, FilterError> {
        self.check_leading()?;
        let a = Polynomial::new(self.a.clone()).trim();
        Ok(roots(a.coefficients(), &NewtonRaphson::default())?)
    }

    /// Finite zeros of the system. Leading zeros of `b` are pure delays and contribute none.
    pub fn zeros(&self) -> Result<Vec<Complex64>, FilterError> {
        let b = Polynomial::new(self.b.clone()).trim();
        let b = b.coefficients();
        let first = b.iter().position(|&c| c != 0.0).unwrap_or(b.len());
        if b.len() - first < 2 {
            return Ok(vec![]);
        }
        Ok(roots(&b[first..], &NewtonRaphson::default())?)
    }

    /// Whether every pole lies strictly inside the unit circle.
    pub fn is_stable(&self) -> Result<bool, FilterError> {
        Ok(self.poles()?.iter().all(|p| p.norm() < 1.0))
    }

    fn check_leading(&self) -> Result<(), FilterError> {
        match self.a.first() {
            Some(&a0) if a0 != 0.0 => Ok(()),
            _ => Err(FilterError::DegenerateCoefficient),
        }
    }
}

fn vector(arg: &'static str, m: &DMatrix<f64>) -> Result<Vec<f64>, FilterError> {
    if m.nrows() == 1 || m.ncols() == 1 {
        Ok(m.iter().copied().collect())
    } else {
        Err(FilterError::shape(
            arg,
            format!("expected a row or column vector, got a {}x{} matrix", m.nrows(), m.ncols()),
        ))
    }
}
