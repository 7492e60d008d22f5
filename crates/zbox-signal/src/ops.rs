use crate::signal::SparseSignal;
use crate::value::Value;
use crate::SignalError;
use num_complex::Complex64;
use std::ops;
use std::ops::RangeInclusive;

/// Union of the stored ranges of both signals. An empty signal contributes nothing.
#[allow(clippy::reversed_empty_ranges)]
pub(crate) fn union_range(a: &SparseSignal, b: &SparseSignal) -> RangeInclusive<i64> {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => 1..=0,
        (true, false) => b.range(),
        (false, true) => a.range(),
        (false, false) => {
            let (ra, rb) = (a.range(), b.range());
            *ra.start().min(rb.start())..=*ra.end().max(rb.end())
        }
    }
}

/// Index span of the convolution of both signals, `None` when either is empty.
fn output_span(a: &SparseSignal, b: &SparseSignal) -> Result<Option<RangeInclusive<i64>>, SignalError> {
    if a.is_empty() || b.is_empty() {
        return Ok(None);
    }
    let (ra, rb) = (a.range(), b.range());
    let add = |start: i64, offset: i64| {
        start
            .checked_add(offset)
            .ok_or(SignalError::IndexOverflow { start, offset })
    };
    Ok(Some(add(*ra.start(), *rb.start())?..=add(*ra.end(), *rb.end())?))
}

fn zip_with(a: &SparseSignal, b: &SparseSignal, f: impl Fn(Value, Value) -> Value) -> SparseSignal {
    union_range(a, b).map(|n| (n, f(a.get(n), b.get(n)))).collect()
}

/// Right-hand side of [`SparseSignal::multiply`].
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Scales every sample of the signal.
    Scalar(Value),
    /// Convolves with the signal.
    Signal(SparseSignal),
    /// A sequence of values without indices. Multiplying by it is an error, as there is no
    /// way to tell where it sits on the time axis.
    Dense(Vec<Value>),
}

impl Operand {
    fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "a scalar",
            Self::Signal(_) => "a signal",
            Self::Dense(_) => "a dense sequence without indices",
        }
    }
}

impl From<f64> for Operand {
    fn from(value: f64) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<Complex64> for Operand {
    fn from(value: Complex64) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        Self::Scalar(value)
    }
}

impl From<SparseSignal> for Operand {
    fn from(value: SparseSignal) -> Self {
        Self::Signal(value)
    }
}

impl From<&SparseSignal> for Operand {
    fn from(value: &SparseSignal) -> Self {
        Self::Signal(value.clone())
    }
}

impl From<Vec<f64>> for Operand {
    fn from(value: Vec<f64>) -> Self {
        Self::Dense(value.into_iter().map(Value::from).collect())
    }
}

impl From<Vec<Value>> for Operand {
    fn from(value: Vec<Value>) -> Self {
        Self::Dense(value)
    }
}

#[allow(clippy::should_implement_trait)]
impl SparseSignal {
    /// Elementwise sum over the union of both stored ranges.
    ///
    /// Adding two empty signals gives the empty signal.
    pub fn add(&self, other: &Self) -> Self {
        zip_with(self, other, ops::Add::add)
    }

    /// Elementwise difference over the union of both stored ranges.
    pub fn sub(&self, other: &Self) -> Self {
        zip_with(self, other, ops::Sub::sub)
    }

    /// Multiplies every sample by `k`.
    ///
    /// The result stores a sample at every index of this signal's range, implicit zeros
    /// included, so its length is the width of that range.
    pub fn scale(&self, k: impl Into<Value>) -> Self {
        let k = k.into();
        self.range().map(|n| (n, self.get(n) * k)).collect()
    }

    /// Discrete convolution, computed on the dense sample vectors of both operands.
    ///
    /// The result spans `[min(self) + min(other), max(self) + max(other)]`. Convolving with an
    /// empty signal gives the empty signal.
    ///
    /// Fails with [`SignalError::IndexOverflow`] when either end of that span does not fit in
    /// an `i64`.
    #[profiling::function]
    pub fn convolve(&self, other: &Self) -> Result<Self, SignalError> {
        let Some(span) = output_span(self, other)? else {
            return Ok(Self::empty());
        };
        let (a, b) = (self.values(), other.values());
        log::trace!("Convolving dense signals of {} and {} samples", a.len(), b.len());
        Ok(Self::from_dense(*span.start(), zbox_math::convolve(&a, &b)))
    }

    /// Discrete convolution, computed as the explicit sum
    /// `y[n] = Σ_{k ∈ [min(self), max(self)]} self[k] · other[n - k]`.
    ///
    /// Agrees with [`Self::convolve`] up to rounding, and fails in the same cases.
    pub fn convolve_direct(&self, other: &Self) -> Result<Self, SignalError> {
        let Some(out) = output_span(self, other)? else {
            return Ok(Self::empty());
        };
        let ra = self.range();
        Ok(out
            .map(|n| {
                let y = ra
                    .clone()
                    // n - k out of bounds lies outside the other signal's range, so reads as zero
                    .filter_map(|k| n.checked_sub(k).map(|m| self.get(k) * other.get(m)))
                    .sum::<Value>();
                (n, y)
            })
            .collect())
    }

    /// Explicit multiplication dispatch: scalars scale the signal, signals are convolved with it.
    ///
    /// Any other operand fails with [`SignalError::TypeKind`].
    pub fn multiply(&self, rhs: impl Into<Operand>) -> Result<Self, SignalError> {
        match rhs.into() {
            Operand::Scalar(k) => Ok(self.scale(k)),
            Operand::Signal(other) => self.convolve(&other),
            other => Err(SignalError::TypeKind { kind: other.kind() }),
        }
    }
}

macro_rules! signal_binop {
    ($trait:ident, $method:ident, $impl:expr) => {
        impl ops::$trait<&SparseSignal> for &SparseSignal {
            type Output = SparseSignal;

            fn $method(self, rhs: &SparseSignal) -> SparseSignal {
                $impl(self, rhs)
            }
        }

        impl ops::$trait<SparseSignal> for &SparseSignal {
            type Output = SparseSignal;

            fn $method(self, rhs: SparseSignal) -> SparseSignal {
                $impl(self, &rhs)
            }
        }

        impl ops::$trait<&SparseSignal> for SparseSignal {
            type Output = SparseSignal;

            fn $method(self, rhs: &SparseSignal) -> SparseSignal {
                $impl(&self, rhs)
            }
        }

        impl ops::$trait<SparseSignal> for SparseSignal {
            type Output = SparseSignal;

            fn $method(self, rhs: SparseSignal) -> SparseSignal {
                $impl(&self, &rhs)
            }
        }
    };
}

signal_binop!(Add, add, SparseSignal::add);
signal_binop!(Sub, sub, SparseSignal::sub);
signal_binop!(Mul, mul, convolve_or_panic);

/// Convolution behind the `*` operator.
///
/// # Panics
///
/// When the output span does not fit in an `i64`, the way integer arithmetic overflows. Use
/// [`SparseSignal::convolve`] to get an error instead.
fn convolve_or_panic(a: &SparseSignal, b: &SparseSignal) -> SparseSignal {
    match a.convolve(b) {
        Ok(y) => y,
        Err(err) => panic!("{err}"),
    }
}

macro_rules! scalar_mul {
    ($($scalar:ty),*) => {
        $(
        impl ops::Mul<$scalar> for &SparseSignal {
            type Output = SparseSignal;

            fn mul(self, rhs: $scalar) -> SparseSignal {
                self.scale(rhs)
            }
        }

        impl ops::Mul<$scalar> for SparseSignal {
            type Output = SparseSignal;

            fn mul(self, rhs: $scalar) -> SparseSignal {
                self.scale(rhs)
            }
        }

        impl ops::Mul<&SparseSignal> for $scalar {
            type Output = SparseSignal;

            fn mul(self, rhs: &SparseSignal) -> SparseSignal {
                rhs.scale(self)
            }
        }

        impl ops::Mul<SparseSignal> for $scalar {
            type Output = SparseSignal;

            fn mul(self, rhs: SparseSignal) -> SparseSignal {
                rhs.scale(self)
            }
        }
        )*
    };
}

scalar_mul!(f64, Complex64, Value);

impl ops::Neg for &SparseSignal {
    type Output = SparseSignal;

    fn neg(self) -> SparseSignal {
        self.iter().map(|(n, v)| (n, -v)).collect()
    }
}

impl ops::Neg for SparseSignal {
    type Output = SparseSignal;

    fn neg(self) -> SparseSignal {
        -&self
    }
}
