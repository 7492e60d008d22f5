use approx::{AbsDiffEq, RelativeEq};
use num_complex::Complex64;
use num_traits::Zero;
use std::fmt;
use std::iter::Sum;
use std::ops;

/// A signal sample, either real or complex.
///
/// Arithmetic promotes: two real operands give a real result, anything involving a complex
/// operand gives a complex result. Equality compares the promoted values, so `Real(1.0)` equals
/// `Complex(1 + 0i)`.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(untagged))]
pub enum Value {
    /// Real sample
    Real(f64),
    /// Complex sample
    Complex(Complex64),
}

impl Value {
    /// The additive identity, as a real value.
    pub const ZERO: Self = Self::Real(0.0);

    /// Whether the value is stored as a real number.
    pub fn is_real(&self) -> bool {
        matches!(self, Self::Real(_))
    }

    /// Real part.
    pub fn re(&self) -> f64 {
        match *self {
            Self::Real(x) => x,
            Self::Complex(z) => z.re,
        }
    }

    /// Imaginary part, `0` for real values.
    pub fn im(&self) -> f64 {
        match *self {
            Self::Real(_) => 0.0,
            Self::Complex(z) => z.im,
        }
    }

    /// Promotes the value to a complex number.
    pub fn to_complex(&self) -> Complex64 {
        match *self {
            Self::Real(x) => Complex64::from(x),
            Self::Complex(z) => z,
        }
    }

    /// Magnitude of the value.
    pub fn norm(&self) -> f64 {
        match *self {
            Self::Real(x) => x.abs(),
            Self::Complex(z) => z.norm(),
        }
    }

    /// Returns the real part if the imaginary part is negligible, that is at most `tolerance`
    /// relative to the magnitude (or absolutely, for magnitudes below 1). Non-finite values are
    /// never coerced.
    pub fn try_real(&self, tolerance: f64) -> Option<f64> {
        match *self {
            Self::Real(x) => Some(x),
            Self::Complex(z) if z.is_finite() && z.im.abs() <= tolerance * z.norm().max(1.0) => Some(z.re),
            Self::Complex(_) => None,
        }
    }

    /// Demotes the value to a real one when [`Self::try_real`] allows it, and keeps it as is
    /// otherwise.
    pub fn coerce_real(self, tolerance: f64) -> Self {
        self.try_real(tolerance).map_or(self, Self::Real)
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Real(value.into())
    }
}

impl From<Complex64> for Value {
    fn from(value: Complex64) -> Self {
        Self::Complex(value)
    }
}

impl From<Value> for Complex64 {
    fn from(value: Value) -> Self {
        value.to_complex()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Real(a), Self::Real(b)) => a == b,
            _ => self.to_complex() == other.to_complex(),
        }
    }
}

macro_rules! promoting_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl ops::$trait for Value {
            type Output = Value;

            #[inline]
            fn $method(self, rhs: Self) -> Self::Output {
                match (self, rhs) {
                    (Self::Real(a), Self::Real(b)) => Self::Real(a $op b),
                    (a, b) => Self::Complex(a.to_complex() $op b.to_complex()),
                }
            }
        }

        impl ops::$trait<f64> for Value {
            type Output = Value;

            #[inline]
            fn $method(self, rhs: f64) -> Self::Output {
                self $op Self::Real(rhs)
            }
        }
    };
}

promoting_op!(Add, add, +);
promoting_op!(Sub, sub, -);
promoting_op!(Mul, mul, *);
promoting_op!(Div, div, /);

impl ops::Neg for Value {
    type Output = Value;

    fn neg(self) -> Self::Output {
        match self {
            Self::Real(x) => Self::Real(-x),
            Self::Complex(z) => Self::Complex(-z),
        }
    }
}

impl ops::AddAssign for Value {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Zero for Value {
    fn zero() -> Self {
        Self::ZERO
    }

    fn is_zero(&self) -> bool {
        self.re() == 0.0 && self.im() == 0.0
    }
}

impl Sum for Value {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, ops::Add::add)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Real(x) => fmt::Display::fmt(x, f),
            Self::Complex(z) => fmt::Display::fmt(z, f),
        }
    }
}

impl AbsDiffEq for Value {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.re().abs_diff_eq(&other.re(), epsilon) && self.im().abs_diff_eq(&other.im(), epsilon)
    }
}

impl RelativeEq for Value {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: Self::Epsilon, max_relative: Self::Epsilon) -> bool {
        self.re().relative_eq(&other.re(), epsilon, max_relative)
            && self.im().relative_eq(&other.im(), epsilon, max_relative)
    }
}

/// Tolerance used for approximate comparisons of samples.
///
/// Two values match when they are within `epsilon` of each other, or within `max_relative` of
/// the larger magnitude, componentwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Absolute tolerance, governs comparisons near zero
    pub epsilon: f64,
    /// Relative tolerance
    pub max_relative: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            epsilon: 1e-9,
            max_relative: 1e-9,
        }
    }
}

impl Tolerance {
    /// Whether the two values match within this tolerance.
    #[inline]
    pub fn matches(&self, a: &Value, b: &Value) -> bool {
        a.relative_eq(b, self.epsilon, self.max_relative)
    }
}
