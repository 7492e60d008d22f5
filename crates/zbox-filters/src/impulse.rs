//! Closed-form impulse responses.
//!
//! The inverse z-transform of a partial-fraction expansion is a finite sum of causal geometric
//! sequences and shifted impulses. [`ImpulseResponse`] stores that sum as a list of [`Term`]s and
//! evaluates it at any integer index.
use num_complex::Complex64;
use std::borrow::Cow;
use std::fmt;
use std::ops::Range;
use zbox_math::residue::PartialFractions;
use zbox_signal::{SparseSignal, Value};

/// Free integer variable of an [`ImpulseResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol(Cow<'static, str>);

impl Symbol {
    /// Creates a symbol with the given name.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// The time index `n`.
    pub const fn n() -> Self {
        Self(Cow::Borrowed("n"))
    }

    /// Name of the symbol.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Default for Symbol {
    fn default() -> Self {
        Self::n()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Controls when complex samples are turned back into real ones.
///
/// Residues and poles of a real system come in conjugate pairs, whose imaginary parts cancel
/// only up to rounding once summed.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RealCoercion {
    /// Largest imaginary part, relative to the magnitude (or absolute below magnitude 1),
    /// which still counts as zero.
    pub tolerance: f64,
}

impl Default for RealCoercion {
    fn default() -> Self {
        Self { tolerance: 1e-9 }
    }
}

/// One term of an [`ImpulseResponse`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Term {
    /// `residue · C(n + order - 1, order - 1) · pole^n · u[n]`, the inverse transform of
    /// `residue / (1 - pole z^-1)^order`.
    Exponential {
        /// Residue of the pole
        residue: Complex64,
        /// Location of the pole
        pole: Complex64,
        /// Power of the pole factor, 1 for a simple pole
        order: usize,
    },
    /// `residue · u[n]`, a simple pole at exactly `z = 1`.
    Step {
        /// Residue of the pole
        residue: Complex64,
    },
    /// `coeff · δ[n - shift]`, a direct term.
    Impulse {
        /// Amplitude of the impulse
        coeff: f64,
        /// Delay of the impulse, in samples
        shift: i64,
    },
}

impl Term {
    /// Value of the term at index `n`.
    pub fn evaluate(&self, n: i64) -> Complex64 {
        match *self {
            Self::Exponential { residue, pole, order } if n >= 0 => {
                residue * binomial(n, order.saturating_sub(1)) * pow_n(pole, n)
            }
            Self::Step { residue } if n >= 0 => residue,
            Self::Impulse { coeff, shift } if n == shift => Complex64::from(coeff),
            _ => Complex64::default(),
        }
    }

    fn fmt_with(&self, var: &Symbol, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Exponential { residue, pole, order } => {
                write!(f, "{}·", Number(residue))?;
                if order > 1 {
                    let k = order - 1;
                    write!(f, "C({var} + {k}, {k})·")?;
                }
                write!(f, "({})^{var}·u[{var}]", Number(pole))
            }
            Self::Step { residue } => write!(f, "{}·u[{var}]", Number(residue)),
            Self::Impulse { coeff, shift: 0 } => write!(f, "{coeff}·δ[{var}]"),
            Self::Impulse { coeff, shift } => write!(f, "{coeff}·δ[{var} - {shift}]"),
        }
    }
}

/// `C(n + k, k)` for `n >= 0`, as a float.
fn binomial(n: i64, k: usize) -> f64 {
    (1..=k).fold(1.0, |acc, j| acc * (n as f64 + j as f64) / j as f64)
}

fn pow_n(z: Complex64, n: i64) -> Complex64 {
    match u32::try_from(n) {
        Ok(exp) => z.powu(exp),
        Err(_) => z.powf(n as f64),
    }
}

/// Renders a complex number as a plain real when it has no imaginary part.
struct Number(Complex64);

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.im == 0.0 {
            write!(f, "{}", self.0.re)
        } else {
            write!(f, "({})", self.0)
        }
    }
}

/// Closed-form impulse response `h[n]`, a sum of [`Term`]s over a free variable.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpulseResponse {
    terms: Vec<Term>,
    variable: Symbol,
}

impl ImpulseResponse {
    /// Creates the response from its terms, over the variable `n`.
    pub fn new(terms: impl Into<Vec<Term>>) -> Self {
        Self {
            terms: terms.into(),
            variable: Symbol::n(),
        }
    }

    /// Builds the inverse z-transform of a partial-fraction expansion.
    ///
    /// Simple poles at exactly `z = 1` become [`Term::Step`], and zero direct terms are dropped.
    pub fn from_partial_fractions(pf: &PartialFractions) -> Self {
        let one = Complex64::new(1.0, 0.0);
        let poles = pf.terms().map(|(residue, pole, order)| {
            if pole == one && order == 1 {
                Term::Step { residue }
            } else {
                Term::Exponential { residue, pole, order }
            }
        });
        let direct = (0..)
            .zip(&pf.direct)
            .filter(|(_, c)| **c != 0.0)
            .map(|(shift, &coeff)| Term::Impulse { coeff, shift });
        Self::new(poles.chain(direct).collect::<Vec<_>>())
    }

    /// Terms of the sum.
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// The free variable the response is expressed over.
    pub fn variable(&self) -> &Symbol {
        &self.variable
    }

    /// Value of `h[n]`.
    pub fn evaluate(&self, n: i64) -> Complex64 {
        self.terms.iter().map(|t| t.evaluate(n)).sum()
    }

    /// Substitutes `symbol = n`. Returns `None` if `symbol` is not the free variable of the
    /// response.
    pub fn subs(&self, symbol: &Symbol, n: i64) -> Option<Complex64> {
        (*symbol == self.variable).then(|| self.evaluate(n))
    }

    /// Value of `h[n]`, demoted to a real value when its imaginary part is negligible.
    pub fn sample(&self, n: i64, coercion: RealCoercion) -> Value {
        let value = Value::Complex(self.evaluate(n)).coerce_real(coercion.tolerance);
        if !value.is_real() {
            log::warn!("h[{n}] = {value} has a non-negligible imaginary part, keeping it complex");
        }
        value
    }

    /// Samples the response over `range` into a signal.
    #[profiling::function]
    pub fn to_signal(&self, range: Range<i64>, coercion: RealCoercion) -> SparseSignal {
        log::trace!("Sampling {} terms over {range:?}", self.terms.len());
        range.map(|n| (n, self.sample(n, coercion))).collect()
    }
}

impl fmt::Display for ImpulseResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return f.write_str("0");
        }
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                f.write_str(" + ")?;
            }
            term.fmt_with(&self.variable, f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case(0, 1.0)]
    #[case(1, 2.0)]
    #[case(4, 16.0)]
    #[case(-1, 0.0)]
    fn exponential_is_causal(#[case] n: i64, #[case] expected: f64) {
        let term = Term::Exponential {
            residue: Complex64::from(1.0),
            pole: Complex64::from(2.0),
            order: 1,
        };
        assert_eq!(term.evaluate(n), Complex64::from(expected));
    }

    #[rstest]
    // 1 / (1 - z^-1)^2 is the ramp (n + 1) u[n]
    #[case(2, &[1.0, 2.0, 3.0, 4.0])]
    // 1 / (1 - z^-1)^3 gives (n + 1)(n + 2) / 2
    #[case(3, &[1.0, 3.0, 6.0, 10.0])]
    fn repeated_pole_weights(#[case] order: usize, #[case] expected: &[f64]) {
        let term = Term::Exponential {
            residue: Complex64::from(1.0),
            pole: Complex64::from(1.0),
            order,
        };
        for (n, &e) in (0..).zip(expected) {
            assert_relative_eq!(term.evaluate(n).re, e, epsilon = 1e-12);
        }
        assert_eq!(term.evaluate(-1), Complex64::default());
    }

    #[test]
    fn step_and_impulse() {
        let step = Term::Step {
            residue: Complex64::from(3.0),
        };
        assert_eq!(step.evaluate(-1), Complex64::default());
        assert_eq!(step.evaluate(100), Complex64::from(3.0));

        let impulse = Term::Impulse { coeff: -0.5, shift: 2 };
        assert_eq!(impulse.evaluate(2), Complex64::from(-0.5));
        assert_eq!(impulse.evaluate(1), Complex64::default());
        assert_eq!(impulse.evaluate(3), Complex64::default());
    }

    #[test]
    fn unit_pole_becomes_step() {
        let pf = PartialFractions {
            residues: vec![Complex64::from(1.0), Complex64::from(2.0)],
            poles: vec![Complex64::from(1.0), Complex64::from(1.0)],
            multiplicity: vec![1, 2],
            direct: vec![0.0, 4.0],
        };
        let h = ImpulseResponse::from_partial_fractions(&pf);
        assert_eq!(
            h.terms(),
            &[
                Term::Step {
                    residue: Complex64::from(1.0)
                },
                Term::Exponential {
                    residue: Complex64::from(2.0),
                    pole: Complex64::from(1.0),
                    order: 2
                },
                Term::Impulse { coeff: 4.0, shift: 1 },
            ]
        );
    }

    #[test]
    fn substitution_checks_the_variable() {
        let h = ImpulseResponse::new([Term::Impulse { coeff: 1.0, shift: 0 }]);
        assert_eq!(h.subs(&Symbol::n(), 0), Some(Complex64::from(1.0)));
        assert_eq!(h.subs(&Symbol::new("k"), 0), None);
        assert_eq!(h.variable().name(), "n");
    }

    #[test]
    fn conjugate_terms_sample_as_real() {
        let (r, p) = (Complex64::new(0.5, -0.25), Complex64::new(0.3, 0.4));
        let h = ImpulseResponse::new([
            Term::Exponential {
                residue: r,
                pole: p,
                order: 1,
            },
            Term::Exponential {
                residue: r.conj(),
                pole: p.conj(),
                order: 1,
            },
        ]);
        for n in 0..10 {
            assert!(h.sample(n, RealCoercion::default()).is_real());
        }
        let x = h.to_signal(0..10, RealCoercion::default());
        assert_eq!(x.len(), 10);
        assert!(x.is_real());
    }

    #[test]
    fn complex_samples_are_kept() {
        let h = ImpulseResponse::new([Term::Exponential {
            residue: Complex64::from(1.0),
            pole: Complex64::new(0.0, 1.0),
            order: 1,
        }]);
        assert!(h.sample(0, RealCoercion::default()).is_real());
        let v = h.sample(1, RealCoercion::default());
        assert!(!v.is_real());
        assert_relative_eq!(v.im(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn display() {
        let h = ImpulseResponse::new([
            Term::Exponential {
                residue: Complex64::from(0.5),
                pole: Complex64::from(2.0),
                order: 1,
            },
            Term::Exponential {
                residue: Complex64::new(1.0, -1.0),
                pole: Complex64::new(0.0, 0.5),
                order: 2,
            },
            Term::Step {
                residue: Complex64::from(-1.0),
            },
            Term::Impulse { coeff: -0.5, shift: 0 },
            Term::Impulse { coeff: 2.0, shift: 3 },
        ]);
        insta::assert_snapshot!(h.to_string(), @"0.5·(2)^n·u[n] + (1-1i)·C(n + 1, 1)·(0+0.5i)^n·u[n] + -1·u[n] + -0.5·δ[n] + 2·δ[n - 3]");
        assert_eq!(ImpulseResponse::new(Vec::new()).to_string(), "0");
    }
}
