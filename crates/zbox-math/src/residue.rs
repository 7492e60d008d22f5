//! Partial-fraction expansion of rational functions in `z^-1`.
//!
//! [`residuez`] rewrites
//!
//! ```text
//!        b0 + b1 z^-1 + ... + bn z^-n          r_i                     -j
//! H(z) = ----------------------------  =  Σ ------------------  +  Σ k_j z
//!        a0 + a1 z^-1 + ... + am z^-m         (1 - p_i z^-1)^o_i
//! ```
//!
//! which makes the inverse z-transform a lookup: each pole term is a (possibly
//! polynomially weighted) geometric sequence, each direct term a shifted impulse.
use crate::poly::{companion_roots, descending_to_complex, polish_root, Polynomial};
use crate::root_eq::nr::NewtonRaphson;
use crate::MathError;
use nalgebra::{DMatrix, DVector};
use num_complex::{Complex, Complex64};
use num_traits::Zero;

/// Tuning for [`residuez_with`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResidueConfig {
    /// Relative distance under which two roots count as the same, repeated pole.
    pub pole_tolerance: f64,
    /// Largest coefficient mismatch, relative to the largest denominator coefficient, between
    /// the denominator and the one rebuilt from grouped poles. Past it, the roots are kept
    /// as distinct simple poles.
    pub denominator_tolerance: f64,
    /// Solver used to refine the companion-matrix eigenvalues.
    pub root_polish: NewtonRaphson<f64>,
}

impl Default for ResidueConfig {
    fn default() -> Self {
        Self {
            pole_tolerance: 1e-3,
            denominator_tolerance: 1e-10,
            root_polish: NewtonRaphson::default(),
        }
    }
}

/// Result of a partial-fraction expansion.
///
/// `residues`, `poles` and `multiplicity` are parallel: entry `i` is the term
/// `residues[i] / (1 - poles[i] z^-1)^multiplicity[i]`. A pole of multiplicity `m` is listed `m`
/// times, with orders `1..=m`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialFractions {
    pub residues: Vec<Complex64>,
    pub poles: Vec<Complex64>,
    pub multiplicity: Vec<usize>,
    /// Direct (FIR) terms, `direct[j]` multiplies `z^-j`.
    pub direct: Vec<f64>,
}

impl PartialFractions {
    /// Iterates over `(residue, pole, order)` triples.
    pub fn terms(&self) -> impl '_ + Iterator<Item = (Complex64, Complex64, usize)> {
        self.residues
            .iter()
            .zip(&self.poles)
            .zip(&self.multiplicity)
            .map(|((&r, &p), &o)| (r, p, o))
    }

    /// Evaluates the expansion back at `z`.
    pub fn eval(&self, z: Complex64) -> Complex64 {
        let w = z.inv();
        let poles: Complex64 = self
            .terms()
            .map(|(r, p, o)| r / (Complex::from(1.0) - p * w).powu(o as u32))
            .sum();
        poles + Polynomial::new(self.direct.clone()).eval_inverse(z)
    }
}

/// Partial-fraction expansion of `b(z^-1) / a(z^-1)`, with default tuning.
///
/// # Example
///
/// ```rust
/// use zbox_math::residue::residuez;
///
/// // z^-1 / (1 - 2 z^-1) = 0.5 / (1 - 2 z^-1) - 0.5
/// let pf = residuez(&[0.0, 1.0], &[1.0, -2.0]).unwrap();
/// assert_eq!(pf.direct, vec![-0.5]);
/// assert!((pf.poles[0].re - 2.0).abs() < 1e-12);
/// assert!((pf.residues[0].re - 0.5).abs() < 1e-12);
/// ```
pub fn residuez(b: &[f64], a: &[f64]) -> Result<PartialFractions, MathError> {
    residuez_with(b, a, &ResidueConfig::default())
}

/// Partial-fraction expansion of `b(z^-1) / a(z^-1)`.
///
/// Trailing zeros of both coefficient lists are ignored. When the numerator degree reaches the
/// denominator degree, polynomial division in `z^-1` produces the direct terms.
///
/// # Errors
///
/// [`MathError::EmptyInput`] when `a` only holds zeros, [`MathError::LeadingZero`] when `a[0]`
/// is zero, and [`MathError::Singular`] when the residue system cannot be solved.
pub fn residuez_with(b: &[f64], a: &[f64], config: &ResidueConfig) -> Result<PartialFractions, MathError> {
    let a = Polynomial::new(a.to_vec()).trim();
    let Some(&a0) = a.coefficients().first() else {
        return Err(MathError::EmptyInput { arg: "a" });
    };
    if a0.is_zero() {
        return Err(MathError::LeadingZero { arg: "a" });
    }
    let a = a.scale(a0.recip());
    let b = Polynomial::new(b.to_vec()).trim().scale(a0.recip());

    let (direct, remainder) = b.div_rem(&a)?;
    let direct = direct.into_coefficients();
    if a.len() == 1 {
        log::debug!("residuez: no poles, {} direct terms", direct.len());
        return Ok(PartialFractions {
            direct,
            ..Default::default()
        });
    }

    let raw = companion_roots(a.coefficients())?;
    let characteristic = descending_to_complex(a.coefficients());
    let mut groups = group_poles(&raw, config.pole_tolerance);
    for (p, m) in &mut groups {
        // Averaging already cancels most of the perturbation of a repeated root, where Newton
        // iterations converge poorly.
        if *m == 1 {
            *p = polish_root(&characteristic, *p, &config.root_polish);
        }
    }
    tidy_poles(&mut groups, config.pole_tolerance);

    let mismatch = denominator_mismatch(&groups, a.coefficients());
    if groups.len() < raw.len() && mismatch > config.denominator_tolerance {
        log::debug!("residuez: grouped poles are off by {mismatch:e} on the denominator, keeping them simple");
        groups = raw
            .iter()
            .map(|&p| (polish_root(&characteristic, p, &config.root_polish), 1))
            .collect();
        tidy_poles(&mut groups, f64::EPSILON.sqrt());
    }
    log::debug!(
        "residuez: {} poles ({} distinct), {} direct terms",
        raw.len(),
        groups.len(),
        direct.len()
    );

    let residues = solve_residues(&groups, &remainder)?;
    let (poles, multiplicity) = groups
        .iter()
        .flat_map(|&(p, m)| (1..=m).map(move |k| (p, k)))
        .unzip();
    Ok(PartialFractions {
        residues,
        poles,
        multiplicity,
        direct,
    })
}

/// `Π (1 - p_i w)^m_i`, the monic-at-zero denominator described by grouped poles.
fn rebuild_denominator(groups: &[(Complex64, usize)]) -> Polynomial<Complex64> {
    groups.iter().fold(Polynomial::one(), |acc, &(p, m)| {
        acc.mul(&Polynomial::new(vec![Complex::from(1.0), -p]).pow(m))
    })
}

/// Largest coefficient difference between the rebuilt and the actual monic-at-zero
/// denominator, relative to the largest actual coefficient.
fn denominator_mismatch(groups: &[(Complex64, usize)], a: &[f64]) -> f64 {
    let rebuilt = rebuild_denominator(groups);
    let scale = a.iter().fold(1.0f64, |acc, c| acc.max(c.abs()));
    let len = a.len().max(rebuilt.len());
    (0..len)
        .map(|i| {
            let actual = Complex::from(a.get(i).copied().unwrap_or(0.0));
            let grouped = rebuilt.coefficients().get(i).copied().unwrap_or_else(Complex64::zero);
            (grouped - actual).norm()
        })
        .fold(0.0, f64::max)
        / scale
}

/// Groups roots closer than `tolerance` (relative to their magnitude, at least 1) into repeated
/// poles, represented by their mean.
fn group_poles(raw: &[Complex64], tolerance: f64) -> Vec<(Complex64, usize)> {
    let mut groups: Vec<(Complex64, usize)> = vec![];
    for &p in raw {
        let scale = p.norm().max(1.0);
        match groups
            .iter_mut()
            .find(|(mean, _)| (*mean - p).norm() <= tolerance * scale)
        {
            Some((mean, count)) => {
                *mean = (*mean * *count as f64 + p) / (*count + 1) as f64;
                *count += 1;
            }
            None => groups.push((p, 1)),
        }
    }
    groups
}

/// Snaps near-real poles onto the real axis, makes conjugate pairs exact, and sorts by real
/// then imaginary part.
fn tidy_poles(groups: &mut [(Complex64, usize)], tolerance: f64) {
    for (p, _) in groups.iter_mut() {
        if p.im.abs() < 1e-12 * p.norm().max(1.0) {
            p.im = 0.0;
        }
    }
    for i in 0..groups.len() {
        let (p, m) = groups[i];
        if p.im <= 0.0 {
            continue;
        }
        let scale = p.norm().max(1.0);
        if let Some(partner) = groups
            .iter_mut()
            .find(|(q, n)| q.im < 0.0 && *n == m && (*q - p.conj()).norm() <= tolerance * scale)
        {
            partner.0 = p.conj();
        }
    }
    groups.sort_by(|(p, _), (q, _)| p.re.total_cmp(&q.re).then(p.im.total_cmp(&q.im)));
}

/// Solves `Σ_{i,k} r_{i,k} · Ã(w) / (1 - p_i w)^k = R(w)` for the residues, where `Ã` is the
/// monic-at-zero denominator rebuilt from the grouped poles.
fn solve_residues(groups: &[(Complex64, usize)], remainder: &Polynomial<f64>) -> Result<Vec<Complex64>, MathError> {
    let factor = |p: Complex64| Polynomial::new(vec![Complex::from(1.0), -p]);
    let order: usize = groups.iter().map(|(_, m)| m).sum();

    let basis = groups
        .iter()
        .enumerate()
        .flat_map(|(i, &(p, m))| {
            let others = groups
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .fold(Polynomial::one(), |acc, (_, &(q, n))| acc.mul(&factor(q).pow(n)));
            (1..=m).map(move |k| others.mul(&factor(p).pow(m - k)))
        })
        .collect::<Vec<_>>();

    let matrix = DMatrix::from_fn(order, order, |row, col| {
        basis[col].coefficients().get(row).copied().unwrap_or_else(Complex64::zero)
    });
    let rhs = DVector::from_fn(order, |row, _| {
        Complex::from(remainder.coefficients().get(row).copied().unwrap_or(0.0))
    });
    let solution = matrix.lu().solve(&rhs).ok_or(MathError::Singular)?;
    Ok(solution.iter().copied().collect())
}
