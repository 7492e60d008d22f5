use crate::root_eq::Differentiable;
use num_complex::ComplexFloat;
use num_traits::Zero;

/// Newton-Raphson solver, over real or complex scalars.
///
/// `tolerance` is compared against the magnitude of the last step, so it is always real.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonRaphson<R> {
    pub max_iterations: usize,
    pub tolerance: R,
}

impl<R> NewtonRaphson<R> {
    pub const fn new(max_iterations: usize, tolerance: R) -> Self {
        Self {
            max_iterations,
            tolerance,
        }
    }
}

impl Default for NewtonRaphson<f64> {
    fn default() -> Self {
        Self::new(50, 1e-14)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SolveResult<T> {
    pub value: T,
    pub delta: T,
    pub iterations: usize,
}

impl<T> SolveResult<T> {
    /// Whether the solver stopped before exhausting its iteration budget.
    pub fn converged(&self, max_iterations: usize) -> bool {
        self.iterations < max_iterations
    }
}

impl<R: PartialOrd + Copy> NewtonRaphson<R> {
    /// Solves the equation using the Newton-Raphson method.
    ///
    /// Iteration stops early on an exact root, and bails out (reporting `max_iterations`) when
    /// the step stops being finite, e.g. on a vanishing derivative at a repeated root. In that
    /// case the last finite estimate is returned.
    pub fn solve<T, F>(&self, function: &F, initial_guess: T) -> SolveResult<T>
    where
        T: ComplexFloat<Real = R>,
        F: Differentiable<Scalar = T>,
    {
        let mut x = initial_guess;

        for i in 0..self.max_iterations {
            let (fx, dfx) = function.eval_with_derivative(x);
            if fx.is_zero() {
                return SolveResult {
                    value: x,
                    delta: T::zero(),
                    iterations: i,
                };
            }

            let delta = fx / dfx;
            if !delta.is_finite() {
                return SolveResult {
                    value: x,
                    delta,
                    iterations: self.max_iterations,
                };
            }

            x = x - delta;

            if delta.abs() < self.tolerance {
                return SolveResult {
                    value: x,
                    delta,
                    iterations: i,
                };
            }
        }

        SolveResult {
            value: x,
            delta: T::zero(),
            iterations: self.max_iterations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    // f(x) = x² - 4 (roots at x = ±2)
    struct Quadratic;
    impl Differentiable for Quadratic {
        type Scalar = f64;

        fn eval(&self, x: f64) -> f64 {
            x * x - 4.0
        }

        fn derivative(&self, x: f64) -> f64 {
            2.0 * x
        }
    }

    // f(x) = x³ - 2x² - 11x + 12 (roots at x = -3, 1, 4)
    struct Cubic;
    impl Differentiable for Cubic {
        type Scalar = f64;

        fn eval(&self, x: f64) -> f64 {
            x.powi(3) - 2.0 * x.powi(2) - 11.0 * x + 12.0
        }

        fn derivative(&self, x: f64) -> f64 {
            3.0 * x.powi(2) - 4.0 * x - 11.0
        }
    }

    // f(z) = z² + 1 (roots at z = ±j)
    struct UnitCircle;
    impl Differentiable for UnitCircle {
        type Scalar = Complex64;

        fn eval(&self, z: Complex64) -> Complex64 {
            z * z + 1.0
        }

        fn derivative(&self, z: Complex64) -> Complex64 {
            2.0 * z
        }
    }

    // f(x) = x² has a double root, the derivative vanishes there
    struct DoubleRoot;
    impl Differentiable for DoubleRoot {
        type Scalar = f64;

        fn eval(&self, x: f64) -> f64 {
            x * x
        }

        fn derivative(&self, x: f64) -> f64 {
            2.0 * x
        }
    }

    #[test]
    fn test_newton_raphson_quadratic() {
        let nr = NewtonRaphson::new(100, 1e-10);

        let result = nr.solve(&Quadratic, 3.0);
        assert!(result.converged(nr.max_iterations));
        assert!((result.value - 2.0).abs() < nr.tolerance);

        let result = nr.solve(&Quadratic, -3.0);
        assert!(result.converged(nr.max_iterations));
        assert!((result.value + 2.0).abs() < nr.tolerance);
    }

    #[test]
    fn test_newton_raphson_cubic() {
        let nr = NewtonRaphson::new(100, 1e-10);

        let result = nr.solve(&Cubic, -4.0);
        assert!(result.converged(nr.max_iterations));
        assert!((result.value + 3.0).abs() < nr.tolerance);

        let result = nr.solve(&Cubic, 0.5);
        assert!(result.converged(nr.max_iterations));
        assert!((result.value - 1.0).abs() < nr.tolerance);

        let result = nr.solve(&Cubic, 3.0);
        assert!(result.converged(nr.max_iterations));
        assert!((result.value - 4.0).abs() < nr.tolerance);
    }

    #[test]
    fn test_newton_raphson_complex() {
        let nr = NewtonRaphson::new(100, 1e-12);

        let result = nr.solve(&UnitCircle, Complex64::new(0.1, 0.9));
        assert!(result.converged(nr.max_iterations));
        assert!((result.value - Complex64::i()).norm() < 1e-10);

        let result = nr.solve(&UnitCircle, Complex64::new(0.1, -1.3));
        assert!(result.converged(nr.max_iterations));
        assert!((result.value + Complex64::i()).norm() < 1e-10);
    }

    #[test]
    fn test_newton_raphson_exact_root_stops_immediately() {
        let nr = NewtonRaphson::new(100, 1e-10);
        let result = nr.solve(&Quadratic, 2.0);
        assert_eq!(result.iterations, 0);
        assert_eq!(result.value, 2.0);
    }

    #[test]
    fn test_newton_raphson_vanishing_derivative_keeps_estimate() {
        let nr = NewtonRaphson::new(100, 1e-10);
        // Converges linearly toward 0 without ever producing a non-finite step.
        let result = nr.solve(&DoubleRoot, 1.0);
        assert!(result.value.abs() < 1e-6);
        assert!(result.value.is_finite());
    }

    #[test]
    fn test_newton_raphson_iterations_limit() {
        let nr = NewtonRaphson::new(2, 1e-10);
        let result = nr.solve(&Cubic, 5.0);
        assert_eq!(result.iterations, nr.max_iterations);

        let nr = NewtonRaphson::new(100, 1e-10);
        let result = nr.solve(&Cubic, 5.0);
        assert!(result.converged(nr.max_iterations));
        assert!((result.value - 4.0).abs() < nr.tolerance);
    }
}
