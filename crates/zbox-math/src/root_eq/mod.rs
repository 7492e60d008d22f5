//! Iterative root finding, used to polish polynomial roots obtained from eigenvalues.
pub mod nr;

/// An equation which can be evaluated together with its derivative.
pub trait Differentiable {
    /// Scalar type of the equation, real or complex
    type Scalar: Clone;

    /// Evaluates the function at a point
    fn eval(&self, x: Self::Scalar) -> Self::Scalar;

    /// Evaluates the derivative of the function at a point
    fn derivative(&self, x: Self::Scalar) -> Self::Scalar;

    /// Evaluates both the function and its derivative at a point. Override when both can share
    /// work, as with Horner's scheme.
    fn eval_with_derivative(&self, x: Self::Scalar) -> (Self::Scalar, Self::Scalar) {
        (self.eval(x.clone()), self.derivative(x))
    }
}
