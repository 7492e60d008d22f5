use thiserror::Error;

/// Errors raised by the dense numeric routines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MathError {
    /// A required coefficient or sample slice is empty.
    #[error("Input `{arg}` was empty")]
    EmptyInput {
        /// Name of the argument that is empty.
        arg: &'static str,
    },
    /// The leading coefficient of a polynomial or filter denominator is zero.
    #[error("Leading coefficient of `{arg}` must be non-zero")]
    LeadingZero {
        /// Name of the offending argument.
        arg: &'static str,
    },
    /// The linear system giving the residues has no unique solution.
    #[error("Could not solve for residues: the pole system is singular")]
    Singular,
}
