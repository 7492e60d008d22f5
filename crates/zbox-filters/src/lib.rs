#![warn(missing_docs)]
//! Rational transfer functions for discrete-time LTI systems.
//!
//! A [`RationalFilter`] holds the coefficients of
//!
//! ```text
//!        b0 + b1 z^-1 + ... + bn z^-n
//! H(z) = ----------------------------
//!        a0 + a1 z^-1 + ... + am z^-m
//! ```
//!
//! and can evaluate it, run it over a [`SparseSignal`](zbox_signal::SparseSignal), sample its
//! frequency response along the unit circle, and invert its z-transform into a closed-form
//! [`ImpulseResponse`].
//!
//! # Example
//!
//! ```rust
//! use zbox_filters::RationalFilter;
//! use zbox_signal::SparseSignal;
//!
//! // Running sum
//! let accumulator = RationalFilter::new([1.0], [1.0, -1.0]).unwrap();
//! let y = accumulator.filter(&SparseSignal::from_dense(0, [1.0, 1.0, 1.0])).unwrap();
//! assert_eq!(y, SparseSignal::from_dense(0, [1.0, 2.0, 3.0]));
//! ```
use thiserror::Error;
use zbox_math::MathError;

mod impulse;
mod rational;
mod response;

pub use impulse::{ImpulseResponse, RealCoercion, Symbol, Term};
pub use rational::RationalFilter;
pub use response::FrequencyResponse;

/// Number of frequency points sampled by [`RationalFilter::freqz`] when the caller has no
/// preference.
pub const DEFAULT_FREQZ_POINTS: usize = 50;

/// Errors raised by [`RationalFilter`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    /// An argument does not have the expected shape.
    #[error("Invalid shape for `{arg}`: {reason}")]
    Shape {
        /// Name of the offending argument.
        arg: &'static str,
        /// What is wrong with it.
        reason: String,
    },
    /// The leading denominator coefficient `a[0]` is zero, so the difference equation cannot
    /// be solved for the current output.
    #[error("Leading denominator coefficient is zero")]
    DegenerateCoefficient,
    /// Numeric failure in one of the dense routines.
    #[error(transparent)]
    Math(#[from] MathError),
}

impl FilterError {
    pub(crate) fn shape(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::Shape {
            arg,
            reason: reason.into(),
        }
    }
}
