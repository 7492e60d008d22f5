use num_complex::Complex64;
use zbox_math::{db_to_linear, linear_to_db};

/// Transfer function sampled along the unit circle, `H(e^{jω})`.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyResponse {
    /// Angular frequencies, in radians per sample
    pub omega: Vec<f64>,
    /// Complex gain at each frequency
    pub h: Vec<Complex64>,
}

impl FrequencyResponse {
    /// Number of frequency points.
    pub fn len(&self) -> usize {
        self.omega.len()
    }

    /// Whether no frequency was sampled.
    pub fn is_empty(&self) -> bool {
        self.omega.is_empty()
    }

    /// Magnitude `|H(e^{jω})|` at each frequency.
    pub fn magnitude(&self) -> Vec<f64> {
        self.h.iter().map(|h| h.norm()).collect()
    }

    /// Magnitude in decibels.
    pub fn magnitude_db(&self) -> Vec<f64> {
        self.h.iter().map(|h| linear_to_db(h.norm())).collect()
    }

    /// Frequencies whose magnitude lies within `drop_db` decibels of the peak magnitude.
    ///
    /// `band_within(3.0)` gives the usual -3 dB band. Empty when nothing was sampled.
    pub fn band_within(&self, drop_db: f64) -> Vec<f64> {
        let magnitude = self.magnitude();
        let peak = magnitude.iter().copied().fold(0.0, f64::max);
        let floor = peak * db_to_linear(-drop_db.abs());
        self.omega
            .iter()
            .zip(&magnitude)
            .filter(|&(_, &m)| m >= floor)
            .map(|(&w, _)| w)
            .collect()
    }

    /// Phase in radians, in `(-π, π]`.
    pub fn phase(&self) -> Vec<f64> {
        self.h.iter().map(|h| h.arg()).collect()
    }
}
