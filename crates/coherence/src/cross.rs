//! Segment-averaged cross-spectra.

use std::f64::consts::PI;

use ccew_spectral::{SegmentReport, WavenumberFrequencyAxes};
use ndarray::{Array2, ArrayView2, Zip};
use num_complex::Complex;

use crate::error::CoherenceError;

/// Tolerance above one before a squared coherence counts as unstable.
pub(crate) const COHERENCE_TOL: f64 = 1e-9;

/// Map an angle from `atan2` into `(-pi, pi]`.
pub(crate) fn wrap_phase(phase: f64) -> f64 {
    if phase <= -PI { phase + 2.0 * PI } else { phase }
}

/// Squared coherence from cross and auto power, clamped to `[0, 1]`.
pub(crate) fn coherence_squared(pxy: Complex<f64>, pxx: f64, pyy: f64) -> Result<f64, CoherenceError> {
    let denom = pxx * pyy;
    if denom <= 0.0 {
        return Ok(0.0);
    }
    let coh2 = pxy.norm_sqr() / denom;
    if !coh2.is_finite() || coh2 > 1.0 + COHERENCE_TOL {
        return Err(CoherenceError::NumericalInstability(format!(
            "squared coherence {coh2} exceeds one"
        )));
    }
    Ok(coh2.min(1.0))
}

/// Cross and auto spectra of a reference and target series, indexed
/// `(wavenumber, frequency)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossSpectrum {
    pub(crate) pxy: Array2<Complex<f64>>,
    pub(crate) pxx: Array2<f64>,
    pub(crate) pyy: Array2<f64>,
    pub(crate) axes: WavenumberFrequencyAxes,
    pub(crate) report: SegmentReport,
}

impl CrossSpectrum {
    /// Cross power `<X conj(Y)>`.
    pub fn cross(&self) -> ArrayView2<'_, Complex<f64>> {
        self.pxy.view()
    }

    /// Reference auto power.
    pub fn reference_power(&self) -> ArrayView2<'_, f64> {
        self.pxx.view()
    }

    /// Target auto power.
    pub fn target_power(&self) -> ArrayView2<'_, f64> {
        self.pyy.view()
    }

    /// Spectral axes.
    pub fn axes(&self) -> &WavenumberFrequencyAxes {
        &self.axes
    }

    /// Segmenting report shared by both series.
    pub fn report(&self) -> &SegmentReport {
        &self.report
    }

    /// Squared coherence per bin; zero where either power vanishes.
    ///
    /// # Errors
    ///
    /// Returns [`CoherenceError::NumericalInstability`] if any bin exceeds
    /// one by more than rounding.
    pub fn coherence_squared(&self) -> Result<Array2<f64>, CoherenceError> {
        let mut out = Array2::zeros(self.pxx.raw_dim());
        let mut failure = None;
        Zip::from(&mut out)
            .and(&self.pxy)
            .and(&self.pxx)
            .and(&self.pyy)
            .for_each(|o, &xy, &xx, &yy| match coherence_squared(xy, xx, yy) {
                Ok(v) => *o = v,
                Err(e) => failure = Some(e),
            });
        match failure {
            Some(e) => Err(e),
            None => Ok(out),
        }
    }

    /// Phase of the cross spectrum per bin in `(-pi, pi]`.
    pub fn phase(&self) -> Array2<f64> {
        self.pxy.mapv(|c| wrap_phase(c.arg()))
    }
}
