//! Band-aggregated coherence and vertical coherence profiles.

use ccew_grid::{GridField, LatBand, TimeLonSeries};
use ccew_spectral::{Fft2, SegmentReport, SpectralConfig, WavenumberFrequencyAxes, prepare_segments};
use ccew_wave::WaveBand;
use ndarray::Array2;
use num_complex::Complex;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::cross::{CrossSpectrum, coherence_squared, wrap_phase};
use crate::error::CoherenceError;

/// Coherence between two series aggregated over a wave band.
#[derive(Debug, Clone, PartialEq)]
pub struct CoherenceEstimate {
    /// Squared coherence in `[0, 1]`.
    pub coherence_squared: f64,
    /// Phase of the aggregated cross spectrum in `(-pi, pi]`.
    pub phase: f64,
    /// Number of `(wavenumber, frequency)` bins aggregated.
    pub n_bins: usize,
    /// Segmenting report.
    pub report: SegmentReport,
}

/// Coherence at one level of a profile.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelCoherence {
    /// Level index into the field.
    pub level_index: usize,
    /// Level value, when the field has a vertical axis.
    pub level: Option<f64>,
    /// Band-aggregated estimate.
    pub estimate: CoherenceEstimate,
}

/// Coherence of a reference signal with a field at each requested level.
#[derive(Debug, Clone, PartialEq)]
pub struct CoherenceProfile {
    levels: Vec<LevelCoherence>,
}

impl CoherenceProfile {
    /// Per-level results in request order.
    pub fn levels(&self) -> &[LevelCoherence] {
        &self.levels
    }

    /// Squared coherence per level.
    pub fn coherence_squared(&self) -> Vec<f64> {
        self.levels.iter().map(|l| l.estimate.coherence_squared).collect()
    }

    /// Phase per level.
    pub fn phase(&self) -> Vec<f64> {
        self.levels.iter().map(|l| l.estimate.phase).collect()
    }
}

/// Computes cross-spectral coherence and phase with the spectral
/// transformer's segmenting and missing-data policy.
#[derive(Debug, Clone)]
pub struct CoherenceAnalyzer {
    config: SpectralConfig,
}

impl CoherenceAnalyzer {
    /// Create an analyzer.
    ///
    /// # Errors
    ///
    /// Returns the configuration's validation error.
    pub fn new(config: SpectralConfig) -> Result<Self, CoherenceError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Segment-averaged cross spectrum of `reference` and `target`.
    ///
    /// A segment dropped for missing data in either series is dropped for
    /// both.
    ///
    /// # Errors
    ///
    /// Returns [`CoherenceError::DimensionMismatch`] for series of different
    /// shape or sampling, and wrapped segmenting errors.
    pub fn cross_spectrum(
        &self,
        reference: &TimeLonSeries,
        target: &TimeLonSeries,
    ) -> Result<CrossSpectrum, CoherenceError> {
        if reference.values().dim() != target.values().dim() {
            return Err(CoherenceError::DimensionMismatch(format!(
                "reference {:?} vs target {:?}",
                reference.values().dim(),
                target.values().dim()
            )));
        }
        if (reference.samples_per_day() - target.samples_per_day()).abs() > 1e-9 {
            return Err(CoherenceError::DimensionMismatch(format!(
                "sampling {} vs {} per day",
                reference.samples_per_day(),
                target.samples_per_day()
            )));
        }

        let (segments, report) = prepare_segments(&self.config, &[reference.values(), target.values()])?;
        let length = self.config.segment_length();
        let n_lon = reference.n_lon();
        let axes = WavenumberFrequencyAxes::new(n_lon, length, reference.samples_per_day());
        let fft = Fft2::forward(length, n_lon);
        let shape = (axes.n_wavenumbers(), axes.n_frequencies());

        let mut pxy = Array2::<Complex<f64>>::zeros(shape);
        let mut pxx = Array2::<f64>::zeros(shape);
        let mut pyy = Array2::<f64>::zeros(shape);
        for seg in &segments {
            let x = fft.transform_real(seg.rows[0].view())?;
            let y = fft.transform_real(seg.rows[1].view())?;
            let xy = ndarray::Zip::from(&x).and(&y).map_collect(|a, b| a * b.conj());
            axes.fold_into(&xy, &mut pxy, |c| c);
            axes.fold_into(&x, &mut pxx, |c| c.norm_sqr());
            axes.fold_into(&y, &mut pyy, |c| c.norm_sqr());
        }
        let n = segments.len() as f64;
        pxy.mapv_inplace(|c| c / n);
        pxx.mapv_inplace(|v| v / n);
        pyy.mapv_inplace(|v| v / n);

        Ok(CrossSpectrum {
            pxy,
            pxx,
            pyy,
            axes,
            report,
        })
    }

    /// Coherence aggregated over the bins inside `band`.
    ///
    /// # Errors
    ///
    /// Returns [`CoherenceError::EmptyBand`] when no bin lies in the band,
    /// [`CoherenceError::ZeroPower`] when either series has no power there,
    /// and [`CoherenceError::NumericalInstability`] for a squared coherence
    /// above one.
    #[tracing::instrument(skip_all, fields(k = ?(band.k_min(), band.k_max())))]
    pub fn band_coherence(
        &self,
        reference: &TimeLonSeries,
        target: &TimeLonSeries,
        band: &WaveBand,
    ) -> Result<CoherenceEstimate, CoherenceError> {
        let cross = self.cross_spectrum(reference, target)?;
        let wavenumbers = cross.axes.wavenumbers();
        let frequencies = cross.axes.frequencies();

        let mut sxy = Complex::new(0.0, 0.0);
        let (mut sxx, mut syy) = (0.0, 0.0);
        let mut n_bins = 0;
        for ((w, f), xy) in cross.pxy.indexed_iter() {
            if band.contains(wavenumbers[w], frequencies[f]) {
                sxy += *xy;
                sxx += cross.pxx[[w, f]];
                syy += cross.pyy[[w, f]];
                n_bins += 1;
            }
        }
        if n_bins == 0 {
            return Err(CoherenceError::EmptyBand);
        }
        if sxx <= 0.0 {
            return Err(CoherenceError::ZeroPower { which: "reference" });
        }
        if syy <= 0.0 {
            return Err(CoherenceError::ZeroPower { which: "target" });
        }

        let coh2 = coherence_squared(sxy, sxx, syy)?;
        let phase = wrap_phase(sxy.arg());
        debug!(n_bins, coherence_squared = coh2, phase, "band coherence");
        Ok(CoherenceEstimate {
            coherence_squared: coh2,
            phase,
            n_bins,
            report: cross.report,
        })
    }

    /// Coherence of `reference` with the `lat_band` average of `target` at
    /// each level index, computed in parallel.
    ///
    /// # Errors
    ///
    /// Returns the first per-level error.
    #[tracing::instrument(skip_all, fields(field = target.name(), n_levels = levels.len()))]
    pub fn profile(
        &self,
        reference: &TimeLonSeries,
        target: &GridField,
        lat_band: &LatBand,
        band: &WaveBand,
        levels: &[usize],
    ) -> Result<CoherenceProfile, CoherenceError> {
        let levels = levels
            .par_iter()
            .map(|&k| -> Result<LevelCoherence, CoherenceError> {
                let series = target.band_average(lat_band, k)?;
                let estimate = self.band_coherence(reference, &series, band)?;
                Ok(LevelCoherence {
                    level_index: k,
                    level: target.levels().map(|l| l[k]),
                    estimate,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        info!(levels = levels.len(), "coherence profile complete");
        Ok(CoherenceProfile { levels })
    }
}
