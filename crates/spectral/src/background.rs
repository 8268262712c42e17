//! Smoothed background spectrum and normalized (signal-to-background) spectra.

use ndarray::{Array2, ArrayView2, Axis, Zip};
use statrs::distribution::{ChiSquared, ContinuousCDF};
use tracing::debug;

use crate::error::SpectralError;
use crate::spectrum::{WavenumberFrequencyAxes, WavenumberFrequencySpectrum};

/// Configuration for the 1-2-1 background smoother.
///
/// The default applies 10 passes along frequency, then a frequency-dependent
/// number of passes along wavenumber: 5 below 0.1 cpd, 10 below 0.2, 20
/// below 0.3 and 40 above.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundConfig {
    frequency_passes: usize,
    wavenumber_schedule: Vec<(f64, usize)>,
    high_frequency_passes: usize,
    floor_fraction: f64,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            frequency_passes: 10,
            wavenumber_schedule: vec![(0.1, 5), (0.2, 10), (0.3, 20)],
            high_frequency_passes: 40,
            floor_fraction: 1e-6,
        }
    }
}

impl BackgroundConfig {
    /// Sets the number of passes along frequency.
    pub fn with_frequency_passes(mut self, passes: usize) -> Self {
        self.frequency_passes = passes;
        self
    }

    /// Sets the wavenumber pass schedule as `(upper frequency in cpd,
    /// passes)` steps plus the pass count above the last step.
    pub fn with_wavenumber_schedule(mut self, schedule: Vec<(f64, usize)>, above: usize) -> Self {
        self.wavenumber_schedule = schedule;
        self.high_frequency_passes = above;
        self
    }

    /// Sets the positivity floor as a fraction of the mean input power.
    pub fn with_floor_fraction(mut self, fraction: f64) -> Self {
        self.floor_fraction = fraction;
        self
    }

    /// Passes along frequency.
    pub fn frequency_passes(&self) -> usize {
        self.frequency_passes
    }

    /// Positivity floor fraction.
    pub fn floor_fraction(&self) -> f64 {
        self.floor_fraction
    }

    /// Wavenumber passes applied at frequency `freq` (cpd).
    pub fn wavenumber_passes(&self, freq: f64) -> usize {
        self.wavenumber_schedule
            .iter()
            .find(|(upper, _)| freq < *upper)
            .map_or(self.high_frequency_passes, |(_, n)| *n)
    }

    /// Validates this configuration.
    ///
    /// Schedule bounds must be finite, positive and strictly increasing, and
    /// the floor fraction finite and positive.
    pub fn validate(&self) -> Result<(), SpectralError> {
        let bounds_ok = self
            .wavenumber_schedule
            .iter()
            .all(|(upper, _)| upper.is_finite() && *upper > 0.0)
            && self.wavenumber_schedule.windows(2).all(|w| w[0].0 < w[1].0);
        if !bounds_ok {
            return Err(SpectralError::InvalidParameter {
                name: "wavenumber_schedule",
                reason: "frequency bounds must be positive and increasing".into(),
            });
        }
        if !self.floor_fraction.is_finite() || self.floor_fraction <= 0.0 {
            return Err(SpectralError::InvalidParameter {
                name: "floor_fraction",
                reason: format!("{} must be positive", self.floor_fraction),
            });
        }
        Ok(())
    }
}

/// A smoothed, strictly positive background spectrum.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundSpectrum {
    power: Array2<f64>,
    axes: WavenumberFrequencyAxes,
    floor: f64,
    segments_used: usize,
}

impl BackgroundSpectrum {
    /// Background power indexed `(wavenumber, frequency)`.
    pub fn power(&self) -> ArrayView2<'_, f64> {
        self.power.view()
    }

    /// Spectral axes.
    pub fn axes(&self) -> &WavenumberFrequencyAxes {
        &self.axes
    }

    /// Positivity floor added to every bin.
    pub fn floor(&self) -> f64 {
        self.floor
    }

    /// Segments behind the source spectrum.
    pub fn segments_used(&self) -> usize {
        self.segments_used
    }
}

/// Estimates the red-noise background of a spectrum by repeated 1-2-1
/// smoothing.
#[derive(Debug, Clone, Default)]
pub struct BackgroundEstimator {
    config: BackgroundConfig,
}

impl BackgroundEstimator {
    /// Create an estimator.
    ///
    /// # Errors
    ///
    /// Returns the configuration's validation error.
    pub fn new(config: BackgroundConfig) -> Result<Self, SpectralError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration in use.
    pub fn config(&self) -> &BackgroundConfig {
        &self.config
    }

    /// Smooth `source` into a background.
    ///
    /// # Errors
    ///
    /// Returns [`SpectralError::NumericalInstability`] for negative,
    /// non-finite or all-zero input, or if any smoothed bin is not finite
    /// and positive.
    #[tracing::instrument(skip_all, fields(shape = ?source.power().dim()))]
    pub fn estimate(&self, source: &WavenumberFrequencySpectrum) -> Result<BackgroundSpectrum, SpectralError> {
        let raw = source.power();
        if let Some(bad) = raw.iter().find(|v| !v.is_finite() || **v < 0.0) {
            return Err(SpectralError::NumericalInstability(format!(
                "background input contains {bad}"
            )));
        }
        let max_raw = raw.fold(0.0_f64, |m, &v| m.max(v));
        if max_raw == 0.0 {
            return Err(SpectralError::NumericalInstability("background input is all zero".into()));
        }

        let mut power = raw.to_owned();
        for mut row in power.lanes_mut(Axis(1)) {
            let mut buf = row.to_vec();
            smooth_121(&mut buf, self.config.frequency_passes);
            for (dst, v) in row.iter_mut().zip(&buf) {
                *dst = *v;
            }
        }

        let frequencies = source.axes().frequencies();
        for (f, mut col) in power.lanes_mut(Axis(0)).into_iter().enumerate() {
            let mut buf = col.to_vec();
            smooth_121(&mut buf, self.config.wavenumber_passes(frequencies[f]));
            for (dst, v) in col.iter_mut().zip(&buf) {
                *dst = *v;
            }
        }

        let floor = self.config.floor_fraction * raw.mean().unwrap_or(0.0);
        power.mapv_inplace(|v| v + floor);

        if let Some(bad) = power.iter().find(|v| !v.is_finite() || **v <= 0.0) {
            return Err(SpectralError::NumericalInstability(format!(
                "background bin {bad} is not positive"
            )));
        }
        debug!(floor, max_raw, "estimated background");

        Ok(BackgroundSpectrum {
            power,
            axes: source.axes().clone(),
            floor,
            segments_used: source.report().used(),
        })
    }
}

/// Apply `passes` 1-2-1 passes with mirrored endpoints in place.
///
/// Each pass preserves the sum and never raises the maximum.
pub(crate) fn smooth_121(data: &mut [f64], passes: usize) {
    let n = data.len();
    if n < 2 {
        return;
    }
    let mut prev = vec![0.0; n];
    for _ in 0..passes {
        prev.copy_from_slice(data);
        data[0] = (3.0 * prev[0] + prev[1]) / 4.0;
        data[n - 1] = (prev[n - 2] + 3.0 * prev[n - 1]) / 4.0;
        for i in 1..n - 1 {
            data[i] = (prev[i - 1] + 2.0 * prev[i] + prev[i + 1]) / 4.0;
        }
    }
}

/// Threshold a normalized bin must exceed to count as significant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Significance {
    /// Fixed ratio.
    Fixed(f64),
    /// Chi-squared quantile at `confidence` with two degrees of freedom per
    /// segment, divided by the degrees of freedom.
    ChiSquared {
        /// Confidence level in (0, 1).
        confidence: f64,
    },
}

impl Default for Significance {
    fn default() -> Self {
        Significance::Fixed(1.1)
    }
}

impl Significance {
    /// Ratio threshold for a spectrum estimated from `segments` segments.
    ///
    /// # Errors
    ///
    /// Returns [`SpectralError::InvalidParameter`] for a confidence outside
    /// (0, 1), a non-positive fixed ratio or zero segments.
    pub fn threshold(&self, segments: usize) -> Result<f64, SpectralError> {
        match *self {
            Significance::Fixed(t) if t.is_finite() && t > 0.0 => Ok(t),
            Significance::Fixed(t) => Err(SpectralError::InvalidParameter {
                name: "significance",
                reason: format!("ratio {t} must be positive"),
            }),
            Significance::ChiSquared { confidence } => {
                if !(confidence > 0.0 && confidence < 1.0) || segments == 0 {
                    return Err(SpectralError::InvalidParameter {
                        name: "significance",
                        reason: format!("confidence {confidence} with {segments} segment(s)"),
                    });
                }
                let dof = 2.0 * segments as f64;
                let dist = ChiSquared::new(dof).map_err(|e| SpectralError::InvalidParameter {
                    name: "significance",
                    reason: e.to_string(),
                })?;
                Ok(dist.inverse_cdf(confidence) / dof)
            }
        }
    }
}

/// Ratio of a spectrum to its background.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSpectrum {
    ratio: Array2<f64>,
    axes: WavenumberFrequencyAxes,
    threshold: f64,
}

impl NormalizedSpectrum {
    /// Ratio indexed `(wavenumber, frequency)`.
    pub fn ratio(&self) -> ArrayView2<'_, f64> {
        self.ratio.view()
    }

    /// Spectral axes.
    pub fn axes(&self) -> &WavenumberFrequencyAxes {
        &self.axes
    }

    /// Significance threshold applied.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// `(wavenumber, frequency)` of bins whose ratio exceeds the threshold.
    pub fn significant_bins(&self) -> Vec<(i32, f64)> {
        self.ratio
            .indexed_iter()
            .filter(|(_, r)| **r > self.threshold)
            .map(|((w, f), _)| (self.axes.wavenumbers()[w], self.axes.frequencies()[f]))
            .collect()
    }
}

/// Divide `spectrum` by `background` bin for bin.
///
/// # Errors
///
/// Returns [`SpectralError::DimensionMismatch`] when the axes differ and
/// the threshold errors of [`Significance::threshold`].
pub fn normalize(
    spectrum: &WavenumberFrequencySpectrum,
    background: &BackgroundSpectrum,
    significance: Significance,
) -> Result<NormalizedSpectrum, SpectralError> {
    if spectrum.axes() != background.axes() {
        return Err(SpectralError::DimensionMismatch(
            "spectrum and background axes differ".into(),
        ));
    }
    let threshold = significance.threshold(background.segments_used())?;
    let mut ratio = Array2::zeros(background.power.raw_dim());
    Zip::from(&mut ratio)
        .and(spectrum.power())
        .and(&background.power)
        .for_each(|r, &p, &b| *r = p / b);
    Ok(NormalizedSpectrum {
        ratio,
        axes: background.axes.clone(),
        threshold,
    })
}
