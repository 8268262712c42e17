//! Configuration for the spectral transformer.

use crate::error::SpectralError;

/// Trend removed from every longitude column of a segment before the FFT.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Detrend {
    /// Subtract the segment mean.
    Mean,
    /// Subtract the least-squares line.
    #[default]
    Linear,
}

/// How missing cells of a segment under the missing-data threshold are filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GapFill {
    /// Linear interpolation in time; leading/trailing gaps take the nearest
    /// present value.
    #[default]
    Linear,
    /// The mean of the present samples in the same longitude column.
    Mean,
}

/// Configuration for segmenting and preprocessing time-longitude records.
///
/// # Example
///
/// ```
/// use ccew_spectral::{Detrend, SpectralConfig};
///
/// let config = SpectralConfig::new(96, 60)
///     .with_detrend(Detrend::Mean)
///     .with_taper_fraction(0.2);
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralConfig {
    segment_length: usize,
    segment_overlap: usize,
    detrend: Detrend,
    taper_fraction: f64,
    max_missing_fraction: f64,
    gap_fill: GapFill,
}

impl SpectralConfig {
    /// Creates a configuration with the given segment length and overlap,
    /// both in samples.
    ///
    /// Defaults: linear detrend, 10% split-cosine-bell taper, no missing
    /// data tolerated, linear gap fill.
    pub fn new(segment_length: usize, segment_overlap: usize) -> Self {
        Self {
            segment_length,
            segment_overlap,
            detrend: Detrend::Linear,
            taper_fraction: 0.1,
            max_missing_fraction: 0.0,
            gap_fill: GapFill::Linear,
        }
    }

    /// Sets the detrending applied per longitude.
    pub fn with_detrend(mut self, detrend: Detrend) -> Self {
        self.detrend = detrend;
        self
    }

    /// Sets the fraction of each segment end tapered by a cosine bell.
    /// Zero disables tapering.
    pub fn with_taper_fraction(mut self, fraction: f64) -> Self {
        self.taper_fraction = fraction;
        self
    }

    /// Sets the largest missing fraction a segment may have and still be
    /// gap-filled instead of dropped.
    pub fn with_max_missing_fraction(mut self, fraction: f64) -> Self {
        self.max_missing_fraction = fraction;
        self
    }

    /// Sets the gap-fill method.
    pub fn with_gap_fill(mut self, gap_fill: GapFill) -> Self {
        self.gap_fill = gap_fill;
        self
    }

    /// Segment length in samples.
    pub fn segment_length(&self) -> usize {
        self.segment_length
    }

    /// Overlap between consecutive segments in samples.
    pub fn segment_overlap(&self) -> usize {
        self.segment_overlap
    }

    /// Distance between consecutive segment starts.
    pub fn hop(&self) -> usize {
        self.segment_length.saturating_sub(self.segment_overlap)
    }

    /// Detrending method.
    pub fn detrend(&self) -> Detrend {
        self.detrend
    }

    /// Taper fraction.
    pub fn taper_fraction(&self) -> f64 {
        self.taper_fraction
    }

    /// Missing-data threshold.
    pub fn max_missing_fraction(&self) -> f64 {
        self.max_missing_fraction
    }

    /// Gap-fill method.
    pub fn gap_fill(&self) -> GapFill {
        self.gap_fill
    }

    /// Validates this configuration.
    ///
    /// Segments need at least four samples and a positive hop; the taper and
    /// missing fractions must lie in `[0, 1]` and `[0, 1)`.
    pub fn validate(&self) -> Result<(), SpectralError> {
        if self.segment_length < 4 || self.segment_overlap >= self.segment_length {
            return Err(SpectralError::InvalidSegmenting {
                length: self.segment_length,
                overlap: self.segment_overlap,
            });
        }
        if !self.taper_fraction.is_finite() || !(0.0..=1.0).contains(&self.taper_fraction) {
            return Err(SpectralError::InvalidParameter {
                name: "taper_fraction",
                reason: format!("{} must lie in [0, 1]", self.taper_fraction),
            });
        }
        if !self.max_missing_fraction.is_finite() || !(0.0..1.0).contains(&self.max_missing_fraction) {
            return Err(SpectralError::InvalidParameter {
                name: "max_missing_fraction",
                reason: format!("{} must lie in [0, 1)", self.max_missing_fraction),
            });
        }
        Ok(())
    }
}

impl Default for SpectralConfig {
    /// 96-sample segments overlapping by 60, the customary setup for daily data.
    fn default() -> Self {
        Self::new(96, 60)
    }
}
