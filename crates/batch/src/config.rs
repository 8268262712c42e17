//! Batch configuration.

use ccew_grid::LatBand;
use ccew_skill::SkillConfig;
use ccew_spectral::{BackgroundConfig, Significance, SpectralConfig};

use crate::error::BatchError;

/// Settings shared by every unit of a batch.
#[derive(Debug, Clone, Default)]
pub struct BatchConfig {
    threads: usize,
    spectral: SpectralConfig,
    background: BackgroundConfig,
    significance: Significance,
    lat_band: LatBand,
    skill: SkillConfig,
}

impl BatchConfig {
    /// Worker threads; 0 lets rayon decide.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_spectral(mut self, spectral: SpectralConfig) -> Self {
        self.spectral = spectral;
        self
    }

    pub fn with_background(mut self, background: BackgroundConfig) -> Self {
        self.background = background;
        self
    }

    pub fn with_significance(mut self, significance: Significance) -> Self {
        self.significance = significance;
        self
    }

    /// Latitude band for spectra and band-averaged coherence series.
    pub fn with_lat_band(mut self, lat_band: LatBand) -> Self {
        self.lat_band = lat_band;
        self
    }

    pub fn with_skill(mut self, skill: SkillConfig) -> Self {
        self.skill = skill;
        self
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn spectral(&self) -> &SpectralConfig {
        &self.spectral
    }

    pub fn background(&self) -> &BackgroundConfig {
        &self.background
    }

    pub fn significance(&self) -> Significance {
        self.significance
    }

    pub fn lat_band(&self) -> &LatBand {
        &self.lat_band
    }

    pub fn skill(&self) -> &SkillConfig {
        &self.skill
    }

    /// Check the nested configurations.
    ///
    /// # Errors
    ///
    /// Returns the first [`SpectralError`](ccew_spectral::SpectralError)
    /// found in the spectral, background or significance settings.
    pub fn validate(&self) -> Result<(), BatchError> {
        self.spectral.validate()?;
        self.background.validate()?;
        self.significance.threshold(1)?;
        Ok(())
    }
}
