//! Projection of band-filtered fields onto the wave basis.

use std::sync::Arc;

use ccew_grid::GridField;
use ccew_spectral::{SpectralConfig, bandpass, fill_missing};
use ndarray::{Array2, Array3, Axis, s};
use rayon::prelude::*;
use tracing::debug;

use crate::activity::WaveActivity;
use crate::band::WaveBand;
use crate::basis::{ModePattern, WaveBasis};
use crate::error::WaveError;
use crate::mode::WaveMode;

/// Projects fields on the basis grid onto each mode's spatial pattern.
///
/// The projection is linear and deterministic. Fields must sit on exactly
/// the basis grid; nothing is interpolated.
#[derive(Debug, Clone)]
pub struct WaveBasisProjector {
    basis: Arc<WaveBasis>,
    config: SpectralConfig,
}

impl WaveBasisProjector {
    /// Create a projector. `config` supplies the missing-data policy.
    ///
    /// # Errors
    ///
    /// Returns the configuration's validation error.
    pub fn new(basis: Arc<WaveBasis>, config: SpectralConfig) -> Result<Self, WaveError> {
        config.validate()?;
        Ok(Self { basis, config })
    }

    /// The shared basis.
    pub fn basis(&self) -> &WaveBasis {
        &self.basis
    }

    /// Filter `field` at a level index to the band of `mode`, then project
    /// onto its pattern.
    ///
    /// # Errors
    ///
    /// Returns [`WaveError::DimensionMismatch`] when the field grid differs
    /// from the basis grid, [`WaveError::UnknownMode`] for a mode not in the
    /// basis, and wrapped missing-data errors.
    #[tracing::instrument(skip_all, fields(field = field.name(), level = level, mode = %mode))]
    pub fn project(&self, field: &GridField, level: usize, mode: WaveMode) -> Result<WaveActivity, WaveError> {
        let pattern = self.basis.pattern(mode)?;
        let data = self.prepare(field, level, Some(pattern.band()))?;
        Ok(project_onto(field, &data, pattern))
    }

    /// Project a field that is already band-filtered.
    ///
    /// # Errors
    ///
    /// Same conditions as [`WaveBasisProjector::project`].
    pub fn project_unfiltered(
        &self,
        field: &GridField,
        level: usize,
        mode: WaveMode,
    ) -> Result<WaveActivity, WaveError> {
        let pattern = self.basis.pattern(mode)?;
        let data = self.prepare(field, level, None)?;
        Ok(project_onto(field, &data, pattern))
    }

    /// Filter and project every mode of the basis in parallel.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered.
    pub fn project_all(&self, field: &GridField, level: usize) -> Result<Vec<WaveActivity>, WaveError> {
        self.basis
            .modes()
            .into_par_iter()
            .map(|mode| self.project(field, level, mode))
            .collect()
    }

    /// `(time, lat, lon)` data at a level after the missing-data policy and
    /// optional band filtering of each latitude row.
    fn prepare(&self, field: &GridField, level: usize, band: Option<&WaveBand>) -> Result<Array3<f64>, WaveError> {
        self.basis.check_grid(field.lats(), field.lons())?;
        let mut out = Array3::<f64>::zeros((field.n_time(), field.n_lat(), field.n_lon()));
        for j in 0..field.n_lat() {
            let row = field.time_lon_row(level, j)?;
            let clean = match band {
                Some(b) => bandpass(&row, &self.config, |s, f| b.contains(s, f))?,
                None => fill_missing(&row, &self.config)?,
            };
            out.slice_mut(s![.., j, ..]).assign(&clean.values());
        }
        Ok(out)
    }
}

fn coefficients(data: &Array3<f64>, pattern: &Array2<f64>) -> (Vec<f64>, f64) {
    let norm_sq: f64 = pattern.iter().map(|v| v * v).sum();
    let coeffs = data
        .axis_iter(Axis(0))
        .map(|x| (&x * pattern).sum() / norm_sq)
        .collect();
    (coeffs, norm_sq)
}

fn project_onto(field: &GridField, data: &Array3<f64>, pattern: &ModePattern) -> WaveActivity {
    let (coeffs, norm_sq) = coefficients(data, pattern.primary());
    let quadrature = pattern.quadrature().map(|q| coefficients(data, q));
    debug!(mode = %pattern.mode(), n_time = coeffs.len(), "projected");
    WaveActivity::new(
        pattern.mode(),
        field.time().clone(),
        coeffs,
        quadrature,
        norm_sq,
        field.n_lat() * field.n_lon(),
    )
}
