//! Pattern correlation between two wavenumber-frequency spectra.

use ndarray::ArrayView2;

use crate::error::SkillError;

/// Floor applied before taking logarithms.
pub const LOG_FLOOR: f64 = 1e-12;

/// Pearson correlation of the log-transformed spectra, bin by bin.
///
/// Typically fed normalized spectra (raw over background) so the score
/// measures where the wave peaks sit rather than the red background shape.
/// Returns `Ok(None)` when fewer than 3 finite bins remain or either
/// spectrum is constant.
///
/// # Errors
///
/// Returns [`SkillError::ShapeMismatch`] when the spectra differ in shape.
pub fn spectral_pattern_correlation(
    model: ArrayView2<'_, f64>,
    observed: ArrayView2<'_, f64>,
) -> Result<Option<f64>, SkillError> {
    if model.dim() != observed.dim() {
        return Err(SkillError::ShapeMismatch(format!(
            "model spectrum {:?}, observed spectrum {:?}",
            model.dim(),
            observed.dim()
        )));
    }
    let log = |v: &f64| if v.is_finite() { v.max(LOG_FLOOR).ln() } else { f64::NAN };
    let lm: Vec<f64> = model.iter().map(log).collect();
    let lo: Vec<f64> = observed.iter().map(log).collect();
    Ok(ccew_stats::pearson_correlation(&lm, &lo))
}
