//! Skill of modelled wave activity against observations.

use ccew_stats::{bias, mae, mean, pearson_correlation, rmse, sd};
use ccew_wave::{WaveActivity, WaveMode};
use serde::Serialize;
use tracing::{debug, warn};

use crate::align::align;
use crate::config::SkillConfig;
use crate::error::SkillError;

/// Fewest paired samples a score is computed from.
pub const MIN_PAIRED_SAMPLES: usize = 3;

/// Model and observed projection coefficients on the common time axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairedSeries {
    /// Days from the observed time origin.
    pub time: Vec<f64>,
    pub model: Vec<f64>,
    pub observed: Vec<f64>,
}

/// Agreement between one model and one observed activity series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillScore {
    pub mode: WaveMode,
    /// Pearson correlation of the coefficient series, `None` for constant input.
    pub correlation: Option<f64>,
    pub rmse: f64,
    pub mae: f64,
    /// Mean of model minus observed.
    pub bias: f64,
    /// Standard deviation of the model over that of the observations.
    pub amplitude_ratio: Option<f64>,
    /// Mean model amplitude over mean observed amplitude.
    pub activity_ratio: Option<f64>,
    pub n_samples: usize,
    /// Samples discarded by alignment, both sides together.
    pub dropped_samples: usize,
    /// Aligned pairs skipped because either coefficient is non-finite.
    pub non_finite_samples: usize,
    pub paired: PairedSeries,
}

fn ratio(num: f64, den: f64) -> Option<f64> {
    if den > 0.0 && num.is_finite() { Some(num / den) } else { None }
}

/// Scores model wave activity against observations.
#[derive(Debug, Clone, Default)]
pub struct SkillScorer {
    config: SkillConfig,
}

impl SkillScorer {
    /// Create a scorer.
    pub fn new(config: SkillConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SkillConfig {
        &self.config
    }

    /// Compare `model` with `observed`.
    ///
    /// Error statistics use the projection coefficients; the activity ratio
    /// uses the amplitude (including the quadrature part when present).
    ///
    /// # Errors
    ///
    /// - [`SkillError::ModeMismatch`] when the modes differ.
    /// - [`SkillError::TemporalMisalignment`] when the axes disagree under
    ///   strict alignment.
    /// - [`SkillError::InsufficientData`] when fewer than
    ///   [`MIN_PAIRED_SAMPLES`] finite pairs remain.
    #[tracing::instrument(skip_all, fields(mode = %model.mode()))]
    pub fn score(&self, model: &WaveActivity, observed: &WaveActivity) -> Result<SkillScore, SkillError> {
        if model.mode() != observed.mode() {
            return Err(SkillError::ModeMismatch {
                model: model.mode(),
                observed: observed.mode(),
            });
        }

        let pairing = align(
            model.time(),
            observed.time(),
            self.config.alignment(),
            self.config.time_tolerance(),
        )?;
        if pairing.dropped > 0 {
            warn!(dropped = pairing.dropped, "time steps without a counterpart dropped");
        }

        let (mc, oc) = (model.coefficients(), observed.coefficients());
        let (ma, oa) = (model.amplitude(), observed.amplitude());
        let mut paired = PairedSeries {
            time: Vec::with_capacity(pairing.pairs.len()),
            model: Vec::with_capacity(pairing.pairs.len()),
            observed: Vec::with_capacity(pairing.pairs.len()),
        };
        let mut model_amp = Vec::new();
        let mut obs_amp = Vec::new();
        let mut non_finite = 0;
        for (&(i, j), &t) in pairing.pairs.iter().zip(&pairing.time) {
            if !(mc[i].is_finite() && oc[j].is_finite()) {
                non_finite += 1;
                continue;
            }
            paired.time.push(t);
            paired.model.push(mc[i]);
            paired.observed.push(oc[j]);
            model_amp.push(ma[i]);
            obs_amp.push(oa[j]);
        }
        if non_finite > 0 {
            warn!(non_finite, paired = pairing.pairs.len(), "non-finite pairs skipped");
        }

        let n = paired.model.len();
        if n < MIN_PAIRED_SAMPLES {
            return Err(SkillError::InsufficientData {
                n,
                min: MIN_PAIRED_SAMPLES,
            });
        }

        let m = &paired.model;
        let o = &paired.observed;
        let insufficient = SkillError::InsufficientData {
            n,
            min: MIN_PAIRED_SAMPLES,
        };
        let score = SkillScore {
            mode: model.mode(),
            correlation: pearson_correlation(m, o),
            rmse: rmse(m, o).ok_or_else(|| insufficient.clone())?,
            mae: mae(m, o).ok_or_else(|| insufficient.clone())?,
            bias: bias(m, o).ok_or(insufficient)?,
            amplitude_ratio: ratio(sd(m), sd(o)),
            activity_ratio: ratio(mean(&model_amp), mean(&obs_amp)),
            n_samples: n,
            dropped_samples: pairing.dropped,
            non_finite_samples: non_finite,
            paired,
        };
        debug!(
            n,
            correlation = ?score.correlation,
            rmse = score.rmse,
            "skill scored"
        );
        Ok(score)
    }
}
