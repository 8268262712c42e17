//! Skill scoring error types.

use ccew_wave::WaveMode;

/// Errors that can occur while scoring model output against observations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SkillError {
    /// The two time axes do not line up under the chosen alignment.
    #[error("temporal misalignment: {reason}")]
    TemporalMisalignment { reason: String },

    /// Model and observed activity describe different modes.
    #[error("mode mismatch: model {model}, observed {observed}")]
    ModeMismatch { model: WaveMode, observed: WaveMode },

    /// Too few paired samples for a statistic.
    #[error("insufficient data: {n} paired sample(s), need at least {min}")]
    InsufficientData { n: usize, min: usize },

    /// Spectra or series of different shape were compared.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_misalignment_display() {
        let err = SkillError::TemporalMisalignment {
            reason: "lengths 10 and 12".to_string(),
        };
        assert_eq!(format!("{}", err), "temporal misalignment: lengths 10 and 12");
    }

    #[test]
    fn test_mode_mismatch_display() {
        let err = SkillError::ModeMismatch {
            model: WaveMode::Kelvin,
            observed: WaveMode::Mjo,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("model kelvin"));
        assert!(msg.contains("observed mjo"));
    }

    #[test]
    fn test_insufficient_data_display() {
        let err = SkillError::InsufficientData { n: 2, min: 3 };
        assert!(format!("{}", err).contains("2 paired sample(s)"));
    }

    #[test]
    fn test_is_send_sync_error() {
        fn assert_impl<T: std::error::Error + Send + Sync>() {}
        assert_impl::<SkillError>();
    }
}
