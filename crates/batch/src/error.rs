//! Batch execution error types.

use ccew_coherence::CoherenceError;
use ccew_grid::GridError;
use ccew_skill::SkillError;
use ccew_spectral::SpectralError;
use ccew_wave::WaveError;

/// Errors raised while setting up or executing a batch unit.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// The worker pool could not be created.
    #[error("thread pool: {0}")]
    ThreadPool(String),

    /// A task names an input that was not supplied.
    #[error("missing input: {0}")]
    MissingInput(String),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Spectral(#[from] SpectralError),

    #[error(transparent)]
    Wave(#[from] WaveError),

    #[error(transparent)]
    Coherence(#[from] CoherenceError),

    #[error(transparent)]
    Skill(#[from] SkillError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_input_display() {
        let err = BatchError::MissingInput("field 'olr'".into());
        assert_eq!(format!("{}", err), "missing input: field 'olr'");
    }

    #[test]
    fn test_wrapped_error_is_transparent() {
        let inner = SkillError::InsufficientData { n: 1, min: 3 };
        let err = BatchError::from(inner.clone());
        assert_eq!(format!("{}", err), format!("{}", inner));
    }

    #[test]
    fn test_is_send_sync_error() {
        fn assert_impl<T: std::error::Error + Send + Sync>() {}
        assert_impl::<BatchError>();
    }
}
