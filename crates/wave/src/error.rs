//! Error types for the ccew-wave crate.

use ccew_grid::GridError;
use ccew_spectral::SpectralError;

use crate::mode::WaveMode;

/// Error type for all fallible operations in the ccew-wave crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WaveError {
    /// Returned when a field or pattern grid differs from the basis grid.
    #[error("{what} mismatch: basis has {basis}, field has {field}")]
    DimensionMismatch {
        /// Which coordinate disagrees.
        what: &'static str,
        /// Basis extent.
        basis: usize,
        /// Field extent.
        field: usize,
    },

    /// Returned when two basis patterns overlap beyond tolerance.
    #[error("basis patterns '{a}' and '{b}' are not orthogonal (cosine {cosine:.3e})")]
    NonOrthogonalBasis {
        /// First pattern label.
        a: String,
        /// Second pattern label.
        b: String,
        /// Normalized inner product.
        cosine: f64,
    },

    /// Returned when a pattern is zero or contains non-finite values.
    #[error("pattern for {mode} is zero or non-finite")]
    DegeneratePattern {
        /// Mode of the offending pattern.
        mode: WaveMode,
    },

    /// Returned when a mode occurs twice in one basis.
    #[error("mode {0} appears more than once in the basis")]
    DuplicateMode(WaveMode),

    /// Returned when a mode is not part of the basis.
    #[error("mode {0} is not in the basis")]
    UnknownMode(WaveMode),

    /// Returned when a mode name cannot be parsed.
    #[error("unrecognised wave mode '{0}'")]
    ParseMode(String),

    /// Returned when a wave band is malformed.
    #[error("invalid wave band: {0}")]
    InvalidBand(String),

    /// Wrapped error from field selection.
    #[error(transparent)]
    Grid(#[from] GridError),

    /// Wrapped error from spectral filtering.
    #[error(transparent)]
    Spectral(#[from] SpectralError),
}
