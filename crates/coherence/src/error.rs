//! Error types for the ccew-coherence crate.

use ccew_grid::GridError;
use ccew_spectral::SpectralError;

/// Error type for all fallible operations in the ccew-coherence crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoherenceError {
    /// Returned when the reference and target series differ in shape or sampling.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Returned when no spectral bin falls inside the wave band.
    #[error("no spectral bins inside the wave band")]
    EmptyBand,

    /// Returned when the reference or target has no power inside the band.
    #[error("{which} has no power inside the wave band")]
    ZeroPower {
        /// `"reference"` or `"target"`.
        which: &'static str,
    },

    /// Returned when the squared coherence exceeds one beyond rounding.
    #[error("numerical instability: {0}")]
    NumericalInstability(String),

    /// Wrapped error from field selection.
    #[error(transparent)]
    Grid(#[from] GridError),

    /// Wrapped error from spectral estimation.
    #[error(transparent)]
    Spectral(#[from] SpectralError),
}
