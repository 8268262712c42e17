//! # ccew-coherence
//!
//! Cross-spectral coherence and phase between a band-filtered reference
//! signal (typically precipitation) and other fields, level by level.
//!
//! ```mermaid
//! graph LR
//!     A["reference: TimeLonSeries"] --> C["cross_spectrum(ref, target)?"]
//!     B["target: TimeLonSeries"] --> C
//!     C -->|"sum over WaveBand bins"| D["CoherenceEstimate"]
//!     E["GridField (levels)"] -->|"profile(ref, field, lat_band, band, levels)?"| F["CoherenceProfile"]
//! ```
//!
//! Squared coherence is `|Pxy|^2 / (Pxx Pyy)` with `Pxy = <X conj(Y)>`
//! averaged over segments and summed over the band's bins.

mod analyzer;
mod cross;
mod error;

pub use analyzer::{CoherenceAnalyzer, CoherenceEstimate, CoherenceProfile, LevelCoherence};
pub use cross::CrossSpectrum;
pub use error::CoherenceError;
