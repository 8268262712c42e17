//! # ccew-spectral
//!
//! Space-time (wavenumber-frequency) spectral analysis of equatorial
//! time-longitude records.
//!
//! ## Spectral Pipeline
//!
//! ```mermaid
//! graph LR
//!     A["GridField"] -->|"decompose(field, band, level)?"| B["SymmetricDecomposition"]
//!     C["TimeLonSeries"] -->|"transform(series)?"| D["WavenumberFrequencySpectrum"]
//!     B -->|"background_source()?"| D
//!     D -->|"BackgroundEstimator::estimate"| E["BackgroundSpectrum"]
//!     D -->|"normalize(raw, bg, significance)?"| F["NormalizedSpectrum"]
//!     C -->|"bandpass(series, config, keep)?"| C
//! ```
//!
//! ## Conventions
//!
//! | Axis | Values | Units |
//! |------|--------|-------|
//! | wavenumber | `-(N/2) ..= (N-1)/2`, eastward positive | cycles per globe |
//! | frequency | `0 ..= T/2` bins of `1 / (T dt)` | cycles per day |
//!
//! Power is variance per bin: summed over all bins it equals the mean
//! square of the detrended record (averaged over segments and rows).

mod background;
mod config;
mod error;
mod fft;
mod filter;
mod segment;
mod spectrum;
mod taper;
mod transform;

pub use background::{
    BackgroundConfig, BackgroundEstimator, BackgroundSpectrum, NormalizedSpectrum, Significance, normalize,
};
pub use config::{Detrend, GapFill, SpectralConfig};
pub use error::SpectralError;
pub use fft::Fft2;
pub use filter::{bandpass, fill_missing};
pub use segment::{DroppedSegment, PreparedSegment, SegmentReport, prepare_segments};
pub use spectrum::{Component, SymmetricDecomposition, WavenumberFrequencyAxes, WavenumberFrequencySpectrum};
pub use transform::SpectralTransformer;
