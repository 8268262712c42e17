//! # ccew-wave
//!
//! Equatorial wave modes, their wavenumber-frequency bands, and projection
//! of gridded fields onto an empirical orthogonal wave basis.
//!
//! ## Projection Pipeline
//!
//! ```mermaid
//! graph LR
//!     A["WaveBasis::new(lats, lons, patterns)?"] -->|"Arc"| B["WaveBasisProjector"]
//!     C["GridField"] -->|"project(field, level, mode)?"| B
//!     B -->|"bandpass each latitude row"| D["(time, lat, lon)"]
//!     D -->|"<x, p> / <p, p>"| E["WaveActivity"]
//! ```
//!
//! ## Default Bands
//!
//! | Mode | Wavenumber | Period (days) | Equivalent depth (m) |
//! |------|-----------|---------------|----------------------|
//! | Kelvin | 1 to 14 | 2.5 to 20 | 8 to 90 |
//! | MJO | 1 to 5 | 30 to 96 | |
//! | ER | -10 to -1 | 10 to 48 | 8 to 90 |
//! | MRG | -10 to -1 | 3 to 6 | 8 to 90 |
//! | EIG0 | 1 to 14 | 2 to 4.5 | 12 to 50 |
//! | EIG(n), WIG(n) | ±1 to ±15 | 1.25 to 2.5 | 12 to 50 |
//! | TD | -20 to -6 | 2.5 to 5 | |

mod activity;
mod band;
mod basis;
mod dispersion;
mod error;
mod mode;
mod projector;

pub use activity::WaveActivity;
pub use band::{DepthRange, WaveBand};
pub use basis::{ModePattern, WaveBasis};
pub use dispersion::{DispersionCurve, EARTH_OMEGA, EARTH_RADIUS, GRAVITY};
pub use error::WaveError;
pub use mode::WaveMode;
pub use projector::WaveBasisProjector;
