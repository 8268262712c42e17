//! # ccew-grid
//!
//! Typed container for gridded physical fields on a regular
//! latitude/longitude/level/time grid, with the selections the spectral
//! diagnostics need.
//!
//! ## Selection Pipeline
//!
//! ```mermaid
//! graph LR
//!     A["GridField::new(...)?"] -->|"crop_time / extract_level"| B["GridField"]
//!     B -->|"band_average(band, level)"| C["TimeLonSeries"]
//!     B -->|"band_rows(band, level)"| D["Vec<(lat, TimeLonSeries)>"]
//!     B -->|"symmetric_pairs(band, level)"| E["Vec<SymmetricPair>"]
//! ```
//!
//! Missing cells (fill value or non-finite) become NaN in every
//! [`TimeLonSeries`] handed to downstream crates; how NaN samples are
//! treated is decided by the consumer.

mod error;
mod field;
mod series;
mod time;
mod validate;
mod variables;

pub use error::GridError;
pub use field::{GridField, SymmetricPair, mirror_pairs};
pub use series::{LatBand, TimeLonSeries};
pub use time::TimeAxis;
pub use variables::{CF_CONVENTION, UnitConversion, VariableEntry, VariableTranslator};
