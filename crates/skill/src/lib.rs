//! # ccew-skill
//!
//! Scores modelled convectively coupled wave activity against observed
//! activity, compares spectra as patterns, and ranks model runs.
//!
//! ```mermaid
//! graph LR
//!     M["WaveActivity (model)"] --> S["SkillScorer::score"]
//!     O["WaveActivity (observed)"] --> S
//!     S --> R["SkillScore"]
//!     R -->|"rmse per run"| K["rank_runs"]
//! ```
//!
//! | Alignment | Behaviour |
//! |-----------|-----------|
//! | `Strict` (default) | axes must match step for step within the tolerance |
//! | `Intersect` | common time stamps only; the dropped count is reported |

mod align;
mod config;
mod error;
mod pattern;
mod ranking;
mod scorer;

pub use config::{Alignment, SkillConfig};
pub use error::SkillError;
pub use pattern::{LOG_FLOOR, spectral_pattern_correlation};
pub use ranking::{RunScore, rank_runs};
pub use scorer::{MIN_PAIRED_SAMPLES, PairedSeries, SkillScore, SkillScorer};
