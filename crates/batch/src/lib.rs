//! # ccew-batch
//!
//! Runs independent diagnostic units (spectra, wave activity, per-level
//! coherence, skill) on a rayon thread pool and collects their results and
//! failures.
//!
//! ## Execution
//!
//! ```mermaid
//! graph TD
//!     T["Vec<Task>"] --> R["BatchRunner::run"]
//!     R -->|"phase 1, parallel"| S["Spectrum / Activity / Coherence"]
//!     S --> A["activity results"]
//!     A -->|"phase 2, parallel"| K["Skill"]
//!     S --> B["BatchReport"]
//!     K --> B
//! ```
//!
//! Fields and the wave basis are shared read-only through `Arc`. A unit
//! error becomes a [`UnitFailure`] carrying the unit key, the time range of
//! its input and the error message; sibling units are unaffected.
//!
//! | Task | Key |
//! |------|-----|
//! | `Spectrum` | variable, level |
//! | `Activity` | variable, mode, level |
//! | `Coherence` | target variable, mode, level, reference and its level |
//! | `Skill` | model variable, mode, level, observed variable |

mod config;
mod error;
mod report;
mod runner;
mod task;

pub use config::BatchConfig;
pub use error::BatchError;
pub use report::{BatchReport, SpectrumOutput, UnitFailure};
pub use runner::{BatchInputs, BatchRunner};
pub use task::{Counterpart, Task, TaskKind, UnitKey};
