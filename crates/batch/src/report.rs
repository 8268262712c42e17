//! Collected outputs and failures of a batch run.

use std::collections::BTreeMap;

use ccew_coherence::LevelCoherence;
use ccew_skill::SkillScore;
use ccew_spectral::{BackgroundSpectrum, NormalizedSpectrum, SymmetricDecomposition};
use ccew_wave::WaveActivity;
use chrono::NaiveDate;
use serde::Serialize;

use crate::task::{TaskKind, UnitKey};

/// Spectra produced by one spectrum unit.
#[derive(Debug, Clone)]
pub struct SpectrumOutput {
    pub decomposition: SymmetricDecomposition,
    /// Background of the mean of the symmetric and antisymmetric spectra.
    pub background: BackgroundSpectrum,
    pub symmetric: NormalizedSpectrum,
    pub antisymmetric: NormalizedSpectrum,
}

/// A unit that did not produce a result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitFailure {
    pub kind: TaskKind,
    pub key: UnitKey,
    /// First and last date of the input record, when known.
    pub time_range: Option<(NaiveDate, NaiveDate)>,
    pub message: String,
}

/// Results of a batch keyed by unit.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub spectra: BTreeMap<UnitKey, SpectrumOutput>,
    pub activity: BTreeMap<UnitKey, WaveActivity>,
    pub coherence: BTreeMap<UnitKey, LevelCoherence>,
    pub skill: BTreeMap<UnitKey, SkillScore>,
    pub failures: Vec<UnitFailure>,
}

impl BatchReport {
    /// Number of units that produced a result.
    pub fn succeeded(&self) -> usize {
        self.spectra.len() + self.activity.len() + self.coherence.len() + self.skill.len()
    }

    /// Returns `true` when every unit succeeded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Coherence results of one variable and mode against `reference`,
    /// ordered by level.
    pub fn coherence_profile(
        &self,
        reference: &str,
        variable: &str,
        mode: ccew_wave::WaveMode,
    ) -> Vec<&LevelCoherence> {
        self.coherence
            .iter()
            .filter(|(k, _)| {
                k.variable == variable
                    && k.mode == Some(mode)
                    && k.against.as_ref().is_some_and(|c| c.variable == reference)
            })
            .map(|(_, c)| c)
            .collect()
    }
}
