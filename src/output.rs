//! JSON output structures for a diagnostics run.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use ndarray::ArrayView2;
use serde::Serialize;

use ccew_batch::{BatchReport, SpectrumOutput, UnitFailure, UnitKey};
use ccew_coherence::LevelCoherence;
use ccew_skill::{RunScore, SkillScore, rank_runs, spectral_pattern_correlation};
use ccew_spectral::{SegmentReport, WavenumberFrequencyAxes};
use ccew_wave::WaveActivity;

/// Top-level diagnostics document.
#[derive(Debug, Serialize)]
pub struct Diagnostics {
    pub spectra: Vec<SpectrumJson>,
    pub activity: Vec<ActivityJson>,
    pub coherence: Vec<CoherenceJson>,
    pub skill: Vec<SkillJson>,
    /// Model runs ranked by RMSE, keyed by `observed/mode@level`.
    pub rankings: BTreeMap<String, Vec<RunScore>>,
    pub failures: Vec<UnitFailure>,
}

/// Segment bookkeeping of a spectrum.
#[derive(Debug, Serialize)]
pub struct SegmentsJson {
    pub total: usize,
    pub used: usize,
    /// Start sample of each dropped segment.
    pub dropped: Vec<usize>,
    pub filled_cells: usize,
}

impl From<&SegmentReport> for SegmentsJson {
    fn from(r: &SegmentReport) -> Self {
        Self {
            total: r.total(),
            used: r.used(),
            dropped: r.dropped().iter().map(|d| d.start).collect(),
            filled_cells: r.filled_cells(),
        }
    }
}

/// Spectra of one variable; matrices are indexed `[wavenumber][frequency]`.
#[derive(Debug, Serialize)]
pub struct SpectrumJson {
    pub key: UnitKey,
    pub wavenumbers: Vec<i32>,
    /// Cycles per day.
    pub frequencies: Vec<f64>,
    pub segments: SegmentsJson,
    pub raw: Vec<Vec<f64>>,
    pub symmetric: Vec<Vec<f64>>,
    pub antisymmetric: Vec<Vec<f64>>,
    pub background: Vec<Vec<f64>>,
    pub normalized_symmetric: Vec<Vec<f64>>,
    pub normalized_antisymmetric: Vec<Vec<f64>>,
    pub threshold: f64,
    /// `(wavenumber, frequency)` of symmetric bins above the threshold.
    pub significant_symmetric: Vec<(i32, f64)>,
    pub significant_antisymmetric: Vec<(i32, f64)>,
}

fn matrix(a: ArrayView2<'_, f64>) -> Vec<Vec<f64>> {
    a.rows().into_iter().map(|r| r.to_vec()).collect()
}

impl SpectrumJson {
    pub fn new(key: UnitKey, s: &SpectrumOutput) -> Self {
        let axes: &WavenumberFrequencyAxes = s.decomposition.raw.axes();
        Self {
            key,
            wavenumbers: axes.wavenumbers().to_vec(),
            frequencies: axes.frequencies().to_vec(),
            segments: s.decomposition.raw.report().into(),
            raw: matrix(s.decomposition.raw.power()),
            symmetric: matrix(s.decomposition.symmetric.power()),
            antisymmetric: matrix(s.decomposition.antisymmetric.power()),
            background: matrix(s.background.power()),
            normalized_symmetric: matrix(s.symmetric.ratio()),
            normalized_antisymmetric: matrix(s.antisymmetric.ratio()),
            threshold: s.symmetric.threshold(),
            significant_symmetric: s.symmetric.significant_bins(),
            significant_antisymmetric: s.antisymmetric.significant_bins(),
        }
    }
}

/// One activity series.
#[derive(Debug, Serialize)]
pub struct ActivityJson {
    pub key: UnitKey,
    pub origin: NaiveDate,
    /// Days from `origin`.
    pub time: Vec<f64>,
    pub coefficients: Vec<f64>,
    pub amplitude: Vec<f64>,
    pub phase: Option<Vec<f64>>,
    pub variance_contribution: f64,
}

impl ActivityJson {
    fn new(key: UnitKey, a: &WaveActivity) -> Self {
        Self {
            key,
            origin: a.time().origin(),
            time: a.time().offsets().to_vec(),
            coefficients: a.coefficients().to_vec(),
            amplitude: a.amplitude(),
            phase: a.phase(),
            variance_contribution: a.variance_contribution(),
        }
    }
}

/// Coherence at one level.
#[derive(Debug, Serialize)]
pub struct CoherenceJson {
    pub key: UnitKey,
    pub level: Option<f64>,
    pub coherence_squared: f64,
    /// Radians in (-pi, pi].
    pub phase: f64,
    pub n_bins: usize,
    pub segments: SegmentsJson,
}

impl CoherenceJson {
    fn new(key: UnitKey, c: &LevelCoherence) -> Self {
        Self {
            key,
            level: c.level,
            coherence_squared: c.estimate.coherence_squared,
            phase: c.estimate.phase,
            n_bins: c.estimate.n_bins,
            segments: (&c.estimate.report).into(),
        }
    }
}

/// Skill of one model field for one mode.
#[derive(Debug, Serialize)]
pub struct SkillJson {
    pub key: UnitKey,
    pub observed: String,
    pub score: SkillScore,
    /// Pattern correlation of the normalized symmetric spectra, when both
    /// spectra were computed.
    pub spectral_pattern_correlation: Option<f64>,
}

/// Assemble the output document.
pub fn build(report: &BatchReport) -> Result<Diagnostics> {
    let spectra = report
        .spectra
        .iter()
        .map(|(k, s)| SpectrumJson::new(k.clone(), s))
        .collect();
    let activity = report
        .activity
        .iter()
        .map(|(k, a)| ActivityJson::new(k.clone(), a))
        .collect();
    let coherence = report
        .coherence
        .iter()
        .map(|(k, c)| CoherenceJson::new(k.clone(), c))
        .collect();

    let spectrum_of = |variable: &str, level: Option<usize>| report.spectra.get(&UnitKey::new(variable, None, level));

    let mut skill = Vec::new();
    let mut runs: BTreeMap<String, Vec<(String, f64)>> = BTreeMap::new();
    for (key, score) in &report.skill {
        let Some(observed) = key.against.as_ref().map(|c| c.variable.as_str()) else {
            continue;
        };
        let pattern = match (spectrum_of(&key.variable, key.level), spectrum_of(observed, key.level)) {
            (Some(m), Some(o)) => spectral_pattern_correlation(m.symmetric.ratio(), o.symmetric.ratio())
                .with_context(|| format!("comparing spectra of {} and {observed}", key.variable))?,
            _ => None,
        };
        let group = UnitKey::new(observed, key.mode, key.level);
        runs.entry(group.to_string())
            .or_default()
            .push((key.variable.clone(), score.rmse));
        skill.push(SkillJson {
            key: key.clone(),
            observed: observed.to_string(),
            score: score.clone(),
            spectral_pattern_correlation: pattern,
        });
    }
    let rankings = runs.into_iter().map(|(k, r)| (k, rank_runs(&r))).collect();

    Ok(Diagnostics {
        spectra,
        activity,
        coherence,
        skill,
        rankings,
        failures: report.failures.clone(),
    })
}

/// Serialize diagnostics to pretty-printed JSON.
pub fn to_json(diagnostics: &Diagnostics) -> Result<String> {
    serde_json::to_string_pretty(diagnostics).context("failed to serialize diagnostics")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccew_batch::TaskKind;
    use ccew_skill::PairedSeries;
    use ccew_grid::TimeAxis;
    use ccew_wave::WaveMode;

    fn key(variable: &str) -> UnitKey {
        UnitKey::new(variable, Some(WaveMode::Kelvin), Some(0))
    }

    #[test]
    fn empty_report_serializes() {
        let d = build(&BatchReport::default()).unwrap();
        let json = to_json(&d).unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(v["spectra"].as_array().unwrap().is_empty());
        assert!(v["rankings"].as_object().unwrap().is_empty());
    }

    #[test]
    fn activity_and_failures_are_written() {
        let origin = NaiveDate::from_ymd_opt(2001, 5, 1).unwrap();
        let time = TimeAxis::regular(origin, 0.0, 1.0, 3).unwrap();
        let mut report = BatchReport::default();
        report.activity.insert(
            key("pr"),
            WaveActivity::from_amplitudes(WaveMode::Kelvin, time, vec![1.0, -2.0, 0.5]),
        );
        report.failures.push(UnitFailure {
            kind: TaskKind::Spectrum,
            key: UnitKey::new("olr", None, Some(0)),
            time_range: None,
            message: "missing input: field 'olr'".into(),
        });

        let v = serde_json::to_value(build(&report).unwrap()).unwrap();
        assert_eq!(v["activity"][0]["amplitude"][1], 2.0);
        assert_eq!(v["activity"][0]["origin"], "2001-05-01");
        assert_eq!(v["activity"][0]["key"]["mode"], "kelvin");
        assert_eq!(v["failures"][0]["kind"], "spectrum");
    }

    fn score(rmse: f64) -> SkillScore {
        SkillScore {
            mode: WaveMode::Kelvin,
            correlation: Some(1.0),
            rmse,
            mae: rmse,
            bias: 0.0,
            amplitude_ratio: Some(1.0),
            activity_ratio: Some(1.0),
            n_samples: 3,
            dropped_samples: 0,
            non_finite_samples: 0,
            paired: PairedSeries {
                time: vec![0.0, 1.0, 2.0],
                model: vec![1.0, 2.0, 3.0],
                observed: vec![1.0, 2.0, 3.0],
            },
        }
    }

    #[test]
    fn skill_labelled_with_its_own_observation() {
        let mut report = BatchReport::default();
        report.skill.insert(key("pr_model").with_against("gpcp", 0), score(0.5));
        report.skill.insert(key("pr_model").with_against("trmm", 0), score(2.0));
        report.skill.insert(key("pr_other").with_against("trmm", 0), score(1.0));

        let d = build(&report).unwrap();
        let labels: Vec<(&str, f64)> = d.skill.iter().map(|s| (s.observed.as_str(), s.score.rmse)).collect();
        assert_eq!(labels, vec![("gpcp", 0.5), ("trmm", 2.0), ("trmm", 1.0)]);
        assert_eq!(d.rankings["gpcp/kelvin@0"].len(), 1);
        let trmm = &d.rankings["trmm/kelvin@0"];
        assert_eq!(trmm.len(), 2);
        assert_eq!(trmm[0].run, "pr_other");
    }
}
