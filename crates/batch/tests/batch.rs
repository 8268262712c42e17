//! Integration tests for batch execution and failure isolation.

use std::f64::consts::PI;
use std::sync::Arc;

use approx::assert_relative_eq;
use ccew_batch::{BatchConfig, BatchInputs, BatchRunner, Task, TaskKind, UnitKey};
use ccew_grid::{GridField, TimeAxis};
use ccew_spectral::SpectralConfig;
use ccew_wave::{ModePattern, WaveBasis, WaveMode};
use chrono::NaiveDate;
use ndarray::{Array2, Array3, Array4};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

const N_TIME: usize = 128;
const N_LAT: usize = 9;
const N_LON: usize = 16;

fn lats() -> Vec<f64> {
    (-4..=4).map(|j| j as f64 * 2.5).collect()
}

fn lons() -> Vec<f64> {
    (0..N_LON).map(|i| i as f64 * 22.5).collect()
}

fn envelope(j: usize) -> f64 {
    (-(lats()[j] / 10.0).powi(2)).exp()
}

fn lambda(l: usize) -> f64 {
    2.0 * PI * l as f64 / N_LON as f64
}

fn time() -> TimeAxis {
    TimeAxis::regular(NaiveDate::from_ymd_opt(2010, 3, 1).unwrap(), 0.0, 1.0, N_TIME).unwrap()
}

/// Eastward wavenumber-3 wave with an 8-day period plus weak noise.
fn kelvin_values(seed: u64) -> Array3<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 0.1).unwrap();
    Array3::from_shape_fn((N_TIME, N_LAT, N_LON), |(t, j, l)| {
        envelope(j) * (3.0 * lambda(l) - 2.0 * PI * t as f64 / 8.0).cos() + noise.sample(&mut rng)
    })
}

fn field(name: &str, values: Array3<f64>) -> Arc<GridField> {
    Arc::new(GridField::from_time_lat_lon(name, values, time(), lats(), lons(), 1.0e20).unwrap())
}

fn basis() -> Arc<WaveBasis> {
    let pattern = |f: &dyn Fn(usize, usize) -> f64| Array2::from_shape_fn((N_LAT, N_LON), |(j, l)| f(j, l));
    let kelvin = ModePattern::new(WaveMode::Kelvin, pattern(&|j, l| envelope(j) * (3.0 * lambda(l)).cos()))
        .with_quadrature(pattern(&|j, l| envelope(j) * (3.0 * lambda(l)).sin()));
    Arc::new(WaveBasis::new(lats(), lons(), vec![kelvin]).unwrap())
}

fn inputs() -> BatchInputs {
    let obs = kelvin_values(7);
    let model = obs.mapv(|v| 0.8 * v);
    let mut bad = obs.clone();
    for t in 0..N_TIME {
        bad[[t, 0, 0]] = f64::NAN;
    }

    // two levels: the observed wave, then independent noise
    let mut rng = StdRng::seed_from_u64(11);
    let noise = Normal::new(0.0, 1.0).unwrap();
    let mut ta = Array4::zeros((N_TIME, 2, N_LAT, N_LON));
    for ((t, k, j, l), v) in ta.indexed_iter_mut() {
        *v = if k == 0 { obs[[t, j, l]] } else { noise.sample(&mut rng) };
    }
    let ta = GridField::new("ta", ta, time(), Some(vec![850.0, 200.0]), lats(), lons(), 1.0e20).unwrap();

    BatchInputs::new()
        .with_field("pr", field("pr", obs))
        .with_field("pr_model", field("pr_model", model))
        .with_field("pr_bad", field("pr_bad", bad))
        .with_field("ta", Arc::new(ta))
        .with_basis(basis())
}

fn runner() -> BatchRunner {
    let config = BatchConfig::default()
        .with_threads(2)
        .with_spectral(SpectralConfig::new(32, 0));
    BatchRunner::new(config).unwrap()
}

fn key(variable: &str, mode: Option<WaveMode>, level: usize) -> UnitKey {
    UnitKey::new(variable, mode, Some(level))
}

fn tasks() -> Vec<Task> {
    let mut tasks = Vec::new();
    for variable in ["pr", "pr_bad", "olr"] {
        tasks.push(Task::Spectrum {
            variable: variable.into(),
            level: 0,
        });
    }
    for variable in ["pr", "pr_model", "pr_bad"] {
        tasks.push(Task::Activity {
            variable: variable.into(),
            mode: WaveMode::Kelvin,
            level: 0,
        });
    }
    for model in ["pr_model", "pr_bad"] {
        tasks.push(Task::Skill {
            model: model.into(),
            observed: "pr".into(),
            mode: WaveMode::Kelvin,
            level: 0,
        });
    }
    tasks.extend(Task::coherence_profile("pr", 0, "ta", WaveMode::Kelvin, [0, 1]));
    tasks
}

#[test]
fn pool_uses_configured_threads() {
    assert_eq!(runner().threads(), 2);
}

#[test]
fn failing_units_do_not_abort_siblings() {
    let report = runner().run(&inputs(), &tasks());

    assert_eq!(report.spectra.len(), 1);
    assert_eq!(report.activity.len(), 2);
    assert_eq!(report.skill.len(), 1);
    assert_eq!(report.coherence.len(), 2);
    assert_eq!(report.failures.len(), 4);
    assert!(!report.is_complete());

    let failed: Vec<(TaskKind, String)> = report
        .failures
        .iter()
        .map(|f| (f.kind, f.key.to_string()))
        .collect();
    assert!(failed.contains(&(TaskKind::Spectrum, "olr@0".to_string())));
    assert!(failed.contains(&(TaskKind::Spectrum, "pr_bad@0".to_string())));
    assert!(failed.contains(&(TaskKind::Activity, "pr_bad/kelvin@0".to_string())));
    assert!(failed.contains(&(TaskKind::Skill, "pr_bad/kelvin@0 vs pr@0".to_string())));
}

#[test]
fn failures_carry_time_range_and_message() {
    let report = runner().run(&inputs(), &tasks());
    let bad = report
        .failures
        .iter()
        .find(|f| f.kind == TaskKind::Spectrum && f.key.variable == "pr_bad")
        .unwrap();
    let (start, end) = bad.time_range.unwrap();
    assert_eq!(start, NaiveDate::from_ymd_opt(2010, 3, 1).unwrap());
    assert_eq!(end, NaiveDate::from_ymd_opt(2010, 7, 6).unwrap());
    assert!(bad.message.contains("missing"));

    let unknown = report.failures.iter().find(|f| f.key.variable == "olr").unwrap();
    assert!(unknown.time_range.is_none());
    assert!(unknown.message.contains("field 'olr'"));

    let json = serde_json::to_value(bad).unwrap();
    assert_eq!(json["kind"], "spectrum");
    assert_eq!(json["key"]["variable"], "pr_bad");
}

#[test]
fn skill_runs_on_activity_results() {
    let report = runner().run(&inputs(), &tasks());
    let score = &report.skill[&key("pr_model", Some(WaveMode::Kelvin), 0).with_against("pr", 0)];
    assert_relative_eq!(score.correlation.unwrap(), 1.0, epsilon = 1e-9);
    assert_relative_eq!(score.amplitude_ratio.unwrap(), 0.8, epsilon = 1e-9);
    assert_relative_eq!(score.activity_ratio.unwrap(), 0.8, epsilon = 1e-9);
    assert_eq!(score.n_samples, N_TIME);
}

#[test]
fn spectrum_unit_finds_the_wave() {
    let report = runner().run(&inputs(), &tasks());
    let out = &report.spectra[&key("pr", None, 0)];
    let significant = out.symmetric.significant_bins();
    assert!(significant.contains(&(3, 0.125)));
    // raw power splits exactly into the two components
    let raw = out.decomposition.raw.total_power();
    let parts = out.decomposition.symmetric.total_power() + out.decomposition.antisymmetric.total_power();
    assert_relative_eq!(raw, parts, max_relative = 1e-9);
}

#[test]
fn coherence_profile_by_level() {
    let report = runner().run(&inputs(), &tasks());
    let profile = report.coherence_profile("pr", "ta", WaveMode::Kelvin);
    assert_eq!(profile.len(), 2);
    assert_eq!(profile[0].level, Some(850.0));
    assert!(profile[0].estimate.coherence_squared > 0.9);
    assert!(profile[1].estimate.coherence_squared < profile[0].estimate.coherence_squared);
    assert!((0.0..=1.0).contains(&profile[1].estimate.coherence_squared));
}

#[test]
fn one_model_scored_against_two_observations() {
    let obs = kelvin_values(7);
    let inputs = inputs()
        .with_field("obs_a", field("obs_a", obs.clone()))
        .with_field("obs_b", field("obs_b", obs.mapv(|v| -v)));
    let mut tasks = Vec::new();
    for variable in ["pr_model", "obs_a", "obs_b"] {
        tasks.push(Task::Activity {
            variable: variable.into(),
            mode: WaveMode::Kelvin,
            level: 0,
        });
    }
    for observed in ["obs_a", "obs_b"] {
        tasks.push(Task::Skill {
            model: "pr_model".into(),
            observed: observed.into(),
            mode: WaveMode::Kelvin,
            level: 0,
        });
    }

    let report = runner().run(&inputs, &tasks);
    assert!(report.is_complete());
    assert_eq!(report.skill.len(), 2);

    let model = key("pr_model", Some(WaveMode::Kelvin), 0);
    let a = &report.skill[&model.clone().with_against("obs_a", 0)];
    let b = &report.skill[&model.with_against("obs_b", 0)];
    assert_relative_eq!(a.correlation.unwrap(), 1.0, epsilon = 1e-9);
    assert_relative_eq!(b.correlation.unwrap(), -1.0, epsilon = 1e-9);
}

#[test]
fn coherence_against_two_references() {
    let mut tasks = Task::coherence_profile("pr", 0, "ta", WaveMode::Kelvin, [0]);
    tasks.extend(Task::coherence_profile("pr_model", 0, "ta", WaveMode::Kelvin, [0]));
    let report = runner().run(&inputs(), &tasks);
    assert_eq!(report.coherence.len(), 2);
    assert_eq!(report.coherence_profile("pr", "ta", WaveMode::Kelvin).len(), 1);
    assert_eq!(report.coherence_profile("pr_model", "ta", WaveMode::Kelvin).len(), 1);
}
