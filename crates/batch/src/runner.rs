//! Worker pool executing batch units.

use std::collections::BTreeMap;
use std::sync::Arc;

use ccew_coherence::{CoherenceAnalyzer, LevelCoherence};
use ccew_grid::{GridField, TimeAxis};
use ccew_skill::SkillScorer;
use ccew_spectral::{BackgroundEstimator, SpectralTransformer, bandpass, normalize};
use ccew_wave::{WaveActivity, WaveBand, WaveBasis, WaveBasisProjector, WaveMode};
use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::BatchConfig;
use crate::error::BatchError;
use crate::report::{BatchReport, SpectrumOutput, UnitFailure};
use crate::task::{Task, TaskKind, UnitKey};

/// Read-only inputs shared by all units.
#[derive(Debug, Clone, Default)]
pub struct BatchInputs {
    fields: BTreeMap<String, Arc<GridField>>,
    basis: Option<Arc<WaveBasis>>,
}

impl BatchInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a field under `name`.
    pub fn with_field(mut self, name: impl Into<String>, field: Arc<GridField>) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    pub fn with_basis(mut self, basis: Arc<WaveBasis>) -> Self {
        self.basis = Some(basis);
        self
    }

    /// Field registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::MissingInput`] for an unknown name.
    pub fn field(&self, name: &str) -> Result<&Arc<GridField>, BatchError> {
        self.fields
            .get(name)
            .ok_or_else(|| BatchError::MissingInput(format!("field '{name}'")))
    }

    pub fn basis(&self) -> Option<&Arc<WaveBasis>> {
        self.basis.as_ref()
    }

    /// Registered field names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

enum UnitOutput {
    Spectrum(Box<SpectrumOutput>),
    Activity(WaveActivity),
    Coherence(LevelCoherence),
}

fn time_range(axis: &TimeAxis) -> Option<(NaiveDate, NaiveDate)> {
    let last = axis.len().checked_sub(1)?;
    Some((axis.date_at(0)?, axis.date_at(last)?))
}

/// Runs batches of tasks on a dedicated rayon pool.
///
/// Units are independent: a failing unit is recorded in
/// [`BatchReport::failures`] and its siblings still run.
pub struct BatchRunner {
    config: BatchConfig,
    pool: rayon::ThreadPool,
    transformer: SpectralTransformer,
    background: BackgroundEstimator,
    coherence: CoherenceAnalyzer,
    scorer: SkillScorer,
}

impl BatchRunner {
    /// Validate `config` and build the worker pool.
    ///
    /// # Errors
    ///
    /// Returns configuration errors and [`BatchError::ThreadPool`] when the
    /// pool cannot be built.
    pub fn new(config: BatchConfig) -> Result<Self, BatchError> {
        config.validate()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads())
            .thread_name(|i| format!("ccew-worker-{i}"))
            .build()
            .map_err(|e| BatchError::ThreadPool(e.to_string()))?;
        Ok(Self {
            transformer: SpectralTransformer::new(config.spectral().clone())?,
            background: BackgroundEstimator::new(config.background().clone())?,
            coherence: CoherenceAnalyzer::new(config.spectral().clone())?,
            scorer: SkillScorer::new(config.skill().clone()),
            pool,
            config,
        })
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Number of worker threads.
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Execute `tasks`.
    ///
    /// Spectrum, activity and coherence units run first, in parallel. Skill
    /// units then run over the activity results; a skill unit whose activity
    /// input failed is itself recorded as failed.
    #[tracing::instrument(skip_all, fields(n_tasks = tasks.len(), threads = self.threads()))]
    pub fn run(&self, inputs: &BatchInputs, tasks: &[Task]) -> BatchReport {
        let (skill_tasks, first): (Vec<&Task>, Vec<&Task>) =
            tasks.iter().partition(|t| t.kind() == TaskKind::Skill);

        let results: Vec<(&Task, Result<UnitOutput, UnitFailure>)> = self.pool.install(|| {
            first
                .par_iter()
                .map(|&task| (task, self.execute(inputs, task)))
                .collect()
        });

        let mut report = BatchReport::default();
        for (task, result) in results {
            match result {
                Ok(UnitOutput::Spectrum(s)) => {
                    report.spectra.insert(task.key(), *s);
                }
                Ok(UnitOutput::Activity(a)) => {
                    report.activity.insert(task.key(), a);
                }
                Ok(UnitOutput::Coherence(c)) => {
                    report.coherence.insert(task.key(), c);
                }
                Err(f) => report.failures.push(f),
            }
        }
        info!(
            succeeded = report.succeeded(),
            failed = report.failures.len(),
            "spectral units complete"
        );

        if !skill_tasks.is_empty() {
            let activity = &report.activity;
            let scored: Vec<_> = self.pool.install(|| {
                skill_tasks
                    .par_iter()
                    .map(|&task| (task.key(), self.score(activity, task)))
                    .collect()
            });
            for (key, result) in scored {
                match result {
                    Ok(score) => {
                        report.skill.insert(key, score);
                    }
                    Err(f) => report.failures.push(f),
                }
            }
            info!(n_skill = report.skill.len(), "skill units complete");
        }

        report.failures.sort_by(|a, b| a.key.cmp(&b.key));
        report
    }

    fn failure(task: &Task, time: Option<&TimeAxis>, err: BatchError) -> UnitFailure {
        let key = task.key();
        warn!(unit = %key, kind = ?task.kind(), error = %err, "unit failed");
        UnitFailure {
            kind: task.kind(),
            key,
            time_range: time.and_then(time_range),
            message: err.to_string(),
        }
    }

    fn execute(&self, inputs: &BatchInputs, task: &Task) -> Result<UnitOutput, UnitFailure> {
        match task {
            Task::Spectrum { variable, level } => {
                Self::on_field(inputs, task, variable, |f| self.spectrum(f, *level))
            }
            Task::Activity { variable, mode, level } => {
                Self::on_field(inputs, task, variable, |f| self.activity(inputs, f, *mode, *level))
            }
            Task::Coherence {
                reference,
                reference_level,
                variable,
                mode,
                level,
            } => Self::on_field(inputs, task, variable, |f| {
                self.level_coherence(inputs, reference, *reference_level, f, *mode, *level)
            }),
            Task::Skill { .. } => Err(Self::failure(
                task,
                None,
                BatchError::MissingInput("skill units need activity results".into()),
            )),
        }
    }

    fn on_field<F>(inputs: &BatchInputs, task: &Task, variable: &str, unit: F) -> Result<UnitOutput, UnitFailure>
    where
        F: FnOnce(&GridField) -> Result<UnitOutput, BatchError>,
    {
        let field = inputs.field(variable).map_err(|e| Self::failure(task, None, e))?;
        unit(field.as_ref()).map_err(|e| Self::failure(task, Some(field.time()), e))
    }

    fn spectrum(&self, field: &GridField, level: usize) -> Result<UnitOutput, BatchError> {
        let decomposition = self.transformer.decompose(field, self.config.lat_band(), level)?;
        let background = self.background.estimate(&decomposition.background_source()?)?;
        let significance = self.config.significance();
        let symmetric = normalize(&decomposition.symmetric, &background, significance)?;
        let antisymmetric = normalize(&decomposition.antisymmetric, &background, significance)?;
        Ok(UnitOutput::Spectrum(Box::new(SpectrumOutput {
            decomposition,
            background,
            symmetric,
            antisymmetric,
        })))
    }

    fn activity(
        &self,
        inputs: &BatchInputs,
        field: &GridField,
        mode: WaveMode,
        level: usize,
    ) -> Result<UnitOutput, BatchError> {
        let basis = inputs
            .basis()
            .ok_or_else(|| BatchError::MissingInput("wave basis".into()))?;
        let projector = WaveBasisProjector::new(Arc::clone(basis), self.config.spectral().clone())?;
        Ok(UnitOutput::Activity(projector.project(field, level, mode)?))
    }

    fn level_coherence(
        &self,
        inputs: &BatchInputs,
        reference: &str,
        reference_level: usize,
        target: &GridField,
        mode: WaveMode,
        level: usize,
    ) -> Result<UnitOutput, BatchError> {
        // the basis may carry a tuned band for the mode
        let band = inputs
            .basis()
            .and_then(|b| b.pattern(mode).ok())
            .map(|p| *p.band())
            .unwrap_or_else(|| WaveBand::for_mode(mode));
        let lat_band = self.config.lat_band();
        let raw = inputs.field(reference)?.band_average(lat_band, reference_level)?;
        let filtered = bandpass(&raw, self.config.spectral(), |s, f| band.contains(s, f))?;
        let series = target.band_average(lat_band, level)?;
        let estimate = self.coherence.band_coherence(&filtered, &series, &band)?;
        Ok(UnitOutput::Coherence(LevelCoherence {
            level_index: level,
            level: target.levels().and_then(|l| l.get(level).copied()),
            estimate,
        }))
    }

    fn score(
        &self,
        activity: &BTreeMap<UnitKey, WaveActivity>,
        task: &Task,
    ) -> Result<ccew_skill::SkillScore, UnitFailure> {
        let Task::Skill {
            model,
            observed,
            mode,
            level,
        } = task
        else {
            return Err(Self::failure(task, None, BatchError::MissingInput("not a skill task".into())));
        };
        let lookup = |variable: &String| {
            let key = UnitKey::new(variable.as_str(), Some(*mode), Some(*level));
            activity
                .get(&key)
                .ok_or_else(|| BatchError::MissingInput(format!("activity for {key}")))
        };
        let m = lookup(model).map_err(|e| Self::failure(task, None, e))?;
        let o = lookup(observed).map_err(|e| Self::failure(task, Some(m.time()), e))?;
        self.scorer
            .score(m, o)
            .map_err(|e| Self::failure(task, Some(o.time()), e.into()))
    }
}
