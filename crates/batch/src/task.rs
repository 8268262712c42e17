//! Unit-of-work descriptors.

use std::fmt;

use ccew_wave::WaveMode;
use serde::Serialize;

/// The field a unit is compared against: the observation of a skill unit
/// or the reference of a coherence unit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Counterpart {
    pub variable: String,
    /// Level index.
    pub level: usize,
}

/// Identifies one unit's result or failure.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct UnitKey {
    pub variable: String,
    pub mode: Option<WaveMode>,
    /// Level index.
    pub level: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub against: Option<Counterpart>,
}

impl UnitKey {
    /// Key of a single-field unit.
    pub fn new(variable: impl Into<String>, mode: Option<WaveMode>, level: Option<usize>) -> Self {
        Self {
            variable: variable.into(),
            mode,
            level,
            against: None,
        }
    }

    pub fn with_against(mut self, variable: impl Into<String>, level: usize) -> Self {
        self.against = Some(Counterpart {
            variable: variable.into(),
            level,
        });
        self
    }
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.variable)?;
        if let Some(mode) = self.mode {
            write!(f, "/{mode}")?;
        }
        if let Some(level) = self.level {
            write!(f, "@{level}")?;
        }
        if let Some(c) = &self.against {
            write!(f, " vs {}@{}", c.variable, c.level)?;
        }
        Ok(())
    }
}

/// Which component a task runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Spectrum,
    Activity,
    Coherence,
    Skill,
}

/// One independent unit of work.
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    /// Raw, symmetric and antisymmetric spectra with background and
    /// normalized spectra for one variable at one level.
    Spectrum { variable: String, level: usize },
    /// Projection of one variable onto one wave mode.
    Activity {
        variable: String,
        mode: WaveMode,
        level: usize,
    },
    /// Coherence of a variable at `level` with the mode-filtered reference.
    Coherence {
        reference: String,
        reference_level: usize,
        variable: String,
        mode: WaveMode,
        level: usize,
    },
    /// Skill of `model` activity against `observed` activity. Runs after
    /// every activity unit has finished.
    Skill {
        model: String,
        observed: String,
        mode: WaveMode,
        level: usize,
    },
}

impl Task {
    /// Result key of this task.
    pub fn key(&self) -> UnitKey {
        match self {
            Task::Spectrum { variable, level } => UnitKey::new(variable.as_str(), None, Some(*level)),
            Task::Activity { variable, mode, level } => {
                UnitKey::new(variable.as_str(), Some(*mode), Some(*level))
            }
            Task::Coherence {
                reference,
                reference_level,
                variable,
                mode,
                level,
            } => UnitKey::new(variable.as_str(), Some(*mode), Some(*level))
                .with_against(reference.as_str(), *reference_level),
            Task::Skill {
                model,
                observed,
                mode,
                level,
            } => UnitKey::new(model.as_str(), Some(*mode), Some(*level)).with_against(observed.as_str(), *level),
        }
    }

    pub fn kind(&self) -> TaskKind {
        match self {
            Task::Spectrum { .. } => TaskKind::Spectrum,
            Task::Activity { .. } => TaskKind::Activity,
            Task::Coherence { .. } => TaskKind::Coherence,
            Task::Skill { .. } => TaskKind::Skill,
        }
    }

    /// One coherence task per level in `levels`.
    pub fn coherence_profile(
        reference: &str,
        reference_level: usize,
        variable: &str,
        mode: WaveMode,
        levels: impl IntoIterator<Item = usize>,
    ) -> Vec<Task> {
        levels
            .into_iter()
            .map(|level| Task::Coherence {
                reference: reference.to_string(),
                reference_level,
                variable: variable.to_string(),
                mode,
                level,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_display() {
        let spectrum = Task::Spectrum {
            variable: "olr".into(),
            level: 0,
        };
        assert_eq!(spectrum.key().to_string(), "olr@0");

        let skill = Task::Skill {
            model: "pr_model".into(),
            observed: "pr".into(),
            mode: WaveMode::Kelvin,
            level: 0,
        };
        assert_eq!(skill.key().to_string(), "pr_model/kelvin@0 vs pr@0");
        assert_eq!(skill.kind(), TaskKind::Skill);
    }

    #[test]
    fn counterpart_distinguishes_keys() {
        let skill = |observed: &str| Task::Skill {
            model: "pr_model".into(),
            observed: observed.into(),
            mode: WaveMode::Kelvin,
            level: 0,
        };
        assert_ne!(skill("gpcp").key(), skill("trmm").key());

        let a = Task::coherence_profile("pr", 0, "ta", WaveMode::Kelvin, [1]);
        let b = Task::coherence_profile("olr", 0, "ta", WaveMode::Kelvin, [1]);
        assert_ne!(a[0].key(), b[0].key());
        assert_eq!(a[0].key().to_string(), "ta/kelvin@1 vs pr@0");
    }

    #[test]
    fn single_field_keys_omit_counterpart() {
        let key = UnitKey::new("olr", None, Some(0));
        let v = serde_json::to_value(&key).unwrap();
        assert!(v.get("against").is_none());
    }

    #[test]
    fn coherence_profile_expands_levels() {
        let tasks = Task::coherence_profile("pr", 0, "ta", WaveMode::Kelvin, [0, 2, 4]);
        let levels: Vec<_> = tasks.iter().map(|t| t.key().level).collect();
        assert_eq!(levels, vec![Some(0), Some(2), Some(4)]);
        assert!(tasks.iter().all(|t| t.kind() == TaskKind::Coherence));
    }
}
