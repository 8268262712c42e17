//! Skill scoring configuration.

/// How model and observed time axes are matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Alignment {
    /// Axes must be identical.
    #[default]
    Strict,
    /// Keep only time stamps present in both and report what was dropped.
    Intersect,
}

/// Configuration for the skill scorer.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillConfig {
    alignment: Alignment,
    time_tolerance: f64,
}

impl Default for SkillConfig {
    fn default() -> Self {
        Self {
            alignment: Alignment::Strict,
            time_tolerance: 1e-6,
        }
    }
}

impl SkillConfig {
    /// Set the alignment policy.
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Set the tolerance in days within which two time stamps are equal.
    pub fn with_time_tolerance(mut self, tolerance: f64) -> Self {
        self.time_tolerance = tolerance;
        self
    }

    /// Returns the alignment policy.
    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    /// Returns the time tolerance in days.
    pub fn time_tolerance(&self) -> f64 {
        self.time_tolerance
    }
}
