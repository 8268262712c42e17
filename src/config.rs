use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Deserialize;

/// Top-level `ccew.toml` configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CcewConfig {
    /// Input and output locations.
    #[serde(default)]
    pub io: IoConfig,

    /// Segmenting, tapering and missing-data policy.
    #[serde(default)]
    pub spectral: SpectralToml,

    /// Background smoothing and significance.
    #[serde(default)]
    pub background: BackgroundToml,

    /// Latitude band for spectra and band averages.
    #[serde(default)]
    pub band: BandToml,

    /// Multi-level coherence.
    #[serde(default)]
    pub coherence: CoherenceToml,

    /// Model-versus-observation skill.
    #[serde(default)]
    pub skill: SkillToml,

    /// Batch planning and worker pool.
    #[serde(default)]
    pub batch: BatchToml,

    /// Variable translation table keyed by CF name.
    #[serde(default)]
    pub variables: BTreeMap<String, VariableToml>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IoConfig {
    /// Field name -> JSON field document.
    #[serde(default)]
    pub fields: BTreeMap<String, PathBuf>,
    /// JSON wave basis document.
    pub basis: Option<PathBuf>,
    pub output: Option<PathBuf>,
    /// Naming convention the field documents use.
    #[serde(default = "default_convention")]
    pub convention: String,
    /// Optional analysis period, inclusive.
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            fields: BTreeMap::new(),
            basis: None,
            output: None,
            convention: default_convention(),
            start: None,
            end: None,
        }
    }
}

fn default_convention() -> String {
    ccew_grid::CF_CONVENTION.to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpectralToml {
    #[serde(default = "default_segment_length")]
    pub segment_length: usize,
    #[serde(default = "default_overlap")]
    pub overlap: usize,
    #[serde(default = "default_taper_fraction")]
    pub taper_fraction: f64,
    #[serde(default)]
    pub max_missing_fraction: f64,
    #[serde(default = "default_linear")]
    pub detrend: String,
    #[serde(default = "default_linear")]
    pub gap_fill: String,
}

impl Default for SpectralToml {
    fn default() -> Self {
        Self {
            segment_length: default_segment_length(),
            overlap: default_overlap(),
            taper_fraction: default_taper_fraction(),
            max_missing_fraction: 0.0,
            detrend: default_linear(),
            gap_fill: default_linear(),
        }
    }
}

fn default_segment_length() -> usize {
    96
}
fn default_overlap() -> usize {
    60
}
fn default_taper_fraction() -> f64 {
    0.1
}
fn default_linear() -> String {
    "linear".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackgroundToml {
    #[serde(default = "default_frequency_passes")]
    pub frequency_passes: usize,
    /// Wavenumber smoothing passes by frequency range.
    #[serde(default = "default_schedule")]
    pub schedule: Vec<PassesToml>,
    #[serde(default = "default_high_frequency_passes")]
    pub high_frequency_passes: usize,
    #[serde(default = "default_floor_fraction")]
    pub floor_fraction: f64,
    #[serde(default)]
    pub significance: SignificanceToml,
}

impl Default for BackgroundToml {
    fn default() -> Self {
        Self {
            frequency_passes: default_frequency_passes(),
            schedule: default_schedule(),
            high_frequency_passes: default_high_frequency_passes(),
            floor_fraction: default_floor_fraction(),
            significance: SignificanceToml::default(),
        }
    }
}

/// `passes` wavenumber passes for frequencies up to `below` cpd.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PassesToml {
    pub below: f64,
    pub passes: usize,
}

fn default_frequency_passes() -> usize {
    10
}
fn default_schedule() -> Vec<PassesToml> {
    [(0.1, 5), (0.2, 10), (0.3, 20)]
        .iter()
        .map(|&(below, passes)| PassesToml { below, passes })
        .collect()
}
fn default_high_frequency_passes() -> usize {
    40
}
fn default_floor_fraction() -> f64 {
    1e-6
}

/// Significance threshold: exactly one of `fixed` or `confidence` should be set.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignificanceToml {
    pub fixed: Option<f64>,
    /// Chi-squared confidence level.
    pub confidence: Option<f64>,
}

impl Default for SignificanceToml {
    fn default() -> Self {
        Self {
            fixed: Some(1.1),
            confidence: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BandToml {
    #[serde(default = "default_south")]
    pub south: f64,
    #[serde(default = "default_north")]
    pub north: f64,
}

impl Default for BandToml {
    fn default() -> Self {
        Self {
            south: default_south(),
            north: default_north(),
        }
    }
}

fn default_south() -> f64 {
    -15.0
}
fn default_north() -> f64 {
    15.0
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoherenceToml {
    /// Field filtered to each mode's band and used as reference.
    pub reference: Option<String>,
    #[serde(default)]
    pub reference_level: usize,
    /// Level-resolved target fields.
    #[serde(default)]
    pub variables: Vec<String>,
    /// Level indices; every level of the target when unset.
    pub levels: Option<Vec<usize>>,
    /// Modes whose bands are analysed; Kelvin when empty.
    #[serde(default)]
    pub modes: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SkillToml {
    #[serde(default = "default_alignment")]
    pub alignment: String,
    #[serde(default = "default_time_tolerance")]
    pub time_tolerance: f64,
    #[serde(default)]
    pub pairs: Vec<SkillPairToml>,
}

impl Default for SkillToml {
    fn default() -> Self {
        Self {
            alignment: default_alignment(),
            time_tolerance: default_time_tolerance(),
            pairs: Vec::new(),
        }
    }
}

fn default_alignment() -> String {
    "strict".to_string()
}
fn default_time_tolerance() -> f64 {
    1e-6
}

/// A model field scored against an observed field.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SkillPairToml {
    pub model: String,
    pub observed: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchToml {
    /// Worker threads; 0 uses every core.
    #[serde(default)]
    pub threads: usize,
    /// Level index for spectra and activity.
    #[serde(default)]
    pub level: usize,
    /// Fields to compute spectra for; all fields when unset.
    pub spectra: Option<Vec<String>>,
    /// Fields to project onto the basis; all fields when unset.
    pub activity: Option<Vec<String>>,
    /// Modes to project; every basis mode when empty.
    #[serde(default)]
    pub modes: Vec<String>,
}

/// One translation entry.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariableToml {
    /// Convention -> native name.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub offset: f64,
    pub units: Option<String>,
}

fn default_scale() -> f64 {
    1.0
}
