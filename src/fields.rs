//! JSON field and wave-basis documents.
//!
//! Arrays are stored flattened in row-major order: fields as
//! `(time, level, lat, lon)`, patterns as `(lat, lon)`. Missing field
//! values are `null` or the document's fill value.

use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use ndarray::{Array2, Array4};
use serde::{Deserialize, Serialize};
use tracing::info;

use ccew_grid::{GridField, TimeAxis, VariableTranslator};
use ccew_wave::{ModePattern, WaveBand, WaveBasis, WaveMode};

/// A gridded field as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldFile {
    pub name: String,
    #[serde(default)]
    pub units: Option<String>,
    /// Calendar date the time offsets count from.
    pub origin: NaiveDate,
    /// Time offsets in days.
    pub time: Vec<f64>,
    #[serde(default)]
    pub levels: Option<Vec<f64>>,
    pub lats: Vec<f64>,
    pub lons: Vec<f64>,
    #[serde(default = "default_fill_value")]
    pub fill_value: f64,
    pub values: Vec<Option<f64>>,
}

fn default_fill_value() -> f64 {
    1.0e20
}

impl FieldFile {
    /// Build the in-memory field.
    pub fn into_field(self) -> Result<GridField> {
        let n_levels = self.levels.as_ref().map_or(1, Vec::len);
        let shape = (self.time.len(), n_levels, self.lats.len(), self.lons.len());
        let expected = shape.0 * shape.1 * shape.2 * shape.3;
        if self.values.len() != expected {
            bail!(
                "field '{}' has {} values, axes {:?} need {expected}",
                self.name,
                self.values.len(),
                shape
            );
        }
        let flat: Vec<f64> = self.values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect();
        let values = Array4::from_shape_vec(shape, flat).context("reshaping field values")?;
        let time = TimeAxis::new(self.origin, self.time)?;
        let field = GridField::new(self.name, values, time, self.levels, self.lats, self.lons, self.fill_value)?;
        Ok(match self.units {
            Some(u) => field.with_units(u),
            None => field,
        })
    }
}

/// Wavenumber-frequency band override for one pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BandFile {
    pub k_min: i32,
    pub k_max: i32,
    pub f_min: f64,
    pub f_max: f64,
}

/// One mode's pattern(s).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternFile {
    pub mode: WaveMode,
    pub primary: Vec<f64>,
    #[serde(default)]
    pub quadrature: Option<Vec<f64>>,
    #[serde(default)]
    pub band: Option<BandFile>,
}

/// A wave basis as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BasisFile {
    pub lats: Vec<f64>,
    pub lons: Vec<f64>,
    pub patterns: Vec<PatternFile>,
}

impl BasisFile {
    /// Build and validate the basis.
    pub fn into_basis(self) -> Result<WaveBasis> {
        let shape = (self.lats.len(), self.lons.len());
        let grid = |mode: WaveMode, what: &str, v: Vec<f64>| {
            Array2::from_shape_vec(shape, v)
                .with_context(|| format!("{what} pattern of {mode} does not match the {shape:?} grid"))
        };
        let mut patterns = Vec::with_capacity(self.patterns.len());
        for p in self.patterns {
            let mut pattern = ModePattern::new(p.mode, grid(p.mode, "primary", p.primary)?);
            if let Some(q) = p.quadrature {
                pattern = pattern.with_quadrature(grid(p.mode, "quadrature", q)?);
            }
            if let Some(b) = p.band {
                pattern = pattern.with_band(WaveBand::new(b.k_min, b.k_max, b.f_min, b.f_max)?);
            }
            patterns.push(pattern);
        }
        Ok(WaveBasis::new(self.lats, self.lons, patterns)?)
    }
}

/// Read a field document, rename it to its CF name and convert its units.
pub fn read_field(path: &Path, translator: &VariableTranslator, convention: &str) -> Result<GridField> {
    let text = std::fs::read_to_string(path).with_context(|| format!("failed to read field file: {}", path.display()))?;
    let doc: FieldFile =
        serde_json::from_str(&text).with_context(|| format!("failed to parse field file: {}", path.display()))?;
    let field = doc.into_field().with_context(|| format!("invalid field in {}", path.display()))?;
    let field = translator.apply(convention, &field)?;
    info!(
        path = %path.display(),
        name = field.name(),
        n_time = field.n_time(),
        n_levels = field.n_levels(),
        missing = field.missing_count(),
        "field loaded"
    );
    Ok(field)
}

/// Read a wave basis document.
pub fn read_basis(path: &Path) -> Result<WaveBasis> {
    let text = std::fs::read_to_string(path).with_context(|| format!("failed to read basis file: {}", path.display()))?;
    let doc: BasisFile =
        serde_json::from_str(&text).with_context(|| format!("failed to parse basis file: {}", path.display()))?;
    let basis = doc.into_basis().with_context(|| format!("invalid basis in {}", path.display()))?;
    info!(path = %path.display(), modes = ?basis.modes(), "basis loaded");
    Ok(basis)
}
