//! Pure conversion functions: TOML config structs -> crate API config types.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result, bail};

use ccew_batch::{BatchConfig, Task};
use ccew_grid::{LatBand, UnitConversion, VariableEntry, VariableTranslator};
use ccew_skill::{Alignment, SkillConfig};
use ccew_spectral::{BackgroundConfig, Detrend, GapFill, Significance, SpectralConfig};
use ccew_wave::WaveMode;

use crate::config::*;

/// Parses a detrending method name.
pub fn parse_detrend(s: &str) -> Result<Detrend> {
    match s.to_lowercase().as_str() {
        "mean" => Ok(Detrend::Mean),
        "linear" => Ok(Detrend::Linear),
        other => bail!("unknown detrend method: {other:?}"),
    }
}

/// Parses a gap-fill method name.
pub fn parse_gap_fill(s: &str) -> Result<GapFill> {
    match s.to_lowercase().as_str() {
        "linear" => Ok(GapFill::Linear),
        "mean" => Ok(GapFill::Mean),
        other => bail!("unknown gap fill method: {other:?}"),
    }
}

/// Parses a time alignment policy name.
pub fn parse_alignment(s: &str) -> Result<Alignment> {
    match s.to_lowercase().as_str() {
        "strict" => Ok(Alignment::Strict),
        "intersect" => Ok(Alignment::Intersect),
        other => bail!("unknown alignment: {other:?}"),
    }
}

/// Converts a TOML significance setting.
///
/// Exactly one of `fixed` or `confidence` must be set.
pub fn parse_significance(s: &SignificanceToml) -> Result<Significance> {
    match (s.fixed, s.confidence) {
        (Some(t), None) => Ok(Significance::Fixed(t)),
        (None, Some(confidence)) => Ok(Significance::ChiSquared { confidence }),
        (Some(_), Some(_)) => bail!("significance must have exactly one of fixed or confidence, got both"),
        (None, None) => bail!("significance must have exactly one of fixed or confidence, got neither"),
    }
}

/// Parses a list of mode names.
pub fn parse_modes(names: &[String]) -> Result<Vec<WaveMode>> {
    names
        .iter()
        .map(|n| n.parse::<WaveMode>().with_context(|| format!("invalid mode in config: {n:?}")))
        .collect()
}

/// Builds a [`SpectralConfig`] from the TOML spectral configuration.
pub fn build_spectral_config(spectral: &SpectralToml) -> Result<SpectralConfig> {
    let cfg = SpectralConfig::new(spectral.segment_length, spectral.overlap)
        .with_taper_fraction(spectral.taper_fraction)
        .with_max_missing_fraction(spectral.max_missing_fraction)
        .with_detrend(parse_detrend(&spectral.detrend)?)
        .with_gap_fill(parse_gap_fill(&spectral.gap_fill)?);
    cfg.validate().context("invalid [spectral] section")?;
    Ok(cfg)
}

/// Builds a [`BackgroundConfig`] from the TOML background configuration.
pub fn build_background_config(background: &BackgroundToml) -> Result<BackgroundConfig> {
    let schedule = background.schedule.iter().map(|p| (p.below, p.passes)).collect();
    let cfg = BackgroundConfig::default()
        .with_frequency_passes(background.frequency_passes)
        .with_wavenumber_schedule(schedule, background.high_frequency_passes)
        .with_floor_fraction(background.floor_fraction);
    cfg.validate().context("invalid [background] section")?;
    Ok(cfg)
}

/// Builds the latitude band.
pub fn build_lat_band(band: &BandToml) -> Result<LatBand> {
    LatBand::new(band.south, band.north).context("invalid [band] section")
}

/// Builds a [`SkillConfig`] from the TOML skill configuration.
pub fn build_skill_config(skill: &SkillToml) -> Result<SkillConfig> {
    if !(skill.time_tolerance.is_finite() && skill.time_tolerance >= 0.0) {
        bail!("skill time_tolerance must be non-negative, got {}", skill.time_tolerance);
    }
    Ok(SkillConfig::default()
        .with_alignment(parse_alignment(&skill.alignment)?)
        .with_time_tolerance(skill.time_tolerance))
}

/// Builds a [`BatchConfig`] from the whole configuration.
///
/// `threads` overrides `[batch].threads` when given.
pub fn build_batch_config(config: &CcewConfig, threads: Option<usize>) -> Result<BatchConfig> {
    Ok(BatchConfig::default()
        .with_threads(threads.unwrap_or(config.batch.threads))
        .with_spectral(build_spectral_config(&config.spectral)?)
        .with_background(build_background_config(&config.background)?)
        .with_significance(parse_significance(&config.background.significance)?)
        .with_lat_band(build_lat_band(&config.band)?)
        .with_skill(build_skill_config(&config.skill)?))
}

/// Builds the variable translator from the `[variables]` table.
pub fn build_translator(variables: &BTreeMap<String, VariableToml>) -> Result<VariableTranslator> {
    let mut translator = VariableTranslator::new();
    for (cf_name, v) in variables {
        let mut entry = VariableEntry::new(cf_name).with_conversion(UnitConversion {
            scale: v.scale,
            offset: v.offset,
            units: v.units.clone(),
        });
        for (convention, native) in &v.aliases {
            entry = entry.with_alias(convention, native);
        }
        translator = translator
            .with_entry(entry)
            .with_context(|| format!("invalid [variables.{cf_name}] entry"))?;
    }
    Ok(translator)
}

/// Expands the configuration into batch tasks.
///
/// `fields` maps each loaded field name to its number of levels;
/// `basis_modes` lists the modes of the loaded basis (empty without one).
pub fn plan_tasks(config: &CcewConfig, fields: &BTreeMap<String, usize>, basis_modes: &[WaveMode]) -> Result<Vec<Task>> {
    let level = config.batch.level;
    let all: Vec<String> = fields.keys().cloned().collect();
    let known = |name: &String, section: &str| -> Result<()> {
        if fields.contains_key(name) {
            Ok(())
        } else {
            bail!("[{section}] names unknown field {name:?}")
        }
    };

    let mut tasks = Vec::new();
    for variable in config.batch.spectra.as_ref().unwrap_or(&all) {
        known(variable, "batch")?;
        tasks.push(Task::Spectrum {
            variable: variable.clone(),
            level,
        });
    }

    let modes = if config.batch.modes.is_empty() {
        basis_modes.to_vec()
    } else {
        parse_modes(&config.batch.modes)?
    };
    let mut projected: BTreeSet<&String> = BTreeSet::new();
    if !basis_modes.is_empty() {
        projected.extend(config.batch.activity.as_ref().unwrap_or(&all));
    }
    for pair in &config.skill.pairs {
        known(&pair.model, "skill")?;
        known(&pair.observed, "skill")?;
        projected.insert(&pair.model);
        projected.insert(&pair.observed);
    }
    if !projected.is_empty() && basis_modes.is_empty() {
        bail!("activity and skill need a wave basis: set [io].basis");
    }
    for variable in &projected {
        known(*variable, "batch")?;
        for &mode in &modes {
            tasks.push(Task::Activity {
                variable: (*variable).clone(),
                mode,
                level,
            });
        }
    }
    for pair in &config.skill.pairs {
        for &mode in &modes {
            tasks.push(Task::Skill {
                model: pair.model.clone(),
                observed: pair.observed.clone(),
                mode,
                level,
            });
        }
    }

    if let Some(reference) = &config.coherence.reference {
        known(reference, "coherence")?;
        let coherence_modes = if config.coherence.modes.is_empty() {
            vec![WaveMode::Kelvin]
        } else {
            parse_modes(&config.coherence.modes)?
        };
        for variable in &config.coherence.variables {
            known(variable, "coherence")?;
            let levels = match &config.coherence.levels {
                Some(levels) => levels.clone(),
                None => (0..fields[variable]).collect(),
            };
            for &mode in &coherence_modes {
                tasks.extend(Task::coherence_profile(
                    reference,
                    config.coherence.reference_level,
                    variable,
                    mode,
                    levels.iter().copied(),
                ));
            }
        }
    }
    Ok(tasks)
}
