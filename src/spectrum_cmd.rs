//! Spectrum command: spectra of a single field document.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::{info, info_span};

use ccew_batch::{BatchInputs, BatchRunner, Task};

use crate::cli::SpectrumArgs;
use crate::config::CcewConfig;
use crate::output::SpectrumJson;
use crate::{convert, fields, load_config};

/// Compute and write raw, background and normalized spectra of one field.
pub fn run(args: SpectrumArgs) -> Result<()> {
    let _cmd = info_span!("spectrum").entered();
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => CcewConfig::default(),
    };
    let batch_cfg = convert::build_batch_config(&config, None)?;
    let translator = convert::build_translator(&config.variables)?;
    let field = fields::read_field(&args.field, &translator, &config.io.convention)?;
    let name = field.name().to_string();

    let inputs = BatchInputs::new().with_field(name.clone(), Arc::new(field));
    let task = Task::Spectrum {
        variable: name,
        level: args.level,
    };
    let key = task.key();
    let runner = BatchRunner::new(batch_cfg).context("failed to set up batch runner")?;
    let mut report = runner.run(&inputs, &[task]);
    if let Some(failure) = report.failures.first() {
        bail!("spectrum of {} failed: {}", failure.key, failure.message);
    }
    let spectrum = report
        .spectra
        .remove(&key)
        .with_context(|| format!("no spectrum produced for {key}"))?;

    let json = serde_json::to_string_pretty(&SpectrumJson::new(key, &spectrum))
        .context("failed to serialize spectrum")?;
    let out_path = args
        .output
        .unwrap_or_else(|| args.field.with_extension("spectrum.json"));
    std::fs::write(&out_path, json).with_context(|| format!("failed to write spectrum: {}", out_path.display()))?;
    info!(path = %out_path.display(), "spectrum written");
    Ok(())
}
