//! Run command: load fields and basis, execute the planned batch, write JSON.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::{info, info_span, warn};

use ccew_batch::{BatchInputs, BatchRunner};

use crate::cli::RunArgs;
use crate::config::CcewConfig;
use crate::{convert, fields, load_config, output};

/// Run the full diagnostics pipeline.
pub fn run(args: RunArgs) -> Result<()> {
    let _cmd = info_span!("run").entered();
    let config = load_config(&args.config)?;
    let out_path = args
        .output
        .clone()
        .or_else(|| config.io.output.clone())
        .unwrap_or_else(|| PathBuf::from("ccew-diagnostics.json"));

    let json = execute(&config, args.threads)?;
    std::fs::write(&out_path, json).with_context(|| format!("failed to write diagnostics: {}", out_path.display()))?;
    info!(path = %out_path.display(), "diagnostics written");
    Ok(())
}

/// Load inputs, run the batch and return the diagnostics JSON.
pub(crate) fn execute(config: &CcewConfig, threads: Option<usize>) -> Result<String> {
    if config.io.fields.is_empty() {
        bail!("no input fields: set [io].fields in config");
    }
    let batch_cfg = convert::build_batch_config(config, threads)?;
    let translator = convert::build_translator(&config.variables)?;

    let mut inputs = BatchInputs::new();
    let mut levels = BTreeMap::new();
    for (name, path) in &config.io.fields {
        let mut field = fields::read_field(path, &translator, &config.io.convention)?;
        if config.io.start.is_some() || config.io.end.is_some() {
            let time = field.time();
            let last = time.len().saturating_sub(1);
            let start = config.io.start.or_else(|| time.date_at(0));
            let end = config.io.end.or_else(|| time.date_at(last));
            if let (Some(start), Some(end)) = (start, end) {
                field = field
                    .crop_time(start, end)
                    .with_context(|| format!("cropping field '{name}' to {start}..{end}"))?;
            }
        }
        levels.insert(name.clone(), field.n_levels());
        inputs = inputs.with_field(name.clone(), Arc::new(field));
    }

    let mut basis_modes = Vec::new();
    if let Some(path) = &config.io.basis {
        let basis = fields::read_basis(path)?;
        basis_modes = basis.modes();
        inputs = inputs.with_basis(Arc::new(basis));
    }

    let tasks = convert::plan_tasks(config, &levels, &basis_modes)?;
    let runner = BatchRunner::new(batch_cfg).context("failed to set up batch runner")?;
    info!(n_tasks = tasks.len(), threads = runner.threads(), "running batch");
    let report = runner.run(&inputs, &tasks);

    if !report.is_complete() {
        warn!(
            failed = report.failures.len(),
            succeeded = report.succeeded(),
            "some units failed; see the failures list in the output"
        );
    }

    let diagnostics = output::build(&report)?;
    output::to_json(&diagnostics)
}
