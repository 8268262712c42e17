mod cli;
mod config;
mod convert;
mod fields;
mod logging;
mod output;
mod run_cmd;
mod spectrum_cmd;

use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use crate::cli::{Cli, Command};
use crate::config::CcewConfig;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Run(args) => run_cmd::run(args),
        Command::Spectrum(args) => spectrum_cmd::run(args),
    }
}

/// Load and parse a TOML configuration file.
pub(crate) fn load_config(path: &Path) -> Result<CcewConfig> {
    let toml_str =
        std::fs::read_to_string(path).with_context(|| format!("failed to read config file: {}", path.display()))?;
    toml::from_str(&toml_str).context("failed to parse TOML config")
}
