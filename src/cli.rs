use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Space-time spectral diagnostics for convectively coupled equatorial waves.
#[derive(Parser)]
#[command(
    name = "ccew",
    version,
    about = "Wavenumber-frequency spectra, wave activity, coherence and skill"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Run every diagnostic the configuration plans.
    Run(RunArgs),
    /// Compute the spectra of a single field document.
    Spectrum(SpectrumArgs),
}

/// Arguments for the `run` subcommand.
#[derive(clap::Args)]
pub struct RunArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "ccew.toml")]
    pub config: PathBuf,

    /// Override output JSON path from config.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Override worker thread count from config.
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,
}

/// Arguments for the `spectrum` subcommand.
#[derive(clap::Args)]
pub struct SpectrumArgs {
    /// JSON field document.
    #[arg(short, long)]
    pub field: PathBuf,

    /// Optional TOML configuration for spectral, background and band settings.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Level index to analyse.
    #[arg(short, long, default_value_t = 0)]
    pub level: usize,

    /// Output JSON path; defaults to the field path with a `.spectrum.json` extension.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
