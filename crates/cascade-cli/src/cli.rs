use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Gamma Cascade CLI - Monte Carlo simulation of nuclear recoil energies from prompt gamma-ray cascades.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a seeded batch of gamma cascades and collect recoil kinetic energies.
    Simulate(SimulateArgs),
    /// Load a level scheme, list its levels and report consistency problems.
    Inspect(InspectArgs),
}

/// Arguments for the `simulate` subcommand.
#[derive(Args, Debug, Default)]
pub struct SimulateArgs {
    // --- Inputs ---
    /// Level files (.dat, .toml) or directories containing them.
    /// Overrides `levels` from the config file.
    #[arg(short, long, value_name = "PATH", num_args(1..))]
    pub levels: Vec<PathBuf>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Simulation Overrides ---
    /// Energy (keV) of the level each cascade starts from.
    /// Defaults to the highest level in the scheme.
    #[arg(short = 'e', long, value_name = "KEV")]
    pub start_energy: Option<f64>,

    /// Half-life (s) at or above which a level ends the cascade.
    #[arg(short = 't', long, value_name = "SECONDS")]
    pub half_life_threshold: Option<f64>,

    /// Number of cascades to simulate.
    #[arg(short = 'n', long, value_name = "INT")]
    pub samples: Option<usize>,

    /// Seed for the random number generator. A random seed is chosen and logged
    /// when none is given.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Maximum number of emissions in a single cascade.
    #[arg(long, value_name = "INT")]
    pub max_steps: Option<usize>,

    /// Fail instead of warning when the level scheme has consistency problems.
    #[arg(long)]
    pub strict: bool,

    // --- Outputs ---
    /// Write every sampled recoil energy to this CSV file.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Write a density-normalized histogram of the recoil energies to this CSV file.
    #[arg(long, value_name = "PATH")]
    pub histogram: Option<PathBuf>,

    /// Histogram bin width in keV.
    #[arg(long, value_name = "KEV")]
    pub bin_width: Option<f64>,

    /// Upper edge of the histogram range in keV.
    #[arg(long, value_name = "KEV")]
    pub max_energy: Option<f64>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S simulation.samples=50000
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Level files (.dat, .toml) or directories containing them.
    #[arg(short, long, required = true, value_name = "PATH", num_args(1..))]
    pub levels: Vec<PathBuf>,

    /// Half-life (s) used to decide which levels a cascade passes through.
    #[arg(short = 't', long, value_name = "SECONDS")]
    pub half_life_threshold: Option<f64>,

    /// Export the merged level scheme as a single TOML file.
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,
}
