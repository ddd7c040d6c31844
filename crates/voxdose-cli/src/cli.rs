use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "VoxDose CLI - Inspection utilities for voxelized-phantom dose simulations: phantom/material statistics and scorer checkpoint summaries.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a phantom geometry file, compact its materials, and report statistics.
    Inspect(InspectArgs),
    /// Summarize a scorer checkpoint (.bin) file.
    Tally(TallyArgs),
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to the phantom geometry file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub phantom: PathBuf,

    /// Write the as-parsed per-voxel densities (raw f32, g/cm³) to this path.
    #[arg(long, value_name = "PATH")]
    pub density_out: Option<PathBuf>,

    /// Maximum number of palette materials to list individually.
    #[arg(long, value_name = "INT", default_value_t = 10)]
    pub max_materials: usize,
}

/// Arguments for the `tally` subcommand.
#[derive(Args, Debug)]
pub struct TallyArgs {
    /// Path to the checkpoint file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Voxel grid dimensions: NX NY NZ.
    #[arg(short, long, num_args = 3, value_names = ["NX", "NY", "NZ"], required = true)]
    pub dims: Vec<usize>,
}
