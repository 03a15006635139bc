use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// surfgen - driver for generating land-surface model input datasets
#[derive(Parser)]
#[command(name = "surfgen")]
#[command(about = "Generates batch jobscripts and drives the surface-dataset toolchain")]
#[command(version)]
pub struct Cli {
    /// Increase output verbosity
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a jobscript running the surface-data generator for every
    /// (target, resolution) pair of a scenario
    Jobscript {
        /// Account number (default P93300606, or the defaults file)
        #[arg(long)]
        account: Option<String>,

        /// Path to the build directory for mksurfdata_esmf
        /// (default: tools/mksurfdata_esmf/tool_bld under the component root)
        #[arg(long)]
        bld_path: Option<PathBuf>,

        /// Number of nodes requested (required)
        #[arg(long)]
        number_of_nodes: u32,

        /// Number of MPI tasks per node (default 12, or the defaults file)
        #[arg(long)]
        tasks_per_node: Option<u32>,

        /// Wallclock time for job submission (default 12:00:00)
        #[arg(long)]
        walltime: Option<String>,

        /// Queue to submit to (default regular)
        #[arg(long)]
        queue: Option<String>,

        /// Scenario to generate for (required, one of the valid scenarios)
        #[arg(long)]
        scenario: String,

        /// Output jobscript file to be submitted later
        #[arg(long, default_value = "mksurfdata_jobscript_multi")]
        jobscript_file: PathBuf,

        /// JSON defaults file for account/queue/walltime/tasks-per-node
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate referential closure of the scenario and resolution tables
    Validate,

    /// List known machines and their batch-submission defaults
    Machines,
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }
}
