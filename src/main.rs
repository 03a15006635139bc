//! surfgen - main entry point
//!
//! Thin dispatch layer: parse arguments, set up logging, hand off to the
//! library, and map fatal errors to exit code 1 with a diagnostic on
//! standard output.

use std::env;
use std::path::PathBuf;

use anyhow::Result;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use surfgen::cli::{Cli, Commands};
use surfgen::config_file::JobscriptDefaults;
use surfgen::jobscript::{self, JobscriptRequest};
use surfgen::machines::known_machines;
use surfgen::namelist::{CommandBuilder, ProcessEntryPoint};
use surfgen::registry::{self, Scenario};
use surfgen::tool_runner::ProcessToolRunner;
use surfgen::{dataset_entry, paths};

/// Initialize tracing with an env-filter; `--verbose` raises the default
/// level to debug, RUST_LOG still overrides.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() {
    let cli = Cli::parse_args();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command) {
        // Diagnostics go to stdout; every failure class is terminal.
        println!("{e}");
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Jobscript {
            account,
            bld_path,
            number_of_nodes,
            tasks_per_node,
            walltime,
            queue,
            scenario,
            jobscript_file,
            config,
        } => {
            let scenario = Scenario::parse(&scenario)?;
            let defaults = match config {
                Some(path) => JobscriptDefaults::load_from_file(path)?,
                None => JobscriptDefaults::default(),
            };

            // Flags win over the defaults file; the file wins over the
            // built-in defaults.
            let request = JobscriptRequest {
                scenario,
                account: account
                    .or(defaults.account)
                    .unwrap_or_else(|| "P93300606".to_string()),
                queue: queue
                    .or(defaults.queue)
                    .unwrap_or_else(|| "regular".to_string()),
                walltime: walltime
                    .or(defaults.walltime)
                    .unwrap_or_else(|| "12:00:00".to_string()),
                number_of_nodes,
                tasks_per_node: tasks_per_node.or(defaults.tasks_per_node).unwrap_or(12),
                bld_path: bld_path.unwrap_or_else(default_bld_path),
                jobscript_file,
            };
            debug!(
                "generating jobscript for {} with {} tasks",
                request.scenario,
                request.task_count()
            );

            let runner = ProcessToolRunner;
            let entry_point = ProcessEntryPoint::new(&runner);
            let builder = CommandBuilder::in_dir(&env::current_dir()?);
            jobscript::generate(&request, &builder, &entry_point)?;
            println!(
                "Successfully created jobscript {}",
                request.jobscript_file.display()
            );
        }

        Commands::Validate => {
            registry::validate_closure()?;
            for scenario in registry_scenarios() {
                if !scenario.is_aggregate() && dataset_entry(scenario).is_none() {
                    println!("warning: scenario {scenario} has no dataset entry");
                }
            }
            println!("scenario and resolution tables are closed");
        }

        Commands::Machines => {
            for machine in known_machines() {
                let d = machine.defaults();
                println!(
                    "{machine}: queue={} walltime={} launcher={} account_required={}",
                    d.queue, d.walltime, d.launcher, d.account_required
                );
            }
        }
    }
    Ok(())
}

fn registry_scenarios() -> Vec<Scenario> {
    use strum::IntoEnumIterator;
    Scenario::iter().collect()
}

/// Default build path: derived from the component root given by CTSM_ROOT,
/// falling back to the current directory.
fn default_bld_path() -> PathBuf {
    let root = env::var_os("CTSM_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    paths::default_bld_path(&root)
}
