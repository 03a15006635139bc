//! Namelist command building.
//!
//! For each (target, resolution) pair of an expanded scenario this module
//! derives the namelist filename and the argument vector for the external
//! namelist-generation entry point, and drives the generation calls.
//!
//! Each invocation carries its own immutable [`NamelistOptions`] value; the
//! entry point is never handed shared argument state, so invocations cannot
//! interfere and each one is independently testable. Invocations are
//! strictly sequential: the pair at position i+1 does not start until the
//! pair at position i has completed.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::Result;
use crate::registry::{self, Scenario};
use crate::tool_args::ToolArgs;
use crate::tool_runner::{run_tool, ToolRunner};

/// Immutable options for one namelist-generation invocation.
///
/// The argument vector is the target's template, the resolution token, the
/// silence flag, and the output-namelist flag, in that order. The namelist
/// filename is keyed by (scenario, resolution) -- not by target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamelistOptions {
    /// Program to invoke (path to the namelist entry point).
    pub program: PathBuf,
    /// Scenario the jobscript is being generated for (filename key).
    pub scenario: Scenario,
    /// Concrete target this pair belongs to.
    pub target: Scenario,
    /// Template tokens from the dataset table, without the resolution.
    pub template: &'static [&'static str],
    /// Resolution token for this pair.
    pub resolution: &'static str,
}

impl NamelistOptions {
    /// Output namelist filename: `"{scenario}_{resolution}.namelist"`.
    pub fn namelist_file(&self) -> String {
        format!("{}_{}.namelist", self.scenario, self.resolution)
    }
}

impl ToolArgs for NamelistOptions {
    fn to_cli_args(&self) -> Vec<String> {
        let mut args: Vec<String> = self.template.iter().map(|t| t.to_string()).collect();
        args.push(self.resolution.to_string());
        args.push("--silent".to_string());
        args.push("--namelist".to_string());
        args.push(self.namelist_file());
        args
    }

    fn program(&self) -> String {
        self.program.display().to_string()
    }
}

/// Seam over the external namelist-generation entry point.
///
/// Consumed as a function from options to a written namelist file; nothing
/// is inspected beyond success or failure.
pub trait NamelistEntryPoint {
    fn generate(&self, options: &NamelistOptions) -> Result<()>;
}

/// Production entry point: spawns the external generator program.
pub struct ProcessEntryPoint<'a> {
    runner: &'a dyn ToolRunner,
}

impl<'a> ProcessEntryPoint<'a> {
    pub fn new(runner: &'a dyn ToolRunner) -> Self {
        Self { runner }
    }
}

impl NamelistEntryPoint for ProcessEntryPoint<'_> {
    fn generate(&self, options: &NamelistOptions) -> Result<()> {
        run_tool(self.runner, options)?.ensure_success(None)
    }
}

/// Builds the ordered command plan for a scenario and drives generation.
pub struct CommandBuilder {
    program: PathBuf,
}

impl CommandBuilder {
    /// `program` is the namelist entry point to invoke for every pair.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Default entry-point location: `gen_mksurfdata_namelist` in `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join("gen_mksurfdata_namelist"))
    }

    /// Expand `scenario` and derive one [`NamelistOptions`] per
    /// (target, resolution) pair, targets in expansion order, resolutions
    /// in registry order.
    ///
    /// Filenames are keyed by (scenario, resolution) only, not by target.
    /// Two targets of an aggregate that share a resolution token therefore
    /// produce the same filename, and the later generation overwrites the
    /// earlier one. That matches the established external contract; the
    /// overlap is logged so it never happens silently.
    pub fn plan(&self, scenario: Scenario) -> Result<Vec<NamelistOptions>> {
        let expanded = registry::expand_validated(scenario)?;

        let mut plan = Vec::new();
        let mut seen = HashSet::new();
        for (target, entry) in expanded {
            for resolution in entry.resolution_set.resolutions() {
                let options = NamelistOptions {
                    program: self.program.clone(),
                    scenario,
                    target,
                    template: entry.template,
                    resolution,
                };
                if !seen.insert(options.namelist_file()) {
                    warn!(
                        "namelist filename {} is produced by more than one target of {scenario}; \
                         the later generation overwrites the earlier one",
                        options.namelist_file()
                    );
                }
                plan.push(options);
            }
        }
        Ok(plan)
    }

    /// Generate every namelist of the plan, strictly in order, returning
    /// the filenames written.
    ///
    /// Only the filenames are retained; the namelist contents live in the
    /// working directory, one file per pair.
    pub fn generate_all(
        &self,
        scenario: Scenario,
        entry_point: &dyn NamelistEntryPoint,
    ) -> Result<Vec<String>> {
        let plan = self.plan(scenario)?;
        let mut files = Vec::with_capacity(plan.len());
        for options in &plan {
            entry_point.generate(options)?;
            info!("generated namelist {}", options.namelist_file());
            files.push(options.namelist_file());
        }
        Ok(files)
    }
}
