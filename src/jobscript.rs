//! Batch jobscript generation.
//!
//! Emits the full batch-queue script that runs the surface-data generator
//! once per (target, resolution) pair of a scenario: PBS header directives,
//! a machine-environment sourcing line with an inline fatal check, one
//! generate/run/check/echo block per pair, and a trailing success line.
//!
//! The script is pure text. It is never executed here; it is submitted to
//! the batch scheduler later, outside this crate.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{Result, SurfgenError};
use crate::namelist::{CommandBuilder, NamelistEntryPoint};
use crate::paths::{ENV_MACH_SPECIFIC, MKSURFDATA};
use crate::registry::Scenario;

/// Everything the jobscript generator needs for one run.
#[derive(Debug, Clone)]
pub struct JobscriptRequest {
    pub scenario: Scenario,
    pub account: String,
    pub queue: String,
    pub walltime: String,
    pub number_of_nodes: u32,
    pub tasks_per_node: u32,
    /// Build-output directory of the surface-data generator.
    pub bld_path: PathBuf,
    /// Output jobscript file.
    pub jobscript_file: PathBuf,
}

impl JobscriptRequest {
    /// Total MPI task count used on every run line.
    pub fn task_count(&self) -> u32 {
        self.tasks_per_node * self.number_of_nodes
    }
}

/// Paths resolved by the precondition check.
#[derive(Debug, Clone)]
pub struct ToolchainPaths {
    pub env_script: PathBuf,
    pub mksurfdata: PathBuf,
}

/// Confirm the build directory, machine-environment script, and generator
/// executable all exist.
///
/// Checked before anything is written or launched; any missing path is a
/// precondition failure the binary reports on stdout with exit code 1.
pub fn check_preconditions(bld_path: &Path) -> Result<ToolchainPaths> {
    if !bld_path.exists() {
        return Err(SurfgenError::precondition_with_hint(
            bld_path,
            "build mksurfdata_esmf before running this script -- using ./gen_mksurfdata_build.sh",
        ));
    }

    let env_script = bld_path.join(ENV_MACH_SPECIFIC);
    if !env_script.exists() {
        return Err(SurfgenError::precondition(&env_script));
    }

    let mksurfdata = bld_path.join(MKSURFDATA);
    if !mksurfdata.exists() {
        return Err(SurfgenError::precondition(&mksurfdata));
    }

    Ok(ToolchainPaths {
        env_script,
        mksurfdata,
    })
}

/// Check preconditions, then create the jobscript file and write it in one
/// linear pass, generating each pair's namelist along the way.
pub fn generate(
    request: &JobscriptRequest,
    builder: &CommandBuilder,
    entry_point: &dyn NamelistEntryPoint,
) -> Result<()> {
    let paths = check_preconditions(&request.bld_path)?;

    let file = File::create(&request.jobscript_file)?;
    let mut out = BufWriter::new(file);
    write_jobscript(&mut out, request, &paths, builder, entry_point)?;
    out.flush()?;

    info!(
        "Successfully created jobscript {}",
        request.jobscript_file.display()
    );
    Ok(())
}

/// Write the jobscript text to `out`.
///
/// Namelist generation is interleaved with writing, one pair at a time in
/// CommandBuilder order, exactly as the run blocks appear in the script.
pub fn write_jobscript<W: Write>(
    out: &mut W,
    request: &JobscriptRequest,
    paths: &ToolchainPaths,
    builder: &CommandBuilder,
    entry_point: &dyn NamelistEntryPoint,
) -> Result<()> {
    let scenario = request.scenario;
    let tpn = request.tasks_per_node;

    writeln!(out, "#!/bin/bash ")?;
    writeln!(out, "#PBS -A {} ", request.account)?;
    writeln!(out, "#PBS -N mksrf_{scenario} ")?;
    writeln!(out, "#PBS -j oe ")?;
    writeln!(out, "#PBS -k eod ")?;
    writeln!(out, "#PBS -S /bin/bash ")?;
    writeln!(out, "#PBS -q {} ", request.queue)?;
    writeln!(out, "#PBS -l walltime={} ", request.walltime)?;
    writeln!(
        out,
        "#PBS -l select={}:ncpus={tpn}:mpiprocs={tpn}:mem=109GB ",
        request.number_of_nodes
    )?;
    writeln!(
        out,
        "# This is a batch script to run a set of resolutions for mksurfdata_esmf {scenario} "
    )?;
    writeln!(
        out,
        "# NOTE: THIS SCRIPT IS AUTOMATICALLY GENERATED SO IN GENERAL YOU SHOULD NOT EDIT it!!\n"
    )?;
    writeln!(out)?;

    let n_p = request.task_count();

    // Source env_mach_specific.sh to set up the machine-dependent
    // environment, compilers and libraries included, before any run line.
    writeln!(out, ". {}", paths.env_script.display())?;
    writeln!(
        out,
        "if [ $? != 0 ]; then echo 'Error running env_specific_script'; exit -4; fi "
    )?;

    for options in builder.plan(scenario)? {
        entry_point.generate(&options)?;
        let namelist = options.namelist_file();
        info!("generated namelist {namelist}");

        writeln!(
            out,
            "time mpiexec_mpt -p \"%g:\" -np {n_p} {} < {namelist} ",
            paths.mksurfdata.display()
        )?;
        writeln!(
            out,
            "if [ $? != 0 ]; then echo 'Error running resolution {}'; exit -4; fi ",
            options.resolution
        )?;
        writeln!(out, "echo Successfully ran resolution {}", options.resolution)?;
    }

    writeln!(
        out,
        "echo Successfully ran {}",
        request.jobscript_file.display()
    )?;
    Ok(())
}
