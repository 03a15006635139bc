//! End-to-end jobscript generation against a staged build directory.
//!
//! These exercise the whole pipeline through `jobscript::generate`: the
//! precondition checks against real paths, namelist generation via the
//! entry-point seam, and the rendered script text.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use surfgen::error::Result;
use surfgen::jobscript::{self, check_preconditions, JobscriptRequest};
use surfgen::namelist::{CommandBuilder, NamelistEntryPoint, NamelistOptions};
use surfgen::Scenario;

/// Entry point that records each namelist it was asked for and touches the
/// file, standing in for the real generator script.
struct TouchingEntryPoint {
    dir: PathBuf,
}

impl NamelistEntryPoint for TouchingEntryPoint {
    fn generate(&self, options: &NamelistOptions) -> Result<()> {
        File::create(self.dir.join(options.namelist_file()))?;
        Ok(())
    }
}

/// Create a plausible build directory: tool_bld with the machine env
/// script and the generator executable inside.
fn stage_bld(root: &Path) -> PathBuf {
    let bld = root.join("tool_bld");
    fs::create_dir_all(&bld).unwrap();
    File::create(bld.join(".env_mach_specific.sh")).unwrap();
    File::create(bld.join("mksurfdata")).unwrap();
    bld
}

fn request(scenario: Scenario, bld: &Path, out: &Path) -> JobscriptRequest {
    JobscriptRequest {
        scenario,
        account: "P93300606".into(),
        queue: "regular".into(),
        walltime: "12:00:00".into(),
        number_of_nodes: 2,
        tasks_per_node: 12,
        bld_path: bld.to_path_buf(),
        jobscript_file: out.to_path_buf(),
    }
}

#[test]
fn generates_script_and_namelists_for_each_resolution() {
    let dir = TempDir::new().unwrap();
    let bld = stage_bld(dir.path());
    let out = dir.path().join("mksurfdata_jobscript_multi");

    let builder = CommandBuilder::new("gen_mksurfdata_namelist");
    let entry_point = TouchingEntryPoint {
        dir: dir.path().to_path_buf(),
    };
    jobscript::generate(
        &request(Scenario::GlobalPresent, &bld, &out),
        &builder,
        &entry_point,
    )
    .unwrap();

    // global-present covers two resolutions; both namelists exist and both
    // run blocks appear in registry order.
    assert!(dir.path().join("global-present_0.9x1.25.namelist").exists());
    assert!(dir.path().join("global-present_1.9x2.5.namelist").exists());

    let script = fs::read_to_string(&out).unwrap();
    let first = script.find("< global-present_0.9x1.25.namelist").unwrap();
    let second = script.find("< global-present_1.9x2.5.namelist").unwrap();
    assert!(first < second);
    assert_eq!(script.matches("time mpiexec_mpt").count(), 2);
}

#[test]
fn run_lines_use_total_task_count() {
    let dir = TempDir::new().unwrap();
    let bld = stage_bld(dir.path());
    let out = dir.path().join("job.sh");

    let builder = CommandBuilder::new("gen_mksurfdata_namelist");
    let entry_point = TouchingEntryPoint {
        dir: dir.path().to_path_buf(),
    };
    jobscript::generate(
        &request(Scenario::GlobalPresentNldas, &bld, &out),
        &builder,
        &entry_point,
    )
    .unwrap();

    // 2 nodes x 12 tasks per node.
    let script = fs::read_to_string(&out).unwrap();
    assert!(script.contains("-np 24 "));
    assert!(script.contains("#PBS -l select=2:ncpus=12:mpiprocs=12:mem=109GB "));
}

#[test]
fn missing_bld_dir_fails_before_any_file_is_written() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("job.sh");

    let builder = CommandBuilder::new("gen_mksurfdata_namelist");
    let entry_point = TouchingEntryPoint {
        dir: dir.path().to_path_buf(),
    };
    let err = jobscript::generate(
        &request(Scenario::GlobalPresent, &dir.path().join("no_bld"), &out),
        &builder,
        &entry_point,
    )
    .unwrap_err();

    assert!(err.is_precondition());
    assert!(err.to_string().contains("gen_mksurfdata_build.sh"));
    assert!(!out.exists());
}

#[test]
fn preconditions_check_env_script_then_executable() {
    let dir = TempDir::new().unwrap();
    let bld = dir.path().join("tool_bld");
    fs::create_dir_all(&bld).unwrap();

    // Empty build dir: the env script is the first missing path.
    let err = check_preconditions(&bld).unwrap_err();
    assert!(err.to_string().contains(".env_mach_specific.sh"));

    File::create(bld.join(".env_mach_specific.sh")).unwrap();
    let err = check_preconditions(&bld).unwrap_err();
    assert!(err.to_string().contains("mksurfdata"));

    File::create(bld.join("mksurfdata")).unwrap();
    let paths = check_preconditions(&bld).unwrap();
    assert_eq!(paths.mksurfdata, bld.join("mksurfdata"));
}

#[test]
fn script_is_framed_by_header_and_success_line() {
    let dir = TempDir::new().unwrap();
    let bld = stage_bld(dir.path());
    let out = dir.path().join("mksurfdata_jobscript_multi");

    let builder = CommandBuilder::new("gen_mksurfdata_namelist");
    let entry_point = TouchingEntryPoint {
        dir: dir.path().to_path_buf(),
    };
    jobscript::generate(
        &request(Scenario::CropGlobal1850, &bld, &out),
        &builder,
        &entry_point,
    )
    .unwrap();

    let script = fs::read_to_string(&out).unwrap();
    assert!(script.starts_with("#!/bin/bash \n"));
    assert!(script.contains("#PBS -N mksrf_crop-global-1850 "));
    assert!(script.contains(&format!(". {}", bld.join(".env_mach_specific.sh").display())));
    let trailer = format!("echo Successfully ran {}", out.display());
    assert!(script.trim_end().ends_with(&trailer));
}
