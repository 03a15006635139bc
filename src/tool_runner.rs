//! External-tool execution.
//!
//! This module provides the one sanctioned way to launch the external
//! toolchain programs (build script, namelist generator, MPI launcher).
//! All subprocess launches go through the [`ToolRunner`] seam so that
//! every invocation is logged with its exact command line and every
//! nonzero exit surfaces through the same fail-fast path.
//!
//! The orchestration layer is strictly sequential: each call blocks until
//! the child exits, and no two children issued by this layer ever run
//! concurrently. There is no timeout or cancellation handling here; an
//! interrupted child propagates as a failure that terminates the run.

use std::fs::File;
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::info;

use crate::error::{Result, SurfgenError};
use crate::tool_args::ToolArgs;

/// Outcome of one external-tool invocation.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// The command line that was executed, for diagnostics.
    pub command: String,
    /// Exit code (None if terminated by signal).
    pub exit_code: Option<i32>,
    /// Whether the tool exited successfully (exit code 0).
    pub success: bool,
}

impl ToolOutput {
    /// Fail-fast check: error out unless the tool exited zero.
    ///
    /// The error names the failing command; with `log` set it also points
    /// at the status log where the framework collects details.
    pub fn ensure_success(&self, log: Option<&Path>) -> Result<()> {
        if self.success {
            return Ok(());
        }
        let status = self.exit_code.unwrap_or(-1);
        Err(match log {
            Some(log) => SurfgenError::process_with_log(&self.command, status, log),
            None => SurfgenError::process(&self.command, status),
        })
    }
}

/// Abstraction over external-tool launches.
///
/// The orchestrators take this seam instead of spawning directly, so tests
/// can script tool outcomes without touching a shell. `ProcessToolRunner`
/// is the production implementation.
pub trait ToolRunner {
    /// Run a tool to completion, inheriting stdio.
    fn run(&self, program: &str, args: &[String]) -> Result<ToolOutput>;

    /// Run a tool to completion with its stdin redirected from a file.
    ///
    /// The external surface-data generator reads its namelist this way
    /// (`mksurfdata < scenario_res.namelist`).
    fn run_with_stdin(&self, program: &str, args: &[String], stdin: &Path) -> Result<ToolOutput>;
}

/// Spawns real subprocesses, one at a time, blocking until each exits.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessToolRunner;

impl ProcessToolRunner {
    fn finish(command: String, status: std::process::ExitStatus) -> ToolOutput {
        let output = ToolOutput {
            command,
            exit_code: status.code(),
            success: status.success(),
        };
        if output.success {
            info!("{} exited successfully", output.command);
        } else {
            info!(
                "{} failed with exit code {}",
                output.command,
                output.exit_code.unwrap_or(-1)
            );
        }
        output
    }
}

impl ToolRunner for ProcessToolRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<ToolOutput> {
        let command = render_command(program, args);
        info!("running: {command}");

        let status = Command::new(program)
            .args(args)
            .status()
            .map_err(|e| SurfgenError::config(format!("failed to spawn {program}: {e}")))?;
        Ok(Self::finish(command, status))
    }

    fn run_with_stdin(&self, program: &str, args: &[String], stdin: &Path) -> Result<ToolOutput> {
        let command = format!("{} < {}", render_command(program, args), stdin.display());
        info!("running: {command}");

        let input = File::open(stdin)?;
        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::from(input))
            .status()
            .map_err(|e| SurfgenError::config(format!("failed to spawn {program}: {e}")))?;
        Ok(Self::finish(command, status))
    }
}

/// Run a tool described by a typed-argument struct.
pub fn run_tool<T: ToolArgs>(runner: &dyn ToolRunner, args: &T) -> Result<ToolOutput> {
    runner.run(&args.program(), &args.to_cli_args())
}

fn render_command(program: &str, args: &[String]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}
