//! Surface-dataset system test orchestration.
//!
//! The test passes if the surface-data generator produces an fsurdat file
//! and the downstream land-model simulation completes against it. This
//! module owns the two-phase, idempotent build/generate/run sequence:
//! a one-time setup gated by a persisted marker file, then the repeatable
//! build and run phases.
//!
//! # Phase Flow
//!
//! ```text
//! NotSetUp
//!     |
//! SetupDone   (one-time: clean bld dir, build tool, generate namelist,
//!     |        point the land user namelist at the fsurdat, drop marker)
//! Built       (framework model build; repeatable)
//!     |
//! Ran         (launch generator under MPI, then framework model run)
//! ```
//!
//! The marker file stays the externally visible setup record, for
//! compatibility with the surrounding test framework; internally the
//! orchestrator tracks an explicit phase value, and the marker sits behind
//! an injectable store so tests can simulate "already set up" without a
//! filesystem.
//!
//! Resolution is pinned to 10x15: it uses a lower-res topography file
//! instead of the 1-km raw dataset, which runs the test out of memory.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::error::{Result, SurfgenError};
use crate::machines::resolve_launcher;
use crate::paths::{self, BUILD_SCRIPT, NAMELIST_SCRIPT};
use crate::tool_runner::ToolRunner;

/// Resolution the test generates at (bounded-memory choice).
pub const TEST_RESOLUTION: &str = "10x15";

/// Model year the test generates for.
pub const TEST_MODEL_YEAR: &str = "1850";

/// Zero-byte sentinel recording that one-time setup completed.
pub const SETUP_MARKER: &str = "done_MKSURFDATAESMF_setup.txt";

/// Land component whose user namelist receives the fsurdat pointer.
pub const LND_COMPONENT: &str = "clm";

/// MPI task count for the generator run.
pub const TEST_TASK_COUNT: u32 = 144;

/// Phases of the system test, in sequential order.
///
/// Phases only move forward; the run is fail-fast, so there is no failure
/// phase to transition into -- a failed step terminates the whole test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TestPhase {
    /// Setup has not completed for this case yet
    NotSetUp = 0,
    /// One-time setup finished (or was found already done via the marker)
    SetupDone = 1,
    /// Framework model build finished
    Built = 2,
    /// Generator and downstream simulation both ran (terminal)
    Ran = 3,
}

impl TestPhase {
    /// Returns the next phase in the sequence, or None at the end.
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::NotSetUp => Some(Self::SetupDone),
            Self::SetupDone => Some(Self::Built),
            Self::Built => Some(Self::Ran),
            Self::Ran => None,
        }
    }

    /// True once the whole sequence has completed.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Ran)
    }

    /// Human-readable description of this phase.
    pub const fn description(self) -> &'static str {
        match self {
            Self::NotSetUp => "not set up",
            Self::SetupDone => "setup done",
            Self::Built => "model built",
            Self::Ran => "generator and model ran",
        }
    }
}

impl fmt::Display for TestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors from invalid phase transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PhaseTransitionError {
    #[error("cannot move from {from} to {to} (phases advance one step at a time)")]
    SkippedPhase { from: TestPhase, to: TestPhase },

    #[error("cannot move backwards from {from} to {to}")]
    BackwardTransition { from: TestPhase, to: TestPhase },

    #[error("the test already completed ({from})")]
    FromTerminal { from: TestPhase },
}

impl From<PhaseTransitionError> for SurfgenError {
    fn from(err: PhaseTransitionError) -> Self {
        SurfgenError::transition(err.to_string())
    }
}

/// Case configuration collaborator: key→value lookup plus the case root.
///
/// Externally managed and opaque; the orchestrator only reads the land
/// component root and the machine identifier from it.
pub trait CaseConfig {
    fn get_value(&self, key: &str) -> Option<String>;
    fn caseroot(&self) -> &Path;
}

/// Storage seam for the setup marker.
pub trait MarkerStore {
    fn exists(&self) -> Result<bool>;
    fn create(&self) -> Result<()>;
}

/// Marker stored as a zero-byte file in the case root. Created exactly
/// once, after all setup steps succeed, and never deleted by this crate.
pub struct FsMarkerStore {
    path: PathBuf,
}

impl FsMarkerStore {
    pub fn in_caseroot(caseroot: &Path) -> Self {
        Self {
            path: caseroot.join(SETUP_MARKER),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MarkerStore for FsMarkerStore {
    fn exists(&self) -> Result<bool> {
        Ok(self.path.exists())
    }

    fn create(&self) -> Result<()> {
        File::create(&self.path)?;
        Ok(())
    }
}

/// Framework lifecycle hooks: the standard model build and run procedures
/// supplied by the surrounding test framework.
pub trait TestHooks {
    fn build_model(&self) -> Result<()>;
    fn run_model(&self) -> Result<()>;
}

/// Appends content to a component's user namelist in the case root.
pub trait UserNlAppender {
    fn append(&self, component: &str, contents: &str) -> Result<()>;
}

/// Appends to `user_nl_<component>` under the case root.
pub struct FsUserNlAppender {
    caseroot: PathBuf,
}

impl FsUserNlAppender {
    pub fn new(caseroot: &Path) -> Self {
        Self {
            caseroot: caseroot.to_path_buf(),
        }
    }
}

impl UserNlAppender for FsUserNlAppender {
    fn append(&self, component: &str, contents: &str) -> Result<()> {
        let path = self.caseroot.join(format!("user_nl_{component}"));
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(file, "{contents}")?;
        Ok(())
    }
}

/// Orchestrates the system test against one case.
pub struct SurfaceDatasetTest<'a> {
    case: &'a dyn CaseConfig,
    runner: &'a dyn ToolRunner,
    hooks: &'a dyn TestHooks,
    marker: &'a dyn MarkerStore,
    user_nl: &'a dyn UserNlAppender,
    phase: TestPhase,
    tool_path: PathBuf,
    fsurdat_prefix: PathBuf,
    status_log: PathBuf,
}

impl fmt::Debug for SurfaceDatasetTest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceDatasetTest")
            .field("phase", &self.phase)
            .field("tool_path", &self.tool_path)
            .field("fsurdat_prefix", &self.fsurdat_prefix)
            .field("status_log", &self.status_log)
            .finish_non_exhaustive()
    }
}

impl<'a> SurfaceDatasetTest<'a> {
    /// Wire up the orchestrator for a case.
    ///
    /// Reads the land component root from the case configuration; the
    /// fsurdat prefix is date-stamped here, at construction.
    pub fn new(
        case: &'a dyn CaseConfig,
        runner: &'a dyn ToolRunner,
        hooks: &'a dyn TestHooks,
        marker: &'a dyn MarkerStore,
        user_nl: &'a dyn UserNlAppender,
    ) -> Result<Self> {
        let component_root = case
            .get_value("COMP_ROOT_DIR_LND")
            .ok_or_else(|| SurfgenError::config("case has no COMP_ROOT_DIR_LND value"))?;
        let tool_path = paths::tool_path(Path::new(&component_root));
        let caseroot = case.caseroot();
        let fsurdat_prefix = paths::fsurdat_prefix(
            caseroot,
            TEST_RESOLUTION,
            TEST_MODEL_YEAR,
            &paths::date_stamp(),
        );
        let status_log = caseroot.join("TestStatus.log");

        Ok(Self {
            case,
            runner,
            hooks,
            marker,
            user_nl,
            phase: TestPhase::NotSetUp,
            tool_path,
            fsurdat_prefix,
            status_log,
        })
    }

    /// Current phase of this invocation.
    pub fn phase(&self) -> TestPhase {
        self.phase
    }

    /// Path prefix of the fsurdat artifact (trailing dot included).
    pub fn fsurdat_prefix(&self) -> &Path {
        &self.fsurdat_prefix
    }

    fn advance_to(&mut self, target: TestPhase) -> Result<()> {
        if self.phase.is_terminal() {
            return Err(PhaseTransitionError::FromTerminal { from: self.phase }.into());
        }
        if target < self.phase {
            return Err(PhaseTransitionError::BackwardTransition {
                from: self.phase,
                to: target,
            }
            .into());
        }
        if self.phase.next() != Some(target) {
            return Err(PhaseTransitionError::SkippedPhase {
                from: self.phase,
                to: target,
            }
            .into());
        }
        self.phase = target;
        Ok(())
    }

    /// Build phase: one-time setup when the marker is absent, then the
    /// standard framework model build. Safe to invoke repeatedly; with the
    /// marker already present the setup side effects are skipped entirely.
    pub fn build_phase(&mut self) -> Result<()> {
        if self.phase.is_terminal() {
            return Err(PhaseTransitionError::FromTerminal { from: self.phase }.into());
        }

        if self.marker.exists()? {
            info!("setup marker present, skipping one-time setup");
        } else {
            self.run_setup()?;
            self.marker.create()?;
        }
        if self.phase == TestPhase::NotSetUp {
            self.advance_to(TestPhase::SetupDone)?;
        }

        self.hooks.build_model()?;
        if self.phase == TestPhase::SetupDone {
            self.advance_to(TestPhase::Built)?;
        }
        Ok(())
    }

    /// One-time setup, in strict order. Any step's failure is immediately
    /// fatal with no rollback: the marker is only written after the whole
    /// sequence succeeds, so the next invocation retries from the start,
    /// tolerating partially overwritten prior artifacts.
    fn run_setup(&mut self) -> Result<()> {
        let bld_dir = self.tool_path.join("bld");
        if bld_dir.exists() {
            std::fs::remove_dir_all(&bld_dir)?;
        }

        let build_script = self.tool_path.join(BUILD_SCRIPT);
        self.runner
            .run(&build_script.display().to_string(), &[])?
            .ensure_success(Some(&self.status_log))?;

        // Deliberately low-resolution, single-year parameters to bound
        // memory consumption.
        let nml_script = self.tool_path.join(NAMELIST_SCRIPT);
        let nml_args: Vec<String> = [
            "--res",
            TEST_RESOLUTION,
            "--start-year",
            TEST_MODEL_YEAR,
            "--end-year",
            TEST_MODEL_YEAR,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        self.runner
            .run(&nml_script.display().to_string(), &nml_args)?
            .ensure_success(Some(&self.status_log))?;

        // Point the land component at the fsurdat about to be produced.
        let contents = format!("fsurdat = '{}nc'", self.fsurdat_prefix.display());
        self.user_nl.append(LND_COMPONENT, &contents)?;
        Ok(())
    }

    /// Run phase: launch the generator under the machine's MPI launcher
    /// with the setup namelist on stdin, then hand over to the standard
    /// framework model run that consumes the produced dataset.
    pub fn run_phase(&mut self) -> Result<()> {
        if self.phase.is_terminal() {
            return Err(PhaseTransitionError::FromTerminal { from: self.phase }.into());
        }
        if self.phase != TestPhase::Built {
            return Err(PhaseTransitionError::SkippedPhase {
                from: self.phase,
                to: TestPhase::Ran,
            }
            .into());
        }

        let machine = self
            .case
            .get_value("MACH")
            .ok_or_else(|| SurfgenError::config("case has no MACH value"))?;
        let launcher = resolve_launcher(&machine)?;

        let executable = self.tool_path.join("bld").join(paths::MKSURFDATA);
        let namelist = PathBuf::from(format!("{}namelist", self.fsurdat_prefix.display()));
        let args = vec![
            "-np".to_string(),
            TEST_TASK_COUNT.to_string(),
            executable.display().to_string(),
        ];
        self.runner
            .run_with_stdin(launcher.program(), &args, &namelist)?
            .ensure_success(Some(&self.status_log))?;

        self.hooks.run_model()?;
        self.advance_to(TestPhase::Ran)?;
        Ok(())
    }
}
