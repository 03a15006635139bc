//! surfgen library
//!
//! Core functionality for driving generation of land-surface model input
//! datasets: scenario expansion, namelist command building, batch-jobscript
//! generation, and the surface-dataset system test orchestration.

pub mod cli;
pub mod config_file;
pub mod error;
pub mod jobscript;
pub mod machines;
pub mod namelist;
pub mod paths;
pub mod registry;
pub mod systest;
pub mod tool_args;
pub mod tool_runner;

// Re-export main types for convenience
pub use config_file::JobscriptDefaults;
pub use error::{Result, SurfgenError};
pub use jobscript::{check_preconditions, JobscriptRequest, ToolchainPaths};
pub use machines::{Machine, MachineDefaults, MpiLauncher};
pub use namelist::{CommandBuilder, NamelistEntryPoint, NamelistOptions, ProcessEntryPoint};
pub use registry::{dataset_entry, validate_closure, DatasetEntry, ResolutionSet, Scenario};
pub use systest::{
    CaseConfig, FsMarkerStore, FsUserNlAppender, MarkerStore, SurfaceDatasetTest, TestHooks,
    TestPhase, UserNlAppender,
};
pub use tool_args::ToolArgs;
pub use tool_runner::{ProcessToolRunner, ToolOutput, ToolRunner};
