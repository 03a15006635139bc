//! Machine-specific defaults.
//!
//! To allow running out-of-the-box on other machines, add entries here.
//! The table carries the batch-queue defaults used when submitting work on
//! a known machine, plus the MPI launcher the surface-data generator is
//! started with on that machine.

use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::error::{Result, SurfgenError};

/// Machines this toolchain knows batch defaults for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Machine {
    Cheyenne,
    Derecho,
    Casper,
    Hobart,
    Izumi,
}

/// Parallel-launch command for the generator executable.
///
/// Distinct binaries on different clusters; the task count and stdin
/// redirection are the same everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(Display, EnumString)]
pub enum MpiLauncher {
    #[strum(serialize = "mpiexec_mpt")]
    MpiexecMpt,
    #[strum(serialize = "mpiexec")]
    Mpiexec,
}

impl MpiLauncher {
    /// The launcher binary name as invoked.
    pub fn program(self) -> &'static str {
        match self {
            Self::MpiexecMpt => "mpiexec_mpt",
            Self::Mpiexec => "mpiexec",
        }
    }
}

/// Batch-submission defaults for one machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineDefaults {
    pub queue: &'static str,
    pub walltime: &'static str,
    /// Whether an account number must accompany submissions.
    pub account_required: bool,
    pub launcher: MpiLauncher,
}

impl Machine {
    /// Batch defaults for this machine.
    pub fn defaults(self) -> MachineDefaults {
        match self {
            Self::Cheyenne => MachineDefaults {
                queue: "regular",
                walltime: "11:50:00",
                account_required: true,
                launcher: MpiLauncher::MpiexecMpt,
            },
            Self::Derecho => MachineDefaults {
                queue: "main",
                walltime: "03:50:00",
                account_required: true,
                launcher: MpiLauncher::Mpiexec,
            },
            Self::Casper => MachineDefaults {
                queue: "casper",
                walltime: "03:50:00",
                account_required: true,
                launcher: MpiLauncher::Mpiexec,
            },
            Self::Hobart | Self::Izumi => MachineDefaults {
                queue: "medium",
                walltime: "04:00:00",
                account_required: false,
                launcher: MpiLauncher::Mpiexec,
            },
        }
    }

    /// The MPI launcher for this machine.
    pub fn launcher(self) -> MpiLauncher {
        self.defaults().launcher
    }
}

/// Resolve the MPI launcher from a machine identifier string, as queried
/// from a case configuration. Unknown machines are a configuration error
/// rather than a deferred failure at launch time.
pub fn resolve_launcher(machine: &str) -> Result<MpiLauncher> {
    let machine: Machine = machine
        .parse()
        .map_err(|_| SurfgenError::config(format!("machine {machine} has no known MPI launcher")))?;
    Ok(machine.launcher())
}

/// All known machines in declaration order, for listings.
pub fn known_machines() -> Vec<Machine> {
    Machine::iter().collect()
}
