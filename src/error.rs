//! Error handling module for surfgen
//!
//! Provides centralized error handling with proper error types using thiserror.
//! All errors in the crate should use these types for consistency.
//!
//! Every failure class here is terminal: nothing is caught, downgraded, or
//! retried. Each step may stand in front of a multi-hour batch job, so a
//! partial recovery would corrupt downstream state.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for surfgen
#[derive(Error, Debug)]
pub enum SurfgenError {
    /// IO errors (file operations, directory creation, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors (unknown scenario, unknown machine, bad defaults file)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A directory or file required before any work starts is missing
    #[error("{path} does NOT exist{hint}")]
    Precondition { path: PathBuf, hint: String },

    /// An invoked subprocess returned a nonzero exit status
    #[error("ERROR RUNNING {command} (exit status {status}){log_hint}")]
    Process {
        command: String,
        status: i32,
        log_hint: String,
    },

    /// Test-phase state machine transition errors
    #[error("Phase transition error: {0}")]
    Transition(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for surfgen operations
pub type Result<T> = std::result::Result<T, SurfgenError>;

// Convenient error constructors
impl SurfgenError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a precondition error for a missing path
    pub fn precondition(path: impl Into<PathBuf>) -> Self {
        Self::Precondition {
            path: path.into(),
            hint: String::new(),
        }
    }

    /// Create a precondition error with a remediation hint appended to the message
    pub fn precondition_with_hint(path: impl Into<PathBuf>, hint: impl Into<String>) -> Self {
        Self::Precondition {
            path: path.into(),
            hint: format!(" -- {}", hint.into()),
        }
    }

    /// Create a process-failure error naming the failing command
    pub fn process(command: impl Into<String>, status: i32) -> Self {
        Self::Process {
            command: command.into(),
            status,
            log_hint: String::new(),
        }
    }

    /// Create a process-failure error that points at a status log for details
    pub fn process_with_log(
        command: impl Into<String>,
        status: i32,
        log: impl Into<PathBuf>,
    ) -> Self {
        Self::Process {
            command: command.into(),
            status,
            log_hint: format!("; details in {}", log.into().display()),
        }
    }

    /// Create a phase transition error
    pub fn transition(msg: impl Into<String>) -> Self {
        Self::Transition(msg.into())
    }

    /// True for errors the binary maps to exit code 1 before any side effect
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SurfgenError::config("scenario bogus is not in valid scenarios");
        assert_eq!(
            err.to_string(),
            "Configuration error: scenario bogus is not in valid scenarios"
        );

        let err = SurfgenError::precondition("/glade/bld");
        assert_eq!(err.to_string(), "/glade/bld does NOT exist");

        let err = SurfgenError::precondition_with_hint(
            "/glade/bld",
            "build mksurfdata_esmf before running this script",
        );
        assert!(err.to_string().contains("-- build mksurfdata_esmf"));
    }

    #[test]
    fn test_process_error_names_command_and_log() {
        let err =
            SurfgenError::process_with_log("gen_mksurfdata_build.sh", 2, "/case/TestStatus.log");
        let msg = err.to_string();
        assert!(msg.contains("ERROR RUNNING gen_mksurfdata_build.sh"));
        assert!(msg.contains("exit status 2"));
        assert!(msg.contains("/case/TestStatus.log"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SurfgenError = io_err.into();
        assert!(matches!(err, SurfgenError::Io(_)));
    }

    #[test]
    fn test_is_precondition() {
        assert!(SurfgenError::precondition("/missing").is_precondition());
        assert!(!SurfgenError::config("x").is_precondition());
    }
}
