//! Type-safe external-tool argument contracts.
//!
//! This module provides the `ToolArgs` trait for ensuring compile-time
//! correctness of the arguments handed to external toolchain programs.
//! Instead of assembling raw argv strings at call sites, Rust structs
//! implement this trait to produce the exact argument vector a given tool
//! expects.
//!
//! # Design Goals
//!
//! 1. **Compile-Time Safety**: flag mismatches (e.g. `--res` vs
//!    `--resolution`) are caught where the struct is defined, not at
//!    runtime in the middle of a batch.
//! 2. **Single Source of Truth**: the struct definition IS the contract.
//! 3. **No Shared Argument State**: every invocation carries its own
//!    immutable options value, so repeated invocations cannot interfere.

/// Trait for typed external-tool arguments.
///
/// Implementors define the mapping between Rust struct fields and the
/// flags of a separately maintained toolchain program.
///
/// # Contract
///
/// - `to_cli_args()`: returns argv exactly as the tool expects it.
/// - `program()`: returns the program to invoke (name or path); the
///   execution layer does not rewrite it.
pub trait ToolArgs {
    /// Convert struct fields to CLI arguments.
    ///
    /// Example: `["--start-year", "2000", "--res", "10x15", "--silent"]`
    fn to_cli_args(&self) -> Vec<String>;

    /// The program to invoke for these arguments.
    fn program(&self) -> String;
}
