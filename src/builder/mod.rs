//! CMake build driver.
//!
//! This module samples the toolchain and executes resolved plans.

pub mod context;
pub mod executor;
pub mod toolchain;
pub mod util;

pub use context::{EnvOverrides, ToolchainContext};
pub use executor::{execute_plan, ProcessRunner, StepRunner};
pub use toolchain::{CompilerFamily, GeneratorProbe, OsFamily, PathProbe};
