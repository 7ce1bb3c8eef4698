//! cmext - CMake build resolution for Python extension modules
//!
//! This crate turns an extension build request plus the ambient toolchain
//! into a deterministic configure/build/install plan, and runs it.

pub mod builder;
pub mod core;
pub mod ops;
pub mod resolver;
pub mod util;

/// Test utilities and mocks for cmext unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a step runner that records instead of
/// spawning processes.
#[cfg(test)]
pub mod test_support;

pub use builder::context::{EnvOverrides, ToolchainContext};
pub use core::{
    plan::{ProcessStep, ResolvedPlan, StepKind},
    request::{BuildMode, BuildRequest},
};
pub use resolver::{resolve, ResolveError};
