//! High-level operations.
//!
//! This module contains the implementation of cmext commands.

pub mod build_ext;

pub use build_ext::{build, detect_context, make_request, plan, run_plan, BuildOptions};
