//! Command implementations

pub mod build;
pub mod plan;
pub mod toolchain;
