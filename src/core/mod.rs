//! Core data structures for cmext.
//!
//! - Build requests (what the packaging layer asks for)
//! - Resolved plans (what gets executed)

pub mod plan;
pub mod request;

pub use plan::{ProcessStep, ResolvedPlan, StepKind};
pub use request::{BuildMode, BuildRequest};
