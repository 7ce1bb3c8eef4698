//! Resolved build plans.
//!
//! A [`ResolvedPlan`] is the output of the resolver: the argument lists for
//! the configure and build stages and the ordered process steps that run
//! them. It is serializable so `cmext plan` can print it as JSON.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Stage of the external build pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Configure,
    Build,
    Install,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::Configure => "configure",
            StepKind::Build => "build",
            StepKind::Install => "install",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One external process invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessStep {
    pub kind: StepKind,
    pub program: PathBuf,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl ProcessStep {
    pub fn new(kind: StepKind, program: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
        ProcessStep {
            kind,
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
        }
    }

    /// Add an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(|a| a.into()));
        self
    }

    /// Render the command line for logs and error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Everything needed to run one extension build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPlan {
    /// Arguments passed to the configure invocation after the source dir
    pub configure_args: Vec<String>,
    /// Arguments appended to the build invocation
    pub build_args: Vec<String>,
    /// Directory the compiled module must land in
    pub output_dir: PathBuf,
    /// Private scratch directory all steps run in
    pub scratch_dir: PathBuf,
    /// Configure, build and install, in order
    pub steps: Vec<ProcessStep>,
}

impl ResolvedPlan {
    pub fn step(&self, kind: StepKind) -> Option<&ProcessStep> {
        self.steps.iter().find(|s| s.kind == kind)
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Serialize the plan as pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
