//! Plan executor with progress reporting.
//!
//! Steps run strictly in order, each blocking until its process exits.
//! The first failing step aborts the build; later steps never start.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;

use crate::core::plan::{ProcessStep, ResolvedPlan, StepKind};
use crate::util::fs::ensure_dir;
use crate::util::process::ProcessBuilder;

/// Error while executing a plan.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to create build directory `{}`", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to run {step} step `{command}`: {message}")]
    Spawn {
        step: StepKind,
        command: String,
        message: String,
    },

    #[error("{step} step failed ({})\n{stderr}", exit_label(.code))]
    StepFailed {
        step: StepKind,
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

impl ExecError {
    /// The step that failed, if any step was reached.
    pub fn step(&self) -> Option<StepKind> {
        match self {
            ExecError::CreateDir { .. } => None,
            ExecError::Spawn { step, .. } | ExecError::StepFailed { step, .. } => Some(*step),
        }
    }
}

/// Runs one process step to completion.
pub trait StepRunner {
    fn run(&mut self, step: &ProcessStep) -> Result<(), ExecError>;
}

/// Execute every step of `plan` in order.
pub fn execute_plan(plan: &ResolvedPlan, runner: &mut dyn StepRunner) -> Result<(), ExecError> {
    let scratch = plan.scratch_dir();
    ensure_dir(scratch).map_err(|source| ExecError::CreateDir {
        path: scratch.to_path_buf(),
        source,
    })?;

    for step in &plan.steps {
        tracing::debug!("running {} step: {}", step.kind, step.display_command());
        runner.run(step)?;
    }

    Ok(())
}

/// Runs steps as real subprocesses.
///
/// Output is captured and shown only on failure, unless `verbose` is set,
/// in which case the child inherits the terminal.
#[derive(Debug, Default)]
pub struct ProcessRunner {
    verbose: bool,
}

impl ProcessRunner {
    pub fn new() -> Self {
        ProcessRunner::default()
    }

    /// Stream child output instead of capturing it.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn spinner(step: &ProcessStep) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]") {
            pb.set_style(style);
        }
        pb.set_message(step_label(step.kind));
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    }

    fn spawn_error(step: &ProcessStep, err: anyhow::Error) -> ExecError {
        ExecError::Spawn {
            step: step.kind,
            command: step.display_command(),
            message: format!("{:#}", err),
        }
    }
}

impl StepRunner for ProcessRunner {
    fn run(&mut self, step: &ProcessStep) -> Result<(), ExecError> {
        let start = Instant::now();
        let cmd = ProcessBuilder::from(step);

        if self.verbose {
            eprintln!("     Running `{}`", step.display_command());
            let status = cmd.status().map_err(|e| Self::spawn_error(step, e))?;
            if !status.success() {
                return Err(ExecError::StepFailed {
                    step: step.kind,
                    command: step.display_command(),
                    code: status.code(),
                    stderr: String::new(),
                });
            }
        } else {
            let pb = Self::spinner(step);
            let result = cmd.exec();
            pb.finish_and_clear();

            let output = result.map_err(|e| Self::spawn_error(step, e))?;
            if !output.status.success() {
                let mut diagnostics = String::from_utf8_lossy(&output.stdout).into_owned();
                diagnostics.push_str(&String::from_utf8_lossy(&output.stderr));
                return Err(ExecError::StepFailed {
                    step: step.kind,
                    command: step.display_command(),
                    code: output.status.code(),
                    stderr: diagnostics,
                });
            }
            tracing::debug!("{}", String::from_utf8_lossy(&output.stdout));
        }

        tracing::info!(
            "{} finished in {:.2}s",
            step_label(step.kind),
            start.elapsed().as_secs_f64()
        );
        Ok(())
    }
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {}", c),
        None => "terminated by signal".to_string(),
    }
}

fn step_label(kind: StepKind) -> &'static str {
    match kind {
        StepKind::Configure => "Configuring",
        StepKind::Build => "Building",
        StepKind::Install => "Installing",
    }
}
