//! Test utilities and mocks for cmext unit tests.
//!
//! Provides a [`StepRunner`] that records the steps it is asked to run
//! instead of spawning processes, with scripted failures.
//!
//! # Example
//!
//! ```rust,ignore
//! use cmext::test_support::RecordingRunner;
//!
//! let mut runner = RecordingRunner::new().fail_on(StepKind::Build, 2, "ninja: build stopped");
//! execute_plan(&plan, &mut runner).unwrap_err();
//! assert_eq!(runner.kinds(), vec![StepKind::Configure, StepKind::Build]);
//! ```

use std::collections::HashMap;

use crate::builder::executor::{ExecError, StepRunner};
use crate::core::plan::{ProcessStep, StepKind};

/// Mock process output for a step.
#[derive(Debug, Clone)]
pub struct MockProcessOutput {
    /// Exit status code (0 = success).
    pub status: i32,
    /// Standard error.
    pub stderr: String,
}

impl MockProcessOutput {
    /// A successful output.
    pub fn success() -> Self {
        MockProcessOutput {
            status: 0,
            stderr: String::new(),
        }
    }

    /// A failure output with the given stderr and status code.
    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        MockProcessOutput {
            status,
            stderr: stderr.into(),
        }
    }

    /// Check if the process succeeded.
    pub fn success_status(&self) -> bool {
        self.status == 0
    }
}

impl Default for MockProcessOutput {
    fn default() -> Self {
        MockProcessOutput::success()
    }
}

/// Step runner that records calls and returns scripted outputs.
///
/// Steps without a scripted output succeed.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    outputs: HashMap<StepKind, MockProcessOutput>,
    steps: Vec<ProcessStep>,
}

impl RecordingRunner {
    /// Create a runner where every step succeeds.
    pub fn new() -> Self {
        RecordingRunner::default()
    }

    /// Script the output for one step kind.
    pub fn expect(mut self, kind: StepKind, output: MockProcessOutput) -> Self {
        self.outputs.insert(kind, output);
        self
    }

    /// Make `kind` exit with `status` and `stderr`.
    pub fn fail_on(self, kind: StepKind, status: i32, stderr: impl Into<String>) -> Self {
        self.expect(kind, MockProcessOutput::failure(status, stderr))
    }

    /// Every step that was run, in order.
    pub fn steps(&self) -> &[ProcessStep] {
        &self.steps
    }

    /// Kinds of the steps that were run, in order.
    pub fn kinds(&self) -> Vec<StepKind> {
        self.steps.iter().map(|s| s.kind).collect()
    }

    /// Command lines of the steps that were run.
    pub fn calls(&self) -> Vec<String> {
        self.steps.iter().map(ProcessStep::display_command).collect()
    }
}

impl StepRunner for RecordingRunner {
    fn run(&mut self, step: &ProcessStep) -> Result<(), ExecError> {
        self.steps.push(step.clone());

        let output = self.outputs.get(&step.kind).cloned().unwrap_or_default();
        if output.success_status() {
            Ok(())
        } else {
            Err(ExecError::StepFailed {
                step: step.kind,
                command: step.display_command(),
                code: Some(output.status),
                stderr: output.stderr,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_runner() {
        let mut runner = RecordingRunner::new().fail_on(StepKind::Install, 1, "permission denied");

        let configure = ProcessStep::new(StepKind::Configure, "cmake", "b").arg("..");
        let install = ProcessStep::new(StepKind::Install, "cmake", "b").args(["--install", "."]);

        runner.run(&configure).unwrap();
        let err = runner.run(&install).unwrap_err();

        assert_eq!(runner.calls(), vec!["cmake ..", "cmake --install ."]);
        assert!(err.to_string().contains("permission denied"));
    }
}
