//! Test utility functions for workflow scenarios

use async_trait::async_trait;
use ci_runner::core::config::WorkflowConfig;
use ci_runner::core::{ExecutionEnvironment, Pipeline, RunStatus, StepState};
use ci_runner::execution::{
    ActionError, ActionExecutor, ActionOutput, ExecutionEngine, RunResult, StepInvocation,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// One recorded invocation
#[derive(Debug, Clone)]
pub struct Call {
    pub step_name: String,
    pub command: String,
    pub environment: ExecutionEnvironment,
}

/// Mock executor with scripted exit codes per step name
///
/// Steps without a script exit with 0.
#[derive(Clone, Default)]
pub struct MockExecutor {
    exit_codes: Arc<HashMap<String, i32>>,
    spawn_errors: Arc<Vec<String>>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `step` exit with `code`
    pub fn failing(steps: &[(&str, i32)]) -> Self {
        Self {
            exit_codes: Arc::new(steps.iter().map(|(s, c)| (s.to_string(), *c)).collect()),
            ..Self::default()
        }
    }

    /// Make `step` fail before producing an exit code
    pub fn unspawnable(step: &str) -> Self {
        Self {
            spawn_errors: Arc::new(vec![step.to_string()]),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn invoked(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.step_name).collect()
    }
}

#[async_trait]
impl ActionExecutor for MockExecutor {
    async fn execute(&self, invocation: &StepInvocation) -> Result<ActionOutput, ActionError> {
        self.calls.lock().unwrap().push(Call {
            step_name: invocation.step_name.clone(),
            command: invocation.command.clone(),
            environment: invocation.environment.clone(),
        });

        if self.spawn_errors.contains(&invocation.step_name) {
            return Err(ActionError::Internal(format!(
                "MockExecutor: cannot start {}",
                invocation.step_name
            )));
        }

        match self.exit_codes.get(&invocation.step_name) {
            Some(code) => Ok(ActionOutput {
                exit_code: Some(*code),
                stdout: String::new(),
                stderr: format!("{} failed", invocation.step_name),
            }),
            None => Ok(ActionOutput {
                exit_code: Some(0),
                stdout: format!("{} ok", invocation.step_name),
                stderr: String::new(),
            }),
        }
    }
}

/// The six-step workflow: setup, install, checkout, format, lint, test
pub const CI_WORKFLOW: &str = r#"
name: "CI"
on:
  push:
    branches: [master]
  pull_request:
    branches: [master]
matrix:
  os: [macOS-latest]
steps:
  - name: setup
    toolchain:
      components: [rustfmt, clippy]
  - name: install
    install: cargo-make
  - name: checkout
    checkout: {}
  - name: format
    run: cargo make format-check
  - name: lint
    run: cargo make clippy
  - name: test
    run: cargo make test
"#;

pub fn ci_config() -> WorkflowConfig {
    WorkflowConfig::from_yaml(CI_WORKFLOW).expect("CI workflow should parse")
}

pub fn pipeline_from_yaml(yaml: &str) -> Pipeline {
    WorkflowConfig::from_yaml(yaml)
        .and_then(|c| c.to_pipeline())
        .expect("Failed to build pipeline from YAML")
}

pub fn mac_stable() -> ExecutionEnvironment {
    ExecutionEnvironment::new("macOS-latest", "stable")
}

/// Run a pipeline once with `executor`
pub async fn run_with(executor: MockExecutor, pipeline: &mut Pipeline) -> RunResult {
    let engine = ExecutionEngine::new(executor);
    engine.run_pipeline(&mac_stable(), pipeline).await
}

/// Assert the run succeeded
pub fn assert_run_succeeded(result: &RunResult) {
    assert_eq!(
        result.status,
        RunStatus::Succeeded,
        "Run should have succeeded, failure: {:?}",
        result.failure
    );
    assert!(result.failure.is_none());
}

/// Assert the run failed at `step`
pub fn assert_run_failed_at(result: &RunResult, step: &str) {
    assert_eq!(result.status, RunStatus::Failed, "Run should have failed");
    assert_eq!(
        result.failed_step(),
        Some(step),
        "Run should have failed at '{}', failure: {:?}",
        step,
        result.failure
    );
}

/// Assert the step was never invoked
pub fn assert_step_not_invoked(pipeline: &Pipeline, executor: &MockExecutor, step: &str) {
    assert!(
        !executor.invoked().iter().any(|s| s == step),
        "Step '{}' should not have been invoked",
        step
    );
    let state = &pipeline
        .step(step)
        .unwrap_or_else(|| panic!("Step '{}' not found", step))
        .state;
    assert!(
        matches!(state, StepState::Skipped { .. }),
        "Step '{}' should be skipped, was {:?}",
        step,
        state
    );
}
