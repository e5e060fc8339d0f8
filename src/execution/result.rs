//! Run results and the step failure error

use crate::core::{ExecutionEnvironment, RunStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Exit status of a step action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitStatus {
    Success,
    /// `code` is `None` when the action never produced an exit code
    /// (spawn failure, killed by a signal)
    Failure { code: Option<i32> },
}

impl ExitStatus {
    pub fn from_code(code: Option<i32>) -> Self {
        match code {
            Some(0) => ExitStatus::Success,
            code => ExitStatus::Failure { code },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExitStatus::Success)
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitStatus::Success => write!(f, "success"),
            ExitStatus::Failure { code: Some(code) } => write!(f, "exit code {}", code),
            ExitStatus::Failure { code: None } => write!(f, "no exit code"),
        }
    }
}

/// Why a run did not succeed
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum RunError {
    #[error("step '{step}' failed with {status}")]
    StepFailed { step: String, status: ExitStatus },
}

impl RunError {
    pub fn step(&self) -> &str {
        match self {
            RunError::StepFailed { step, .. } => step,
        }
    }

    pub fn status(&self) -> ExitStatus {
        match self {
            RunError::StepFailed { status, .. } => *status,
        }
    }
}

/// Outcome of one invoked step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub step_name: String,
    pub exit_status: ExitStatus,

    /// Captured stdout and stderr
    pub output: String,

    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// Outcome of one pipeline run in one environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub execution_id: Uuid,
    pub pipeline_name: String,
    pub environment: ExecutionEnvironment,
    pub status: RunStatus,

    /// Invoked steps only, in order
    pub steps: Vec<StepResult>,

    /// First failure, if any
    pub failure: Option<RunError>,

    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl RunResult {
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Succeeded
    }

    /// Name of the step the run failed at
    pub fn failed_step(&self) -> Option<&str> {
        self.failure.as_ref().map(RunError::step)
    }

    /// The run as a `Result`, for `?` at call sites
    pub fn outcome(&self) -> Result<(), RunError> {
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    pub fn step(&self, name: &str) -> Option<&StepResult> {
        self.steps.iter().find(|s| s.step_name == name)
    }
}

/// Results of every environment run of a workflow, in matrix order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowResult {
    pub runs: Vec<RunResult>,
}

impl WorkflowResult {
    /// Succeeds iff every environment run succeeded
    pub fn is_success(&self) -> bool {
        !self.runs.is_empty() && self.runs.iter().all(RunResult::is_success)
    }

    pub fn failed_runs(&self) -> impl Iterator<Item = &RunResult> {
        self.runs.iter().filter(|r| !r.is_success())
    }
}
