//! Execution state models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Overall run status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Run has not started
    Pending,
    /// Run is executing steps
    Running,
    /// Every step succeeded
    Succeeded,
    /// A step failed and the run halted
    Failed,
}

/// State of a single step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StepState {
    /// Step has not been invoked yet
    Pending,
    /// Step action is executing
    Running {
        started_at: DateTime<Utc>,
    },
    /// Step action exited successfully
    Succeeded {
        output: String,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    },
    /// Step action failed
    Failed {
        error: String,
        exit_code: Option<i32>,
        started_at: DateTime<Utc>,
        failed_at: DateTime<Utc>,
    },
    /// Step was never invoked because an earlier step failed
    Skipped {
        reason: String,
    },
}

impl StepState {
    /// Whether the step's action was ever started
    pub fn was_invoked(&self) -> bool {
        matches!(
            self,
            StepState::Running { .. } | StepState::Succeeded { .. } | StepState::Failed { .. }
        )
    }
}

/// State of one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineState {
    /// Unique execution ID
    pub execution_id: Uuid,

    pub status: RunStatus,

    pub started_at: Option<DateTime<Utc>>,

    /// When the run succeeded or failed
    pub completed_at: Option<DateTime<Utc>>,

    pub total_steps: usize,

    pub succeeded_steps: usize,
}

impl PipelineState {
    pub fn new() -> Self {
        Self {
            execution_id: Uuid::new_v4(),
            status: RunStatus::Pending,
            started_at: None,
            completed_at: None,
            total_steps: 0,
            succeeded_steps: 0,
        }
    }

    /// Mark run as started
    pub fn start(&mut self, total_steps: usize) {
        self.status = RunStatus::Running;
        self.started_at = Some(Utc::now());
        self.total_steps = total_steps;
        self.succeeded_steps = 0;
    }

    pub fn step_succeeded(&mut self) {
        self.succeeded_steps += 1;
    }

    /// Mark run as succeeded
    pub fn succeed(&mut self) {
        self.status = RunStatus::Succeeded;
        self.completed_at = Some(Utc::now());
    }

    /// Mark run as failed
    pub fn fail(&mut self) {
        self.status = RunStatus::Failed;
        self.completed_at = Some(Utc::now());
    }
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::new()
    }
}
