//! ci-runner - run a CI workflow locally: triggers, environment matrix, fail-fast steps

pub mod cli;
pub mod core;
pub mod execution;

// Re-export commonly used types
pub use crate::core::config::{default_workflow, WorkflowConfig};
pub use crate::core::{
    evaluate_trigger, instantiate_environment, Event, EventKind, ExecutionEnvironment,
    EnvironmentMatrix, Pipeline, RunStatus, Step, StepAction, StepState, Trigger,
};
pub use crate::execution::{
    ActionExecutor, ExecutionEngine, ExecutionEvent, ExitStatus, MatrixScheduler, RunError,
    RunResult, SchedulingStrategy, ShellExecutor, WorkflowResult,
};
