//! Pipeline execution: running steps and fanning out over the matrix

pub mod engine;
pub mod executor;
pub mod result;
pub mod scheduler;

pub use engine::{EventHandler, ExecutionEngine, ExecutionEvent};
pub use executor::{ActionError, ActionExecutor, ActionOutput, ShellExecutor, StepInvocation};
pub use result::{ExitStatus, RunError, RunResult, StepResult, WorkflowResult};
pub use scheduler::{MatrixScheduler, SchedulingStrategy};
