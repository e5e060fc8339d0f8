//! Main execution engine - runs a pipeline against one environment

use crate::{
    core::{ExecutionEnvironment, Pipeline, RunStatus, StepState},
    execution::{
        executor::{ActionExecutor, StepInvocation},
        result::{ExitStatus, RunError, RunResult, StepResult},
    },
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Events that can occur during a pipeline run
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    RunStarted {
        execution_id: Uuid,
        pipeline_name: String,
        environment: ExecutionEnvironment,
    },
    StepStarted {
        environment: ExecutionEnvironment,
        step_name: String,
        /// 1-based position
        position: usize,
        total: usize,
        command: String,
    },
    StepOutput {
        environment: ExecutionEnvironment,
        step_name: String,
        output: String,
    },
    StepSucceeded {
        environment: ExecutionEnvironment,
        step_name: String,
    },
    StepFailed {
        environment: ExecutionEnvironment,
        step_name: String,
        status: ExitStatus,
        error: String,
    },
    StepSkipped {
        environment: ExecutionEnvironment,
        step_name: String,
    },
    RunFinished {
        execution_id: Uuid,
        environment: ExecutionEnvironment,
        status: RunStatus,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(ExecutionEvent) + Send + Sync>;

/// Runs pipelines step by step, stopping at the first failure
pub struct ExecutionEngine<E> {
    executor: E,
    event_handlers: Vec<EventHandler>,
}

impl<E: ActionExecutor> ExecutionEngine<E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            event_handlers: Vec::new(),
        }
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(ExecutionEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    fn emit_event(&self, event: ExecutionEvent) {
        for handler in &self.event_handlers {
            handler(event.clone());
        }
    }

    /// Execute every step of `pipeline` against `env` in declaration order.
    ///
    /// The first failing step halts the run: later steps are marked
    /// skipped and never invoked. There are no retries.
    pub async fn run_pipeline(&self, env: &ExecutionEnvironment, pipeline: &mut Pipeline) -> RunResult {
        let execution_id = pipeline.state.execution_id;
        let total = pipeline.steps.len();

        info!("Starting {} on {} ({})", pipeline.name, env, execution_id);
        self.emit_event(ExecutionEvent::RunStarted {
            execution_id,
            pipeline_name: pipeline.name.clone(),
            environment: env.clone(),
        });

        pipeline.state.start(total);
        let variables = pipeline.variables_for(env);
        let mut results = Vec::with_capacity(total);
        let mut failure: Option<RunError> = None;

        for (index, step) in pipeline.steps.iter_mut().enumerate() {
            if let Some(err) = &failure {
                step.state = StepState::Skipped {
                    reason: format!("'{}' failed", err.step()),
                };
                self.emit_event(ExecutionEvent::StepSkipped {
                    environment: env.clone(),
                    step_name: step.name.clone(),
                });
                continue;
            }

            let invocation = StepInvocation {
                step_name: step.name.clone(),
                command: step.render_command(&variables),
                env: step.render_env(&variables),
                working_directory: step.working_directory.clone(),
                environment: env.clone(),
            };

            let started_at = Utc::now();
            step.state = StepState::Running { started_at };
            info!("[{}] Step {}/{}: {}", env, index + 1, total, step.name);
            self.emit_event(ExecutionEvent::StepStarted {
                environment: env.clone(),
                step_name: step.name.clone(),
                position: index + 1,
                total,
                command: invocation.command.clone(),
            });

            let (exit_status, output, error_message) = match self.executor.execute(&invocation).await {
                Ok(out) => {
                    let status = ExitStatus::from_code(out.exit_code);
                    let message = format!("`{}` exited with {}", invocation.command, status);
                    (status, out.combined(), message)
                }
                Err(e) => {
                    error!("[{}] Could not run step {}: {}", env, step.name, e);
                    (ExitStatus::Failure { code: None }, String::new(), e.to_string())
                }
            };
            let completed_at = Utc::now();

            if !output.is_empty() {
                self.emit_event(ExecutionEvent::StepOutput {
                    environment: env.clone(),
                    step_name: step.name.clone(),
                    output: output.clone(),
                });
            }

            match exit_status {
                ExitStatus::Success => {
                    step.state = StepState::Succeeded {
                        output: output.clone(),
                        started_at,
                        completed_at,
                    };
                    pipeline.state.step_succeeded();
                    self.emit_event(ExecutionEvent::StepSucceeded {
                        environment: env.clone(),
                        step_name: step.name.clone(),
                    });
                }
                ExitStatus::Failure { code } => {
                    warn!("[{}] Step {} failed: {}", env, step.name, error_message);
                    step.state = StepState::Failed {
                        error: error_message.clone(),
                        exit_code: code,
                        started_at,
                        failed_at: completed_at,
                    };
                    self.emit_event(ExecutionEvent::StepFailed {
                        environment: env.clone(),
                        step_name: step.name.clone(),
                        status: exit_status,
                        error: error_message,
                    });
                    failure = Some(RunError::StepFailed {
                        step: step.name.clone(),
                        status: exit_status,
                    });
                }
            }

            results.push(StepResult {
                step_name: step.name.clone(),
                exit_status,
                output,
                started_at,
                completed_at,
            });
        }

        if failure.is_some() {
            pipeline.state.fail();
        } else {
            pipeline.state.succeed();
        }
        let status = pipeline.state.status;

        info!("Finished {} on {}: {:?}", pipeline.name, env, status);
        self.emit_event(ExecutionEvent::RunFinished {
            execution_id,
            environment: env.clone(),
            status,
        });

        RunResult {
            execution_id,
            pipeline_name: pipeline.name.clone(),
            environment: env.clone(),
            status,
            steps: results,
            failure,
            started_at: pipeline.state.started_at.unwrap_or_else(Utc::now),
            completed_at: pipeline.state.completed_at.unwrap_or_else(Utc::now),
        }
    }
}
