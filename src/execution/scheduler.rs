//! Matrix scheduler - runs one independent pipeline per environment

use crate::{
    core::{ExecutionEnvironment, Pipeline},
    execution::{
        engine::ExecutionEngine,
        executor::ActionExecutor,
        result::{RunResult, WorkflowResult},
    },
};
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

/// Strategy for running environments of the matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulingStrategy {
    /// One environment at a time, in matrix order
    #[default]
    Sequential,

    /// All environments at once
    Parallel,

    /// At most N environments at once
    LimitedParallel(usize),
}

/// Runs the pipeline once per environment
pub struct MatrixScheduler {
    strategy: SchedulingStrategy,
}

impl MatrixScheduler {
    pub fn new(strategy: SchedulingStrategy) -> Self {
        Self { strategy }
    }

    /// Run `pipeline` against every environment.
    ///
    /// Each run gets a fresh copy of the pipeline, so runs share no state.
    /// Results come back in the order of `environments`.
    pub async fn run<E>(
        &self,
        engine: Arc<ExecutionEngine<E>>,
        pipeline: &Pipeline,
        environments: Vec<ExecutionEnvironment>,
    ) -> WorkflowResult
    where
        E: ActionExecutor + 'static,
    {
        self.run_until(engine, pipeline, environments, std::future::pending())
            .await
            .unwrap_or_default()
    }

    /// Like [`run`](Self::run), but stops every environment once `cancel`
    /// resolves.
    ///
    /// Returns `None` when cancelled. By then all running environment tasks
    /// have been dropped, and with them their step processes.
    pub async fn run_until<E, C>(
        &self,
        engine: Arc<ExecutionEngine<E>>,
        pipeline: &Pipeline,
        environments: Vec<ExecutionEnvironment>,
        cancel: C,
    ) -> Option<WorkflowResult>
    where
        E: ActionExecutor + 'static,
        C: Future<Output = ()>,
    {
        let total = environments.len();
        let limit = match self.strategy {
            SchedulingStrategy::Sequential => 1,
            SchedulingStrategy::Parallel => total.max(1),
            SchedulingStrategy::LimitedParallel(max) => max.max(1),
        };
        debug!("Running {} environments with up to {} at once", total, limit);

        let mut queue = environments.into_iter().enumerate();
        let mut tasks = JoinSet::new();
        let mut slots: Vec<Option<RunResult>> = vec![None; total];
        tokio::pin!(cancel);

        loop {
            // Environments start in matrix order as slots free up
            while tasks.len() < limit {
                let Some((index, env)) = queue.next() else {
                    break;
                };
                let engine = engine.clone();
                let mut run = pipeline.fresh();
                tasks.spawn(async move {
                    let result = engine.run_pipeline(&env, &mut run).await;
                    (index, result)
                });
            }
            if tasks.is_empty() {
                break;
            }

            tokio::select! {
                joined = tasks.join_next() => match joined {
                    Some(Ok((index, result))) => slots[index] = Some(result),
                    Some(Err(e)) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                    Some(Err(e)) => error!("Environment run was cancelled: {}", e),
                    None => {}
                },
                _ = &mut cancel => {
                    warn!("Stopping {} running environments", tasks.len());
                    tasks.shutdown().await;
                    return None;
                }
            }
        }

        Some(WorkflowResult {
            runs: slots.into_iter().flatten().collect(),
        })
    }
}
