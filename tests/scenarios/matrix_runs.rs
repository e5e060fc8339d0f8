//! Test: environment runs are independent of each other

use crate::helpers::*;
use ci_runner::core::config::WorkflowConfig;
use ci_runner::core::{ExecutionEnvironment, RunStatus};
use ci_runner::execution::{ExecutionEngine, MatrixScheduler, SchedulingStrategy};
use std::sync::Arc;

#[tokio::test]
async fn test_two_environments_yield_independent_results() {
    let pipeline = ci_config().to_pipeline().unwrap();
    let executor = MockExecutor::new();
    let engine = ExecutionEngine::new(executor.clone());

    let mut first = pipeline.fresh();
    let mut second = pipeline.fresh();
    let a = engine.run_pipeline(&mac_stable(), &mut first).await;
    let b = engine
        .run_pipeline(&ExecutionEnvironment::new("macOS-latest", "stable"), &mut second)
        .await;

    assert_run_succeeded(&a);
    assert_run_succeeded(&b);
    assert_ne!(a.execution_id, b.execution_id);
    assert_eq!(a.steps.len(), 6);
    assert_eq!(b.steps.len(), 6);
    assert_eq!(executor.invoked().len(), 12);

    // The template itself was never run
    assert_eq!(pipeline.state.status, RunStatus::Pending);
}

#[tokio::test]
async fn test_matrix_failure_is_isolated() {
    let config = WorkflowConfig::from_yaml(
        r#"
name: "Matrix"
matrix:
  os: [linux, macos]
  toolchain: [stable, nightly]
  exclude:
    - os: macos
      toolchain: nightly
steps:
  - name: build
    run: cargo +{{ toolchain }} build
  - name: test
    run: cargo +{{ toolchain }} test
"#,
    )
    .unwrap();
    let environments = config.environments();
    assert_eq!(environments.len(), 3);

    let executor = MockExecutor::failing(&[("test", 1)]);
    let engine = Arc::new(ExecutionEngine::new(executor.clone()));
    let scheduler = MatrixScheduler::new(SchedulingStrategy::Parallel);

    let result = scheduler
        .run(engine, &config.to_pipeline().unwrap(), environments)
        .await;

    assert!(!result.is_success());
    assert_eq!(result.runs.len(), 3);
    for run in &result.runs {
        assert_run_failed_at(run, "test");
        assert_eq!(run.steps.len(), 2);
    }
    assert_eq!(executor.invoked().len(), 6);

    let mut nightly: Vec<String> = executor
        .calls()
        .into_iter()
        .filter(|c| c.environment.toolchain_version == "nightly")
        .map(|c| c.command)
        .collect();
    nightly.sort();
    assert_eq!(nightly, vec!["cargo +nightly build", "cargo +nightly test"]);
}

#[tokio::test]
async fn test_matrix_success() {
    let config = ci_config();
    let engine = Arc::new(ExecutionEngine::new(MockExecutor::new()));
    let scheduler = MatrixScheduler::new(SchedulingStrategy::LimitedParallel(1));

    let result = scheduler
        .run(engine, &config.to_pipeline().unwrap(), config.environments())
        .await;

    assert!(result.is_success());
    assert_eq!(result.runs[0].environment, mac_stable());
}
