//! Test: the first failing step halts the run

use crate::helpers::*;
use ci_runner::core::StepState;
use ci_runner::execution::{ExitStatus, RunError};

#[tokio::test]
async fn test_lint_failure_skips_test() {
    let mut pipeline = ci_config().to_pipeline().unwrap();
    let executor = MockExecutor::failing(&[("lint", 1)]);

    let result = run_with(executor.clone(), &mut pipeline).await;

    assert_run_failed_at(&result, "lint");
    assert_eq!(
        executor.invoked(),
        vec!["setup", "install", "checkout", "format", "lint"]
    );
    assert_step_not_invoked(&pipeline, &executor, "test");
    assert_eq!(
        result.failure,
        Some(RunError::StepFailed {
            step: "lint".to_string(),
            status: ExitStatus::Failure { code: Some(1) },
        })
    );
}

#[tokio::test]
async fn test_failure_at_each_position() {
    let names = ["setup", "install", "checkout", "format", "lint", "test"];

    for (i, failing) in names.iter().enumerate() {
        let mut pipeline = ci_config().to_pipeline().unwrap();
        let executor = MockExecutor::failing(&[(*failing, 2)]);

        let result = run_with(executor.clone(), &mut pipeline).await;

        assert_run_failed_at(&result, failing);
        assert_eq!(executor.invoked(), names[..=i].to_vec());
        for later in &names[i + 1..] {
            assert_step_not_invoked(&pipeline, &executor, later);
        }
        assert_eq!(result.steps.len(), i + 1);
    }
}

#[tokio::test]
async fn test_only_first_failure_is_reported() {
    let mut pipeline = ci_config().to_pipeline().unwrap();
    let executor = MockExecutor::failing(&[("format", 1), ("test", 101)]);

    let result = run_with(executor.clone(), &mut pipeline).await;

    assert_run_failed_at(&result, "format");
    assert!(!executor.invoked().contains(&"test".to_string()));
}

#[tokio::test]
async fn test_spawn_error_fails_without_exit_code() {
    let mut pipeline = ci_config().to_pipeline().unwrap();
    let executor = MockExecutor::unspawnable("install");

    let result = run_with(executor.clone(), &mut pipeline).await;

    assert_run_failed_at(&result, "install");
    assert_eq!(
        result.failure.as_ref().unwrap().status(),
        ExitStatus::Failure { code: None }
    );
    match &pipeline.step("install").unwrap().state {
        StepState::Failed { error, exit_code, .. } => {
            assert!(error.contains("cannot start install"));
            assert_eq!(*exit_code, None);
        }
        other => panic!("install should have failed, was {:?}", other),
    }
    assert_step_not_invoked(&pipeline, &executor, "checkout");
}
