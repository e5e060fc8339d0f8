//! Test: every step succeeds and runs exactly once, in order

use crate::helpers::*;
use ci_runner::core::StepState;

#[tokio::test]
async fn test_all_six_steps_succeed_in_order() {
    let mut pipeline = ci_config().to_pipeline().unwrap();
    let executor = MockExecutor::new();

    let result = run_with(executor.clone(), &mut pipeline).await;

    assert_run_succeeded(&result);
    assert_eq!(
        executor.invoked(),
        vec!["setup", "install", "checkout", "format", "lint", "test"]
    );
    assert_eq!(result.steps.len(), 6);
    assert!(result.steps.iter().all(|s| s.exit_status.is_success()));
    assert!(pipeline
        .steps
        .iter()
        .all(|s| matches!(s.state, StepState::Succeeded { .. })));
    assert_eq!(pipeline.state.succeeded_steps, 6);
}

#[tokio::test]
async fn test_commands_are_rendered_for_the_environment() {
    let mut pipeline = ci_config().to_pipeline().unwrap();
    let executor = MockExecutor::new();

    run_with(executor.clone(), &mut pipeline).await;

    let commands: Vec<String> = executor.calls().into_iter().map(|c| c.command).collect();
    assert_eq!(
        commands,
        vec![
            "rustup toolchain install stable --profile minimal --component rustfmt,clippy",
            "cargo install cargo-make",
            "git checkout --quiet HEAD",
            "cargo make format-check",
            "cargo make clippy",
            "cargo make test",
        ]
    );
    assert!(executor
        .calls()
        .iter()
        .all(|c| c.environment == mac_stable()));
}

#[tokio::test]
async fn test_step_output_is_kept() {
    let mut pipeline = pipeline_from_yaml(
        r#"
name: "Single"
matrix:
  os: [linux]
steps:
  - name: build
    run: cargo build
"#,
    );
    let result = run_with(MockExecutor::new(), &mut pipeline).await;

    assert_run_succeeded(&result);
    assert_eq!(result.step("build").unwrap().output, "build ok");
}

#[tokio::test]
async fn test_variables_reach_commands() {
    let mut pipeline = pipeline_from_yaml(
        r#"
name: "Vars"
matrix:
  os: [linux]
variables:
  profile: release
steps:
  - name: build
    run: "cargo build --profile {{ profile }} --target {{ os }}"
"#,
    );
    pipeline.variables.insert("profile".to_string(), "dev".to_string());
    let executor = MockExecutor::new();

    run_with(executor.clone(), &mut pipeline).await;

    assert_eq!(
        executor.calls()[0].command,
        "cargo build --profile dev --target macOS-latest"
    );
}
