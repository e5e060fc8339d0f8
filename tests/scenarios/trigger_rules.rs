//! Test: which events schedule a run

use crate::helpers::*;
use ci_runner::core::config::{default_workflow, WorkflowConfig};
use ci_runner::core::{evaluate_trigger, Event, EventKind};

#[test]
fn test_only_master_triggers() {
    let trigger = ci_config().trigger().unwrap();
    let cases = [
        (EventKind::Push, "master", true),
        (EventKind::PullRequest, "master", true),
        (EventKind::Push, "refs/heads/master", true),
        (EventKind::Push, "main", false),
        (EventKind::PullRequest, "feature/x", false),
        (EventKind::Push, "master-old", false),
    ];

    for (kind, branch, expected) in cases {
        assert_eq!(
            evaluate_trigger(&trigger, &Event::new(kind, branch)),
            expected,
            "{} on {}",
            kind,
            branch
        );
    }
}

#[test]
fn test_default_workflow_matches_ci_file() {
    let default = default_workflow();
    let trigger = default.trigger().unwrap();
    assert!(trigger.evaluate(&Event::new(EventKind::Push, "master")));
    assert!(!trigger.evaluate(&Event::new(EventKind::Push, "develop")));
    assert_eq!(default.environments(), ci_config().environments());
}

#[test]
fn test_push_only_workflow() {
    let config = WorkflowConfig::from_yaml(
        r#"
name: "Release"
on:
  push:
    branches: ["release/*"]
matrix:
  os: [linux]
steps:
  - name: publish
    run: cargo publish --dry-run
"#,
    )
    .unwrap();
    let trigger = config.trigger().unwrap();

    assert!(trigger.evaluate(&Event::new(EventKind::Push, "release/1.2")));
    assert!(!trigger.evaluate(&Event::new(EventKind::PullRequest, "release/1.2")));
    assert!(!trigger.evaluate(&Event::new(EventKind::Push, "master")));
}

#[test]
fn test_workflow_without_triggers_never_fires() {
    let config = WorkflowConfig::from_yaml(
        r#"
name: "Manual"
matrix:
  os: [linux]
steps:
  - name: build
    run: cargo build
"#,
    )
    .unwrap();
    let trigger = config.trigger().unwrap();
    assert!(!trigger.evaluate(&Event::new(EventKind::Push, "master")));
}
