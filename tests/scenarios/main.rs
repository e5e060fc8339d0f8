//! Scenario-based tests for the workflow runner

#[allow(dead_code)]
mod helpers;

mod fail_fast;
mod matrix_runs;
mod success_chain;
mod trigger_rules;
