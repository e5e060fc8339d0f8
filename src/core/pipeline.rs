//! Pipeline domain model

use crate::core::{
    environment::ExecutionEnvironment,
    state::{PipelineState, StepState},
    step::Step,
};
use std::collections::HashMap;

/// An ordered list of steps plus the state of one run over them
#[derive(Debug, Clone)]
pub struct Pipeline {
    pub name: String,

    /// Workflow variables available to all steps
    pub variables: HashMap<String, String>,

    /// Steps in declaration order
    pub steps: Vec<Step>,

    /// Execution state
    pub state: PipelineState,
}

impl Pipeline {
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Self {
        Pipeline {
            name: name.into(),
            variables: HashMap::new(),
            steps,
            state: PipelineState::new(),
        }
    }

    /// Get a step by name
    pub fn step(&self, name: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.name == name)
    }

    /// Fresh copy with all run state reset, for an independent run
    pub fn fresh(&self) -> Self {
        let mut copy = self.clone();
        copy.state = PipelineState::new();
        for step in &mut copy.steps {
            step.state = StepState::Pending;
        }
        copy
    }

    /// Names of steps whose action was started, in order
    pub fn invoked_steps(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|s| s.state.was_invoked())
            .map(|s| s.name.as_str())
            .collect()
    }

    /// Placeholder values for a run in `env`; environment values win over workflow variables
    pub fn variables_for(&self, env: &ExecutionEnvironment) -> HashMap<String, String> {
        let mut variables = self.variables.clone();
        variables.extend(env.variables());
        variables
    }
}
