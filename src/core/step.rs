//! Step domain model

use crate::core::state::StepState;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{ ([\w.-]+) \}\}").expect("placeholder pattern is valid"));

/// What a step does when invoked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    /// Arbitrary shell command line
    Run(String),

    /// Install a toolchain with extra components
    Toolchain {
        version: String,
        components: Vec<String>,
    },

    /// Install a helper tool
    Install(String),

    /// Check out the given ref of the working tree
    Checkout { reference: String },
}

impl StepAction {
    /// Command line before placeholder substitution
    pub fn command_template(&self) -> String {
        match self {
            StepAction::Run(command) => command.clone(),
            StepAction::Toolchain {
                version,
                components,
            } => {
                let mut command = format!("rustup toolchain install {} --profile minimal", version);
                if !components.is_empty() {
                    command.push_str(&format!(" --component {}", components.join(",")));
                }
                command
            }
            StepAction::Install(tool) => format!("cargo install {}", tool),
            StepAction::Checkout { reference } => format!("git checkout --quiet {}", reference),
        }
    }
}

/// A single step in a pipeline
#[derive(Debug, Clone)]
pub struct Step {
    /// Step name, unique within a pipeline
    pub name: String,

    pub action: StepAction,

    /// Extra process environment for this step
    pub env: HashMap<String, String>,

    /// Working directory (relative to the runner's directory)
    pub working_directory: Option<PathBuf>,

    /// Runtime state
    pub state: StepState,
}

impl Step {
    pub fn new(name: impl Into<String>, action: StepAction) -> Self {
        Step {
            name: name.into(),
            action,
            env: HashMap::new(),
            working_directory: None,
            state: StepState::Pending,
        }
    }

    /// Shorthand for a `run` step
    pub fn run(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self::new(name, StepAction::Run(command.into()))
    }

    /// Render the command line with variable substitution
    pub fn render_command(&self, variables: &HashMap<String, String>) -> String {
        render_template(&self.action.command_template(), variables)
    }

    /// Render env values with the same substitution as the command
    pub fn render_env(&self, variables: &HashMap<String, String>) -> Vec<(String, String)> {
        let mut env: Vec<(String, String)> = self
            .env
            .iter()
            .map(|(k, v)| (k.clone(), render_template(v, variables)))
            .collect();
        env.sort();
        env
    }
}

/// Replace placeholders of the form `{{ name }}`; unknown names are left as-is.
///
/// One left-to-right pass: substituted values are never rendered again.
pub fn render_template(template: &str, variables: &HashMap<String, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match variables.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}
