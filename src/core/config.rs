//! Workflow configuration from YAML

use crate::core::{
    environment::{EnvironmentMatrix, ExecutionEnvironment},
    step::{Step, StepAction},
    trigger::{BranchPattern, EventFilter, EventKind, Trigger},
    Pipeline,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Workflow file used when none is given on the command line
pub const DEFAULT_WORKFLOW_FILE: &str = "ci.yml";

/// Top-level workflow configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Workflow name
    pub name: String,

    /// Events that schedule a run
    #[serde(rename = "on", default)]
    pub triggers: TriggerConfig,

    /// Environment matrix
    pub matrix: EnvironmentMatrix,

    /// Global variables available to all steps
    #[serde(default)]
    pub variables: HashMap<String, String>,

    /// Steps, run in this order
    pub steps: Vec<StepConfig>,
}

/// The `on:` block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TriggerConfig {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub push: Option<BranchFilterConfig>,

    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<BranchFilterConfig>,
}

/// Branch filter for one event kind; empty matches every branch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BranchFilterConfig {
    #[serde(default)]
    pub branches: Vec<String>,
}

/// Step configuration as defined in YAML. Exactly one action key must be set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepConfig {
    /// Step name
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toolchain: Option<ToolchainConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install: Option<String>,

    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub checkout: Option<CheckoutConfig>,

    /// Extra environment variables for this step
    #[serde(default)]
    pub env: HashMap<String, String>,

    #[serde(default)]
    pub working_directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolchainConfig {
    #[serde(default = "default_toolchain_version")]
    pub version: String,

    #[serde(default)]
    pub components: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckoutConfig {
    #[serde(default, rename = "ref")]
    pub reference: Option<String>,
}

fn default_toolchain_version() -> String {
    "{{ toolchain }}".to_string()
}

/// Treat a key that is present with a null value (`push:`) as an empty mapping
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(|value| Some(value.unwrap_or_default()))
}

impl StepConfig {
    /// Resolve the single declared action
    pub fn action(&self) -> Result<StepAction> {
        let mut actions = Vec::new();
        if let Some(command) = &self.run {
            actions.push(StepAction::Run(command.clone()));
        }
        if let Some(toolchain) = &self.toolchain {
            actions.push(StepAction::Toolchain {
                version: toolchain.version.clone(),
                components: toolchain.components.clone(),
            });
        }
        if let Some(tool) = &self.install {
            actions.push(StepAction::Install(tool.clone()));
        }
        if let Some(checkout) = &self.checkout {
            actions.push(StepAction::Checkout {
                reference: checkout.reference.clone().unwrap_or_else(|| "HEAD".to_string()),
            });
        }

        match actions.len() {
            0 => anyhow::bail!(
                "Step '{}' declares no action (expected one of run, toolchain, install, checkout)",
                self.name
            ),
            1 => Ok(actions.remove(0)),
            _ => anyhow::bail!("Step '{}' declares more than one action", self.name),
        }
    }

    fn to_step(&self) -> Result<Step> {
        let mut step = Step::new(self.name.clone(), self.action()?);
        step.env = self.env.clone();
        step.working_directory = self.working_directory.clone();
        Ok(step)
    }
}

impl WorkflowConfig {
    /// Load workflow configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read workflow file {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Invalid workflow file {}", path.display()))
    }

    /// Parse workflow configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: WorkflowConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the workflow configuration
    pub fn validate(&self) -> Result<()> {
        if self.steps.is_empty() {
            anyhow::bail!("Workflow '{}' has no steps", self.name);
        }

        let mut seen = std::collections::HashSet::new();
        for step in &self.steps {
            if step.name.trim().is_empty() {
                anyhow::bail!("Step names must not be empty");
            }
            if !seen.insert(&step.name) {
                anyhow::bail!("Duplicate step name: {}", step.name);
            }
            step.action()?;
        }

        if self.matrix.os.is_empty() {
            anyhow::bail!("Matrix axis 'os' must list at least one value");
        }
        if self.matrix.toolchain.is_empty() {
            anyhow::bail!("Matrix axis 'toolchain' must list at least one value");
        }
        if self.matrix.expand().is_empty() {
            anyhow::bail!("Matrix exclusions remove every environment");
        }

        self.trigger()?;

        Ok(())
    }

    /// Build the trigger from the `on:` block
    pub fn trigger(&self) -> Result<Trigger> {
        let mut filters = Vec::new();
        let declared = [
            (EventKind::Push, &self.triggers.push),
            (EventKind::PullRequest, &self.triggers.pull_request),
        ];
        for (kind, filter) in declared {
            if let Some(filter) = filter {
                let branches = filter
                    .branches
                    .iter()
                    .map(|b| {
                        BranchPattern::parse(b)
                            .with_context(|| format!("Invalid branch filter '{}' for {}", b, kind))
                    })
                    .collect::<Result<Vec<_>>>()?;
                filters.push(EventFilter { kind, branches });
            }
        }
        Ok(Trigger::new(filters))
    }

    /// Expanded environments of the matrix
    pub fn environments(&self) -> Vec<ExecutionEnvironment> {
        self.matrix.expand()
    }

    /// Convert config to a Pipeline domain model
    pub fn to_pipeline(&self) -> Result<Pipeline> {
        let steps = self
            .steps
            .iter()
            .map(StepConfig::to_step)
            .collect::<Result<Vec<_>>>()?;
        let mut pipeline = Pipeline::new(self.name.clone(), steps);
        pipeline.variables = self.variables.clone();
        Ok(pipeline)
    }
}

/// Format-check, lint and test on `macOS-latest` with the stable toolchain,
/// triggered by pushes and pull requests to `master`.
pub fn default_workflow() -> WorkflowConfig {
    let master = || {
        Some(BranchFilterConfig {
            branches: vec!["master".to_string()],
        })
    };
    let step = |name: &str| StepConfig {
        name: name.to_string(),
        run: None,
        toolchain: None,
        install: None,
        checkout: None,
        env: HashMap::new(),
        working_directory: None,
    };

    WorkflowConfig {
        name: "CI".to_string(),
        triggers: TriggerConfig {
            push: master(),
            pull_request: master(),
        },
        // Linux and Windows runners left out of the matrix
        matrix: EnvironmentMatrix::single("macOS-latest"),
        variables: HashMap::new(),
        steps: vec![
            StepConfig {
                toolchain: Some(ToolchainConfig {
                    version: default_toolchain_version(),
                    components: vec!["rustfmt".to_string(), "clippy".to_string()],
                }),
                ..step("Setup toolchain")
            },
            StepConfig {
                install: Some("cargo-make".to_string()),
                ..step("Install cargo-make")
            },
            StepConfig {
                checkout: Some(CheckoutConfig::default()),
                ..step("Checkout")
            },
            StepConfig {
                run: Some("cargo make format-check".to_string()),
                ..step("Format check")
            },
            StepConfig {
                run: Some("cargo make clippy".to_string()),
                ..step("Lint")
            },
            StepConfig {
                run: Some("cargo make test".to_string()),
                ..step("Test")
            },
        ],
    }
}
