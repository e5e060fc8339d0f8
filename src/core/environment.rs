//! Execution environments and the environment matrix

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Toolchain used when the matrix declares no toolchain axis
pub const DEFAULT_TOOLCHAIN: &str = "stable";

/// One concrete environment a pipeline runs against
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecutionEnvironment {
    pub operating_system: String,
    pub toolchain_version: String,
}

impl ExecutionEnvironment {
    pub fn new(operating_system: impl Into<String>, toolchain_version: impl Into<String>) -> Self {
        Self {
            operating_system: operating_system.into(),
            toolchain_version: toolchain_version.into(),
        }
    }

    /// Values available to `{{ name }}` placeholders in step commands
    pub fn variables(&self) -> HashMap<String, String> {
        let mut vars = HashMap::new();
        vars.insert("os".to_string(), self.operating_system.clone());
        vars.insert("toolchain".to_string(), self.toolchain_version.clone());
        vars
    }

    /// Process environment variables exported to every step
    pub fn process_env(&self) -> Vec<(&'static str, String)> {
        vec![
            ("CI_OS", self.operating_system.clone()),
            ("CI_TOOLCHAIN", self.toolchain_version.clone()),
        ]
    }
}

impl fmt::Display for ExecutionEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.operating_system, self.toolchain_version)
    }
}

/// Partial combination removed from the expansion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixExclude {
    #[serde(default)]
    pub os: Option<String>,

    #[serde(default)]
    pub toolchain: Option<String>,
}

impl MatrixExclude {
    fn matches(&self, env: &ExecutionEnvironment) -> bool {
        let os_ok = self.os.as_ref().map_or(true, |os| *os == env.operating_system);
        let tc_ok = self
            .toolchain
            .as_ref()
            .map_or(true, |tc| *tc == env.toolchain_version);
        os_ok && tc_ok
    }
}

/// Declared environment matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentMatrix {
    /// Operating system axis
    pub os: Vec<String>,

    /// Toolchain axis (defaults to `[stable]`)
    #[serde(default = "default_toolchains")]
    pub toolchain: Vec<String>,

    #[serde(default)]
    pub exclude: Vec<MatrixExclude>,
}

fn default_toolchains() -> Vec<String> {
    vec![DEFAULT_TOOLCHAIN.to_string()]
}

impl EnvironmentMatrix {
    /// Single-os matrix on the default toolchain
    pub fn single(os: impl Into<String>) -> Self {
        Self {
            os: vec![os.into()],
            toolchain: default_toolchains(),
            exclude: Vec::new(),
        }
    }

    /// Expand into concrete environments, os outer and toolchain inner
    pub fn expand(&self) -> Vec<ExecutionEnvironment> {
        let mut envs = Vec::with_capacity(self.os.len() * self.toolchain.len());
        for os in &self.os {
            for toolchain in &self.toolchain {
                let env = ExecutionEnvironment::new(os.clone(), toolchain.clone());
                if !self.exclude.iter().any(|e| e.matches(&env)) && !envs.contains(&env) {
                    envs.push(env);
                }
            }
        }
        envs
    }
}

/// Free-function form of [`EnvironmentMatrix::expand`]
pub fn instantiate_environment(matrix: &EnvironmentMatrix) -> Vec<ExecutionEnvironment> {
    matrix.expand()
}
