//! Step action executors

use crate::core::ExecutionEnvironment;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

/// Error types for action execution
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Everything an executor needs to invoke one step
#[derive(Debug, Clone)]
pub struct StepInvocation {
    pub step_name: String,

    /// Rendered command line
    pub command: String,

    /// Step-level environment variables, already rendered
    pub env: Vec<(String, String)>,

    pub working_directory: Option<PathBuf>,

    pub environment: ExecutionEnvironment,
}

/// What an action produced
#[derive(Debug, Clone, Default)]
pub struct ActionOutput {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ActionOutput {
    pub fn success() -> Self {
        Self {
            exit_code: Some(0),
            ..Self::default()
        }
    }

    pub fn failure(code: i32) -> Self {
        Self {
            exit_code: Some(code),
            ..Self::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// stdout followed by stderr
    pub fn combined(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (_, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => format!("{}\n{}", self.stdout.trim_end(), self.stderr),
        }
    }
}

/// Trait for step execution - allows for different implementations
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    /// Run one step action to completion
    async fn execute(&self, invocation: &StepInvocation) -> Result<ActionOutput, ActionError>;
}

/// Runs step commands through the platform shell
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    shell: String,
    shell_flag: String,

    /// Directory steps run in; relative step working directories resolve against it
    base_dir: Option<PathBuf>,
}

impl Default for ShellExecutor {
    fn default() -> Self {
        if cfg!(windows) {
            Self::new("cmd", "/C")
        } else {
            Self::new("sh", "-c")
        }
    }
}

impl ShellExecutor {
    pub fn new(shell: impl Into<String>, shell_flag: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
            shell_flag: shell_flag.into(),
            base_dir: None,
        }
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    fn working_dir(&self, invocation: &StepInvocation) -> Option<PathBuf> {
        match (&self.base_dir, &invocation.working_directory) {
            (Some(base), Some(dir)) => Some(base.join(dir)),
            (Some(base), None) => Some(base.clone()),
            (None, dir) => dir.clone(),
        }
    }
}

#[async_trait]
impl ActionExecutor for ShellExecutor {
    async fn execute(&self, invocation: &StepInvocation) -> Result<ActionOutput, ActionError> {
        debug!(
            "Spawning `{} {} {}` for step {}",
            self.shell, self.shell_flag, invocation.command, invocation.step_name
        );

        let mut command = Command::new(&self.shell);
        command
            .arg(&self.shell_flag)
            .arg(&invocation.command)
            .envs(invocation.environment.process_env())
            .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .kill_on_drop(true);
        if let Some(dir) = self.working_dir(invocation) {
            command.current_dir(dir);
        }

        let output = command.output().await.map_err(|source| ActionError::Spawn {
            command: invocation.command.clone(),
            source,
        })?;

        let exit_code = output.status.code();
        if exit_code.is_none() {
            warn!("Step {} was terminated by a signal", invocation.step_name);
        }

        let result = ActionOutput {
            exit_code,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(
            "Step {} exited with {:?} ({} bytes of output)",
            invocation.step_name,
            exit_code,
            result.stdout.len() + result.stderr.len()
        );

        Ok(result)
    }
}
