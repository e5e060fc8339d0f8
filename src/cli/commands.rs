//! CLI command definitions

use crate::core::config::{WorkflowConfig, DEFAULT_WORKFLOW_FILE};
use crate::core::{Event, EventKind, ExecutionEnvironment, Pipeline};
use crate::execution::SchedulingStrategy;
use anyhow::Result;
use clap::Args;

/// Run the workflow
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Path to workflow YAML file
    #[arg(short, long, default_value = DEFAULT_WORKFLOW_FILE)]
    pub file: String,

    /// Event that scheduled this run; when given, the workflow triggers are checked
    #[arg(long, value_enum, requires = "branch")]
    pub event: Option<EventArg>,

    /// Branch of the event (target branch for pull requests)
    #[arg(long)]
    pub branch: Option<String>,

    /// Only run matrix environments with this operating system
    #[arg(long)]
    pub os: Option<String>,

    /// Variable overrides (key=value)
    #[arg(long, value_parser = parse_key_value)]
    pub variable: Vec<(String, String)>,

    /// How matrix environments are scheduled
    #[arg(long, value_enum, default_value_t = SchedulingStrategyArg::Sequential)]
    pub strategy: SchedulingStrategyArg,

    /// Limit for `parallel-limited`
    #[arg(long, default_value_t = 2)]
    pub jobs: usize,

    /// Directory steps run in
    #[arg(long)]
    pub workdir: Option<String>,

    /// Print the results as JSON
    #[arg(long)]
    pub json: bool,
}

/// What `run` does with a loaded workflow
#[derive(Debug)]
pub enum RunPlan {
    /// The given event does not trigger the workflow; nothing runs
    NotTriggered(Event),
    /// Run `pipeline` once per environment
    Run {
        pipeline: Pipeline,
        environments: Vec<ExecutionEnvironment>,
    },
}

impl RunCommand {
    /// The event given on the command line, if any
    pub fn event(&self) -> Option<Event> {
        match (self.event, &self.branch) {
            (Some(kind), Some(branch)) => Some(Event::new(kind.into(), branch.clone())),
            _ => None,
        }
    }

    /// Apply the trigger check, `--os` filter and `--variable` overrides
    pub fn plan(&self, config: &WorkflowConfig) -> Result<RunPlan> {
        if let Some(event) = self.event() {
            if !config.trigger()?.evaluate(&event) {
                return Ok(RunPlan::NotTriggered(event));
            }
        }

        let mut environments = config.environments();
        if let Some(os) = &self.os {
            environments.retain(|env| env.operating_system.eq_ignore_ascii_case(os));
            if environments.is_empty() {
                anyhow::bail!("No matrix environment uses operating system '{}'", os);
            }
        }

        let mut pipeline = config.to_pipeline()?;
        pipeline.variables.extend(self.variable.iter().cloned());

        Ok(RunPlan::Run {
            pipeline,
            environments,
        })
    }
}

/// Validate a workflow file
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to workflow YAML file
    #[arg(short, long, default_value = DEFAULT_WORKFLOW_FILE)]
    pub file: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// List matrix environments
#[derive(Debug, Args, Clone)]
pub struct MatrixCommand {
    /// Path to workflow YAML file
    #[arg(short, long, default_value = DEFAULT_WORKFLOW_FILE)]
    pub file: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Check an event against the workflow triggers
#[derive(Debug, Args, Clone)]
pub struct TriggerCommand {
    /// Path to workflow YAML file
    #[arg(short, long, default_value = DEFAULT_WORKFLOW_FILE)]
    pub file: String,

    #[arg(long, value_enum)]
    pub event: EventArg,

    #[arg(long)]
    pub branch: String,
}

/// Event kind argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EventArg {
    Push,
    #[value(alias = "pull_request")]
    PullRequest,
}

impl From<EventArg> for EventKind {
    fn from(arg: EventArg) -> Self {
        match arg {
            EventArg::Push => EventKind::Push,
            EventArg::PullRequest => EventKind::PullRequest,
        }
    }
}

/// Scheduling strategy argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SchedulingStrategyArg {
    Sequential,
    Parallel,
    #[value(name = "parallel-limited")]
    ParallelLimited,
}

impl SchedulingStrategyArg {
    pub fn to_strategy(self, jobs: usize) -> SchedulingStrategy {
        match self {
            SchedulingStrategyArg::Sequential => SchedulingStrategy::Sequential,
            SchedulingStrategyArg::Parallel => SchedulingStrategy::Parallel,
            SchedulingStrategyArg::ParallelLimited => SchedulingStrategy::LimitedParallel(jobs),
        }
    }
}

/// Parse key=value pairs
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("Invalid key=value pair: {}", s)),
    }
}
