//! CLI output formatting

use crate::{
    core::{ExecutionEnvironment, RunStatus},
    execution::{ExecutionEvent, ExitStatus, RunResult, WorkflowResult},
};
use console::Emoji;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static SKIP: Emoji<'_, '_> = Emoji("⏭️  ", "- ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Format a run status for display
pub fn format_status(status: RunStatus) -> String {
    match status {
        RunStatus::Pending => style("PENDING").dim().to_string(),
        RunStatus::Running => style("RUNNING").yellow().to_string(),
        RunStatus::Succeeded => style("SUCCEEDED").green().to_string(),
        RunStatus::Failed => style("FAILED").red().to_string(),
    }
}

fn env_label(env: &ExecutionEnvironment) -> String {
    style(format!("[{}]", env)).dim().to_string()
}

/// Format an execution event for display
pub fn format_execution_event(event: &ExecutionEvent) -> String {
    match event {
        ExecutionEvent::RunStarted {
            execution_id,
            pipeline_name,
            environment,
        } => format!(
            "{}{} Starting {} ({})",
            ROCKET,
            env_label(environment),
            style(pipeline_name).bold(),
            style(&execution_id.to_string()[..8]).dim()
        ),
        ExecutionEvent::StepStarted {
            environment,
            step_name,
            position,
            total,
            command,
        } => format!(
            "{}{} [{}/{}] {} {}",
            SPINNER,
            env_label(environment),
            position,
            total,
            style(step_name).cyan(),
            style(format!("$ {}", command)).dim()
        ),
        ExecutionEvent::StepOutput {
            environment,
            step_name,
            output,
        } => format!(
            "{}{} Output from {}:\n{}",
            INFO,
            env_label(environment),
            style(step_name).dim(),
            output
        ),
        ExecutionEvent::StepSucceeded {
            environment,
            step_name,
        } => format!("{}{} {}", CHECK, env_label(environment), style(step_name).green()),
        ExecutionEvent::StepFailed {
            environment,
            step_name,
            error,
            ..
        } => format!(
            "{}{} {}: {}",
            CROSS,
            env_label(environment),
            style(step_name).red(),
            style(error).dim()
        ),
        ExecutionEvent::StepSkipped {
            environment,
            step_name,
        } => format!(
            "{}{} {} {}",
            SKIP,
            env_label(environment),
            style(step_name).dim(),
            style("(not run)").dim()
        ),
        ExecutionEvent::RunFinished {
            execution_id,
            environment,
            status,
        } => format!(
            "{}{} Run ({}) {}",
            INFO,
            env_label(environment),
            style(&execution_id.to_string()[..8]).dim(),
            format_status(*status)
        ),
    }
}

/// One summary line for an environment run
pub fn format_run_summary(run: &RunResult) -> String {
    let duration = run
        .completed_at
        .signed_duration_since(run.started_at)
        .to_std()
        .map(format_duration)
        .unwrap_or_default();

    match &run.failure {
        None => format!(
            "{} {} - {} ({} steps, {})",
            CHECK,
            style(&run.environment).bold(),
            format_status(run.status),
            run.steps.len(),
            duration
        ),
        Some(err) => format!(
            "{} {} - {} at {} ({}, {})",
            CROSS,
            style(&run.environment).bold(),
            format_status(run.status),
            style(err.step()).red(),
            format_exit_status(err.status()),
            duration
        ),
    }
}

pub fn format_exit_status(status: ExitStatus) -> String {
    match status {
        ExitStatus::Success => style("success").green().to_string(),
        failure => style(failure.to_string()).red().to_string(),
    }
}

/// Multi-line summary for the whole workflow
pub fn format_workflow_summary(name: &str, result: &WorkflowResult) -> String {
    let mut lines = vec![format!(
        "{} {} ({} environment{})",
        INFO,
        style(name).bold(),
        result.runs.len(),
        if result.runs.len() == 1 { "" } else { "s" }
    )];
    lines.extend(result.runs.iter().map(|r| format!("  {}", format_run_summary(r))));
    lines.join("\n")
}

/// Format step output with truncation
pub fn format_output(output: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = output.lines().collect();

    if lines.len() <= max_lines {
        output.to_string()
    } else {
        let truncated = lines[..max_lines].join("\n");
        format!(
            "{}\n{}... ({} more lines)",
            truncated,
            style("[truncated]").dim(),
            lines.len() - max_lines
        )
    }
}

pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{}.{:01}s", secs, duration.subsec_millis() / 100)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
