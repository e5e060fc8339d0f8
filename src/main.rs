use anyhow::{Context, Result};
use ci_runner::cli::commands::{
    MatrixCommand, RunCommand, RunPlan, TriggerCommand, ValidateCommand,
};
use ci_runner::cli::output::*;
use ci_runner::cli::terminal_output::ProgressReporter;
use ci_runner::cli::{Cli, Command};
use ci_runner::core::config::WorkflowConfig;
use ci_runner::core::Event;
use ci_runner::execution::{ExecutionEngine, MatrixScheduler, ShellExecutor};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging; RUST_LOG wins over --verbose
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.default_log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("{}", e))
        .context("Failed to set logging subscriber")?;

    match &cli.command {
        Command::Run(cmd) => run_workflow(cmd, &cli).await,
        Command::Validate(cmd) => validate_workflow(cmd),
        Command::Matrix(cmd) => list_matrix(cmd),
        Command::Trigger(cmd) => check_trigger(cmd),
    }
}

async fn run_workflow(cmd: &RunCommand, cli: &Cli) -> Result<()> {
    let config = WorkflowConfig::from_file(&cmd.file)?;

    let (pipeline, environments) = match cmd.plan(&config)? {
        RunPlan::NotTriggered(event) => {
            println!(
                "{} {} on {} does not trigger {}; nothing to run",
                INFO,
                style(event.kind).cyan(),
                style(event.branch_name()).cyan(),
                style(&config.name).bold()
            );
            return Ok(());
        }
        RunPlan::Run {
            pipeline,
            environments,
        } => (pipeline, environments),
    };
    if let Some(event) = cmd.event() {
        info!("{} on {} triggers {}", event.kind, event.branch_name(), config.name);
    }

    if !cmd.json {
        for (key, value) in &cmd.variable {
            println!(
                "{} Variable override: {} = {}",
                INFO,
                style(key).cyan(),
                style(value).dim()
            );
        }
    }

    let mut executor = ShellExecutor::default();
    if let Some(dir) = &cmd.workdir {
        executor = executor.with_base_dir(dir);
    }

    let mut engine = ExecutionEngine::new(executor);
    if !cmd.json {
        let reporter = ProgressReporter::new(cli.stream);
        engine.add_event_handler(move |event| reporter.handle(&event));
    }
    let engine = Arc::new(engine);
    let scheduler = MatrixScheduler::new(cmd.strategy.to_strategy(cmd.jobs));

    let interrupted = async {
        // Without a signal handler the run is never interrupted
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };
    let Some(result) = scheduler
        .run_until(engine, &pipeline, environments, interrupted)
        .await
    else {
        warn!("Interrupted; running steps were stopped");
        println!("\n{} {} {}", CROSS, style(&config.name).bold(), style("interrupted").red());
        std::process::exit(130);
    };

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("\n{}", format_workflow_summary(&config.name, &result));
    }

    if result.is_success() {
        if !cmd.json {
            println!(
                "\n{} {} completed {}",
                CHECK,
                style(&config.name).bold(),
                style("successfully").green()
            );
        }
        Ok(())
    } else {
        for run in result.failed_runs() {
            if let Err(e) = run.outcome() {
                error!("[{}] {}", run.environment, e);
            }
        }
        if !cmd.json {
            println!("\n{} {} {}", CROSS, style(&config.name).bold(), style("failed").red());
        }
        std::process::exit(1);
    }
}

fn validate_workflow(cmd: &ValidateCommand) -> Result<()> {
    println!("{} Validating workflow...", INFO);

    match WorkflowConfig::from_file(&cmd.file) {
        Ok(config) => {
            println!("{} Workflow configuration is valid!", CHECK);
            println!("  Name: {}", style(&config.name).bold());
            println!("  Steps: {}", style(config.steps.len()).cyan());
            println!("  Environments: {}", style(config.environments().len()).cyan());
            println!("  Variables: {}", style(config.variables.len()).cyan());

            if cmd.json {
                let json = serde_json::to_string_pretty(&config)?;
                println!("\n{}", json);
            }
            Ok(())
        }
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(format!("{:#}", e)).red());
            std::process::exit(1);
        }
    }
}

fn list_matrix(cmd: &MatrixCommand) -> Result<()> {
    let config = WorkflowConfig::from_file(&cmd.file)?;
    let environments = config.environments();

    if cmd.json {
        let data = serde_json::json!({ "environments": environments });
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    println!("{} {} expands to:", INFO, style(&config.name).bold());
    for env in &environments {
        println!("  {}", style(env).bold());
    }
    Ok(())
}

fn check_trigger(cmd: &TriggerCommand) -> Result<()> {
    let config = WorkflowConfig::from_file(&cmd.file)?;
    let event = Event::new(cmd.event.into(), cmd.branch.clone());
    let trigger = config
        .trigger()
        .context("Failed to build workflow trigger")?;

    if trigger.evaluate(&event) {
        println!(
            "{} {} on {} triggers {}",
            CHECK,
            style(event.kind).cyan(),
            style(event.branch_name()).cyan(),
            style(&config.name).bold()
        );
        Ok(())
    } else {
        println!(
            "{} {} on {} does not trigger {}",
            CROSS,
            style(event.kind).cyan(),
            style(event.branch_name()).cyan(),
            style(&config.name).bold()
        );
        std::process::exit(1);
    }
}
