//! Command-line interface

pub mod commands;
pub mod output;
pub mod terminal_output;

use clap::{Parser, Subcommand};
use commands::{MatrixCommand, RunCommand, TriggerCommand, ValidateCommand};
use std::ffi::OsString;

/// Run a CI workflow locally
#[derive(Debug, Parser, Clone)]
#[command(name = "ci-runner")]
#[command(version)]
#[command(about = "Run a CI workflow locally: triggers, environment matrix, fail-fast steps", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print captured step output
    #[arg(short, long, global = true)]
    pub stream: bool,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the workflow
    Run(RunCommand),

    /// Validate a workflow file
    Validate(ValidateCommand),

    /// List the environments the matrix expands to
    Matrix(MatrixCommand),

    /// Check whether an event would schedule a run
    Trigger(TriggerCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }

    /// Log filter used when `RUST_LOG` is unset
    pub fn default_log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}
