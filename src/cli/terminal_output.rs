//! Live terminal progress for running steps
//!
//! `ProgressReporter` turns [`ExecutionEvent`]s into one spinner per
//! running step. Finished steps are replaced by a single status line,
//! so concurrent environments print cleanly above the active spinners.

use crate::cli::output::{format_execution_event, format_output};
use crate::execution::ExecutionEvent;
use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Lines of step output shown when streaming
const STREAM_LINES: usize = 20;

/// Renders execution events to the terminal
pub struct ProgressReporter {
    multi: MultiProgress,
    spinners: Mutex<HashMap<String, ProgressBar>>,
    stream: bool,
}

impl ProgressReporter {
    pub fn new(stream: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            spinners: Mutex::new(HashMap::new()),
            stream,
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} [{elapsed}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn println(&self, line: &str) {
        if self.multi.println(line).is_err() {
            println!("{}", line);
        }
    }

    fn finish(&self, key: &str) {
        let spinner = match self.spinners.lock() {
            Ok(mut spinners) => spinners.remove(key),
            Err(_) => None,
        };
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
            self.multi.remove(&spinner);
        }
    }

    /// Handle one event
    pub fn handle(&self, event: &ExecutionEvent) {
        match event {
            ExecutionEvent::StepStarted {
                environment,
                step_name,
                ..
            } => {
                let spinner = self.multi.add(ProgressBar::new_spinner());
                spinner.set_style(Self::spinner_style());
                spinner.set_message(format!("{} {}", style(environment).dim(), step_name));
                spinner.enable_steady_tick(Duration::from_millis(100));
                if let Ok(mut spinners) = self.spinners.lock() {
                    spinners.insert(spinner_key(&environment.to_string(), step_name), spinner);
                }
                self.println(&format_execution_event(event));
            }
            ExecutionEvent::StepOutput { output, .. } => {
                if self.stream {
                    self.println(&format_output(output, STREAM_LINES));
                }
            }
            ExecutionEvent::StepSucceeded {
                environment,
                step_name,
            }
            | ExecutionEvent::StepFailed {
                environment,
                step_name,
                ..
            } => {
                self.finish(&spinner_key(&environment.to_string(), step_name));
                self.println(&format_execution_event(event));
            }
            ExecutionEvent::RunFinished { .. } => {
                self.println(&format_execution_event(event));
                self.println(&separator());
            }
            _ => self.println(&format_execution_event(event)),
        }
    }
}

fn spinner_key(environment: &str, step_name: &str) -> String {
    format!("{}::{}", environment, step_name)
}

/// A horizontal rule spanning the terminal width
pub fn separator() -> String {
    let width = term_size::dimensions_stdout()
        .map(|(w, _)| w)
        .unwrap_or(80);
    style("─".repeat(width)).dim().to_string()
}
