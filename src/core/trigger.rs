//! Trigger model - decides which events schedule a run

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of repository event that can schedule a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Push,
    PullRequest,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Push => write!(f, "push"),
            EventKind::PullRequest => write!(f, "pull_request"),
        }
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "push" => Ok(EventKind::Push),
            "pull_request" | "pull-request" => Ok(EventKind::PullRequest),
            other => Err(format!("Unknown event kind: {}", other)),
        }
    }
}

/// An incoming event
///
/// For `pull_request` the branch is the target branch of the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    pub branch: String,
}

impl Event {
    pub fn new(kind: EventKind, branch: impl Into<String>) -> Self {
        Self {
            kind,
            branch: branch.into(),
        }
    }

    /// Branch name with any `refs/heads/` prefix removed
    pub fn branch_name(&self) -> &str {
        self.branch
            .strip_prefix("refs/heads/")
            .unwrap_or(&self.branch)
    }
}

/// A single branch filter entry
#[derive(Debug, Clone)]
pub enum BranchPattern {
    /// Exact branch name
    Exact(String),
    /// Wildcard pattern compiled to an anchored regex
    Wildcard { source: String, regex: Regex },
}

impl BranchPattern {
    /// Parse a filter entry; `*` matches within one path segment, `**` across segments
    pub fn parse(pattern: &str) -> Result<Self, regex::Error> {
        if !pattern.contains('*') {
            return Ok(BranchPattern::Exact(pattern.to_string()));
        }

        let mut expr = String::from("^");
        let mut rest = pattern;
        while let Some(pos) = rest.find('*') {
            expr.push_str(&regex::escape(&rest[..pos]));
            rest = &rest[pos..];
            if rest.starts_with("**") {
                expr.push_str(".*");
                rest = &rest[2..];
            } else {
                expr.push_str("[^/]*");
                rest = &rest[1..];
            }
        }
        expr.push_str(&regex::escape(rest));
        expr.push('$');

        Ok(BranchPattern::Wildcard {
            source: pattern.to_string(),
            regex: Regex::new(&expr)?,
        })
    }

    pub fn matches(&self, branch: &str) -> bool {
        match self {
            BranchPattern::Exact(name) => name == branch,
            BranchPattern::Wildcard { regex, .. } => regex.is_match(branch),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BranchPattern::Exact(name) => name,
            BranchPattern::Wildcard { source, .. } => source,
        }
    }
}

/// Filter for one event kind
#[derive(Debug, Clone)]
pub struct EventFilter {
    pub kind: EventKind,

    /// Empty means every branch
    pub branches: Vec<BranchPattern>,
}

impl EventFilter {
    pub fn matches(&self, event: &Event) -> bool {
        if event.kind != self.kind {
            return false;
        }
        if self.branches.is_empty() {
            return true;
        }
        let branch = event.branch_name();
        self.branches.iter().any(|p| p.matches(branch))
    }
}

/// The set of events that schedule a run. Built once from configuration.
#[derive(Debug, Clone, Default)]
pub struct Trigger {
    filters: Vec<EventFilter>,
}

impl Trigger {
    pub fn new(filters: Vec<EventFilter>) -> Self {
        Self { filters }
    }

    /// Check whether an incoming event should schedule a run
    pub fn evaluate(&self, event: &Event) -> bool {
        self.filters.iter().any(|f| f.matches(event))
    }
}

/// Free-function form of [`Trigger::evaluate`]
pub fn evaluate_trigger(trigger: &Trigger, event: &Event) -> bool {
    trigger.evaluate(event)
}
