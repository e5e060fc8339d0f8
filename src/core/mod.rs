//! Core domain models for the workflow runner
//!
//! This module defines the fundamental data structures that represent
//! triggers, environments, pipelines, steps, and their configuration.

pub mod config;
pub mod environment;
pub mod pipeline;
pub mod state;
pub mod step;
pub mod trigger;

pub use environment::*;
pub use pipeline::*;
pub use state::*;
pub use step::*;
pub use trigger::*;
