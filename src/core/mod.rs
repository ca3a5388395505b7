//! Core types and traits for stepchain.
//!
//! This module contains the foundational pieces every chain is built from:
//! - The [`Step`] wrapper and the [`Invocable`] capability
//! - [`Pipeline`] composition
//! - The dynamic [`Value`] used by config-driven pipelines
//! - Error types

pub mod error;
pub mod pipeline;
pub mod step;
pub mod types;

// Re-export commonly used types
pub use error::{
    ConfigError, DebugError, ResolveError, RunError, RunResult, StepError, StepResult,
    ValidationError,
};
pub use pipeline::{IntoPipeline, Pipeline};
pub use step::{step, Invocable, Step};
pub use types::{Value, ValueType};
