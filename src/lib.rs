//! # Stepchain - Composable Step Pipelines
//!
//! Stepchain composes independently written single-argument functions into
//! ordered, immutable chains. A chain can be built in code with the `>>`
//! operator, or described by name in a JSON/TOML config and assembled at
//! runtime from a registry.
//!
//! ## Features
//!
//! - **Steps**: wrap any `Fn(T) -> StepResult<T>` without changing how it behaves
//! - **Pipelines**: associative, order-preserving composition; the empty pipeline is the identity
//! - **Validators**: chains over [`Outcome`](validation::Outcome) that stop at the first failure
//! - **Debugging**: per-step traces and step-by-step cursors that never alter the result
//! - **Config runner**: dotted references such as `"math.double"` resolved through a registry
//!
//! ## Quick Start
//!
//! ```rust
//! use stepchain::prelude::*;
//!
//! fn double(x: i64) -> StepResult<i64> { Ok(x * 2) }
//! fn negate(x: i64) -> StepResult<i64> { Ok(-x) }
//!
//! let pipeline = step(double) >> negate;
//! assert_eq!(pipeline.invoke(2).unwrap(), -4);
//!
//! // Both functions remain usable on their own
//! assert_eq!(double(2).unwrap(), 4);
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: steps, pipelines, the dynamic [`Value`](core::types::Value) and error types
//! - [`validation`]: status-carrying validator chains
//! - [`execution`]: tracing, stepping and progress reporting
//! - [`resolve`]: the registry and its built-in callables
//! - [`config`]: config parsing and the config runner

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod execution;
pub mod resolve;
pub mod validation;

/// Prelude module for convenient imports.
///
/// Import everything commonly needed with:
/// ```rust
/// use stepchain::prelude::*;
/// ```
pub mod prelude {
    // Steps and pipelines
    pub use crate::core::pipeline::{IntoPipeline, Pipeline};
    pub use crate::core::step::{step, Invocable, Step};

    // Core types
    pub use crate::core::types::{Value, ValueType};

    // Errors
    pub use crate::core::error::{
        ConfigError, DebugError, LookupFailure, ResolveError, RunError, RunResult, StepError,
        StepResult, ValidationError,
    };

    // Validation
    pub use crate::validation::{IntoValidator, Outcome, Status, ValidatorPipeline};

    // Execution
    pub use crate::execution::debugger::{PipelineDebugger, StepCursor, Trace, TraceEntry, TraceOutcome};
    pub use crate::execution::progress::{ProgressCallback, ProgressTracker, ProgressUpdate, SkipReason};

    // Resolution
    pub use crate::resolve::{Entry, Registry, RegistryBuilder};

    // Config
    pub use crate::config::{ChainDescription, ConfigRunner, PipelineConfig, RunOptions};
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::prelude::*;

    fn double(x: i64) -> StepResult<i64> {
        Ok(x * 2)
    }

    fn negate(x: i64) -> StepResult<i64> {
        Ok(-x)
    }

    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
        assert_eq!(super::NAME, "stepchain");
    }

    #[test]
    fn test_order_of_numeric_steps() {
        assert_eq!((step(double) >> negate).invoke(2).unwrap(), -4);
        assert_eq!((step(negate) >> double).invoke(2).unwrap(), -4);
    }

    #[test]
    fn test_debugger_matches_plain_invocation() {
        let pipeline = step(double) >> negate >> double;
        let mut debugger = PipelineDebugger::new(pipeline.clone());
        assert_eq!(debugger.invoke(3).unwrap(), pipeline.invoke(3).unwrap());
        assert_eq!(debugger.trace().len(), pipeline.len());
    }

    #[test]
    fn test_registry_with_builtins() {
        let registry = Registry::with_builtins();
        assert!(registry.contains("math.double"));
        assert!(registry.contains("text.to_string"));
        assert!(registry.contains("core.identity"));
        assert!(registry.contains("checks.not_null"));
    }
}
