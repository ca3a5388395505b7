//! Error types for stepchain.
//!
//! Uses thiserror for structured errors with context. Each layer has its own
//! enum so callers can tell which phase failed:
//! - [`ConfigError`]: the declarative config is malformed (nothing resolved yet)
//! - [`ResolveError`]: a dotted reference did not lead to a registered callable
//! - [`ValidationError`]: a validator chain returned a FAILURE outcome
//! - [`StepError`]: a wrapped callable raised during invocation
//!
//! [`RunError`] gathers all of them for the config runner and the CLI.

use crate::core::types::ValueType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for config-driven runs.
///
/// This enum encompasses all error categories and enables automatic
/// conversion between specific error types.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Resolution error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Step error: {0}")]
    Step(#[from] StepError),
}

/// Errors raised by a wrapped callable during invocation.
///
/// Pipelines, validators and the debugger pass these through untouched.
#[derive(Error, Debug)]
pub enum StepError {
    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: ValueType, got: ValueType },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("arithmetic overflow in '{0}'")]
    Overflow(String),

    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StepError {
    /// Create a type mismatch error.
    pub fn type_mismatch(expected: ValueType, got: ValueType) -> Self {
        StepError::TypeMismatch { expected, got }
    }

    /// Create a generic failure from a message.
    pub fn failed(message: impl Into<String>) -> Self {
        StepError::Failed(message.into())
    }
}

/// Why an attribute lookup failed once its namespace was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupFailure {
    /// Nothing is registered under the attribute name.
    Missing,
    /// The entry exists but is a validator, not a step.
    NotAStep,
    /// The entry exists but is a step, not a validator.
    NotAValidator,
}

impl fmt::Display for LookupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupFailure::Missing => f.write_str("no such attribute"),
            LookupFailure::NotAStep => f.write_str("attribute is a validator and cannot be used as a step"),
            LookupFailure::NotAValidator => f.write_str("attribute is a step and cannot be used as a validator"),
        }
    }
}

/// Errors turning a dotted reference into a callable.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolveError {
    /// The namespace portion of the reference cannot be located.
    #[error("could not locate namespace '{namespace}' for reference '{reference}'")]
    Resolution { reference: String, namespace: String },

    /// The namespace exists but the final name is absent or not callable in the requested role.
    #[error("could not look up '{attribute}' in namespace '{namespace}' ({reason})")]
    AttributeLookup {
        reference: String,
        namespace: String,
        attribute: String,
        reason: LookupFailure,
    },
}

impl ResolveError {
    /// The reference that failed to resolve.
    pub fn reference(&self) -> &str {
        match self {
            ResolveError::Resolution { reference, .. }
            | ResolveError::AttributeLookup { reference, .. } => reference,
        }
    }
}

/// Errors in the shape of a declarative configuration.
///
/// These are detected before any resolution is attempted.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration must be an object, got {0}")]
    NotAnObject(String),

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("field '{field}' must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("entry {index} of '{field}' must be a non-empty string")]
    InvalidReference { field: &'static str, index: usize },

    #[error("configuration is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("the config file {} could not be read: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("the config file {} could not be read as {format}: {message}", path.display())]
    Parse {
        path: PathBuf,
        format: &'static str,
        message: String,
    },
}

/// Errors from the validation phase.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("The pipeline failed to validate for the following reason:\n  {reason}")]
    Failed { reason: String },
}

impl ValidationError {
    /// The reason reported by the failing validator.
    pub fn reason(&self) -> &str {
        match self {
            ValidationError::Failed { reason } => reason,
        }
    }
}

/// Errors from stepping through a pipeline one step at a time.
#[derive(Error, Debug)]
pub enum DebugError {
    #[error("debugger has finished every step ({steps} total)")]
    Exhausted { steps: usize },

    #[error(transparent)]
    Step(#[from] StepError),
}

/// Result type alias for step invocation.
pub type StepResult<T> = Result<T, StepError>;

/// Result type alias for config-driven runs.
pub type RunResult<T> = Result<T, RunError>;
