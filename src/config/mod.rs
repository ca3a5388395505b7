//! Config-driven pipelines.
//!
//! A declarative config names its steps by dotted reference. The runner
//! resolves them against a [`Registry`], composes them into one pipeline and
//! invokes it on the config's `DATA`.
//!
//! ```rust
//! use stepchain::prelude::*;
//! use serde_json::json;
//!
//! let registry = Registry::with_builtins();
//! let config = json!({
//!     "PIPELINE": ["math.double", "math.negate", "text.to_string"],
//!     "DATA": 2
//! });
//!
//! assert_eq!(stepchain::config::run(&config, &registry).unwrap(), Value::from("-4"));
//! ```

pub mod runner;
pub mod schema;

pub use runner::{AssembledChain, ChainDescription, ConfigRunner, RunOptions};
pub use schema::PipelineConfig;

use crate::core::error::RunResult;
use crate::core::types::Value;
use crate::resolve::Registry;

/// Run the pipeline described by a JSON config and return its result.
pub fn run(config: &serde_json::Value, registry: &Registry<Value>) -> RunResult<Value> {
    let config = PipelineConfig::from_json_value(config)?;
    ConfigRunner::new(registry).run(&config)
}

/// Resolve and validate a JSON config without running it.
pub fn dry_run(
    config: &serde_json::Value,
    registry: &Registry<Value>,
) -> RunResult<ChainDescription> {
    let config = PipelineConfig::from_json_value(config)?;
    ConfigRunner::new(registry).dry_run(&config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{ConfigError, RunError};
    use serde_json::json;

    #[test]
    fn test_run_from_json() {
        let registry = Registry::with_builtins();
        let config = json!({"PIPELINE": ["math.square", "math.add_one"], "DATA": -3});
        assert_eq!(run(&config, &registry).unwrap(), Value::Integer(10));
    }

    #[test]
    fn test_malformed_config_is_a_config_error() {
        let registry = Registry::with_builtins();
        let err = run(&json!({"PIPELINE": ["math.double"]}), &registry).unwrap_err();
        assert!(matches!(err, RunError::Config(ConfigError::MissingField("DATA"))));
        assert!(dry_run(&json!("nope"), &registry).is_err());
    }

    #[test]
    fn test_dry_run_from_json() {
        let registry = Registry::with_builtins();
        let config = json!({
            "PIPELINE": ["text.trim", "text.upper"],
            "DATA": "  hi ",
            "VALIDATORS": ["checks.is_string"]
        });
        let description = dry_run(&config, &registry).unwrap();
        assert_eq!(description.steps, vec!["text.trim", "text.upper"]);
        assert_eq!(
            description.to_string(),
            "validate[checks.is_string] then text.trim >> text.upper"
        );
    }
}
