//! Assembling and running pipelines from a [`PipelineConfig`].
//!
//! A run goes through three phases, each failing with its own error:
//! 1. Resolution: every `PIPELINE` reference, then every `VALIDATORS`
//!    reference, is looked up in the registry. The first failure aborts.
//! 2. Validation: the validators run on `DATA`. A failure aborts.
//! 3. Execution: the pipeline runs on the validated value.
//!
//! A dry run stops after phase 2 and returns a [`ChainDescription`].

use crate::config::schema::PipelineConfig;
use crate::core::error::{RunError, RunResult, ValidationError};
use crate::core::pipeline::Pipeline;
use crate::core::types::Value;
use crate::execution::progress::{ProgressCallback, ProgressTracker, ProgressUpdate};
use crate::resolve::Registry;
use crate::validation::{Outcome, ValidatorPipeline};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Options for config-driven runs.
#[derive(Clone, Default)]
pub struct RunOptions {
    /// Progress callback, receiving validator and step events.
    pub progress_callback: Option<Arc<ProgressCallback>>,
}

impl fmt::Debug for RunOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunOptions")
            .field("progress_callback", &self.progress_callback.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

impl RunOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set progress callback.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(Box::new(callback)));
        self
    }
}

/// Ordered identities of an assembled chain, as returned by a dry run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainDescription {
    /// Step references in execution order.
    pub steps: Vec<String>,
    /// Validator references in execution order.
    pub validators: Vec<String>,
}

impl fmt::Display for ChainDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.validators.is_empty() {
            write!(f, "validate[{}] then ", self.validators.join(" >> "))?;
        }
        if self.steps.is_empty() {
            f.write_str("identity")
        } else {
            f.write_str(&self.steps.join(" >> "))
        }
    }
}

/// A fully resolved config, ready to validate and run.
#[derive(Debug, Clone)]
pub struct AssembledChain {
    pipeline: Pipeline<Value>,
    validator: ValidatorPipeline<Value>,
    data: Value,
    description: ChainDescription,
}

impl AssembledChain {
    /// The assembled pipeline.
    pub fn pipeline(&self) -> &Pipeline<Value> {
        &self.pipeline
    }

    /// The assembled validator chain. Empty when the config has none.
    pub fn validator(&self) -> &ValidatorPipeline<Value> {
        &self.validator
    }

    /// The initial input.
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// The identities of every resolved step and validator.
    pub fn describe(&self) -> &ChainDescription {
        &self.description
    }

    /// Run the validators on the initial input.
    ///
    /// Returns the value the pipeline should start from.
    pub fn validate(&self) -> RunResult<Value> {
        self.validate_tracked(&ProgressTracker::default())
    }

    /// Validate, then run the pipeline, reporting progress through `options`.
    pub fn execute(&self, options: &RunOptions) -> RunResult<Value> {
        let total = self.validator.len() + self.pipeline.len();
        let mut tracker =
            ProgressTracker::with_shared_callback(total, options.progress_callback.as_ref());
        tracker.start();

        let started = Instant::now();
        let result = self
            .validate_tracked(&tracker)
            .and_then(|input| Ok(self.pipeline.invoke_tracked(input, &tracker)?));
        tracker.complete();

        if result.is_ok() {
            log::info!(
                "✓ Pipeline complete in {:.2} seconds.",
                started.elapsed().as_secs_f64()
            );
        }
        result
    }

    fn validate_tracked(&self, tracker: &ProgressTracker) -> RunResult<Value> {
        if self.validator.is_empty() {
            return Ok(self.data.clone());
        }

        let outcome = self
            .validator
            .as_pipeline()
            .invoke_tracked(Outcome::success(self.data.clone()), tracker)?;
        match outcome {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(reason) => {
                log::debug!("validation failed: {}", reason);
                Err(ValidationError::Failed {
                    reason: reason.to_string(),
                }
                .into())
            }
        }
    }
}

/// Assembles and runs configs against a registry.
#[derive(Debug)]
pub struct ConfigRunner<'r> {
    registry: &'r Registry<Value>,
    options: RunOptions,
}

impl<'r> ConfigRunner<'r> {
    /// Create a runner resolving against `registry`.
    pub fn new(registry: &'r Registry<Value>) -> Self {
        Self {
            registry,
            options: RunOptions::default(),
        }
    }

    /// Set run options.
    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Resolve every reference and compose the chains. Nothing is invoked.
    pub fn assemble(&self, config: &PipelineConfig) -> RunResult<AssembledChain> {
        let pipeline = config
            .pipeline
            .iter()
            .try_fold(Pipeline::<Value>::empty(), |pipeline, reference| {
                Ok::<_, RunError>(pipeline >> self.registry.resolve_step(reference)?)
            })?;

        let validator_refs = config.validators.clone().unwrap_or_default();
        let validator = validator_refs
            .iter()
            .try_fold(ValidatorPipeline::<Value>::empty(), |validator, reference| {
                Ok::<_, RunError>(validator >> self.registry.resolve_validator(reference)?)
            })?;

        log::debug!("assembled {}", pipeline);

        Ok(AssembledChain {
            pipeline,
            validator,
            data: config.data.clone(),
            description: ChainDescription {
                steps: config.pipeline.clone(),
                validators: validator_refs,
            },
        })
    }

    /// Assemble, validate and run, returning the pipeline's result.
    pub fn run(&self, config: &PipelineConfig) -> RunResult<Value> {
        self.assemble(config)?.execute(&self.options)
    }

    /// Assemble and validate without running the pipeline.
    pub fn dry_run(&self, config: &PipelineConfig) -> RunResult<ChainDescription> {
        let chain = self.assemble(config)?;
        chain.validate()?;
        log::info!("✓ Pipeline is runnable: {}", chain.describe());
        Ok(chain.description)
    }
}
