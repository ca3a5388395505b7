//! Validator chains with fail-fast semantics.
//!
//! A [`ValidatorPipeline`] is a [`Pipeline`] over [`Outcome`] values in which
//! every step is guarded by [`Outcome::is_failure`]. Once a step returns a
//! failure, no later step is invoked and the failure becomes the chain's
//! return value. Errors raised inside a validator are not turned into
//! failures; they abort the invocation like in any other pipeline.
//!
//! ```rust
//! use stepchain::prelude::*;
//!
//! fn non_empty(s: String) -> StepResult<Outcome<String>> {
//!     Ok(if s.is_empty() { Outcome::failure("empty".to_string()) } else { Outcome::success(s) })
//! }
//! fn short(s: String) -> StepResult<Outcome<String>> {
//!     Ok(if s.len() > 8 { Outcome::failure("too long".to_string()) } else { Outcome::success(s) })
//! }
//!
//! let checks = ValidatorPipeline::step(non_empty) >> short;
//! assert!(checks.validate("hello".to_string()).unwrap().is_success());
//! assert_eq!(checks.validate(String::new()).unwrap(), Outcome::failure("empty".to_string()));
//! ```

use crate::core::error::{RunResult, StepResult, ValidationError};
use crate::core::pipeline::{IntoPipeline, Pipeline};
use crate::core::step::{callable_name, Invocable, Step};
use crate::validation::outcome::Outcome;
use std::fmt;
use std::ops::Shr;
use std::sync::Arc;

/// Anything that can be appended to a validator chain.
pub trait IntoValidator<T> {
    /// Convert into a validator chain.
    fn into_validator(self) -> ValidatorPipeline<T>;
}

/// An ordered chain of validators over `Outcome<T>`.
pub struct ValidatorPipeline<T> {
    inner: Pipeline<Outcome<T>>,
}

impl<T: 'static> ValidatorPipeline<T> {
    /// The chain with no validators. Returns its input unchanged.
    pub fn empty() -> Self {
        Self {
            inner: Pipeline::empty(),
        }
    }

    /// Wrap a single validator, named after the function.
    pub fn step<F>(f: F) -> Self
    where
        F: Fn(T) -> StepResult<Outcome<T>> + Send + Sync + 'static,
    {
        Self::named(callable_name::<F>(), f)
    }

    /// Wrap a single validator under an explicit name.
    pub fn named<F>(name: impl Into<Arc<str>>, f: F) -> Self
    where
        F: Fn(T) -> StepResult<Outcome<T>> + Send + Sync + 'static,
    {
        let step = Step::named(name, move |outcome: Outcome<T>| match outcome {
            Outcome::Success(payload) => f(payload),
            failure => Ok(failure),
        })
        .guarded(Outcome::is_failure);

        Self {
            inner: Pipeline::from(step),
        }
    }

    /// A copy of this chain that runs as a single validator called `name`.
    ///
    /// A one-step chain keeps its function; a longer chain is wrapped so that
    /// traces and explanations show only the new name.
    pub fn renamed(&self, name: impl Into<Arc<str>>) -> Self {
        let step = match self.inner.get(0) {
            Some(only) if self.inner.len() == 1 => only.renamed(name),
            _ => {
                let inner = self.inner.clone();
                Step::named(name, move |outcome: Outcome<T>| inner.invoke(outcome))
                    .guarded(Outcome::is_failure)
            }
        };

        Self {
            inner: Pipeline::from(step),
        }
    }

    /// Compose with another validator chain or bare validator function.
    pub fn compose<R: IntoValidator<T>>(&self, right: R) -> Self {
        Self {
            inner: self.inner.compose(right.into_validator().inner),
        }
    }

    /// Run the chain on an outcome.
    ///
    /// A failing input is returned as-is without invoking any validator.
    pub fn invoke(&self, input: Outcome<T>) -> StepResult<Outcome<T>> {
        self.inner.invoke(input)
    }

    /// Run the chain on a payload, starting from a success.
    pub fn validate(&self, payload: T) -> StepResult<Outcome<T>> {
        self.invoke(Outcome::success(payload))
    }

    /// Run the chain, turning a failure into a [`ValidationError`].
    pub fn check(&self, payload: T) -> RunResult<T>
    where
        T: fmt::Display,
    {
        match self.validate(payload)? {
            Outcome::Success(payload) => Ok(payload),
            Outcome::Failure(reason) => {
                log::debug!("validation failed: {}", reason);
                Err(ValidationError::Failed {
                    reason: reason.to_string(),
                }
                .into())
            }
        }
    }

    /// Validate `payload`, then run `target` on the validated value.
    ///
    /// `target` is anything [`Invocable`]: a step, a pipeline, or a boxed
    /// trait object chosen at runtime.
    pub fn check_and_run<I>(&self, target: &I, payload: T) -> RunResult<T>
    where
        T: fmt::Display,
        I: Invocable<T> + ?Sized,
    {
        let validated = self.check(payload)?;
        log::debug!("validated, running {}", target.explain());
        Ok(target.invoke(validated)?)
    }
}

impl<T> ValidatorPipeline<T> {
    /// The underlying guarded pipeline.
    pub fn as_pipeline(&self) -> &Pipeline<Outcome<T>> {
        &self.inner
    }

    /// Number of validators.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if the chain has no validators.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Validator names in order.
    pub fn step_names(&self) -> Vec<&str> {
        self.inner.step_names()
    }

    /// Describe the chain as `a >> b`.
    pub fn explain(&self) -> String {
        self.inner.explain()
    }
}

impl<T> Clone for ValidatorPipeline<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: 'static> Default for ValidatorPipeline<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> fmt::Debug for ValidatorPipeline<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorPipeline")
            .field("steps", &self.inner.step_names())
            .finish()
    }
}

impl<T> fmt::Display for ValidatorPipeline<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validator[{}]", self.inner.explain())
    }
}

impl<T: 'static> Invocable<Outcome<T>> for ValidatorPipeline<T> {
    fn invoke(&self, input: Outcome<T>) -> StepResult<Outcome<T>> {
        ValidatorPipeline::invoke(self, input)
    }

    fn explain(&self) -> String {
        ValidatorPipeline::explain(self)
    }
}

impl<T> IntoValidator<T> for ValidatorPipeline<T> {
    fn into_validator(self) -> ValidatorPipeline<T> {
        self
    }
}

impl<T: 'static> From<ValidatorPipeline<T>> for Pipeline<Outcome<T>> {
    fn from(validator: ValidatorPipeline<T>) -> Self {
        validator.inner
    }
}

impl<T: 'static> IntoPipeline<Outcome<T>> for ValidatorPipeline<T> {
    fn into_pipeline(self) -> Pipeline<Outcome<T>> {
        self.inner
    }
}

impl<T, F> IntoValidator<T> for F
where
    T: 'static,
    F: Fn(T) -> StepResult<Outcome<T>> + Send + Sync + 'static,
{
    fn into_validator(self) -> ValidatorPipeline<T> {
        ValidatorPipeline::step(self)
    }
}

impl<T: 'static, R: IntoValidator<T>> Shr<R> for ValidatorPipeline<T> {
    type Output = ValidatorPipeline<T>;

    fn shr(self, right: R) -> ValidatorPipeline<T> {
        self.compose(right)
    }
}

impl<T: 'static, R: IntoValidator<T>> Shr<R> for &ValidatorPipeline<T> {
    type Output = ValidatorPipeline<T>;

    fn shr(self, right: R) -> ValidatorPipeline<T> {
        self.compose(right)
    }
}
