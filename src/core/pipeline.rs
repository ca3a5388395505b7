//! Ordered, immutable chains of steps.
//!
//! A [`Pipeline`] is itself a unary function: invoking it folds the input
//! through each step in order. Composition never touches its operands; it
//! builds a new pipeline whose steps are the left steps followed by the right
//! steps. Because composition is plain sequence concatenation it is
//! associative, and the empty pipeline is its identity.
//!
//! ```rust
//! use stepchain::prelude::*;
//!
//! fn add_one(x: i64) -> StepResult<i64> { Ok(x + 1) }
//! fn double(x: i64) -> StepResult<i64> { Ok(x * 2) }
//!
//! let base = step(add_one) >> double;
//! let squared = &base >> |x: i64| -> StepResult<i64> { Ok(x * x) };
//!
//! assert_eq!(base.invoke(1).unwrap(), 4);
//! assert_eq!(squared.invoke(1).unwrap(), 16);
//! assert_eq!(base.explain(), "add_one >> double");
//! ```

use crate::core::error::StepResult;
use crate::core::step::{Invocable, Step};
use crate::execution::debugger::StepCursor;
use crate::execution::progress::{ProgressTracker, SkipReason};
use std::fmt;
use std::ops::Shr;
use std::time::Instant;

/// Anything that can be appended to a pipeline.
///
/// Implemented for [`Step`], [`Pipeline`] and bare functions, so decorated and
/// undecorated functions mix freely in one chain.
pub trait IntoPipeline<T> {
    /// Convert into a pipeline.
    fn into_pipeline(self) -> Pipeline<T>;
}

/// An ordered chain of steps.
pub struct Pipeline<T> {
    steps: Vec<Step<T>>,
}

impl<T: 'static> Pipeline<T> {
    /// The identity pipeline: zero steps, returns its input unchanged.
    pub fn empty() -> Self {
        Self { steps: Vec::new() }
    }

    /// Compose with a step, pipeline or bare function.
    ///
    /// Returns a new pipeline running `self`'s steps, then `right`'s.
    /// Neither operand is modified.
    pub fn compose<R: IntoPipeline<T>>(&self, right: R) -> Self {
        let right = right.into_pipeline();
        let mut steps = Vec::with_capacity(self.steps.len() + right.steps.len());
        steps.extend(self.steps.iter().cloned());
        steps.extend(right.steps);
        Self { steps }
    }

    /// Run every step in order, feeding each output to the next step.
    ///
    /// Stops at the first error and returns it unchanged.
    pub fn invoke(&self, input: T) -> StepResult<T> {
        let mut data = input;
        for step in &self.steps {
            if step.skips(&data) {
                log::trace!("skipping step '{}'", step.name());
                continue;
            }
            log::trace!("entering step '{}'", step.name());
            data = step.call(data).map_err(|error| {
                log::debug!("step '{}' failed: {}", step.name(), error);
                error
            })?;
        }
        Ok(data)
    }

    /// Same as [`invoke`](Self::invoke), reporting each step to `tracker`.
    pub fn invoke_tracked(&self, input: T, tracker: &ProgressTracker) -> StepResult<T> {
        let mut data = input;
        for step in &self.steps {
            if step.skips(&data) {
                tracker.step_skipped(step.name(), SkipReason::Guarded);
                continue;
            }
            tracker.step_started(step.name());
            let started = Instant::now();
            match step.call(data) {
                Ok(output) => {
                    tracker.step_completed(step.name(), started.elapsed().as_millis() as u64);
                    data = output;
                }
                Err(error) => {
                    tracker.report_error(Some(step.name()), error.to_string());
                    return Err(error);
                }
            }
        }
        Ok(data)
    }

    /// A cursor for stepping through the pipeline one step at a time.
    pub fn cursor(&self) -> StepCursor<'_, T> {
        StepCursor::new(self)
    }
}

impl<T> Pipeline<T> {
    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if this is the identity pipeline.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Iterate over the steps in execution order.
    pub fn steps(&self) -> impl Iterator<Item = &Step<T>> {
        self.steps.iter()
    }

    /// Get the step at `index`.
    pub fn get(&self, index: usize) -> Option<&Step<T>> {
        self.steps.get(index)
    }

    /// The last step, if any.
    pub fn tail(&self) -> Option<&Step<T>> {
        self.steps.last()
    }

    /// Step names in execution order.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(Step::name).collect()
    }

    /// Describe the chain as `a >> b >> c`.
    pub fn explain(&self) -> String {
        self.step_names().join(" >> ")
    }
}

impl<T> Clone for Pipeline<T> {
    fn clone(&self) -> Self {
        Self {
            steps: self.steps.clone(),
        }
    }
}

impl<T: 'static> Default for Pipeline<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> fmt::Debug for Pipeline<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline").field("steps", &self.steps).finish()
    }
}

impl<T> fmt::Display for Pipeline<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            write!(f, "Pipeline[identity]")
        } else {
            write!(f, "Pipeline[{}]", self.explain())
        }
    }
}

impl<T: 'static> Invocable<T> for Pipeline<T> {
    fn invoke(&self, input: T) -> StepResult<T> {
        Pipeline::invoke(self, input)
    }

    fn explain(&self) -> String {
        Pipeline::explain(self)
    }
}

impl<T: 'static> From<Step<T>> for Pipeline<T> {
    fn from(step: Step<T>) -> Self {
        Self { steps: vec![step] }
    }
}

impl<T> IntoPipeline<T> for Pipeline<T> {
    fn into_pipeline(self) -> Pipeline<T> {
        self
    }
}

impl<T: 'static> IntoPipeline<T> for Step<T> {
    fn into_pipeline(self) -> Pipeline<T> {
        Pipeline::from(self)
    }
}

impl<T, F> IntoPipeline<T> for F
where
    T: 'static,
    F: Fn(T) -> StepResult<T> + Send + Sync + 'static,
{
    fn into_pipeline(self) -> Pipeline<T> {
        Pipeline::from(Step::new(self))
    }
}

impl<T: 'static, R: IntoPipeline<T>> Shr<R> for Pipeline<T> {
    type Output = Pipeline<T>;

    fn shr(self, right: R) -> Pipeline<T> {
        self.compose(right)
    }
}

impl<T: 'static, R: IntoPipeline<T>> Shr<R> for &Pipeline<T> {
    type Output = Pipeline<T>;

    fn shr(self, right: R) -> Pipeline<T> {
        self.compose(right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::StepError;
    use crate::core::step::step;
    use crate::core::types::{Value, ValueType};
    use crate::resolve::builtin::{math, text};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn add_one(x: i64) -> StepResult<i64> {
        Ok(x + 1)
    }

    fn double(x: i64) -> StepResult<i64> {
        Ok(2 * x)
    }

    fn negate(x: i64) -> StepResult<i64> {
        Ok(-x)
    }

    fn value_chain(steps: Vec<fn(Value) -> StepResult<Value>>) -> Pipeline<Value> {
        steps
            .into_iter()
            .fold(Pipeline::empty(), |pipeline, f| pipeline >> f)
    }

    #[test]
    fn test_empty_is_identity() {
        let empty: Pipeline<i64> = Pipeline::empty();
        assert!(empty.is_empty());
        assert_eq!(empty.invoke(7).unwrap(), 7);
    }

    #[test]
    fn test_empty_compose_step_equals_step() {
        let s = step(double);
        let composed = Pipeline::empty().compose(s.clone());
        for x in [-3, 0, 5] {
            assert_eq!(composed.invoke(x).unwrap(), s.call(x).unwrap());
        }
    }

    #[test]
    fn test_associativity() {
        let a = step(add_one);
        let b = step(double);
        let c = step(negate);

        let left = (a.clone() >> b.clone()) >> c.clone();
        let right = a >> (b >> c);

        assert_eq!(left.step_names(), right.step_names());
        for x in [-2, 0, 1, 10] {
            assert_eq!(left.invoke(x).unwrap(), right.invoke(x).unwrap());
        }
    }

    #[test]
    fn test_steps_apply_left_to_right() {
        let pipeline = value_chain(vec![math::double, text::to_string]);
        assert_eq!(pipeline.invoke(Value::Integer(2)).unwrap(), Value::from("4"));

        let reversed = value_chain(vec![text::to_string, math::double]);
        let err = reversed.invoke(Value::Integer(2)).unwrap_err();
        assert!(matches!(
            err,
            StepError::TypeMismatch {
                expected: ValueType::Number,
                got: ValueType::String
            }
        ));
    }

    #[test]
    fn test_double_then_negate() {
        let pipeline = value_chain(vec![math::double, math::negate]);
        assert_eq!(pipeline.invoke(Value::Integer(2)).unwrap(), Value::Integer(-4));
    }

    #[test]
    fn test_compose_does_not_mutate_operands() {
        let base = step(add_one) >> double;
        let left = &base >> negate;
        let right = &base >> add_one;

        assert_eq!(base.len(), 2);
        assert_eq!(left.len(), 3);
        assert_eq!(right.len(), 3);
        assert_eq!(base.invoke(1).unwrap(), 4);
        assert_eq!(left.invoke(1).unwrap(), -4);
        assert_eq!(right.invoke(1).unwrap(), 5);
    }

    #[test]
    fn test_bare_callables_mix_with_steps() {
        let pipeline =
            Pipeline::empty() >> double >> step(negate) >> |x: i64| -> StepResult<i64> { Ok(x + 10) };
        assert_eq!(pipeline.invoke(2).unwrap(), 6);
    }

    #[test]
    fn test_error_stops_execution() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let pipeline = step(add_one)
            >> |_: i64| -> StepResult<i64> { Err(StepError::failed("boom")) }
            >> move |x: i64| -> StepResult<i64> {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(x)
            };

        let err = pipeline.invoke(1).unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_explain_and_display() {
        let pipeline = step(add_one) >> double >> negate;
        assert_eq!(pipeline.explain(), "add_one >> double >> negate");
        assert_eq!(pipeline.to_string(), "Pipeline[add_one >> double >> negate]");
        assert_eq!(Pipeline::<i64>::empty().to_string(), "Pipeline[identity]");
    }

    #[test]
    fn test_tail_and_iteration() {
        let pipeline = step(add_one) >> double >> negate;
        assert_eq!(pipeline.tail().map(Step::name), Some("negate"));
        assert_eq!(pipeline.steps().count(), 3);
        assert_eq!(pipeline.get(1).map(Step::name), Some("double"));
        assert!(Pipeline::<i64>::empty().tail().is_none());
    }

    #[test]
    fn test_guarded_steps_are_skipped() {
        let skip_negative = step(double).guarded(|x: &i64| *x < 0);
        let pipeline = step(negate) >> skip_negative >> add_one;
        assert_eq!(pipeline.invoke(3).unwrap(), -2);
        assert_eq!(pipeline.invoke(-3).unwrap(), 7);
    }

    #[test]
    fn test_invoke_tracked_matches_invoke() {
        let pipeline = step(add_one) >> double;
        let tracker = ProgressTracker::new(pipeline.len());
        assert_eq!(pipeline.invoke_tracked(3, &tracker).unwrap(), 8);
        assert_eq!(tracker.progress_percent(), 100.0);
    }
}
