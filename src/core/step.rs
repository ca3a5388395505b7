//! The Step abstraction: a named, immutable wrapper around a unary function.
//!
//! A step is the smallest composable unit. Wrapping a function adds nothing to
//! its behaviour: calling the step calls the function, and errors come back
//! exactly as the function produced them. The original function stays
//! independently callable.
//!
//! ```rust
//! use stepchain::prelude::*;
//!
//! fn double(x: i64) -> StepResult<i64> {
//!     Ok(x * 2)
//! }
//!
//! let s = step(double);
//! assert_eq!(s.name(), "double");
//! assert_eq!(s.call(2).unwrap(), 4);
//! assert_eq!(double(2).unwrap(), 4);
//! ```

use crate::core::error::StepResult;
use crate::core::pipeline::{IntoPipeline, Pipeline};
use std::fmt;
use std::ops::Shr;
use std::sync::Arc;

/// Shared function pointer stored inside a step.
pub type StepFn<T> = Arc<dyn Fn(T) -> StepResult<T> + Send + Sync>;

/// Predicate deciding whether a step is skipped for a given input.
///
/// A skipped step forwards its input unchanged and is not invoked.
pub type SkipGuard<T> = fn(&T) -> bool;

/// Capability shared by everything that takes one value and returns one value.
pub trait Invocable<T> {
    /// Run on `input` and return the produced value.
    fn invoke(&self, input: T) -> StepResult<T>;

    /// Human-readable description, used in logs and dry runs.
    fn explain(&self) -> String;
}

/// A wrapped unary function.
///
/// Cloning a step is cheap: the function is shared behind an `Arc`.
pub struct Step<T> {
    name: Arc<str>,
    func: StepFn<T>,
    skip_if: Option<SkipGuard<T>>,
}

impl<T: 'static> Step<T> {
    /// Wrap a function, naming the step after the function itself.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(T) -> StepResult<T> + Send + Sync + 'static,
    {
        Self::named(callable_name::<F>(), f)
    }

    /// Wrap a function under an explicit name.
    pub fn named<F>(name: impl Into<Arc<str>>, f: F) -> Self
    where
        F: Fn(T) -> StepResult<T> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(f),
            skip_if: None,
        }
    }

    /// Wrap an infallible function.
    pub fn map<F>(f: F) -> Self
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        Self::named(callable_name::<F>(), move |input| Ok(f(input)))
    }

    /// Compose this step with another step, pipeline or bare function.
    pub fn then<R: IntoPipeline<T>>(&self, right: R) -> Pipeline<T> {
        Pipeline::from(self.clone()).compose(right)
    }
}

impl<T> Step<T> {
    /// Invoke the wrapped function directly, ignoring any skip guard.
    ///
    /// [`Invocable::invoke`] honours the guard.
    pub fn call(&self, input: T) -> StepResult<T> {
        (self.func)(input)
    }

    /// The step's identifying name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// A copy of this step under a different name.
    pub fn renamed(&self, name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            func: Arc::clone(&self.func),
            skip_if: self.skip_if,
        }
    }

    /// A copy of this step that is skipped whenever `guard` holds for its input.
    pub fn guarded(&self, guard: SkipGuard<T>) -> Self {
        Self {
            name: Arc::clone(&self.name),
            func: Arc::clone(&self.func),
            skip_if: Some(guard),
        }
    }

    /// Check whether this step would be skipped for `input`.
    pub fn skips(&self, input: &T) -> bool {
        self.skip_if.is_some_and(|guard| guard(input))
    }
}

impl<T> Clone for Step<T> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            func: Arc::clone(&self.func),
            skip_if: self.skip_if,
        }
    }
}

impl<T> fmt::Debug for Step<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("guarded", &self.skip_if.is_some())
            .finish()
    }
}

impl<T> fmt::Display for Step<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl<T> Invocable<T> for Step<T> {
    fn invoke(&self, input: T) -> StepResult<T> {
        if self.skips(&input) {
            return Ok(input);
        }
        self.call(input)
    }

    fn explain(&self) -> String {
        self.name.to_string()
    }
}

impl<T: 'static, R: IntoPipeline<T>> Shr<R> for Step<T> {
    type Output = Pipeline<T>;

    fn shr(self, right: R) -> Pipeline<T> {
        Pipeline::from(self).compose(right)
    }
}

/// Turn any unary function into a [`Step`] named after the function.
pub fn step<T, F>(f: F) -> Step<T>
where
    T: 'static,
    F: Fn(T) -> StepResult<T> + Send + Sync + 'static,
{
    Step::new(f)
}

/// Derive a display name from a callable's type.
///
/// Function items yield their own name (`double`); closures yield the
/// enclosing item followed by `{{closure}}`. Function pointers carry no name
/// and yield `<fn>`.
pub(crate) fn callable_name<F>() -> String {
    let full = std::any::type_name::<F>();
    if full.starts_with("fn(") {
        return "<fn>".to_string();
    }
    let path = full.split('<').next().unwrap_or(full);
    let mut segments = path.rsplit("::");
    match segments.next() {
        Some("{{closure}}") => match segments.next() {
            Some(parent) => format!("{}::{{{{closure}}}}", parent),
            None => "{{closure}}".to_string(),
        },
        Some(last) => last.to_string(),
        None => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::StepError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn double(x: i64) -> StepResult<i64> {
        Ok(x * 2)
    }

    fn reject(_x: i64) -> StepResult<i64> {
        Err(StepError::failed("rejected"))
    }

    #[test]
    fn test_step_is_transparent() {
        let wrapped = step(double);
        assert_eq!(wrapped.call(2).unwrap(), 4);
        // The original function is still callable with its original result
        assert_eq!(double(2).unwrap(), 4);
    }

    #[test]
    fn test_default_name_is_function_name() {
        assert_eq!(step(double).name(), "double");
        assert_eq!(Step::named("custom", double).name(), "custom");
    }

    #[test]
    fn test_closure_name() {
        let s = Step::new(|x: i64| Ok(x + 1));
        assert!(s.name().ends_with("{{closure}}"));
    }

    #[test]
    fn test_fn_pointer_name() {
        let ops: [fn(i64) -> StepResult<i64>; 2] = [double, reject];
        assert_eq!(step(ops[0]).name(), "<fn>");
        assert_eq!((step(ops[0]) >> ops[1]).explain(), "<fn> >> <fn>");
        assert_eq!(step(ops[0]).call(4).unwrap(), 8);
    }

    #[test]
    fn test_errors_propagate_unmodified() {
        let err = step(reject).call(1).unwrap_err();
        assert!(matches!(err, StepError::Failed(ref msg) if msg == "rejected"));
    }

    #[test]
    fn test_map_wraps_infallible_function() {
        let s = Step::map(|x: i64| -x);
        assert_eq!(s.call(3).unwrap(), -3);
    }

    #[test]
    fn test_renamed_shares_function() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let original = Step::named("a", move |x: i64| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(x)
        });
        let renamed = original.renamed("b");

        original.call(1).unwrap();
        renamed.call(1).unwrap();

        assert_eq!(original.name(), "a");
        assert_eq!(renamed.name(), "b");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_guarded_step_skips() {
        let s = step(double).guarded(|x: &i64| *x < 0);
        assert!(s.skips(&-1));
        assert!(!s.skips(&1));
        assert_eq!(s.invoke(-1).unwrap(), -1);
        assert_eq!(s.invoke(3).unwrap(), 6);
        // `call` ignores the guard
        assert_eq!(s.call(-1).unwrap(), -2);
    }

    #[test]
    fn test_step_shr_builds_pipeline() {
        let pipeline = step(double) >> step(double);
        assert_eq!(pipeline.len(), 2);
        assert_eq!(pipeline.invoke(1).unwrap(), 4);
    }
}
