//! Execution tracing and step-through debugging.
//!
//! [`PipelineDebugger`] runs a pipeline exactly as [`Pipeline::invoke`] would
//! and records what each executed step received and produced. The returned
//! value, the error and the short-circuit behaviour are identical to an
//! undecorated invocation.
//!
//! [`StepCursor`] advances through a pipeline one step at a time.

use crate::core::error::{DebugError, StepResult};
use crate::core::pipeline::{IntoPipeline, Pipeline};
use crate::core::step::Step;
use serde::Serialize;

/// What a traced step produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceOutcome<T> {
    /// The step returned this value.
    Output(T),
    /// The step raised an error with this message.
    Error(String),
}

/// One record per executed step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceEntry<T> {
    /// Position of the step in the pipeline.
    pub index: usize,
    /// Name of the step.
    pub step: String,
    /// The value the step received.
    pub input: T,
    /// The value it returned, or the error it raised.
    pub outcome: TraceOutcome<T>,
}

impl<T> TraceEntry<T> {
    /// The produced value, if the step succeeded.
    pub fn output(&self) -> Option<&T> {
        match &self.outcome {
            TraceOutcome::Output(output) => Some(output),
            TraceOutcome::Error(_) => None,
        }
    }

    /// The error message, if the step raised.
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            TraceOutcome::Output(_) => None,
            TraceOutcome::Error(message) => Some(message),
        }
    }

    /// Check whether the step raised.
    pub fn is_error(&self) -> bool {
        matches!(self.outcome, TraceOutcome::Error(_))
    }
}

/// Ordered record of one invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace<T> {
    entries: Vec<TraceEntry<T>>,
}

impl<T> Trace<T> {
    /// All entries in execution order.
    pub fn entries(&self) -> &[TraceEntry<T>] {
        &self.entries
    }

    /// Number of executed steps.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no step executed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry of the step that raised, if any.
    pub fn failed(&self) -> Option<&TraceEntry<T>> {
        self.entries.iter().find(|entry| entry.is_error())
    }

    /// Names of the executed steps in order.
    pub fn step_names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.step.as_str()).collect()
    }

    fn push(&mut self, entry: TraceEntry<T>) {
        self.entries.push(entry);
    }
}

impl<T> Default for Trace<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<'a, T> IntoIterator for &'a Trace<T> {
    type Item = &'a TraceEntry<T>;
    type IntoIter = std::slice::Iter<'a, TraceEntry<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Records a [`Trace`] while invoking a pipeline.
///
/// Each call to [`invoke`](Self::invoke) starts a fresh trace; traces are
/// never shared between invocations.
#[derive(Debug)]
pub struct PipelineDebugger<T> {
    pipeline: Pipeline<T>,
    trace: Trace<T>,
}

impl<T: Clone + 'static> PipelineDebugger<T> {
    /// Wrap a pipeline, validator chain, step or bare function.
    pub fn new<P: IntoPipeline<T>>(pipeline: P) -> Self {
        Self {
            pipeline: pipeline.into_pipeline(),
            trace: Trace::default(),
        }
    }

    /// Invoke the wrapped pipeline, recording every executed step.
    ///
    /// Steps skipped by their guard are not recorded. If a step raises, its
    /// entry records the error message and the error itself is returned.
    pub fn invoke(&mut self, input: T) -> StepResult<T> {
        self.trace = Trace::default();

        let mut data = input;
        for (index, step) in self.pipeline.steps().enumerate() {
            if step.skips(&data) {
                continue;
            }

            let received = data.clone();
            match step.call(data) {
                Ok(output) => {
                    self.trace.push(TraceEntry {
                        index,
                        step: step.name().to_string(),
                        input: received,
                        outcome: TraceOutcome::Output(output.clone()),
                    });
                    data = output;
                }
                Err(error) => {
                    self.trace.push(TraceEntry {
                        index,
                        step: step.name().to_string(),
                        input: received,
                        outcome: TraceOutcome::Error(error.to_string()),
                    });
                    return Err(error);
                }
            }
        }
        Ok(data)
    }
}

impl<T> PipelineDebugger<T> {
    /// The trace of the most recent invocation.
    pub fn trace(&self) -> &Trace<T> {
        &self.trace
    }

    /// Consume the debugger, keeping the trace.
    pub fn into_trace(self) -> Trace<T> {
        self.trace
    }

    /// The wrapped pipeline.
    pub fn pipeline(&self) -> &Pipeline<T> {
        &self.pipeline
    }
}

/// Advances through a pipeline one step at a time.
///
/// ```rust
/// use stepchain::prelude::*;
///
/// fn add_one(x: i64) -> StepResult<i64> { Ok(x + 1) }
/// fn double(x: i64) -> StepResult<i64> { Ok(x * 2) }
///
/// let pipeline = step(add_one) >> double;
/// let mut cursor = pipeline.cursor();
/// assert_eq!(cursor.step(10).unwrap(), 11);
/// assert_eq!(cursor.step(11).unwrap(), 22);
/// assert!(cursor.step(22).is_err());
/// ```
#[derive(Debug)]
pub struct StepCursor<'a, T> {
    pipeline: &'a Pipeline<T>,
    position: usize,
}

impl<'a, T: 'static> StepCursor<'a, T> {
    /// Create a cursor positioned before the first step.
    pub fn new(pipeline: &'a Pipeline<T>) -> Self {
        Self { pipeline, position: 0 }
    }

    /// Run the next step on `data`.
    pub fn step(&mut self, data: T) -> Result<T, DebugError> {
        self.step_n(data, 1)
    }

    /// Run the next `n` steps on `data`.
    pub fn step_n(&mut self, data: T, n: usize) -> Result<T, DebugError> {
        let mut data = data;
        for _ in 0..n {
            let step = self.pipeline.get(self.position).ok_or(DebugError::Exhausted {
                steps: self.pipeline.len(),
            })?;
            self.position += 1;

            log::info!("‣ Entering {}", step.name());
            if !step.skips(&data) {
                data = step.call(data)?;
            }

            match self.peek() {
                Some(next) => log::info!("ⓘ Next: {}", next.name()),
                None => log::info!("ⓘ Pipeline Complete"),
            }
        }
        Ok(data)
    }

    /// The step that will run next.
    pub fn peek(&self) -> Option<&'a Step<T>> {
        self.pipeline.get(self.position)
    }

    /// Number of steps already run.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Check whether every step has run.
    pub fn is_finished(&self) -> bool {
        self.position >= self.pipeline.len()
    }
}
