//! Execution instrumentation.
//!
//! This module observes pipeline invocation without changing its result:
//! tracing and stepping in [`debugger`], progress events in [`progress`].

pub mod debugger;
pub mod progress;

pub use debugger::{PipelineDebugger, StepCursor, Trace, TraceEntry, TraceOutcome};
pub use progress::{ProgressCallback, ProgressTracker, ProgressUpdate, SkipReason};
