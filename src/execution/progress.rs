//! Progress tracking for pipeline invocation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// A progress update event.
#[derive(Debug, Clone)]
pub enum ProgressUpdate {
    /// Invocation has started.
    Started {
        total_steps: usize,
    },
    /// A step has started.
    StepStarted {
        name: String,
        index: usize,
        total: usize,
    },
    /// A step has returned a value.
    StepCompleted {
        name: String,
        duration_ms: u64,
        index: usize,
        total: usize,
    },
    /// A step was skipped.
    StepSkipped {
        name: String,
        reason: SkipReason,
    },
    /// Invocation has finished, successfully or not.
    Completed {
        total_duration_ms: u64,
        steps_executed: usize,
        steps_skipped: usize,
    },
    /// A step raised an error.
    Error {
        step: Option<String>,
        message: String,
    },
}

/// Reason why a step was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The step's guard rejected its input (a FAILURE outcome in a validator chain).
    Guarded,
}

/// Callback type for progress updates.
pub type ProgressCallback = Box<dyn Fn(ProgressUpdate) + Send + Sync>;

/// Tracks invocation progress.
pub struct ProgressTracker {
    /// Total number of steps in the pipeline.
    total_steps: usize,
    /// Number of steps completed.
    completed_steps: AtomicU64,
    /// Number of steps skipped.
    skipped_steps: AtomicU64,
    /// Start time.
    start_time: Option<Instant>,
    /// Progress callback.
    callback: Option<ProgressCallback>,
}

impl ProgressTracker {
    /// Create a new progress tracker.
    pub fn new(total_steps: usize) -> Self {
        Self {
            total_steps,
            completed_steps: AtomicU64::new(0),
            skipped_steps: AtomicU64::new(0),
            start_time: None,
            callback: None,
        }
    }

    /// Create a tracker that forwards updates to a shared callback.
    pub fn with_shared_callback(total_steps: usize, callback: Option<&Arc<ProgressCallback>>) -> Self {
        let tracker = Self::new(total_steps);
        match callback {
            Some(callback) => {
                let callback = Arc::clone(callback);
                tracker.with_callback(Box::new(move |update| callback(update)))
            }
            None => tracker,
        }
    }

    /// Set a callback for progress updates.
    pub fn with_callback(mut self, callback: ProgressCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Start tracking.
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
        self.send_update(ProgressUpdate::Started {
            total_steps: self.total_steps,
        });
    }

    /// Report that a step has started.
    pub fn step_started(&self, name: &str) {
        let completed = self.completed_steps.load(Ordering::Relaxed) as usize;
        self.send_update(ProgressUpdate::StepStarted {
            name: name.to_string(),
            index: completed,
            total: self.total_steps,
        });
    }

    /// Report that a step has completed.
    pub fn step_completed(&self, name: &str, duration_ms: u64) {
        let completed = self.completed_steps.fetch_add(1, Ordering::Relaxed) as usize + 1;
        self.send_update(ProgressUpdate::StepCompleted {
            name: name.to_string(),
            duration_ms,
            index: completed,
            total: self.total_steps,
        });
    }

    /// Report that a step was skipped.
    pub fn step_skipped(&self, name: &str, reason: SkipReason) {
        self.skipped_steps.fetch_add(1, Ordering::Relaxed);
        self.send_update(ProgressUpdate::StepSkipped {
            name: name.to_string(),
            reason,
        });
    }

    /// Report an error.
    pub fn report_error(&self, step: Option<&str>, message: String) {
        self.send_update(ProgressUpdate::Error {
            step: step.map(str::to_string),
            message,
        });
    }

    /// Complete tracking.
    pub fn complete(&self) {
        let duration = self
            .start_time
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or(0);

        self.send_update(ProgressUpdate::Completed {
            total_duration_ms: duration,
            steps_executed: self.completed_steps.load(Ordering::Relaxed) as usize,
            steps_skipped: self.skipped_steps.load(Ordering::Relaxed) as usize,
        });
    }

    /// Get current progress percentage.
    pub fn progress_percent(&self) -> f32 {
        if self.total_steps == 0 {
            return 100.0;
        }
        let completed = self.completed_steps.load(Ordering::Relaxed);
        let skipped = self.skipped_steps.load(Ordering::Relaxed);
        ((completed + skipped) as f32 / self.total_steps as f32) * 100.0
    }

    fn send_update(&self, update: ProgressUpdate) {
        if let Some(ref callback) = self.callback {
            callback(update);
        }
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    #[test]
    fn test_progress_calculation() {
        let tracker = ProgressTracker::new(10);
        assert_eq!(tracker.progress_percent(), 0.0);

        tracker.completed_steps.store(5, Ordering::Relaxed);
        assert_eq!(tracker.progress_percent(), 50.0);

        tracker.skipped_steps.store(5, Ordering::Relaxed);
        assert_eq!(tracker.progress_percent(), 100.0);
    }

    #[test]
    fn test_empty_pipeline_is_complete() {
        assert_eq!(ProgressTracker::default().progress_percent(), 100.0);
    }

    #[test]
    fn test_callback_invoked() {
        let call_count = Arc::new(AtomicUsize::new(0));
        let call_count_clone = call_count.clone();

        let mut tracker = ProgressTracker::new(5).with_callback(Box::new(move |_| {
            call_count_clone.fetch_add(1, Ordering::Relaxed);
        }));

        tracker.start();
        tracker.step_started("double");
        tracker.step_completed("double", 1);
        tracker.complete();

        // Started, StepStarted, StepCompleted, Completed
        assert_eq!(call_count.load(Ordering::Relaxed), 4);
    }

    #[test]
    fn test_shared_callback_receives_step_names() {
        let names = Arc::new(Mutex::new(Vec::new()));
        let sink = names.clone();
        let callback: Arc<ProgressCallback> = Arc::new(Box::new(move |update| {
            if let ProgressUpdate::StepStarted { name, .. } = update {
                sink.lock().unwrap().push(name);
            }
        }));

        let tracker = ProgressTracker::with_shared_callback(2, Some(&callback));
        tracker.step_started("a");
        tracker.step_started("b");

        assert_eq!(*names.lock().unwrap(), vec!["a".to_string(), "b".to_string()]);
    }
}
