use std::sync::Arc;
use std::thread;
use tracing::{debug, warn};
use super::counter::{RequestCounter, Verdict};

/// # Completion
///
/// The one-time right to record a request's result against a
/// [`RequestCounter`].
///
/// ## Purpose
///
/// The final wait of a run only ends once every submitted request has been
/// recorded. A request task that never records, because the task panicked
/// or was dropped with its runtime, would stall that wait forever.
///
/// ## Implementation Strategy
///
/// `Completion` is consumed by [`Completion::finish`]. If it is instead
/// dropped while still armed, its `Drop` records a [`Verdict::Failed`], so
/// each request is recorded exactly once on every path out of its task.
#[derive(Debug)]
pub struct Completion {
    counter: Option<Arc<RequestCounter>>,
    index: usize,
}

impl Completion {
    /// Arms a completion for request `index` against `counter`.
    pub fn new(counter: Arc<RequestCounter>, index: usize) -> Self {
        Self {
            counter: Some(counter),
            index,
        }
    }

    /// Records `verdict` and disarms the completion.
    pub fn finish(mut self, verdict: Verdict) {
        if let Some(counter) = self.counter.take() {
            counter.record(verdict);
        }
    }
}

impl Drop for Completion {
    /// Records a failure if the request never reached [`Completion::finish`].
    fn drop(&mut self) {
        if let Some(counter) = self.counter.take() {
            if counter.is_abandoned() {
                debug!(index = self.index, "request dropped after the run was abandoned");
            } else if thread::panicking() {
                warn!(index = self.index, "request task panicked before completing");
            } else {
                warn!(index = self.index, "request task dropped before completing");
            }
            counter.record(Verdict::Failed);
        }
    }
}
