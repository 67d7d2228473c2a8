use std::time::Duration;
use serde::Serialize;
use crate::core::CounterSnapshot;

/// Final counts of a dispatch run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub completed: usize,
    pub errors: usize,
    pub failures: usize,
    pub mispredictions: usize,
    pub concurrency: usize,
    pub peak_active: usize,
    #[serde(rename = "elapsed_secs", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
    error_rate: f64,
}

impl RunSummary {
    pub fn new(total: usize, concurrency: usize, counts: CounterSnapshot, elapsed: Duration) -> Self {
        let error_rate = if total == 0 {
            0.0
        } else {
            counts.errors as f64 / total as f64
        };
        Self {
            total,
            completed: counts.completed,
            errors: counts.errors,
            failures: counts.failures,
            mispredictions: counts.errors - counts.failures,
            concurrency,
            peak_active: counts.peak_active,
            elapsed,
            error_rate,
        }
    }

    /// Fraction of requests that failed or mispredicted, in `[0, 1]`.
    pub fn error_rate(&self) -> f64 {
        self.error_rate
    }
}

fn serialize_secs<S: serde::Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64())
}
