use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, debug_span, info, warn, Instrument};
use uuid::Uuid;
use crate::config::DispatchConfig;
use crate::core::{Completion, CounterSnapshot, PredictionService, RequestCounter};
use crate::dispatch::outcome::PredictionOutcome;
use crate::dispatch::summary::RunSummary;
use crate::error::{DispatchError, Result};
use crate::request::{CensusRecord, FixedSample, LabeledRequest, ModelSpec, SampleSource};

/// # ConcurrentRequestDispatcher
///
/// Sends a fixed number of prediction requests to a [`PredictionService`]
/// while keeping at most `concurrency` of them in flight, then reports the
/// fraction that failed or mispredicted.
///
/// ## Lifecycle of a request
///
/// `Pending → Submitted → {Succeeded | Failed} → Completed`
///
/// 1. The issuing flow draws the payload from the [`SampleSource`] and
///    waits on [`RequestCounter::throttle`] for a free slot
/// 2. The request is submitted on its own spawned task, which owns a
///    [`Completion`]
/// 3. The task resolves a [`PredictionOutcome`] under the per-request
///    timeout and records its [`Verdict`](crate::core::Verdict)
///
/// Completions may arrive in any order. The run returns once every request
/// has been recorded, or when the optional deadline elapses.
pub struct ConcurrentRequestDispatcher<S> {
    service: Arc<S>,
    samples: Arc<dyn SampleSource>,
    config: DispatchConfig,
}

impl<S> ConcurrentRequestDispatcher<S>
where S: PredictionService
{
    /// Creates a dispatcher sending the default census record to `service`.
    pub fn new(service: S, config: DispatchConfig) -> Self {
        let sample = CensusRecord::default().to_labeled_request(ModelSpec::default());
        Self {
            service: Arc::new(service),
            samples: Arc::new(FixedSample::new(sample)),
            config,
        }
    }

    /// Replaces the source the request payloads are drawn from.
    pub fn with_samples<T>(mut self, samples: T) -> Self
    where T: SampleSource + 'static
    {
        self.samples = Arc::new(samples);
        self
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Runs the configured number of requests and returns the error rate.
    ///
    /// # Errors
    ///
    /// See [`run_summary`](Self::run_summary).
    pub async fn run(&self) -> Result<f64> {
        Ok(self.run_summary().await?.error_rate())
    }

    /// Runs the configured number of requests and returns the final counts.
    ///
    /// A run of zero requests returns immediately without touching the
    /// service. Individual request failures never surface here; they are
    /// counted in the summary.
    ///
    /// # Errors
    ///
    /// * [`DispatchError::InvalidConfig`] if the configuration does not validate
    /// * [`DispatchError::DeadlineExceeded`] if a deadline is configured and
    ///   elapses first; requests still in flight keep running detached
    pub async fn run_summary(&self) -> Result<RunSummary> {
        self.config.validate()?;

        let started = Instant::now();
        let total = self.config.num_requests;
        let concurrency = self.config.concurrency;
        let counter = Arc::new(RequestCounter::new(total, concurrency));

        if total == 0 {
            debug!("no requests to send");
            return Ok(RunSummary::new(0, concurrency, counter.snapshot(), started.elapsed()));
        }

        info!(
            service = self.service.name(),
            total,
            concurrency,
            timeout = ?self.config.request_timeout,
            "dispatching prediction requests"
        );

        let work = self.issue_and_join(counter.clone());
        let counts = match self.config.deadline {
            None => work.await,
            Some(deadline) => match tokio::time::timeout(deadline, work).await {
                Ok(counts) => counts,
                Err(_) => {
                    counter.abandon();
                    let counts = counter.snapshot();
                    warn!(completed = counts.completed, total, ?deadline, "deadline exceeded");
                    return Err(DispatchError::DeadlineExceeded {
                        completed: counts.completed,
                        total,
                    });
                }
            },
        };

        let summary = RunSummary::new(total, concurrency, counts, started.elapsed());
        info!(
            completed = summary.completed,
            errors = summary.errors,
            failures = summary.failures,
            peak_active = summary.peak_active,
            error_rate = summary.error_rate(),
            elapsed = ?summary.elapsed,
            "run finished"
        );
        Ok(summary)
    }

    async fn issue_and_join(&self, counter: Arc<RequestCounter>) -> CounterSnapshot {
        let output_key: Arc<str> = Arc::from(self.config.output_key.as_str());

        for index in 0..counter.total() {
            let sample = self.samples.sample(index);
            counter.throttle().await;

            let completion = Completion::new(counter.clone(), index);
            let span = debug_span!("predict", request_id = %Uuid::new_v4(), index);
            tokio::spawn(
                execute(
                    self.service.clone(),
                    sample,
                    self.config.request_timeout,
                    output_key.clone(),
                    completion,
                )
                .instrument(span),
            );
        }

        counter.wait_all().await
    }
}

/// Body of one request task.
async fn execute<S>(
    service: Arc<S>,
    sample: LabeledRequest,
    timeout: Duration,
    output_key: Arc<str>,
    completion: Completion,
)
where S: PredictionService
{
    let LabeledRequest { request, expected_label } = sample;
    let outcome = PredictionOutcome::resolve(service.as_ref(), request, timeout, &output_key).await;

    match &outcome {
        PredictionOutcome::Failure(error) => warn!(%error, "request failed"),
        PredictionOutcome::Success(predicted) if outcome.is_error(expected_label) => {
            debug!(predicted, expected = expected_label, "mispredicted")
        }
        PredictionOutcome::Success(predicted) => debug!(predicted, "predicted"),
    }

    completion.finish(outcome.verdict(expected_label));
}
