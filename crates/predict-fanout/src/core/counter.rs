//! The shared result counter of a dispatch run.

use std::sync::atomic::{AtomicBool, Ordering};
use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::warn;

/// How a completed request counts towards the error rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The predicted label matched the expected one
    Correct,
    /// The request succeeded but predicted the wrong label
    Mispredicted,
    /// The request failed outright
    Failed,
}

impl Verdict {
    pub fn is_error(self) -> bool {
        !matches!(self, Verdict::Correct)
    }
}

/// Counts guarded by the [`RequestCounter`] lock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    /// Requests currently submitted and not yet completed
    pub active: usize,

    /// Requests whose completion has been recorded
    pub completed: usize,

    /// Completed requests that failed or mispredicted
    pub errors: usize,

    /// Completed requests that failed outright
    pub failures: usize,

    /// Highest value `active` has reached
    pub peak_active: usize,
}

/// # RequestCounter
///
/// A monitor tracking the progress of one run: how many requests are in
/// flight, how many have completed and how many of those were errors.
///
/// The issuing flow calls [`throttle`](Self::throttle) before each
/// submission and [`wait_all`](Self::wait_all) once everything is
/// submitted. Completion handlers call [`record`](Self::record) from
/// whichever task they run on.
///
/// ## Invariants
///
/// * `active <= concurrency`
/// * `completed <= total`
/// * `failures <= errors <= completed`
///
/// ## Waiting
///
/// Waiters register with the notifier before checking their condition and
/// re-check it after every wake, so neither a completion landing between
/// the check and the wait nor a wake meant for another waiter can be missed
/// or mistaken for progress.
#[derive(Debug)]
pub struct RequestCounter {
    total: usize,
    concurrency: usize,
    state: Mutex<CounterSnapshot>,
    notifier: Notify,
    abandoned: AtomicBool,
}

impl RequestCounter {
    /// Creates a counter for `total` requests with at most `concurrency` in flight.
    ///
    /// A `concurrency` of zero is raised to one; callers validate it first.
    pub fn new(total: usize, concurrency: usize) -> Self {
        Self {
            total,
            concurrency: concurrency.max(1),
            state: Mutex::new(CounterSnapshot::default()),
            notifier: Notify::new(),
            abandoned: AtomicBool::new(false),
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Marks the run as given up on. Requests still in flight keep
    /// recording, but nobody waits for them any more.
    pub fn abandon(&self) {
        self.abandoned.store(true, Ordering::Release);
    }

    pub fn is_abandoned(&self) -> bool {
        self.abandoned.load(Ordering::Acquire)
    }

    /// Returns a consistent copy of the current counts.
    pub fn snapshot(&self) -> CounterSnapshot {
        *self.state.lock()
    }

    /// Waits until fewer than `concurrency` requests are active, then claims
    /// a slot by incrementing the active count.
    pub async fn throttle(&self) {
        let concurrency = self.concurrency;
        self.wait_until(|state| {
            if state.active < concurrency {
                state.active += 1;
                state.peak_active = state.peak_active.max(state.active);
                true
            } else {
                false
            }
        })
        .await
    }

    /// Records the completion of one request and wakes every waiter.
    ///
    /// Completions beyond `total` are dropped with a warning.
    pub fn record(&self, verdict: Verdict) {
        {
            let mut state = self.state.lock();
            if state.completed >= self.total {
                warn!(total = self.total, "completion recorded after every request finished; ignoring");
                return;
            }
            state.completed += 1;
            if verdict.is_error() {
                state.errors += 1;
            }
            if verdict == Verdict::Failed {
                state.failures += 1;
            }
            state.active = state.active.saturating_sub(1);
        }
        self.notifier.notify_waiters();
    }

    /// Waits until every request has completed and returns the final counts.
    pub async fn wait_all(&self) -> CounterSnapshot {
        let total = self.total;
        self.wait_until(|state| state.completed >= total).await;
        self.snapshot()
    }

    /// Fraction of requests that were errors, `0.0` when there are none.
    pub fn error_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.snapshot().errors as f64 / self.total as f64
    }

    /// Evaluates `condition` under the lock until it returns `true`,
    /// sleeping on the notifier in between.
    async fn wait_until<F>(&self, mut condition: F)
    where F: FnMut(&mut CounterSnapshot) -> bool
    {
        loop {
            let notified = self.notifier.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let ready = {
                let mut state = self.state.lock();
                condition(&mut state)
            };
            if ready {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time;

    #[tokio::test]
    async fn test_new_counter_is_empty() {
        let counter = RequestCounter::new(3, 2);
        assert_eq!(counter.snapshot(), CounterSnapshot::default());
        assert_eq!(counter.total(), 3);
        assert_eq!(counter.concurrency(), 2);
    }

    #[tokio::test]
    async fn test_zero_concurrency_raised_to_one() {
        let counter = RequestCounter::new(1, 0);
        assert_eq!(counter.concurrency(), 1);
    }

    #[tokio::test]
    async fn test_throttle_claims_slots() {
        let counter = RequestCounter::new(4, 2);
        counter.throttle().await;
        counter.throttle().await;

        let state = counter.snapshot();
        assert_eq!(state.active, 2);
        assert_eq!(state.peak_active, 2);
    }

    #[tokio::test]
    async fn test_throttle_blocks_at_limit() {
        let counter = Arc::new(RequestCounter::new(2, 1));
        counter.throttle().await;

        let blocked = time::timeout(Duration::from_millis(50), counter.throttle()).await;
        assert!(blocked.is_err(), "second throttle should wait while the slot is taken");

        counter.record(Verdict::Correct);
        time::timeout(Duration::from_millis(50), counter.throttle())
            .await
            .expect("slot should be free after a completion");
        assert_eq!(counter.snapshot().active, 1);
    }

    #[tokio::test]
    async fn test_record_counts() {
        let counter = RequestCounter::new(3, 3);
        for _ in 0..3 {
            counter.throttle().await;
        }
        counter.record(Verdict::Correct);
        counter.record(Verdict::Mispredicted);
        counter.record(Verdict::Failed);

        let state = counter.snapshot();
        assert_eq!(state.active, 0);
        assert_eq!(state.completed, 3);
        assert_eq!(state.errors, 2);
        assert_eq!(state.failures, 1);
        assert!((counter.error_rate() - 2.0 / 3.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_abandon_keeps_recording() {
        let counter = RequestCounter::new(2, 2);
        counter.throttle().await;
        assert!(!counter.is_abandoned());

        counter.abandon();
        counter.record(Verdict::Failed);

        assert!(counter.is_abandoned());
        assert_eq!(counter.snapshot().completed, 1);
    }

    #[test]
    fn test_verdict_is_error() {
        assert!(!Verdict::Correct.is_error());
        assert!(Verdict::Mispredicted.is_error());
        assert!(Verdict::Failed.is_error());
    }

    #[tokio::test]
    async fn test_failure_implies_error() {
        let counter = RequestCounter::new(1, 1);
        counter.throttle().await;
        counter.record(Verdict::Failed);

        let state = counter.snapshot();
        assert_eq!(state.errors, 1);
        assert_eq!(state.failures, 1);
    }

    #[tokio::test]
    async fn test_record_beyond_total_ignored() {
        let counter = RequestCounter::new(1, 1);
        counter.throttle().await;
        counter.record(Verdict::Correct);
        counter.record(Verdict::Failed);

        let state = counter.snapshot();
        assert_eq!(state.completed, 1);
        assert_eq!(state.errors, 0);
    }

    #[tokio::test]
    async fn test_wait_all_returns_immediately_for_zero_total() {
        let counter = RequestCounter::new(0, 1);
        let state = time::timeout(Duration::from_millis(50), counter.wait_all())
            .await
            .expect("nothing to wait for");
        assert_eq!(state.completed, 0);
        assert_eq!(counter.error_rate(), 0.0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_wait_all_joins_concurrent_completions() {
        let counter = Arc::new(RequestCounter::new(50, 50));
        for _ in 0..50 {
            counter.throttle().await;
        }

        let handles = (0..50).map(|i| {
            let counter = counter.clone();
            tokio::spawn(async move {
                time::sleep(Duration::from_millis((i % 5) as u64)).await;
                counter.record(if i % 2 == 0 { Verdict::Mispredicted } else { Verdict::Correct });
            })
        }).collect::<Vec<_>>();

        let state = counter.wait_all().await;
        futures::future::join_all(handles).await;

        assert_eq!(state.completed, 50);
        assert_eq!(state.errors, 25);
        assert_eq!(state.active, 0);
        assert_eq!(counter.error_rate(), 0.5);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_throttlers_respect_limit() {
        let counter = Arc::new(RequestCounter::new(40, 3));

        let handles = (0..40).map(|_| {
            let counter = counter.clone();
            tokio::spawn(async move {
                counter.throttle().await;
                assert!(counter.snapshot().active <= 3);
                time::sleep(Duration::from_millis(1)).await;
                counter.record(Verdict::Correct);
            })
        }).collect::<Vec<_>>();

        for handle in futures::future::join_all(handles).await {
            handle.unwrap();
        }

        let state = counter.wait_all().await;
        assert_eq!(state.completed, 40);
        assert!(state.peak_active <= 3);
        assert_eq!(state.active, 0);
    }
}
