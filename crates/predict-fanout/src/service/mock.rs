use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Barrier;
use crate::core::PredictionService;
use crate::error::ServiceError;
use crate::request::{PredictRequest, PredictResponse};
use crate::tensor::{TensorProto, TensorValues};

/// What the mock answers for a request.
#[derive(Debug, Clone)]
pub enum MockReply {
    Scores(Vec<f32>),
    Fail(ServiceError),
    Panic,
    Hang,
}

type ReplyFn = Box<dyn Fn(usize) -> MockReply + Send + Sync>;
type DelayFn = Box<dyn Fn(usize) -> Duration + Send + Sync>;

/// A scripted prediction service for tests.
///
/// Requests are identified by the value of their `age` input, which test
/// sample sources set to the request index. The mock tracks how many calls
/// are in flight at once and the order in which they complete.
pub struct MockService {
    reply: ReplyFn,
    delay: Option<DelayFn>,
    barrier: Option<Barrier>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    completion_order: Mutex<Vec<usize>>,
}

impl MockService {
    pub fn new<F>(reply: F) -> Self
    where F: Fn(usize) -> MockReply + Send + Sync + 'static
    {
        Self {
            reply: Box::new(reply),
            delay: None,
            barrier: None,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            completion_order: Mutex::new(vec![]),
        }
    }

    /// Sleeps for `delay(index)` before replying.
    pub fn with_delay<F>(mut self, delay: F) -> Self
    where F: Fn(usize) -> Duration + Send + Sync + 'static
    {
        self.delay = Some(Box::new(delay));
        self
    }

    /// Holds every call until `parties` calls are in flight together.
    pub fn with_barrier(mut self, parties: usize) -> Self {
        self.barrier = Some(Barrier::new(parties));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    pub fn completion_order(&self) -> Vec<usize> {
        self.completion_order.lock().clone()
    }

    fn request_index(request: &PredictRequest) -> usize {
        match request.input("age").map(|t| t.values()) {
            Some(TensorValues::Float(values)) => values.first().copied().unwrap_or(0.0) as usize,
            _ => 0,
        }
    }
}

#[async_trait]
impl PredictionService for MockService {
    async fn predict(&self, request: PredictRequest) -> Result<PredictResponse, ServiceError> {
        let index = Self::request_index(&request);
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        if let Some(delay) = &self.delay {
            tokio::time::sleep(delay(index)).await;
        }

        let reply = (self.reply)(index);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        match reply {
            MockReply::Scores(scores) => {
                self.completion_order.lock().push(index);
                Ok(PredictResponse::new().with_output("scores", TensorProto::from_scores(scores)))
            }
            MockReply::Fail(error) => {
                self.completion_order.lock().push(index);
                Err(error)
            }
            MockReply::Panic => panic!("mock service panic for request {}", index),
            MockReply::Hang => std::future::pending().await,
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
