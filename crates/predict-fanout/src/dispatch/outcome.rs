use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use futures::FutureExt;
use crate::core::{PredictionService, Verdict};
use crate::error::ServiceError;
use crate::request::PredictRequest;

/// The result of a single prediction request.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionOutcome {
    /// The service answered and its scores decoded to this label
    Success(usize),

    /// The request timed out, failed in transit, was rejected by the
    /// service, or returned an undecodable response
    Failure(ServiceError),
}

impl PredictionOutcome {
    /// Submits `request` to `service` and waits at most `timeout` for it.
    ///
    /// Every way the call can go wrong, including a panic inside the service
    /// implementation, becomes a [`PredictionOutcome::Failure`].
    pub async fn resolve<S>(
        service: &S,
        request: PredictRequest,
        timeout: Duration,
        output_key: &str,
    ) -> Self
    where S: PredictionService + ?Sized
    {
        let call = AssertUnwindSafe(service.predict(request)).catch_unwind();
        match tokio::time::timeout(timeout, call).await {
            Err(_) => PredictionOutcome::Failure(ServiceError::Timeout(timeout)),
            Ok(Err(panic)) => PredictionOutcome::Failure(ServiceError::Panicked(panic_message(panic.as_ref()))),
            Ok(Ok(Err(error))) => PredictionOutcome::Failure(error),
            Ok(Ok(Ok(response))) => match response.predicted_label(output_key) {
                Ok(label) => PredictionOutcome::Success(label),
                Err(error) => PredictionOutcome::Failure(error),
            },
        }
    }

    /// Classifies the outcome against the label the request expected.
    pub fn verdict(&self, expected_label: i64) -> Verdict {
        match self {
            PredictionOutcome::Failure(_) => Verdict::Failed,
            PredictionOutcome::Success(label) if i64::try_from(*label).ok() == Some(expected_label) => Verdict::Correct,
            PredictionOutcome::Success(_) => Verdict::Mispredicted,
        }
    }

    pub fn is_error(&self, expected_label: i64) -> bool {
        self.verdict(expected_label).is_error()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
