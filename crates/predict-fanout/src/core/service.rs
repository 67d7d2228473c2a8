use async_trait::async_trait;
use crate::error::ServiceError;
use crate::request::{PredictRequest, PredictResponse};

/// A remote prediction service the dispatcher fans requests out to.
///
/// Implementations perform exactly one attempt per call; the dispatcher
/// owns timeouts and never retries.
#[async_trait]
pub trait PredictionService: Send + Sync + 'static {
    /// Submit one request and wait for its response.
    async fn predict(&self, request: PredictRequest) -> Result<PredictResponse, ServiceError>;

    /// Short name used in log lines.
    fn name(&self) -> &str {
        "prediction-service"
    }
}
