//! # Dispatch
//!
//! Fans a fixed number of prediction requests out to a service with
//! bounded concurrency and aggregates their results.
//!
//! The entry point is [`ConcurrentRequestDispatcher`]. With the `rest`
//! feature, [`run`] wires one up against a served model at `host:port`.

mod dispatcher;
mod outcome;
mod summary;

pub use dispatcher::ConcurrentRequestDispatcher;
pub use outcome::PredictionOutcome;
pub use summary::RunSummary;

#[cfg(feature = "rest")]
use crate::config::DispatchConfig;
#[cfg(feature = "rest")]
use crate::error::Result;
#[cfg(feature = "rest")]
use crate::service::RestPredictionService;

/// Sends `num_requests` default census requests to the service at `server`
/// with at most `concurrency` in flight, and returns the error rate.
///
/// `num_requests == 0` returns `0.0` without any network traffic.
///
/// # Errors
///
/// Invalid arguments or an unparseable address are reported before any
/// request is sent. Individual request failures only raise the rate.
#[cfg(feature = "rest")]
pub async fn run(server: &str, concurrency: usize, num_requests: usize) -> Result<f64> {
    let config = DispatchConfig::new(concurrency, num_requests);
    config.validate()?;
    let service = RestPredictionService::connect(server)?;
    ConcurrentRequestDispatcher::new(service, config).run().await
}
