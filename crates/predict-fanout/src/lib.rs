//! # predict-fanout
//!
//! A load-testing client for models served behind a remote prediction
//! endpoint. It sends a fixed number of prediction requests with a bounded
//! number in flight and reports the fraction that failed or mispredicted.
//!
//! ## Overview
//!
//! A run is driven by a [`ConcurrentRequestDispatcher`]:
//!
//! - One flow issues the requests in order, waiting for a free slot before
//!   each submission
//! - Each request runs on its own task and records its result when it
//!   completes, in whatever order that happens
//! - Once every request is recorded the error rate is computed as
//!   `errors / total`
//!
//! A request counts as an error if it failed outright (timeout, transport
//! failure, remote error, undecodable response) or if the arg-max of its
//! score vector differs from the expected label. Nothing is retried.
//!
//! ## Architecture
//!
//! ### Prediction Services
//!
//! The [`PredictionService`] trait is the only contact point with the
//! remote model. The dispatcher is generic over it, so tests drive runs
//! with scripted services and the `rest` feature supplies
//! [`RestPredictionService`].
//!
//! ### Counting
//!
//! [`RequestCounter`] is a monitor shared by the issuing flow and the
//! request tasks. Its lock guards the active, completed and error counts;
//! its notifier wakes the throttle and the final join.
//!
//! ### Payloads
//!
//! Requests are maps of named single-element tensors. The default payload
//! is one row of the UCI adult census dataset ([`CensusRecord`]); any
//! [`SampleSource`] can replace it.
//!
//! ## Features
//!
//! - **rest** (default) - Enables the REST transport and [`run`]
//!
//! ## Limitations
//!
//! Without a configured deadline the final wait has no bound of its own: it
//! ends only once every request has answered or hit its per-request
//! timeout. In-flight requests are never cancelled by the dispatcher.
//!

mod error;
mod config;

pub mod core;
pub mod dispatch;
pub mod request;
pub mod service;
pub mod tensor;

pub use config::{DispatchConfig, DEFAULT_REQUEST_TIMEOUT, MAX_REQUESTS};
pub use error::{DispatchError, Result, ServiceError};

pub use crate::core::{PredictionService, RequestCounter};
pub use dispatch::{ConcurrentRequestDispatcher, PredictionOutcome, RunSummary};
pub use request::{CensusRecord, SampleSource};

#[cfg(feature = "rest")]
pub use dispatch::run;
#[cfg(feature = "rest")]
pub use service::RestPredictionService;
