//! # Prediction Services
//!
//! Transports implementing [`PredictionService`](crate::core::PredictionService).
//!
//! ## Feature Flags
//!
//! - `rest` (default): [`RestPredictionService`], the REST predict API of a
//!   model server, over `reqwest`

#[cfg(feature = "rest")]
mod rest;

#[cfg(feature = "rest")]
pub use rest::{RestConfig, RestPredictionService};

#[cfg(test)]
/// Scripted service for tests.
pub(crate) mod mock;
