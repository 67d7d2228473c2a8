//! # Requests
//!
//! The request/response contract spoken with a prediction service and the
//! census payloads the client sends through it.
//!
//! * [`PredictRequest`] / [`PredictResponse`] - model-addressed maps of named tensors
//! * [`CensusRecord`] - the 13 named input columns of the census model plus its label
//! * [`SampleSource`] - where the dispatcher draws each request's payload from

mod census;
mod predict;
mod source;

pub use census::{CensusRecord, LABEL_VOCABULARY, label_index};
pub use predict::{LabeledRequest, ModelSpec, PredictRequest, PredictResponse};
pub use source::{CyclicSamples, FixedSample, SampleSource};
