//! # Tensors
//!
//! Minimal tensor values exchanged with a prediction service.
//!
//! Requests carry one single-element tensor per named input column, either a
//! float or a string. Responses carry float score vectors, one score per
//! class, which [`operations::argmax`] turns into a predicted label.

mod proto;
pub mod operations;

pub use proto::{DataType, TensorProto, TensorValues};
