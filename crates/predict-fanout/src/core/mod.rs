//! # Core
//!
//! The pieces shared between the issuing flow of a run and its request tasks.
//!
//! ## Module Structure
//!
//! * [`counter`] - The [`RequestCounter`] monitor. Bounds the number of
//!   requests in flight and joins on their completion.
//!
//! * [`completion`] - The [`Completion`] handed to each request task, which
//!   guarantees the task's result is recorded exactly once.
//!
//! * [`service`] - The [`PredictionService`] trait, the seam between the
//!   dispatcher and whatever transport reaches the served model.
//!
pub mod completion;
pub mod counter;
pub mod service;

pub use completion::Completion;
pub use counter::{CounterSnapshot, RequestCounter, Verdict};
pub use service::PredictionService;
