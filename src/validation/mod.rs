//! Validation chains that thread a pass/fail status alongside the payload.
//!
//! Validators run before a pipeline to reject bad input early, without
//! raising: a rejected payload comes back as [`Outcome::Failure`].

pub mod outcome;
pub mod pipeline;

pub use outcome::{Outcome, Status};
pub use pipeline::{IntoValidator, ValidatorPipeline};
