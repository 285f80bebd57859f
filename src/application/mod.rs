//! Application layer: Use cases and services.
//!
//! This module wires the domain pipeline to the classifier port and owns the
//! startup phase that loads the model bundle.

mod assessment;

pub use assessment::{run_pipeline, AssessmentService};
