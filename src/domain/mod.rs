//! Domain layer: Core types and pure logic of the risk pipeline.
//!
//! Nothing in here performs I/O. The classifier is reached only through the
//! `ports` layer.

pub mod encoding;
pub mod features;
mod patient;
pub mod risk;
pub mod validation;

pub use encoding::{AdlDifficulties, SelfRatedHealth, YesNo};
pub use features::{assemble, EncodedInput, FeatureId, FeatureManifest, FeatureVector};
pub use patient::{Measurement, RawInput};
pub use risk::{PredictionResult, RiskAssessment, RiskBand};

#[cfg(test)]
pub(crate) use patient::sample_input;
