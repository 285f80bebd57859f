//! # Cardiorenal
//!
//! Cardiovascular disease (CVD) risk decision support for chronic kidney
//! disease (CKD) patients.
//!
//! This crate provides:
//! - Validation and encoding of nine clinical indicators
//! - Feature ordering driven by the model's feature manifest
//! - Random-forest inference over a signed JSON model export
//! - Three-tier risk banding with static recommendations
//! - Terminal UI for local use
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types and pure pipeline steps (encoding, validation, banding)
//! - `ports`: Trait definitions for external collaborators (the classifier)
//! - `adapters`: Concrete implementations (random forest, model bundle, log sanitizer)
//! - `application`: The assessment pipeline and startup context
//! - `config`: Environment-driven settings
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{Measurement, RawInput, RiskAssessment, RiskBand};

/// Result type for Cardiorenal operations
pub type Result<T> = std::result::Result<T, CardiorenalError>;

/// Main error type for Cardiorenal
#[derive(Debug, thiserror::Error)]
pub enum CardiorenalError {
    #[error("The value for '{0}' is 0. Please enter a valid measurement.")]
    InvalidMeasurement(domain::Measurement),

    #[error("Feature manifest does not match the input schema: {0}")]
    ManifestMismatch(String),

    #[error("Classifier invocation failed: {0}")]
    ClassifierInvocation(#[from] ports::ClassifierError),

    #[error("Model artifact error: {0}")]
    Artifact(#[from] adapters::ArtifactError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CardiorenalError {
    /// Whether the user can fix this by correcting the form.
    #[must_use]
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, Self::InvalidMeasurement(_))
    }

    /// Message safe to show on screen.
    ///
    /// Validation errors are shown verbatim; everything else is reduced to a
    /// generic message and left to the log for detail.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidMeasurement(_) => self.to_string(),
            Self::ClassifierInvocation(_) => {
                "The risk model could not produce a result for this input.".to_string()
            }
            _ => "The assessment could not be completed. Contact your administrator.".to_string(),
        }
    }
}
