//! Classifier port: Trait for the pre-trained CVD risk model.
//!
//! The pipeline treats the model as a black box. It only relies on the
//! input/output contract below, so any in-process model can sit behind it.

use crate::domain::FeatureVector;

/// Errors raised by a classifier while evaluating a feature vector.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifierError {
    #[error("Feature count mismatch: got {got}, expected {expected}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Feature {index} is not a finite number")]
    NonFiniteFeature { index: usize },

    #[error("Classifier produced an invalid probability: {0}")]
    InvalidProbability(f64),

    #[error("Model evaluation failed: {0}")]
    Evaluation(String),
}

/// Trait for binary risk classifiers.
///
/// Implementations must be deterministic and free of side effects: the same
/// vector always yields the same answer, and evaluation never mutates the
/// model. They are shared across submissions by `Arc`.
pub trait RiskClassifier: Send + Sync {
    /// Hard class label: 1 = elevated CVD risk, 0 otherwise.
    ///
    /// # Errors
    /// Returns `ClassifierError` if the vector cannot be evaluated.
    fn predict(&self, features: &FeatureVector) -> Result<u8, ClassifierError>;

    /// Probability of the positive class, in `[0, 1]`.
    ///
    /// # Errors
    /// Returns `ClassifierError` if the vector cannot be evaluated.
    fn predict_proba(&self, features: &FeatureVector) -> Result<f64, ClassifierError>;

    /// Feature identifiers the model was trained on, if it records them.
    fn feature_names(&self) -> Option<&[String]> {
        None
    }
}
