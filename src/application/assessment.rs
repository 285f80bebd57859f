//! Assessment service: runs one form submission through the risk pipeline.
//!
//! Validator → Assembler → Classifier → Bander. Every step is synchronous
//! and the service holds only immutable state, so one instance can serve any
//! number of submissions concurrently.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::adapters::bundle::BundleLoader;
use crate::adapters::forest::RandomForestClassifier;
use crate::config::AppConfig;
use crate::domain::{assemble, validation, FeatureManifest, PredictionResult, RawInput, RiskAssessment};
use crate::ports::{ClassifierError, RiskClassifier};
use crate::{CardiorenalError, Result};

/// Run the full pipeline for one submission.
///
/// Pure with respect to its arguments: no state is read or written besides
/// the classifier call.
///
/// # Errors
/// - `InvalidMeasurement` if a measurement was not entered; the classifier is
///   not called.
/// - `ClassifierInvocation` if the model fails or breaks its output contract.
pub fn run_pipeline<C>(
    input: &RawInput,
    classifier: &C,
    manifest: &FeatureManifest,
) -> Result<RiskAssessment>
where
    C: RiskClassifier + ?Sized,
{
    let input = validation::validate(input)?;
    let features = assemble(input, manifest);

    let probability = classifier.predict_proba(&features)?;
    if !(0.0..=1.0).contains(&probability) {
        return Err(ClassifierError::InvalidProbability(probability).into());
    }
    let predicted_label = classifier.predict(&features)?;
    if predicted_label > 1 {
        return Err(ClassifierError::Evaluation(format!(
            "label {predicted_label} is not a binary class"
        ))
        .into());
    }

    Ok(RiskAssessment::new(PredictionResult {
        predicted_label,
        probability,
    }))
}

/// Service holding the classifier and manifest loaded at startup.
pub struct AssessmentService<C>
where
    C: RiskClassifier,
{
    classifier: Arc<C>,
    manifest: Arc<FeatureManifest>,
}

impl<C> Clone for AssessmentService<C>
where
    C: RiskClassifier,
{
    fn clone(&self) -> Self {
        Self {
            classifier: Arc::clone(&self.classifier),
            manifest: Arc::clone(&self.manifest),
        }
    }
}

impl<C> AssessmentService<C>
where
    C: RiskClassifier,
{
    /// Create a service, checking that the classifier was trained on the
    /// manifest's feature order when it records one.
    ///
    /// # Errors
    /// Returns `CardiorenalError::ManifestMismatch` if the orders differ.
    pub fn new(classifier: Arc<C>, manifest: FeatureManifest) -> Result<Self> {
        if let Some(trained) = classifier.feature_names() {
            let expected = manifest.names();
            if trained.len() != expected.len()
                || trained.iter().zip(&expected).any(|(a, b)| a.as_str() != *b)
            {
                return Err(CardiorenalError::ManifestMismatch(format!(
                    "model was trained on {trained:?} but the manifest lists {expected:?}"
                )));
            }
        }

        Ok(Self {
            classifier,
            manifest: Arc::new(manifest),
        })
    }

    /// Assess one submission.
    ///
    /// # Errors
    /// See [`run_pipeline`].
    pub fn assess(&self, input: &RawInput) -> Result<RiskAssessment> {
        let started = Instant::now();
        let result = run_pipeline(input, self.classifier.as_ref(), &self.manifest);

        match &result {
            Ok(assessment) => tracing::info!(
                "Assessment complete: band={}, label={}, elapsed_us={}",
                assessment.band,
                assessment.prediction.predicted_label,
                started.elapsed().as_micros()
            ),
            Err(e) if e.is_user_correctable() => {
                tracing::info!("Submission rejected: {}", e);
            }
            Err(e) => tracing::error!("Assessment failed: {}", e),
        }

        result
    }
}

impl AssessmentService<RandomForestClassifier> {
    /// Startup phase: load the model bundle once and build the service.
    ///
    /// # Errors
    /// Returns an error if the bundle is missing, unverifiable or disagrees
    /// with the form schema. Callers should abort startup.
    pub fn load(model_dir: &Path, loader: &BundleLoader) -> Result<Self> {
        let bundle = loader.load(model_dir)?;
        Self::new(Arc::new(bundle.classifier), bundle.manifest)
    }

    /// [`AssessmentService::load`] with the policy from `config`.
    ///
    /// # Errors
    /// See [`AssessmentService::load`].
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let loader = BundleLoader::new(config.verifying_key, config.allow_unsigned_models);
        Self::load(&config.model_dir, &loader)
    }
}
