//! Inference engine
//!
//! Normalize, transform once, classify the single feature vector for both
//! the discrete label and the probability distribution, then coerce the
//! outputs into a [`Prediction`]. Every fault leaves this module as an
//! [`InferenceError`].

use crate::loader::ReadyPipeline;
use crate::model::{FeatureVector, ModelError};
use crate::normalizer;
use sentimark_core::{InferenceError, Prediction, Sentiment};
use tracing::debug;

/// Class label treated as positive sentiment
pub const POSITIVE_CLASS: i64 = 1;

/// Tolerance for probability range and normalization checks
const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Run one prediction against a ready pipeline
pub fn infer(ready: &ReadyPipeline, raw_text: &str) -> Result<Prediction, InferenceError> {
    let normalized = normalizer::normalize(raw_text);
    debug!(tokens = normalized.tokens().count(), "Normalized input");

    let features = ready
        .transformer()
        .transform(&normalized)
        .map_err(|e| stage_error(e, Stage::Transform))?;

    classify(ready, &features)
}

#[derive(Debug, Clone, Copy)]
enum Stage {
    Transform,
    Classify,
}

fn stage_error(err: ModelError, stage: Stage) -> InferenceError {
    if err.is_not_fitted() {
        return InferenceError::not_fitted(err.to_string());
    }
    let detail = err.to_string();
    match stage {
        Stage::Transform => InferenceError::Transform { detail },
        Stage::Classify => InferenceError::Classify { detail },
    }
}

/// Label and confidence from one feature vector
fn classify(ready: &ReadyPipeline, features: &FeatureVector) -> Result<Prediction, InferenceError> {
    let classifier = ready.classifier();

    let class = classifier
        .predict(features)
        .map_err(|e| stage_error(e, Stage::Classify))?;
    let probabilities = classifier
        .predict_proba(features)
        .map_err(|e| stage_error(e, Stage::Classify))?;

    let classes = classifier.classes();
    let confidence = positive_probability(classes, &probabilities)?;
    let label = Sentiment::from_class(class);

    if classes.len() == 2 && disagrees(label, confidence) {
        return Err(InferenceError::invalid_output(format!(
            "predicted class {class} contradicts positive probability {confidence:.4}"
        )));
    }

    debug!(label = %label, confidence, "Classified input");
    Ok(Prediction::new(label, confidence))
}

/// Probability assigned to [`POSITIVE_CLASS`], validated and clamped to [0, 1]
fn positive_probability(classes: &[i64], probabilities: &[f64]) -> Result<f64, InferenceError> {
    if probabilities.len() != classes.len() {
        return Err(InferenceError::invalid_output(format!(
            "{} probabilities for {} classes",
            probabilities.len(),
            classes.len()
        )));
    }

    if probabilities
        .iter()
        .any(|p| !p.is_finite() || *p < -PROBABILITY_TOLERANCE || *p > 1.0 + PROBABILITY_TOLERANCE)
    {
        return Err(InferenceError::invalid_output(format!(
            "probabilities out of range: {probabilities:?}"
        )));
    }

    let total: f64 = probabilities.iter().sum();
    if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(InferenceError::invalid_output(format!(
            "probabilities sum to {total}"
        )));
    }

    let index = classes
        .iter()
        .position(|&c| c == POSITIVE_CLASS)
        .ok_or_else(|| {
            InferenceError::invalid_output(format!(
                "classifier has no positive class {POSITIVE_CLASS} in {classes:?}"
            ))
        })?;

    Ok(probabilities[index].clamp(0.0, 1.0))
}

/// Label on the opposite side of the 0.5 threshold from its probability
fn disagrees(label: Sentiment, confidence: f64) -> bool {
    match label {
        Sentiment::Positive => confidence < 0.5,
        Sentiment::Negative => confidence > 0.5,
    }
}
