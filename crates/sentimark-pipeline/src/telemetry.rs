//! Prediction metrics
//!
//! Recorded through the `metrics` facade; without an installed recorder
//! these calls are no-ops.

use crate::loader::PipelineState;
use sentimark_core::{PipelineError, Prediction};

pub const PREDICTIONS_TOTAL: &str = "sentimark_predictions_total";
pub const INFERENCE_LATENCY_US: &str = "sentimark_inference_latency_us";
pub const PIPELINE_READY: &str = "sentimark_pipeline_ready";

/// Register metric descriptions with the installed recorder
pub fn describe_metrics() {
    metrics::describe_counter!(
        PREDICTIONS_TOTAL,
        "Total number of prediction requests by outcome"
    );
    metrics::describe_histogram!(
        INFERENCE_LATENCY_US,
        metrics::Unit::Microseconds,
        "Prediction latency in microseconds"
    );
    metrics::describe_gauge!(
        PIPELINE_READY,
        "1 when the model artifacts loaded successfully, 0 otherwise"
    );
}

/// Outcome label for a finished prediction
pub fn outcome_label(result: &Result<Prediction, PipelineError>) -> &'static str {
    match result {
        Ok(prediction) if prediction.label.is_positive() => "positive",
        Ok(_) => "negative",
        Err(PipelineError::EmptyInput) => "empty_input",
        Err(PipelineError::ServiceUnavailable { .. }) => "unavailable",
        Err(PipelineError::InferenceFailed(err)) if err.is_not_fitted() => "not_fitted",
        Err(PipelineError::InferenceFailed(err)) if err.is_input_too_long() => "input_too_long",
        Err(PipelineError::InferenceFailed(_)) => "failed",
    }
}

pub(crate) fn record_prediction(result: &Result<Prediction, PipelineError>, latency_us: u64) {
    metrics::counter!(PREDICTIONS_TOTAL, "outcome" => outcome_label(result)).increment(1);
    if result.is_ok() {
        metrics::histogram!(INFERENCE_LATENCY_US).record(latency_us as f64);
    }
}

/// Publish the startup state
pub fn record_state(state: &PipelineState) {
    let ready = if state.is_ready() { 1.0 } else { 0.0 };
    metrics::gauge!(PIPELINE_READY).set(ready);
}
