//! JSON lines written by the `predict` and `status` commands

use sentimark_core::{PipelineError, Prediction};
use sentimark_pipeline::{ArtifactInfo, PipelineState};
use serde::Serialize;

/// One line of `predict` output
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PredictionLine {
    Success {
        text: String,
        label: &'static str,
        confidence: f64,
        display: String,
    },
    Failure {
        text: String,
        error: &'static str,
        message: &'static str,
    },
}

impl PredictionLine {
    pub fn new(text: String, result: &Result<Prediction, PipelineError>) -> Self {
        match result {
            Ok(prediction) => Self::Success {
                text,
                label: prediction.label.as_str(),
                confidence: prediction.confidence,
                display: prediction.confidence_display(),
            },
            Err(err) => Self::Failure {
                text,
                error: err.kind().as_str(),
                message: err.user_message(),
            },
        }
    }
}

/// Output of the `status` command
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StatusReport<'a> {
    Ready { artifacts: &'a [ArtifactInfo] },
    Unavailable { reason: String },
}

impl<'a> StatusReport<'a> {
    pub fn new(state: &'a PipelineState) -> Self {
        match state {
            PipelineState::Ready(ready) => Self::Ready {
                artifacts: ready.artifacts(),
            },
            PipelineState::Unavailable(reason) => Self::Unavailable {
                reason: reason.to_string(),
            },
        }
    }
}
