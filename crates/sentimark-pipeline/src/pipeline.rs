//! Prediction facade
//!
//! The only surface callers need: check availability, reject empty input,
//! run inference, and fold every outcome into a [`PipelineError`].

use crate::config::{InferenceConfig, PipelineConfig};
use crate::engine;
use crate::loader::{self, PipelineState, ReadyPipeline};
use crate::telemetry;
use sentimark_core::{InferenceError, PipelineError, Prediction};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

/// Predict the sentiment of `raw_text` against a loaded state.
///
/// Availability is checked before the input; `None` and `""` are
/// [`PipelineError::EmptyInput`]. Whitespace-only text is still classified.
/// No input length limit applies; [`SentimentPipeline`] enforces one.
pub fn predict(state: &PipelineState, raw_text: Option<&str>) -> Result<Prediction, PipelineError> {
    let start = Instant::now();
    finish(evaluate(state, raw_text, None), start)
}

fn evaluate(
    state: &PipelineState,
    raw_text: Option<&str>,
    max_input_bytes: Option<usize>,
) -> Result<Prediction, PipelineError> {
    let (ready, text) = admit(state, raw_text, max_input_bytes)?;
    engine::infer(ready, text).map_err(PipelineError::from)
}

fn admit<'a>(
    state: &'a PipelineState,
    raw_text: Option<&'a str>,
    max_input_bytes: Option<usize>,
) -> Result<(&'a ReadyPipeline, &'a str), PipelineError> {
    let ready = match state {
        PipelineState::Ready(ready) => ready,
        PipelineState::Unavailable(reason) => {
            return Err(PipelineError::ServiceUnavailable {
                reason: reason.clone(),
            })
        }
    };

    let text = match raw_text {
        Some(text) if !text.is_empty() => text,
        _ => return Err(PipelineError::EmptyInput),
    };

    match max_input_bytes {
        Some(limit) if text.len() > limit => Err(InferenceError::InputTooLong {
            length: text.len(),
            limit,
        }
        .into()),
        _ => Ok((ready, text)),
    }
}

fn finish(
    result: Result<Prediction, PipelineError>,
    start: Instant,
) -> Result<Prediction, PipelineError> {
    let latency_us = start.elapsed().as_micros() as u64;

    match &result {
        Ok(prediction) => debug!(
            label = %prediction.label,
            confidence = prediction.confidence,
            latency_us,
            "Prediction complete"
        ),
        Err(PipelineError::EmptyInput) => debug!("Rejected empty input"),
        Err(err @ PipelineError::ServiceUnavailable { .. }) => {
            warn!("Prediction rejected: {}", err)
        }
        Err(PipelineError::InferenceFailed(err)) if err.is_input_too_long() => {
            warn!("Prediction rejected: {}", err)
        }
        Err(PipelineError::InferenceFailed(err)) => error!(
            not_fitted = err.is_not_fitted(),
            latency_us,
            "Error in sentiment analysis: {}",
            err
        ),
    }

    telemetry::record_prediction(&result, latency_us);
    result
}

/// Shareable handle over a loaded pipeline
#[derive(Debug, Clone)]
pub struct SentimentPipeline {
    state: Arc<PipelineState>,
    timeout: Duration,
    max_input_bytes: Option<usize>,
}

impl SentimentPipeline {
    /// Load artifacts described by `config`. Never fails; check [`Self::is_ready`].
    pub fn initialize(config: &PipelineConfig) -> Self {
        let state = loader::initialize(config);
        telemetry::record_state(&state);
        Self::from_state(state)
            .with_timeout(config.inference.timeout())
            .with_max_input_bytes(config.inference.max_input_bytes)
    }

    /// Wrap an existing state
    pub fn from_state(state: PipelineState) -> Self {
        let defaults = InferenceConfig::default();
        Self {
            state: Arc::new(state),
            timeout: defaults.timeout(),
            max_input_bytes: defaults.max_input_bytes,
        }
    }

    /// Set the timeout for [`Self::predict_async`]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reject longer inputs without running inference; `None` disables the limit
    pub fn with_max_input_bytes(mut self, max_input_bytes: Option<usize>) -> Self {
        self.max_input_bytes = max_input_bytes;
        self
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_input_bytes(&self) -> Option<usize> {
        self.max_input_bytes
    }

    /// Blocking prediction on the calling thread
    pub fn predict(&self, raw_text: Option<&str>) -> Result<Prediction, PipelineError> {
        let start = Instant::now();
        finish(evaluate(&self.state, raw_text, self.max_input_bytes), start)
    }

    /// Prediction on the blocking pool, abandoned after the configured timeout.
    ///
    /// The blocking task cannot be cancelled; on timeout it runs to
    /// completion in the background and its result is dropped.
    pub async fn predict_async(
        &self,
        raw_text: Option<String>,
    ) -> Result<Prediction, PipelineError> {
        let start = Instant::now();
        let limit = self.max_input_bytes;

        if let Err(err) = admit(&self.state, raw_text.as_deref(), limit) {
            return finish(Err(err), start);
        }

        let state = Arc::clone(&self.state);
        let task =
            tokio::task::spawn_blocking(move || evaluate(&state, raw_text.as_deref(), limit));

        let result = match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(join_error)) => Err(InferenceError::Aborted {
                detail: join_error.to_string(),
            }
            .into()),
            Err(_) => Err(InferenceError::TimedOut {
                timeout: self.timeout,
            }
            .into()),
        };

        finish(result, start)
    }
}
