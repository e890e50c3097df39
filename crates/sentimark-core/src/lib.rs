//! Sentimark Core
//!
//! Boundary types shared by the sentiment pipeline and its callers.
//!
//! This crate provides:
//! - The prediction result types (`Sentiment`, `Prediction`)
//! - The normalized text newtype handed between pipeline stages
//! - The stable error taxonomy exposed at the pipeline boundary

pub mod error;
pub mod types;

pub use error::{Error, ErrorKind, InferenceError, PipelineError, Result, UnavailableReason};
pub use types::{ArtifactRole, NormalizedText, Prediction, Sentiment};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{ErrorKind, InferenceError, PipelineError, UnavailableReason};
    pub use crate::types::{NormalizedText, Prediction, Sentiment};
}
