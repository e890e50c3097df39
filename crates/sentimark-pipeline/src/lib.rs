//! Sentimark Pipeline
//!
//! Binary sentiment classification over pre-trained artifacts.
//!
//! A request flows through four stages:
//! - Normalization: lowercase, strip punctuation, drop English stop words, stem
//! - Feature transformation through the loaded vectorizer
//! - Classification into a label plus positive-class probability
//! - Folding of every fault into the three-kind [`PipelineError`] taxonomy
//!
//! Artifacts are loaded once at startup. A missing or misconfigured artifact
//! leaves the pipeline [`PipelineState::Unavailable`] rather than failing the
//! process.

pub mod artifact;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod loader;
pub mod model;
pub mod normalizer;
pub mod pipeline;
pub mod porter;
pub mod stopwords;
pub mod telemetry;
pub mod vectorizer;

pub use artifact::{ArtifactFormat, ArtifactInfo};
pub use classifier::{LogisticRegression, MultinomialNaiveBayes};
pub use config::{ArtifactsConfig, DeviceSpec, InferenceConfig, PipelineConfig};
pub use loader::{initialize, ArtifactLoader, PipelineState, ReadyPipeline};
pub use model::{FeatureTransformer, FeatureVector, ModelError, ProbabilisticClassifier};
pub use normalizer::{normalize, normalize_input, normalize_value, Normalizer};
pub use pipeline::{predict, SentimentPipeline};
pub use vectorizer::{TermVectorizer, VectorizerSpec};

pub use sentimark_core::{
    ArtifactRole, ErrorKind, InferenceError, NormalizedText, PipelineError, Prediction, Sentiment,
    UnavailableReason,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::PipelineConfig;
    pub use crate::loader::PipelineState;
    pub use crate::model::{FeatureTransformer, FeatureVector, ProbabilisticClassifier};
    pub use crate::pipeline::{predict, SentimentPipeline};
    pub use sentimark_core::prelude::*;
}
