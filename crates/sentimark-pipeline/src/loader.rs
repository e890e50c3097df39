//! Startup artifact loading
//!
//! Loading never fails the process. Every fault is folded into
//! [`PipelineState::Unavailable`] so the service can still start and answer
//! prediction requests with a service-unavailable error.

use crate::artifact::{ArtifactInfo, RawArtifact};
use crate::config::{DeviceSpec, PipelineConfig};
use crate::model::{FeatureTransformer, ProbabilisticClassifier};
use candle_core::Device;
use sentimark_core::{ArtifactRole, UnavailableReason};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

/// A transformer and classifier that loaded successfully
#[derive(Clone)]
pub struct ReadyPipeline {
    transformer: Arc<dyn FeatureTransformer>,
    classifier: Arc<dyn ProbabilisticClassifier>,
    artifacts: Vec<ArtifactInfo>,
}

impl ReadyPipeline {
    /// Assemble a ready pipeline from in-memory models
    pub fn new(
        transformer: Arc<dyn FeatureTransformer>,
        classifier: Arc<dyn ProbabilisticClassifier>,
    ) -> Self {
        Self {
            transformer,
            classifier,
            artifacts: Vec::new(),
        }
    }

    fn with_artifacts(mut self, artifacts: Vec<ArtifactInfo>) -> Self {
        self.artifacts = artifacts;
        self
    }

    pub fn transformer(&self) -> &dyn FeatureTransformer {
        self.transformer.as_ref()
    }

    pub fn classifier(&self) -> &dyn ProbabilisticClassifier {
        self.classifier.as_ref()
    }

    /// Provenance of the files this pipeline was loaded from
    pub fn artifacts(&self) -> &[ArtifactInfo] {
        &self.artifacts
    }
}

impl fmt::Debug for ReadyPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadyPipeline")
            .field("transformer", &self.transformer.describe())
            .field("classifier", &self.classifier.describe())
            .field("artifacts", &self.artifacts)
            .finish()
    }
}

/// Startup outcome, fixed for the life of the process
#[derive(Debug, Clone)]
pub enum PipelineState {
    Ready(ReadyPipeline),
    Unavailable(UnavailableReason),
}

impl PipelineState {
    /// Shorthand for a ready state built from in-memory models
    pub fn ready(
        transformer: Arc<dyn FeatureTransformer>,
        classifier: Arc<dyn ProbabilisticClassifier>,
    ) -> Self {
        Self::Ready(ReadyPipeline::new(transformer, classifier))
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn unavailable_reason(&self) -> Option<&UnavailableReason> {
        match self {
            Self::Ready(_) => None,
            Self::Unavailable(reason) => Some(reason),
        }
    }
}

/// Loads the vectorizer and classifier artifacts
#[derive(Debug, Clone)]
pub struct ArtifactLoader {
    vectorizer_path: PathBuf,
    classifier_path: PathBuf,
    device: DeviceSpec,
}

impl ArtifactLoader {
    /// Create a loader for explicit artifact paths on the CPU
    pub fn new(vectorizer_path: impl Into<PathBuf>, classifier_path: impl Into<PathBuf>) -> Self {
        Self {
            vectorizer_path: vectorizer_path.into(),
            classifier_path: classifier_path.into(),
            device: DeviceSpec::Cpu,
        }
    }

    /// Create a loader from pipeline configuration
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            vectorizer_path: config.artifacts.vectorizer_path(),
            classifier_path: config.artifacts.classifier_path(),
            device: config.device.clone(),
        }
    }

    /// Set device
    pub fn with_device(mut self, device: DeviceSpec) -> Self {
        self.device = device;
        self
    }

    pub fn vectorizer_path(&self) -> &Path {
        &self.vectorizer_path
    }

    pub fn classifier_path(&self) -> &Path {
        &self.classifier_path
    }

    /// Load both artifacts into a pipeline state
    pub fn load(&self) -> PipelineState {
        match self.try_load() {
            Ok(ready) => {
                info!(
                    transformer = %ready.transformer.describe(),
                    classifier = %ready.classifier.describe(),
                    "Model and vectorizer loaded successfully"
                );
                for artifact in ready.artifacts() {
                    info!(
                        role = %artifact.role,
                        path = %artifact.path.display(),
                        bytes = artifact.size_bytes,
                        sha256 = %artifact.sha256,
                        "Loaded artifact"
                    );
                }
                PipelineState::Ready(ready)
            }
            Err(reason) => {
                error!(
                    vectorizer = %self.vectorizer_path.display(),
                    classifier = %self.classifier_path.display(),
                    "Failed to load models: {}",
                    reason
                );
                if matches!(reason, UnavailableReason::VectorizerMisconfigured { .. }) {
                    error!("The vectorizer file needs to be regenerated with a fitted vectorizer");
                }
                PipelineState::Unavailable(reason)
            }
        }
    }

    fn try_load(&self) -> Result<ReadyPipeline, UnavailableReason> {
        let device = self.create_device()?;

        let classifier_raw = RawArtifact::read(ArtifactRole::Classifier, &self.classifier_path)?;
        let vectorizer_raw = RawArtifact::read(ArtifactRole::Vectorizer, &self.vectorizer_path)?;

        let artifacts = vec![vectorizer_raw.info.clone(), classifier_raw.info.clone()];

        let classifier = classifier_raw.into_classifier(&device)?;
        let transformer = vectorizer_raw.into_transformer(&device)?;

        Ok(ReadyPipeline::new(transformer, classifier).with_artifacts(artifacts))
    }

    fn create_device(&self) -> Result<Device, UnavailableReason> {
        self.device
            .create_device()
            .map_err(|e| UnavailableReason::DeviceUnavailable {
                detail: e.to_string(),
            })
    }
}

/// Load the pipeline state described by `config`
pub fn initialize(config: &PipelineConfig) -> PipelineState {
    ArtifactLoader::from_config(config).load()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_paths_from_config() {
        let config = PipelineConfig::from_yaml(
            r#"
artifacts:
  models_dir: /srv/models
  vectorizer: vec.yaml
"#,
        )
        .unwrap();
        let loader = ArtifactLoader::from_config(&config);
        assert_eq!(loader.vectorizer_path(), Path::new("/srv/models/vec.yaml"));
        assert_eq!(
            loader.classifier_path(),
            Path::new("/srv/models/sentiment_model.json")
        );
    }

    #[test]
    fn test_missing_artifacts_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ArtifactLoader::new(dir.path().join("v.json"), dir.path().join("c.json"));

        let state = loader.load();
        assert!(!state.is_ready());
        let reason = state.unavailable_reason().unwrap();
        assert!(reason.is_missing());
        assert_eq!(reason.role(), Some(ArtifactRole::Classifier));
    }
}
