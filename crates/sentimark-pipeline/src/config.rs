//! Pipeline configuration
//!
//! Loaded once at startup from an optional YAML/JSON/TOML file layered with
//! `SENTIMARK_` environment variables, e.g.
//! `SENTIMARK_ARTIFACTS__MODELS_DIR=/srv/models`.

use candle_core::Device;
use sentimark_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "SENTIMARK";

/// Top-level pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Artifact locations
    #[serde(default)]
    pub artifacts: ArtifactsConfig,

    /// Device to run inference on
    #[serde(default)]
    pub device: DeviceSpec,

    /// Per-request limits
    #[serde(default)]
    pub inference: InferenceConfig,
}

/// Where the two artifacts live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    /// Base directory for relative artifact paths
    #[serde(default = "default_models_dir")]
    pub models_dir: PathBuf,

    /// Vectorizer artifact file
    #[serde(default = "default_vectorizer")]
    pub vectorizer: PathBuf,

    /// Classifier artifact file
    #[serde(default = "default_classifier")]
    pub classifier: PathBuf,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            models_dir: default_models_dir(),
            vectorizer: default_vectorizer(),
            classifier: default_classifier(),
        }
    }
}

impl ArtifactsConfig {
    /// Resolved vectorizer path
    pub fn vectorizer_path(&self) -> PathBuf {
        self.resolve(&self.vectorizer)
    }

    /// Resolved classifier path
    pub fn classifier_path(&self) -> PathBuf {
        self.resolve(&self.classifier)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.models_dir.join(path)
        }
    }
}

/// Request handling limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Timeout for one prediction on the async path, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Longest accepted input in bytes; `null` disables the limit
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: Option<usize>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            max_input_bytes: default_max_input_bytes(),
        }
    }
}

impl InferenceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Device specification (for config files)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceSpec {
    #[default]
    Cpu,
    Cuda { index: Option<usize> },
    Metal { index: Option<usize> },
}

impl DeviceSpec {
    /// Create the Candle device
    pub fn create_device(&self) -> candle_core::Result<Device> {
        match self {
            DeviceSpec::Cpu => Ok(Device::Cpu),
            DeviceSpec::Cuda { index } => Device::new_cuda(index.unwrap_or(0)),
            DeviceSpec::Metal { index } => Device::new_metal(index.unwrap_or(0)),
        }
    }
}

impl PipelineConfig {
    /// Load from YAML string.
    ///
    /// Goes through the same `config` deserializer as [`Self::load`], so the
    /// device may be written as a plain name or a single-key map.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::from_str(yaml, config::FileFormat::Yaml));
        Self::build(builder)
    }

    /// Load from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Layer an optional config file with `SENTIMARK_` environment variables.
    ///
    /// A missing file is not an error; defaults apply.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    fn load_with_env(path: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        let environment = config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(env);

        Self::build(builder.add_source(environment))
    }

    fn build(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        builder
            .build()
            .and_then(|settings| settings.try_deserialize::<Self>())
            .map_err(|e| Error::config(format!("Failed to load pipeline config: {e}")))
    }
}

fn default_models_dir() -> PathBuf {
    PathBuf::from("./models")
}

fn default_vectorizer() -> PathBuf {
    PathBuf::from("vectorizer.json")
}

fn default_classifier() -> PathBuf {
    PathBuf::from("sentiment_model.json")
}

fn default_timeout_ms() -> u64 {
    2_000
}

fn default_max_input_bytes() -> Option<usize> {
    Some(100_000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(
            config.artifacts.vectorizer_path(),
            PathBuf::from("./models/vectorizer.json")
        );
        assert_eq!(
            config.artifacts.classifier_path(),
            PathBuf::from("./models/sentiment_model.json")
        );
        assert_eq!(config.device, DeviceSpec::Cpu);
        assert_eq!(config.inference.timeout(), Duration::from_secs(2));
        assert_eq!(config.inference.max_input_bytes, Some(100_000));
    }

    #[test]
    fn test_from_yaml() {
        let yaml = r#"
artifacts:
  models_dir: /srv/models
  classifier: lr.safetensors
device:
  cuda:
    index: 1
inference:
  timeout_ms: 250
"#;
        let config = PipelineConfig::from_yaml(yaml).unwrap();
        assert_eq!(
            config.artifacts.classifier_path(),
            PathBuf::from("/srv/models/lr.safetensors")
        );
        assert_eq!(
            config.artifacts.vectorizer_path(),
            PathBuf::from("/srv/models/vectorizer.json")
        );
        assert_eq!(config.device, DeviceSpec::Cuda { index: Some(1) });
        assert_eq!(config.inference.timeout_ms, 250);
    }

    #[test]
    fn test_device_forms() {
        let config = PipelineConfig::from_yaml("device: { cuda: { index: 0 } }").unwrap();
        assert_eq!(config.device, DeviceSpec::Cuda { index: Some(0) });

        let config = PipelineConfig::from_yaml("device:\n  metal:\n    index: 2").unwrap();
        assert_eq!(config.device, DeviceSpec::Metal { index: Some(2) });

        let config = PipelineConfig::from_yaml("device: cpu").unwrap();
        assert_eq!(config.device, DeviceSpec::Cpu);
    }

    #[test]
    fn test_from_yaml_rejects_unknown_device() {
        let err = PipelineConfig::from_yaml("device: tpu").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_example_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../sentimark-cli/config.example.yaml");
        let config = PipelineConfig::from_file(path).unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_input_limit_can_be_disabled() {
        let config = PipelineConfig::from_yaml("inference:\n  max_input_bytes: ~").unwrap();
        assert_eq!(config.inference.max_input_bytes, None);
        assert_eq!(config.inference.timeout_ms, 2_000);

        let config = PipelineConfig::from_yaml("inference:\n  max_input_bytes: 64").unwrap();
        assert_eq!(config.inference.max_input_bytes, Some(64));
    }

    #[test]
    fn test_absolute_artifact_path_kept() {
        let yaml = r#"
artifacts:
  vectorizer: /opt/vec.yaml
"#;
        let config = PipelineConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.artifacts.vectorizer_path(), PathBuf::from("/opt/vec.yaml"));
    }

    #[test]
    fn test_device_spec() {
        let spec: DeviceSpec = serde_yaml::from_str("cpu").unwrap();
        assert_eq!(spec, DeviceSpec::Cpu);
        assert!(matches!(DeviceSpec::Cpu.create_device().unwrap(), Device::Cpu));
    }

    #[test]
    fn test_load_layers_file_and_env() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "artifacts:\n  models_dir: /from/file\ninference:\n  timeout_ms: 100").unwrap();

        let mut env = HashMap::new();
        env.insert("SENTIMARK_INFERENCE__TIMEOUT_MS".to_string(), "900".to_string());

        let config = PipelineConfig::load_with_env(Some(file.path()), Some(env)).unwrap();
        assert_eq!(config.artifacts.models_dir, PathBuf::from("/from/file"));
        assert_eq!(config.inference.timeout_ms, 900);
        assert_eq!(config.artifacts.vectorizer, PathBuf::from("vectorizer.json"));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = PipelineConfig::load_with_env(
            Some(Path::new("/definitely/not/here.yaml")),
            Some(HashMap::new()),
        )
        .unwrap();
        assert_eq!(config, PipelineConfig::default());
    }
}
