//! Artifact files produced by the training process
//!
//! Artifacts are JSON or YAML documents internally tagged by `kind`, or
//! safetensors archives for classifier weights. The file extension selects
//! the format; unknown extensions are decoded as JSON.

use crate::classifier::{
    default_classes, LogisticRegression, LogisticRegressionSpec, MultinomialNaiveBayes,
    NaiveBayesSpec,
};
use crate::model::{FeatureTransformer, ModelResult, ProbabilisticClassifier};
use crate::vectorizer::{TermVectorizer, VectorizerSpec, Weighting};
use candle_core::{DType, Device, Tensor};
use sentimark_core::{ArtifactRole, UnavailableReason};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Document kinds that provide the transform capability
pub const TRANSFORMER_KINDS: &[&str] = &["tfidf_vectorizer", "count_vectorizer"];

/// On-disk encoding of an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    Json,
    Yaml,
    SafeTensors,
}

impl ArtifactFormat {
    /// Pick the format from the file extension
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => Self::Yaml,
            Some("safetensors") => Self::SafeTensors,
            _ => Self::Json,
        }
    }
}

/// Provenance of one loaded artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactInfo {
    pub role: ArtifactRole,
    pub path: PathBuf,
    pub format: ArtifactFormat,
    pub size_bytes: u64,
    /// Hex SHA-256 of the file contents
    pub sha256: String,
}

/// Artifact bytes plus provenance
pub(crate) struct RawArtifact {
    pub info: ArtifactInfo,
    pub bytes: Vec<u8>,
}

impl RawArtifact {
    /// Read an artifact file. A missing file is reported separately from
    /// other read failures.
    pub fn read(role: ArtifactRole, path: &Path) -> Result<Self, UnavailableReason> {
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => UnavailableReason::ArtifactMissing {
                role,
                path: path.to_path_buf(),
            },
            _ => UnavailableReason::ReadFailed {
                role,
                path: path.to_path_buf(),
                detail: e.to_string(),
            },
        })?;

        let info = ArtifactInfo {
            role,
            path: path.to_path_buf(),
            format: ArtifactFormat::from_path(path),
            size_bytes: bytes.len() as u64,
            sha256: format!("{:x}", Sha256::digest(&bytes)),
        };

        Ok(Self { info, bytes })
    }

    fn malformed(&self, detail: impl Into<String>) -> UnavailableReason {
        UnavailableReason::Malformed {
            role: self.info.role,
            path: self.info.path.clone(),
            detail: detail.into(),
        }
    }

    /// Decode a JSON or YAML document into a generic value
    fn document(&self) -> Result<Value, UnavailableReason> {
        match self.info.format {
            ArtifactFormat::Json | ArtifactFormat::SafeTensors => {
                serde_json::from_slice(&self.bytes).map_err(|e| self.malformed(e.to_string()))
            }
            ArtifactFormat::Yaml => {
                serde_yaml::from_slice(&self.bytes).map_err(|e| self.malformed(e.to_string()))
            }
        }
    }

    fn tensors(&self, device: &Device) -> Result<HashMap<String, Tensor>, UnavailableReason> {
        candle_core::safetensors::load_buffer(&self.bytes, device)
            .map_err(|e| self.malformed(e.to_string()))
    }

    /// Decode the vectorizer, checking structurally that the document
    /// declares a transformer kind before deserializing it.
    pub fn into_transformer(
        self,
        device: &Device,
    ) -> Result<Arc<dyn FeatureTransformer>, UnavailableReason> {
        let found = match self.info.format {
            ArtifactFormat::SafeTensors => {
                let tensors = self.tensors(device)?;
                format!("a tensor archive with {} tensors", tensors.len())
            }
            _ => {
                let doc = self.document()?;
                match inspect_transformer(&doc) {
                    Inspection::Transformer => {
                        let artifact: TransformerArtifact = serde_json::from_value(doc)
                            .map_err(|e| self.malformed(e.to_string()))?;
                        return artifact
                            .build(device)
                            .map_err(|e| self.malformed(e.to_string()));
                    }
                    Inspection::NotATransformer(found) => found,
                }
            }
        };

        Err(UnavailableReason::VectorizerMisconfigured {
            path: self.info.path,
            found,
        })
    }

    /// Decode the classifier. Only decoding is checked here; unfitted
    /// classifiers are reported at inference time.
    pub fn into_classifier(
        self,
        device: &Device,
    ) -> Result<Arc<dyn ProbabilisticClassifier>, UnavailableReason> {
        match self.info.format {
            ArtifactFormat::SafeTensors => {
                let tensors = self.tensors(device)?;
                classifier_from_tensors(tensors).map_err(|e| self.malformed(e))
            }
            _ => {
                let doc = self.document()?;
                let artifact: ClassifierArtifact =
                    serde_json::from_value(doc).map_err(|e| self.malformed(e.to_string()))?;
                artifact
                    .build(device)
                    .map_err(|e| self.malformed(e.to_string()))
            }
        }
    }
}

/// Serialized feature transformer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformerArtifact {
    TfidfVectorizer(VectorizerSpec),
    CountVectorizer(VectorizerSpec),
}

impl TransformerArtifact {
    pub fn build(self, device: &Device) -> ModelResult<Arc<dyn FeatureTransformer>> {
        let vectorizer = match self {
            Self::TfidfVectorizer(spec) => TermVectorizer::from_spec(Weighting::Tfidf, spec, device)?,
            Self::CountVectorizer(spec) => TermVectorizer::from_spec(Weighting::Count, spec, device)?,
        };
        Ok(Arc::new(vectorizer))
    }
}

/// Serialized classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    LogisticRegression(LogisticRegressionSpec),
    MultinomialNb(NaiveBayesSpec),
}

impl ClassifierArtifact {
    pub fn build(self, device: &Device) -> ModelResult<Arc<dyn ProbabilisticClassifier>> {
        let model: Arc<dyn ProbabilisticClassifier> = match self {
            Self::LogisticRegression(spec) => Arc::new(LogisticRegression::from_spec(spec, device)?),
            Self::MultinomialNb(spec) => Arc::new(MultinomialNaiveBayes::from_spec(spec, device)?),
        };
        Ok(model)
    }
}

fn classifier_from_tensors(
    mut tensors: HashMap<String, Tensor>,
) -> Result<Arc<dyn ProbabilisticClassifier>, String> {
    let coef = tensors
        .remove("coef")
        .ok_or_else(|| "archive has no 'coef' tensor".to_string())?;
    let intercept = tensors.remove("intercept");

    let classes = match tensors.remove("classes") {
        Some(classes) => classes
            .to_dtype(DType::F64)
            .and_then(|t| t.flatten_all())
            .and_then(|t| t.to_vec1::<f64>())
            .map_err(|e| e.to_string())?
            .into_iter()
            .map(class_label)
            .collect::<Result<Vec<_>, _>>()?,
        None => default_classes(),
    };

    let model = LogisticRegression::from_tensors(classes, Some(coef), intercept)
        .map_err(|e| e.to_string())?;
    Ok(Arc::new(model))
}

/// Class labels stored as floats must be finite whole numbers
fn class_label(value: f64) -> Result<i64, String> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= i64::MAX as f64 {
        Ok(value as i64)
    } else {
        Err(format!("'classes' tensor holds {value}, not an integer label"))
    }
}

/// Outcome of the structural transformer check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inspection {
    /// The document declares a transformer kind
    Transformer,
    /// The document is something else, described for diagnostics
    NotATransformer(String),
}

/// Check whether a decoded document is a transformer, without
/// deserializing it.
pub fn inspect_transformer(doc: &Value) -> Inspection {
    if let Some(kind) = doc.get("kind").and_then(Value::as_str) {
        if TRANSFORMER_KINDS.contains(&kind) {
            return Inspection::Transformer;
        }
    }
    Inspection::NotATransformer(describe_document(doc))
}

fn describe_document(doc: &Value) -> String {
    match doc {
        Value::Array(rows) if !rows.is_empty() && rows.iter().all(Value::is_array) => {
            let cols = rows[0].as_array().map(Vec::len).unwrap_or(0);
            format!("a {}x{} matrix", rows.len(), cols)
        }
        Value::Array(values) => format!("an array of {} values", values.len()),
        Value::Object(map) => match map.get("kind").and_then(Value::as_str) {
            Some(kind) => format!("an object of kind '{kind}'"),
            None if map.contains_key("indptr") && map.contains_key("indices") => {
                "a sparse matrix".to_string()
            }
            None => "an object without a 'kind' field".to_string(),
        },
        Value::String(_) => "a string value".to_string(),
        Value::Number(_) => "a number value".to_string(),
        Value::Bool(_) => "a boolean value".to_string(),
        Value::Null => "a null value".to_string(),
    }
}
