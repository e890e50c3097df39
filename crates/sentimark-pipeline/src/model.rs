//! Model capability traits and shared model types
//!
//! Artifacts loaded from disk are turned into trait objects implementing
//! [`FeatureTransformer`] and [`ProbabilisticClassifier`]. Both traits are
//! read-only (`&self`) and `Send + Sync`, so one loaded pair serves every
//! concurrent request.

use candle_core::{DType, Device, Tensor};
use sentimark_core::NormalizedText;

/// Errors raised by transformers and classifiers
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The model was serialized before being fitted
    #[error("this {component} instance is not fitted yet")]
    NotFitted { component: String },

    /// Input width does not match what the model was fitted on
    #[error("X has {actual} features, but {component} is expecting {expected} features as input")]
    DimensionMismatch {
        component: String,
        expected: usize,
        actual: usize,
    },

    /// Model parameters are inconsistent
    #[error("invalid {component} parameters: {detail}")]
    InvalidParameters { component: String, detail: String },

    /// Tensor computation failed
    #[error("tensor operation failed: {0}")]
    Tensor(#[from] candle_core::Error),
}

impl ModelError {
    pub fn not_fitted(component: impl Into<String>) -> Self {
        Self::NotFitted {
            component: component.into(),
        }
    }

    pub fn invalid(component: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::InvalidParameters {
            component: component.into(),
            detail: detail.into(),
        }
    }

    pub fn is_not_fitted(&self) -> bool {
        matches!(self, Self::NotFitted { .. })
    }
}

pub type ModelResult<T> = std::result::Result<T, ModelError>;

/// Numeric representation of one normalized document: a `(1, n_features)`
/// F64 tensor.
#[derive(Debug, Clone)]
pub struct FeatureVector {
    tensor: Tensor,
}

impl FeatureVector {
    /// Build a feature vector from dense values
    pub fn from_dense(values: Vec<f64>, device: &Device) -> ModelResult<Self> {
        let width = values.len();
        let tensor = Tensor::from_vec(values, (1, width), device)?;
        Ok(Self { tensor })
    }

    /// Wrap an existing tensor; it must be a single row
    pub fn from_tensor(tensor: Tensor) -> ModelResult<Self> {
        let tensor = match tensor.rank() {
            1 => tensor.unsqueeze(0)?,
            2 if tensor.dim(0)? == 1 => tensor,
            _ => {
                return Err(ModelError::invalid(
                    "feature vector",
                    format!("expected a single row, got shape {:?}", tensor.dims()),
                ))
            }
        };
        Ok(Self {
            tensor: tensor.to_dtype(DType::F64)?,
        })
    }

    pub fn n_features(&self) -> usize {
        self.tensor.dims()[1]
    }

    pub fn as_tensor(&self) -> &Tensor {
        &self.tensor
    }

    pub fn device(&self) -> &Device {
        self.tensor.device()
    }

    /// Copy the values out of the tensor
    pub fn to_vec(&self) -> ModelResult<Vec<f64>> {
        Ok(self.tensor.squeeze(0)?.to_vec1::<f64>()?)
    }
}

/// Converts normalized text into classifier input
pub trait FeatureTransformer: Send + Sync {
    /// Transform one document into one feature vector
    fn transform(&self, text: &NormalizedText) -> ModelResult<FeatureVector>;

    /// Output width, if fitted
    fn n_features(&self) -> Option<usize>;

    /// Short model description for logs
    fn describe(&self) -> String;
}

/// Binary classifier exposing discrete and probabilistic predictions
pub trait ProbabilisticClassifier: Send + Sync {
    /// Class labels in the order used by [`predict_proba`](Self::predict_proba)
    fn classes(&self) -> &[i64];

    /// Discrete class prediction
    fn predict(&self, features: &FeatureVector) -> ModelResult<i64>;

    /// Probability of each class, aligned with [`classes`](Self::classes)
    fn predict_proba(&self, features: &FeatureVector) -> ModelResult<Vec<f64>>;

    /// Short model description for logs
    fn describe(&self) -> String;
}
