//! Linear probabilistic classifiers
//!
//! Inference for the two classifier families the training process exports:
//! logistic regression and multinomial naive Bayes. Both reduce to one
//! affine map over the feature vector (a [`candle_nn::Linear`]) followed by
//! a sigmoid or softmax.

use crate::model::{FeatureVector, ModelError, ModelResult, ProbabilisticClassifier};
use candle_core::{DType, Device, Module, Tensor, D};
use candle_nn::Linear;
use serde::{Deserialize, Serialize};

/// Serialized logistic regression parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegressionSpec {
    #[serde(default = "default_classes")]
    pub classes: Vec<i64>,

    /// One row per decision function; absent when not fitted
    #[serde(default)]
    pub coef: Option<Vec<Vec<f64>>>,

    #[serde(default)]
    pub intercept: Option<Vec<f64>>,
}

/// Serialized multinomial naive Bayes parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NaiveBayesSpec {
    #[serde(default = "default_classes")]
    pub classes: Vec<i64>,

    #[serde(default)]
    pub class_log_prior: Option<Vec<f64>>,

    /// One row per class; absent when not fitted
    #[serde(default)]
    pub feature_log_prob: Option<Vec<Vec<f64>>>,
}

pub(crate) fn default_classes() -> Vec<i64> {
    vec![0, 1]
}

/// How decision scores become probabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Link {
    /// Single score for the second class
    Sigmoid,
    /// One score per class
    Softmax,
}

/// Fitted affine layer plus its input width
#[derive(Debug, Clone)]
struct Fitted {
    layer: Linear,
    n_features: usize,
    link: Link,
}

/// Shared implementation for both classifier families
#[derive(Debug, Clone)]
struct LinearModel {
    component: &'static str,
    classes: Vec<i64>,
    fitted: Option<Fitted>,
}

impl LinearModel {
    fn new(
        component: &'static str,
        classes: Vec<i64>,
        weight: Option<Tensor>,
        bias: Option<Tensor>,
        allow_sigmoid: bool,
    ) -> ModelResult<Self> {
        if classes.len() < 2 {
            return Err(ModelError::invalid(
                component,
                format!("need at least two classes, got {}", classes.len()),
            ));
        }

        let fitted = match weight {
            None => None,
            Some(weight) => {
                let weight = weight.to_dtype(DType::F64)?;
                let (rows, n_features) = weight.dims2()?;
                ensure_finite(component, "weights", &weight)?;

                let link = if rows == classes.len() {
                    Link::Softmax
                } else if allow_sigmoid && rows == 1 && classes.len() == 2 {
                    Link::Sigmoid
                } else {
                    return Err(ModelError::invalid(
                        component,
                        format!("{rows} weight rows for {} classes", classes.len()),
                    ));
                };

                let bias = match bias {
                    Some(bias) => {
                        let bias = bias.to_dtype(DType::F64)?.flatten_all()?;
                        if bias.dim(0)? != rows {
                            return Err(ModelError::invalid(
                                component,
                                format!("{} bias terms for {rows} weight rows", bias.dim(0)?),
                            ));
                        }
                        ensure_finite(component, "bias terms", &bias)?;
                        bias
                    }
                    None => Tensor::zeros(rows, DType::F64, weight.device())?,
                };

                Some(Fitted {
                    layer: Linear::new(weight, Some(bias)),
                    n_features,
                    link,
                })
            }
        };

        Ok(Self {
            component,
            classes,
            fitted,
        })
    }

    fn probabilities(&self, features: &FeatureVector) -> ModelResult<Vec<f64>> {
        let fitted = self
            .fitted
            .as_ref()
            .ok_or_else(|| ModelError::not_fitted(self.component))?;

        if features.n_features() != fitted.n_features {
            return Err(ModelError::DimensionMismatch {
                component: self.component.to_string(),
                expected: fitted.n_features,
                actual: features.n_features(),
            });
        }

        let scores = fitted.layer.forward(features.as_tensor())?;
        let probs = match fitted.link {
            Link::Sigmoid => {
                let positive = scores.neg()?.exp()?.affine(1.0, 1.0)?.recip()?;
                let negative = positive.affine(-1.0, 1.0)?;
                Tensor::cat(&[&negative, &positive], 1)?
            }
            Link::Softmax => candle_nn::ops::softmax(&scores, D::Minus1)?,
        };

        Ok(probs.squeeze(0)?.to_vec1::<f64>()?)
    }

    fn predict(&self, features: &FeatureVector) -> ModelResult<i64> {
        let probs = self.probabilities(features)?;
        argmax(&probs)
            .map(|idx| self.classes[idx])
            .ok_or_else(|| ModelError::invalid(self.component, "empty probability vector"))
    }

    fn describe(&self) -> String {
        match &self.fitted {
            Some(fitted) => format!(
                "{}({} classes, {} features)",
                self.component,
                self.classes.len(),
                fitted.n_features
            ),
            None => format!("{}(unfitted)", self.component),
        }
    }
}

/// Index of the largest value; ties resolve to the first index
fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &value) in values.iter().enumerate() {
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((idx, value)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Build a `(rows, cols)` tensor from nested rows, rejecting ragged input
pub(crate) fn matrix(component: &str, rows: Vec<Vec<f64>>, device: &Device) -> ModelResult<Tensor> {
    let n_rows = rows.len();
    let n_cols = rows.first().map(Vec::len).unwrap_or(0);
    if n_rows == 0 || n_cols == 0 {
        return Err(ModelError::invalid(component, "empty weight matrix"));
    }
    if rows.iter().any(|row| row.len() != n_cols) {
        return Err(ModelError::invalid(component, "ragged weight matrix"));
    }
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Ok(Tensor::from_vec(flat, (n_rows, n_cols), device)?)
}

fn ensure_finite(component: &str, name: &str, tensor: &Tensor) -> ModelResult<()> {
    let values = tensor.flatten_all()?.to_vec1::<f64>()?;
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ModelError::invalid(
            component,
            format!("{name} contain non-finite values"),
        ));
    }
    Ok(())
}

fn vector(values: Vec<f64>, device: &Device) -> ModelResult<Tensor> {
    let n = values.len();
    Ok(Tensor::from_vec(values, n, device)?)
}

/// Logistic regression classifier
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    inner: LinearModel,
}

impl LogisticRegression {
    const COMPONENT: &'static str = "LogisticRegression";

    pub fn from_spec(spec: LogisticRegressionSpec, device: &Device) -> ModelResult<Self> {
        let weight = spec
            .coef
            .map(|coef| matrix(Self::COMPONENT, coef, device))
            .transpose()?;
        let bias = spec
            .intercept
            .map(|intercept| vector(intercept, device))
            .transpose()?;
        Self::from_tensors(spec.classes, weight, bias)
    }

    /// Build from already-decoded tensors (e.g. a safetensors archive)
    pub fn from_tensors(
        classes: Vec<i64>,
        coef: Option<Tensor>,
        intercept: Option<Tensor>,
    ) -> ModelResult<Self> {
        Ok(Self {
            inner: LinearModel::new(Self::COMPONENT, classes, coef, intercept, true)?,
        })
    }
}

impl ProbabilisticClassifier for LogisticRegression {
    fn classes(&self) -> &[i64] {
        &self.inner.classes
    }

    fn predict(&self, features: &FeatureVector) -> ModelResult<i64> {
        self.inner.predict(features)
    }

    fn predict_proba(&self, features: &FeatureVector) -> ModelResult<Vec<f64>> {
        self.inner.probabilities(features)
    }

    fn describe(&self) -> String {
        self.inner.describe()
    }
}

/// Multinomial naive Bayes classifier
#[derive(Debug, Clone)]
pub struct MultinomialNaiveBayes {
    inner: LinearModel,
}

impl MultinomialNaiveBayes {
    const COMPONENT: &'static str = "MultinomialNB";

    pub fn from_spec(spec: NaiveBayesSpec, device: &Device) -> ModelResult<Self> {
        let weight = spec
            .feature_log_prob
            .map(|rows| matrix(Self::COMPONENT, rows, device))
            .transpose()?;
        let bias = spec
            .class_log_prior
            .map(|prior| vector(prior, device))
            .transpose()?;
        Ok(Self {
            inner: LinearModel::new(Self::COMPONENT, spec.classes, weight, bias, false)?,
        })
    }
}

impl ProbabilisticClassifier for MultinomialNaiveBayes {
    fn classes(&self) -> &[i64] {
        &self.inner.classes
    }

    fn predict(&self, features: &FeatureVector) -> ModelResult<i64> {
        self.inner.predict(features)
    }

    fn predict_proba(&self, features: &FeatureVector) -> ModelResult<Vec<f64>> {
        self.inner.probabilities(features)
    }

    fn describe(&self) -> String {
        self.inner.describe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(values: &[f64]) -> FeatureVector {
        FeatureVector::from_dense(values.to_vec(), &Device::Cpu).unwrap()
    }

    fn binary_lr(coef: Vec<f64>, intercept: f64) -> LogisticRegression {
        LogisticRegression::from_spec(
            LogisticRegressionSpec {
                classes: vec![0, 1],
                coef: Some(vec![coef]),
                intercept: Some(vec![intercept]),
            },
            &Device::Cpu,
        )
        .unwrap()
    }

    #[test]
    fn test_binary_logistic_regression() {
        let model = binary_lr(vec![2.0, -2.0], 0.0);

        let x = features(&[1.0, 0.0]);
        let probs = model.predict_proba(&x).unwrap();
        let expected = 1.0 / (1.0 + (-2.0f64).exp());
        assert!((probs[1] - expected).abs() < 1e-12);
        assert!((probs[0] + probs[1] - 1.0).abs() < 1e-12);
        assert_eq!(model.predict(&x).unwrap(), 1);

        let x = features(&[0.0, 1.0]);
        assert_eq!(model.predict(&x).unwrap(), 0);
    }

    #[test]
    fn test_zero_vector_uses_intercept() {
        let model = binary_lr(vec![1.0, 1.0], 0.0);
        let probs = model.predict_proba(&features(&[0.0, 0.0])).unwrap();
        assert!((probs[1] - 0.5).abs() < 1e-12);
        // Exact tie resolves to the first class
        assert_eq!(model.predict(&features(&[0.0, 0.0])).unwrap(), 0);
    }

    #[test]
    fn test_softmax_logistic_regression() {
        let model = LogisticRegression::from_spec(
            LogisticRegressionSpec {
                classes: vec![0, 1],
                coef: Some(vec![vec![1.0, 0.0], vec![0.0, 1.0]]),
                intercept: None,
            },
            &Device::Cpu,
        )
        .unwrap();

        let probs = model.predict_proba(&features(&[0.0, 3.0])).unwrap();
        assert!(probs[1] > probs[0]);
        assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert_eq!(model.predict(&features(&[0.0, 3.0])).unwrap(), 1);
    }

    #[test]
    fn test_multinomial_nb() {
        let model = MultinomialNaiveBayes::from_spec(
            NaiveBayesSpec {
                classes: vec![0, 1],
                class_log_prior: Some(vec![0.5f64.ln(), 0.5f64.ln()]),
                feature_log_prob: Some(vec![
                    vec![0.8f64.ln(), 0.2f64.ln()],
                    vec![0.2f64.ln(), 0.8f64.ln()],
                ]),
            },
            &Device::Cpu,
        )
        .unwrap();

        let x = features(&[0.0, 1.0]);
        let probs = model.predict_proba(&x).unwrap();
        assert!((probs[1] - 0.8).abs() < 1e-9);
        assert_eq!(model.predict(&x).unwrap(), 1);
    }

    #[test]
    fn test_dimension_mismatch() {
        let model = binary_lr(vec![1.0, 1.0, 1.0], 0.0);
        let err = model.predict_proba(&features(&[1.0])).unwrap_err();
        assert!(matches!(
            err,
            ModelError::DimensionMismatch {
                expected: 3,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_not_fitted() {
        let model = LogisticRegression::from_spec(
            LogisticRegressionSpec {
                classes: vec![0, 1],
                coef: None,
                intercept: None,
            },
            &Device::Cpu,
        )
        .unwrap();

        assert!(model.predict(&features(&[1.0])).unwrap_err().is_not_fitted());
        assert!(model.predict_proba(&features(&[1.0])).unwrap_err().is_not_fitted());
        assert_eq!(model.describe(), "LogisticRegression(unfitted)");
    }

    #[test]
    fn test_invalid_shapes_rejected() {
        let ragged = LogisticRegressionSpec {
            classes: vec![0, 1],
            coef: Some(vec![vec![1.0, 2.0], vec![1.0]]),
            intercept: None,
        };
        assert!(LogisticRegression::from_spec(ragged, &Device::Cpu).is_err());

        let bad_intercept = LogisticRegressionSpec {
            classes: vec![0, 1],
            coef: Some(vec![vec![1.0, 2.0]]),
            intercept: Some(vec![0.0, 0.0]),
        };
        assert!(LogisticRegression::from_spec(bad_intercept, &Device::Cpu).is_err());

        let one_class = LogisticRegressionSpec {
            classes: vec![1],
            coef: Some(vec![vec![1.0]]),
            intercept: None,
        };
        assert!(LogisticRegression::from_spec(one_class, &Device::Cpu).is_err());

        let nb_single_row = NaiveBayesSpec {
            classes: vec![0, 1],
            class_log_prior: None,
            feature_log_prob: Some(vec![vec![0.0, 0.0]]),
        };
        assert!(MultinomialNaiveBayes::from_spec(nb_single_row, &Device::Cpu).is_err());
    }

    #[test]
    fn test_non_finite_parameters_rejected() {
        let nan_coef = Tensor::new(&[[f32::NAN, 1.0]], &Device::Cpu).unwrap();
        let err = LogisticRegression::from_tensors(vec![0, 1], Some(nan_coef), None).unwrap_err();
        assert!(err.to_string().contains("non-finite"));

        let coef = Tensor::new(&[[1f32, 1.0]], &Device::Cpu).unwrap();
        let inf_bias = Tensor::new(&[f32::INFINITY], &Device::Cpu).unwrap();
        assert!(LogisticRegression::from_tensors(vec![0, 1], Some(coef), Some(inf_bias)).is_err());

        let nb = NaiveBayesSpec {
            classes: vec![0, 1],
            class_log_prior: Some(vec![f64::NEG_INFINITY, 0.0]),
            feature_log_prob: Some(vec![vec![-1.0, -2.0], vec![-2.0, -1.0]]),
        };
        assert!(MultinomialNaiveBayes::from_spec(nb, &Device::Cpu).is_err());
    }

    #[test]
    fn test_argmax() {
        assert_eq!(argmax(&[0.2, 0.8]), Some(1));
        assert_eq!(argmax(&[0.5, 0.5]), Some(0));
        assert_eq!(argmax(&[]), None);
    }
}
