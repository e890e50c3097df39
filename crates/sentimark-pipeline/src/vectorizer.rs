//! Bag-of-words feature transformers
//!
//! Inference-side counterparts of the count and TF-IDF vectorizers the
//! training process fits. Both share one implementation, [`TermVectorizer`],
//! and differ only in their weighting defaults.

use crate::model::{FeatureTransformer, FeatureVector, ModelError, ModelResult};
use candle_core::Device;
use regex::Regex;
use sentimark_core::NormalizedText;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default token pattern: runs of two or more word characters
pub const DEFAULT_TOKEN_PATTERN: &str = r"\b\w\w+\b";

/// Row normalization applied after weighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
    None,
}

/// Term weighting scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weighting {
    /// Raw term counts
    Count,
    /// Term counts scaled by inverse document frequency
    Tfidf,
}

impl Weighting {
    fn component(&self) -> &'static str {
        match self {
            Self::Count => "CountVectorizer",
            Self::Tfidf => "TfidfVectorizer",
        }
    }
}

/// Fitted vectorizer parameters as serialized by training
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorizerSpec {
    /// Term to column index; absent when not fitted
    #[serde(default)]
    pub vocabulary: Option<HashMap<String, usize>>,

    /// Inverse document frequency per column
    #[serde(default)]
    pub idf: Option<Vec<f64>>,

    /// Inclusive n-gram range
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),

    /// Token regex applied to normalized text
    #[serde(default)]
    pub token_pattern: Option<String>,

    /// Row normalization; defaults depend on the vectorizer kind
    #[serde(default)]
    pub norm: Option<Norm>,

    /// Scale counts by idf (TF-IDF only)
    #[serde(default)]
    pub use_idf: Option<bool>,

    /// Replace tf with 1 + ln(tf)
    #[serde(default)]
    pub sublinear_tf: bool,

    /// Clip counts to 1
    #[serde(default)]
    pub binary: bool,
}

impl Default for VectorizerSpec {
    fn default() -> Self {
        Self {
            vocabulary: None,
            idf: None,
            ngram_range: default_ngram_range(),
            token_pattern: None,
            norm: None,
            use_idf: None,
            sublinear_tf: false,
            binary: false,
        }
    }
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

/// Count / TF-IDF vectorizer
#[derive(Debug)]
pub struct TermVectorizer {
    weighting: Weighting,
    vocabulary: Option<HashMap<String, usize>>,
    idf: Option<Vec<f64>>,
    n_features: usize,
    ngram_range: (usize, usize),
    token_pattern: Regex,
    norm: Norm,
    use_idf: bool,
    sublinear_tf: bool,
    binary: bool,
    device: Device,
}

impl TermVectorizer {
    /// Build a vectorizer from its serialized parameters.
    ///
    /// Rejects inconsistent parameters. Missing vocabulary or idf is
    /// accepted here and reported as not fitted at transform time.
    pub fn from_spec(weighting: Weighting, spec: VectorizerSpec, device: &Device) -> ModelResult<Self> {
        let component = weighting.component();

        let (min_n, max_n) = spec.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(ModelError::invalid(
                component,
                format!("invalid ngram_range ({min_n}, {max_n})"),
            ));
        }

        let pattern = spec.token_pattern.as_deref().unwrap_or(DEFAULT_TOKEN_PATTERN);
        let token_pattern = Regex::new(pattern)
            .map_err(|e| ModelError::invalid(component, format!("bad token_pattern: {e}")))?;

        let n_features = match &spec.vocabulary {
            Some(vocabulary) => {
                let n = vocabulary.len();
                if let Some((term, index)) = vocabulary.iter().find(|&(_, &index)| index >= n) {
                    return Err(ModelError::invalid(
                        component,
                        format!("vocabulary index {index} for '{term}' out of range for {n} terms"),
                    ));
                }
                n
            }
            None => 0,
        };

        let use_idf = match weighting {
            Weighting::Count => false,
            Weighting::Tfidf => spec.use_idf.unwrap_or(true),
        };

        if use_idf {
            if let (Some(idf), Some(_)) = (&spec.idf, &spec.vocabulary) {
                if idf.len() != n_features {
                    return Err(ModelError::invalid(
                        component,
                        format!("idf has {} entries for {} vocabulary terms", idf.len(), n_features),
                    ));
                }
                if idf.iter().any(|w| !w.is_finite()) {
                    return Err(ModelError::invalid(component, "idf contains non-finite values"));
                }
            }
        }

        let norm = spec.norm.unwrap_or(match weighting {
            Weighting::Count => Norm::None,
            Weighting::Tfidf => Norm::L2,
        });

        Ok(Self {
            weighting,
            vocabulary: spec.vocabulary,
            idf: spec.idf,
            n_features,
            ngram_range: spec.ngram_range,
            token_pattern,
            norm,
            use_idf,
            sublinear_tf: spec.sublinear_tf,
            binary: spec.binary,
            device: device.clone(),
        })
    }

    pub fn weighting(&self) -> Weighting {
        self.weighting
    }

    fn fitted(&self) -> ModelResult<(&HashMap<String, usize>, Option<&[f64]>)> {
        let component = self.weighting.component();
        let vocabulary = self
            .vocabulary
            .as_ref()
            .ok_or_else(|| ModelError::not_fitted(component))?;

        let idf = if self.use_idf {
            Some(
                self.idf
                    .as_deref()
                    .ok_or_else(|| ModelError::not_fitted(component))?,
            )
        } else {
            None
        };

        Ok((vocabulary, idf))
    }

    /// Column counts for every in-vocabulary n-gram of the document
    fn count_terms(&self, text: &str, vocabulary: &HashMap<String, usize>) -> HashMap<usize, f64> {
        let tokens: Vec<&str> = self
            .token_pattern
            .find_iter(text)
            .map(|m| m.as_str())
            .collect();

        let mut counts = HashMap::new();
        let (min_n, max_n) = self.ngram_range;

        for n in min_n..=max_n {
            if n > tokens.len() {
                break;
            }
            for window in tokens.windows(n) {
                let gram = window.join(" ");
                if let Some(&column) = vocabulary.get(&gram) {
                    *counts.entry(column).or_insert(0.0) += 1.0;
                }
            }
        }

        counts
    }
}

impl FeatureTransformer for TermVectorizer {
    fn transform(&self, text: &NormalizedText) -> ModelResult<FeatureVector> {
        let (vocabulary, idf) = self.fitted()?;
        let mut values = vec![0.0f64; self.n_features];

        for (column, count) in self.count_terms(text.as_str(), vocabulary) {
            let mut tf = if self.binary { 1.0 } else { count };
            if self.sublinear_tf {
                tf = 1.0 + tf.ln();
            }
            if let Some(idf) = idf {
                tf *= idf[column];
            }
            values[column] = tf;
        }

        let scale = match self.norm {
            Norm::L1 => values.iter().map(|v| v.abs()).sum::<f64>(),
            Norm::L2 => values.iter().map(|v| v * v).sum::<f64>().sqrt(),
            Norm::None => 1.0,
        };
        if scale > 0.0 && scale != 1.0 {
            values.iter_mut().for_each(|v| *v /= scale);
        }

        FeatureVector::from_dense(values, &self.device)
    }

    fn n_features(&self) -> Option<usize> {
        self.vocabulary.as_ref().map(|_| self.n_features)
    }

    fn describe(&self) -> String {
        match &self.vocabulary {
            Some(_) => format!("{}({} features)", self.weighting.component(), self.n_features),
            None => format!("{}(unfitted)", self.weighting.component()),
        }
    }
}
