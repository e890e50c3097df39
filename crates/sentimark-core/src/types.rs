//! Prediction and text types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentiment label produced by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    /// Class `1` of the classifier
    Positive,
    /// Any other class
    Negative,
}

impl Sentiment {
    /// Map a discrete classifier prediction onto a label.
    ///
    /// Only class `1` is positive; every other value is negative.
    pub fn from_class(class: i64) -> Self {
        if class == 1 {
            Self::Positive
        } else {
            Self::Negative
        }
    }

    /// The fixed label string ("Positive" or "Negative")
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Negative => "Negative",
        }
    }

    pub fn is_positive(&self) -> bool {
        matches!(self, Self::Positive)
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a single prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Sentiment label
    pub label: Sentiment,

    /// Probability mass of the positive class (0.0-1.0)
    pub confidence: f64,
}

impl Prediction {
    /// Create a new prediction
    pub fn new(label: Sentiment, confidence: f64) -> Self {
        Self { label, confidence }
    }

    /// Confidence rendered as a percentage with two decimals, e.g. `"92.00%"`
    pub fn confidence_display(&self) -> String {
        format!("{:.2}%", self.confidence * 100.0)
    }
}

/// Text after normalization: lowercase stemmed tokens joined by single spaces.
///
/// Values are produced by the pipeline's normalizer. An empty value is valid
/// and means no content token survived.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedText(String);

impl NormalizedText {
    /// Wrap text that is already in normalized form
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Join already-normalized tokens with single spaces
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut joined = String::new();
        for token in tokens {
            if !joined.is_empty() {
                joined.push(' ');
            }
            joined.push_str(token.as_ref());
        }
        Self(joined)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the tokens
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0.split(' ').filter(|t| !t.is_empty())
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which of the two pipeline artifacts a value refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactRole {
    /// Fitted feature transformer
    Vectorizer,
    /// Fitted classifier
    Classifier,
}

impl ArtifactRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vectorizer => "vectorizer",
            Self::Classifier => "classifier",
        }
    }
}

impl fmt::Display for ArtifactRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
