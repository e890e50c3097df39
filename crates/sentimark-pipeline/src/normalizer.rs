//! Text normalization
//!
//! Turns raw user text into the token string the vectorizer was fitted on:
//! lowercase, strip everything that is neither a word character nor
//! whitespace, drop English stop words, stem the rest with the Porter
//! stemmer and join with single spaces.
//!
//! All resources are process-wide statics built on first use and never
//! mutated, so [`normalize`] can be called from any number of threads.

use crate::{porter, stopwords};
use regex::Regex;
use sentimark_core::NormalizedText;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Characters removed before tokenization
const STRIP_PATTERN: &str = r"[^\w\s]";

static SHARED: LazyLock<Normalizer> = LazyLock::new(Normalizer::new);

/// Deterministic text normalizer
pub struct Normalizer {
    strip: Regex,
    stop_words: &'static HashSet<&'static str>,
}

impl Normalizer {
    fn new() -> Self {
        Self {
            strip: Regex::new(STRIP_PATTERN).expect("strip pattern is a valid regex"),
            stop_words: stopwords::english(),
        }
    }

    /// The process-wide normalizer
    pub fn shared() -> &'static Normalizer {
        &SHARED
    }

    /// Normalize one string
    pub fn normalize(&self, text: &str) -> NormalizedText {
        let lowered = text.to_lowercase();
        let stripped = self.strip.replace_all(&lowered, "");

        let tokens = stripped
            .split_whitespace()
            .filter(|token| !self.stop_words.contains(token))
            .map(porter::stem);

        NormalizedText::from_tokens(tokens)
    }
}

/// Normalize text with the shared normalizer
pub fn normalize(text: &str) -> NormalizedText {
    Normalizer::shared().normalize(text)
}

/// Normalize optional text; absent text yields the empty string
pub fn normalize_input(text: Option<&str>) -> NormalizedText {
    text.map(normalize).unwrap_or_default()
}

/// Normalize a dynamically typed value; anything but a JSON string yields
/// the empty string
pub fn normalize_value(value: &serde_json::Value) -> NormalizedText {
    match value {
        serde_json::Value::String(text) => normalize(text),
        _ => NormalizedText::default(),
    }
}
