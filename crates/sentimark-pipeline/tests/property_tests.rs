//! Property tests for normalization and prediction
//!
//! Arbitrary input text must never panic and must always produce either a
//! well-formed prediction or one of the three pipeline error kinds.

use proptest::prelude::*;
use sentimark_pipeline::prelude::*;
use sentimark_pipeline::{normalize, ArtifactLoader};
use std::path::Path;
use std::sync::OnceLock;

fn fixture_state() -> &'static PipelineState {
    static STATE: OnceLock<PipelineState> = OnceLock::new();
    STATE.get_or_init(|| {
        let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
        ArtifactLoader::new(
            fixtures.join("vectorizer.json"),
            fixtures.join("sentiment_model.json"),
        )
        .load()
    })
}

/// Review-like text mixing vocabulary terms, stop words and punctuation
fn review_text() -> impl Strategy<Value = String> {
    let word = prop::sample::select(vec![
        "great", "love", "film", "bad", "hate", "the", "and", "not", "movie", "LOVED", "Great!",
        "terrible,", "it's", "", "  ", "42",
    ]);
    prop::collection::vec(word, 0..20).prop_map(|words| words.join(" "))
}

proptest! {
    #[test]
    fn prop_confidence_in_unit_interval(text in "\\PC*") {
        match predict(fixture_state(), Some(text.as_str())) {
            Ok(prediction) => {
                prop_assert!((0.0..=1.0).contains(&prediction.confidence));
                prop_assert!(matches!(prediction.label.as_str(), "Positive" | "Negative"));
            }
            Err(err) => prop_assert_eq!(err.kind(), ErrorKind::EmptyInput),
        }
    }

    #[test]
    fn prop_label_agrees_with_confidence(text in review_text()) {
        if let Ok(prediction) = predict(fixture_state(), Some(text.as_str())) {
            if prediction.confidence > 0.5 {
                prop_assert_eq!(prediction.label, Sentiment::Positive);
            }
            if prediction.confidence < 0.5 {
                prop_assert_eq!(prediction.label, Sentiment::Negative);
            }
        }
    }

    #[test]
    fn prop_prediction_deterministic(text in review_text()) {
        let first = predict(fixture_state(), Some(text.as_str()));
        let second = predict(fixture_state(), Some(text.as_str()));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_normalize_deterministic(text in "\\PC*") {
        prop_assert_eq!(normalize(&text), normalize(&text));
    }

    #[test]
    fn prop_normalized_tokens_are_clean(text in "\\PC*") {
        let normalized = normalize(&text);
        for token in normalized.tokens() {
            prop_assert!(!token.is_empty());
            prop_assert!(!token.chars().any(|c| c.is_ascii_punctuation() && c != '_'));
            prop_assert_eq!(token.to_lowercase(), token.to_string());
        }
        prop_assert!(!normalized.as_str().contains("  "));
    }
}
