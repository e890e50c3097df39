//! Error types for Sentimark
//!
//! The pipeline boundary exposes exactly three failure kinds
//! ([`ErrorKind`]). Stage-level faults are folded into
//! [`UnavailableReason`] (startup) and [`InferenceError`] (per request)
//! before the façade wraps them into [`PipelineError`].

use crate::types::ArtifactRole;
use std::path::PathBuf;
use std::time::Duration;

/// Result type alias using Sentimark's generic Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Generic error for configuration and ambient operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Why the pipeline could not become ready at startup
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnavailableReason {
    /// The artifact file does not exist
    #[error("{role} artifact not found at {}", .path.display())]
    ArtifactMissing { role: ArtifactRole, path: PathBuf },

    /// The artifact exists but could not be read
    #[error("failed to read {role} artifact {}: {detail}", .path.display())]
    ReadFailed {
        role: ArtifactRole,
        path: PathBuf,
        detail: String,
    },

    /// The artifact could not be decoded into a model
    #[error("{role} artifact {} is malformed: {detail}", .path.display())]
    Malformed {
        role: ArtifactRole,
        path: PathBuf,
        detail: String,
    },

    /// The vectorizer artifact decoded to something that cannot transform text
    #[error("vectorizer misconfigured: {} contains {found} instead of a fitted vectorizer", .path.display())]
    VectorizerMisconfigured { path: PathBuf, found: String },

    /// The configured compute device could not be created
    #[error("inference device unavailable: {detail}")]
    DeviceUnavailable { detail: String },
}

impl UnavailableReason {
    /// The artifact this reason refers to, if any
    pub fn role(&self) -> Option<ArtifactRole> {
        match self {
            Self::ArtifactMissing { role, .. }
            | Self::ReadFailed { role, .. }
            | Self::Malformed { role, .. } => Some(*role),
            Self::VectorizerMisconfigured { .. } => Some(ArtifactRole::Vectorizer),
            Self::DeviceUnavailable { .. } => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::ArtifactMissing { .. })
    }
}

/// Failure inside the inference engine
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    /// The transformer or classifier was never fitted
    #[error("model not fitted: {detail}")]
    NotFitted { detail: String },

    /// Feature transformation failed
    #[error("feature transformation failed: {detail}")]
    Transform { detail: String },

    /// Discrete prediction or probability estimation failed
    #[error("classification failed: {detail}")]
    Classify { detail: String },

    /// The classifier produced output outside its contract
    #[error("invalid classifier output: {detail}")]
    InvalidOutput { detail: String },

    /// The request-level timeout elapsed
    #[error("inference did not complete within {timeout:?}")]
    TimedOut { timeout: Duration },

    /// The inference task ended without producing a result
    #[error("inference task aborted: {detail}")]
    Aborted { detail: String },

    /// The text exceeds the configured input limit and was not inferred
    #[error("input of {length} bytes exceeds the {limit}-byte limit")]
    InputTooLong { length: usize, limit: usize },
}

impl InferenceError {
    pub fn not_fitted(detail: impl Into<String>) -> Self {
        Self::NotFitted {
            detail: detail.into(),
        }
    }

    pub fn invalid_output(detail: impl Into<String>) -> Self {
        Self::InvalidOutput {
            detail: detail.into(),
        }
    }

    pub fn is_not_fitted(&self) -> bool {
        matches!(self, Self::NotFitted { .. })
    }

    pub fn is_input_too_long(&self) -> bool {
        matches!(self, Self::InputTooLong { .. })
    }
}

/// The three stable failure kinds of the pipeline boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ServiceUnavailable,
    EmptyInput,
    InferenceFailed,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ServiceUnavailable => "service_unavailable",
            Self::EmptyInput => "empty_input",
            Self::InferenceFailed => "inference_failed",
        }
    }
}

const MSG_UNAVAILABLE: &str = "Prediction service is unavailable: the model files are missing or \
corrupted and need to be regenerated. Please retrain the model.";
const MSG_EMPTY_INPUT: &str = "Please enter some text for analysis.";
const MSG_NOT_FITTED: &str = "Model configuration error: the vectorizer or classifier needs to be \
retrained. Please regenerate the model files.";
const MSG_TOO_LONG: &str = "The text is too long to analyze. Please shorten it and try again.";
const MSG_FAILED: &str = "An error occurred during prediction. Check server logs.";

/// Error returned by the pipeline façade
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    /// The pipeline never became ready
    #[error("prediction service is unavailable: {reason}")]
    ServiceUnavailable { reason: UnavailableReason },

    /// The caller supplied no text
    #[error("no text supplied for analysis")]
    EmptyInput,

    /// The inference engine failed
    #[error("prediction failed: {0}")]
    InferenceFailed(#[from] InferenceError),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ServiceUnavailable { .. } => ErrorKind::ServiceUnavailable,
            Self::EmptyInput => ErrorKind::EmptyInput,
            Self::InferenceFailed(_) => ErrorKind::InferenceFailed,
        }
    }

    /// True when the fault is a bad or unfitted artifact.
    ///
    /// Covers startup unavailability and a lazily detected unfitted model.
    pub fn requires_regeneration(&self) -> bool {
        match self {
            Self::ServiceUnavailable { .. } => true,
            Self::InferenceFailed(err) => err.is_not_fitted(),
            Self::EmptyInput => false,
        }
    }

    /// True when the caller, not the service, is at fault
    pub fn is_caller_error(&self) -> bool {
        match self {
            Self::EmptyInput => true,
            Self::InferenceFailed(err) => err.is_input_too_long(),
            Self::ServiceUnavailable { .. } => false,
        }
    }

    /// Human-readable guidance safe to show to end users.
    ///
    /// Never includes internal detail; use `Display` for logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::ServiceUnavailable { .. } => MSG_UNAVAILABLE,
            Self::EmptyInput => MSG_EMPTY_INPUT,
            Self::InferenceFailed(err) if err.is_not_fitted() => MSG_NOT_FITTED,
            Self::InferenceFailed(err) if err.is_input_too_long() => MSG_TOO_LONG,
            Self::InferenceFailed(_) => MSG_FAILED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing() -> UnavailableReason {
        UnavailableReason::ArtifactMissing {
            role: ArtifactRole::Vectorizer,
            path: PathBuf::from("models/vectorizer.json"),
        }
    }

    #[test]
    fn test_unavailable_reason_display() {
        assert_eq!(
            missing().to_string(),
            "vectorizer artifact not found at models/vectorizer.json"
        );

        let misconfigured = UnavailableReason::VectorizerMisconfigured {
            path: PathBuf::from("models/vectorizer.json"),
            found: "a 2x3 matrix".to_string(),
        };
        assert!(misconfigured.to_string().starts_with("vectorizer misconfigured"));
        assert_eq!(misconfigured.role(), Some(ArtifactRole::Vectorizer));
        assert!(!misconfigured.is_missing());
        assert!(missing().is_missing());
    }

    #[test]
    fn test_error_kinds() {
        let unavailable = PipelineError::ServiceUnavailable { reason: missing() };
        assert_eq!(unavailable.kind(), ErrorKind::ServiceUnavailable);
        assert!(unavailable.requires_regeneration());

        assert_eq!(PipelineError::EmptyInput.kind(), ErrorKind::EmptyInput);
        assert!(PipelineError::EmptyInput.is_caller_error());
        assert!(!PipelineError::EmptyInput.requires_regeneration());

        let failed = PipelineError::from(InferenceError::Transform {
            detail: "bad shape".to_string(),
        });
        assert_eq!(failed.kind(), ErrorKind::InferenceFailed);
        assert!(!failed.requires_regeneration());
    }

    #[test]
    fn test_not_fitted_shares_regeneration_guidance() {
        let not_fitted = PipelineError::InferenceFailed(InferenceError::not_fitted(
            "TfidfVectorizer instance is not fitted yet",
        ));
        assert!(not_fitted.requires_regeneration());
        assert!(not_fitted.user_message().contains("regenerate the model files"));

        let unavailable = PipelineError::ServiceUnavailable { reason: missing() };
        assert!(unavailable.user_message().contains("regenerated"));
    }

    #[test]
    fn test_user_message_hides_detail() {
        let failed = PipelineError::InferenceFailed(InferenceError::Classify {
            detail: "secret internal state".to_string(),
        });
        assert!(!failed.user_message().contains("secret"));
        assert!(failed.to_string().contains("secret"));
    }

    #[test]
    fn test_input_too_long_is_caller_error() {
        let too_long = PipelineError::from(InferenceError::InputTooLong {
            length: 200_000,
            limit: 100_000,
        });
        assert_eq!(too_long.kind(), ErrorKind::InferenceFailed);
        assert!(too_long.is_caller_error());
        assert!(!too_long.requires_regeneration());
        assert!(too_long.user_message().contains("too long"));
        assert_eq!(
            too_long.to_string(),
            "prediction failed: input of 200000 bytes exceeds the 100000-byte limit"
        );
    }

    #[test]
    fn test_generic_error_conversions() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = Error::from(io);
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.to_string(), "io error: denied");

        assert_eq!(
            Error::config("bad timeout").to_string(),
            "configuration error: bad timeout"
        );
    }
}
