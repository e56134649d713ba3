//! # Provider Trait
//!
//! Core abstraction for speech-to-text backends. Every adapter implements
//! [`SpeechToText`] so the dispatcher can invoke any of them the same way:
//! hand over the resolved credential, the audio bytes and the run's config,
//! get back `Some(text)`, `None` (nothing transcribed) or a [`ProviderError`].

use async_trait::async_trait;
use hark_core::{AudioPayload, ProviderKind, ResolvedCredential, TranscriptionConfig};

use crate::error_parsing::parse_api_error;

/// Result type alias for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors that can occur during a provider call.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP transport failed (connect, TLS, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required credential field is absent or empty.
    #[error("missing credential field: {field}")]
    MissingCredential {
        /// Credential field name, e.g. `assemblyAIApiKey`.
        field: &'static str,
    },

    /// A required config option is absent or empty.
    #[error("missing option: {field}")]
    MissingOption {
        /// Config key, e.g. `baseUrl`.
        field: &'static str,
    },

    /// A config option could not be interpreted.
    #[error("invalid option {field}: {value:?}")]
    InvalidOption {
        /// Config key.
        field: &'static str,
        /// Offending value.
        value: String,
    },

    /// The backend answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error description.
        message: String,
        /// Provider-specific error code.
        code: Option<String>,
    },

    /// An asynchronous transcription job ended in failure.
    #[error("transcription job {job_id} failed: {message}")]
    JobFailed {
        /// Provider job identifier.
        job_id: String,
        /// Provider-reported reason.
        message: String,
    },

    /// Gave up waiting on the backend.
    #[error("timed out after {after_ms}ms waiting for {waiting_for}")]
    Timeout {
        /// What was being awaited.
        waiting_for: &'static str,
        /// Time waited in milliseconds.
        after_ms: u64,
    },

    /// Success status but a body we could not use.
    #[error("malformed response: {message}")]
    MalformedResponse {
        /// Error description.
        message: String,
    },
}

impl ProviderError {
    /// Build an [`ProviderError::Api`] from a failed response's status and body.
    pub fn from_response(status: u16, body: &str) -> Self {
        let info = parse_api_error(body, status);
        Self::Api {
            status,
            message: info.message,
            code: info.code,
        }
    }

    /// Error category string for logs and alerts.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Http(e) if e.is_timeout() => "timeout",
            Self::Http(_) => "network",
            Self::Json(_) | Self::MalformedResponse { .. } => "parse",
            Self::MissingCredential { .. } => "credentials",
            Self::MissingOption { .. } | Self::InvalidOption { .. } => "config",
            Self::Api { status: 401 | 403, .. } => "auth",
            Self::Api { .. } => "api",
            Self::JobFailed { .. } => "job",
            Self::Timeout { .. } => "timeout",
        }
    }
}

/// A speech-to-text backend.
///
/// Implementors must be `Send + Sync`; one instance serves concurrent
/// dispatches and must not keep per-call state.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Which backend this adapter talks to.
    fn kind(&self) -> ProviderKind;

    /// Transcribe `audio`.
    ///
    /// Returns `Ok(None)` when the backend succeeds but reports no text.
    async fn run(
        &self,
        credential: &ResolvedCredential,
        audio: &AudioPayload,
        config: &TranscriptionConfig,
    ) -> ProviderResult<Option<String>>;
}

/// Parse the configured temperature string into the number sent upstream.
///
/// Absent or empty -> `None` (no field is sent). Parsed as `f64` so the
/// configured decimal reaches the backend digit for digit.
pub fn parse_temperature(config: &TranscriptionConfig) -> ProviderResult<Option<f64>> {
    let Some(raw) = config.temperature() else {
        return Ok(None);
    };
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(ProviderError::InvalidOption {
            field: "temperature",
            value: raw.to_string(),
        }),
    }
}

/// Read a required credential field.
pub(crate) fn require_credential(
    credential: &ResolvedCredential,
    field: &'static str,
) -> ProviderResult<String> {
    credential
        .get(field)
        .map(str::to_string)
        .ok_or(ProviderError::MissingCredential { field })
}

/// Map backend text to the dispatch contract: empty means "nothing transcribed".
pub(crate) fn non_empty_text(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.is_empty())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn temperature_parses_decimal_string() {
        let config = TranscriptionConfig::new("localAISTT").with_temperature("0.2");
        assert_eq!(parse_temperature(&config).unwrap(), Some(0.2));
    }

    #[test]
    fn temperature_keeps_full_precision() {
        let config = TranscriptionConfig::new("localAISTT").with_temperature("0.123456789");
        let value = parse_temperature(&config).unwrap().unwrap();
        assert_eq!(value.to_string(), "0.123456789");
    }

    #[test]
    fn absent_temperature_is_none() {
        let config = TranscriptionConfig::new("localAISTT");
        assert_eq!(parse_temperature(&config).unwrap(), None);
        let config = config.with_temperature("");
        assert_eq!(parse_temperature(&config).unwrap(), None);
    }

    #[test]
    fn garbage_temperature_is_rejected() {
        for raw in ["warm", "NaN", "inf"] {
            let config = TranscriptionConfig::new("localAISTT").with_temperature(raw);
            assert_matches!(
                parse_temperature(&config),
                Err(ProviderError::InvalidOption { field: "temperature", .. })
            );
        }
    }

    #[test]
    fn require_credential_reports_field() {
        let cred = ResolvedCredential::empty().with_field("other", "x");
        let err = require_credential(&cred, "assemblyAIApiKey").unwrap_err();
        assert_eq!(err.to_string(), "missing credential field: assemblyAIApiKey");
        assert_eq!(err.category(), "credentials");
    }

    #[test]
    fn empty_text_maps_to_none() {
        assert_eq!(non_empty_text(Some(String::new())), None);
        assert_eq!(non_empty_text(None), None);
        assert_eq!(non_empty_text(Some(" hi ".into())), Some(" hi ".into()));
    }

    #[test]
    fn api_error_from_openai_envelope() {
        let err = ProviderError::from_response(
            401,
            r#"{"error":{"message":"Incorrect API key provided","code":"invalid_api_key"}}"#,
        );
        assert_matches!(&err, ProviderError::Api { status: 401, code: Some(code), .. } if code == "invalid_api_key");
        assert_eq!(err.category(), "auth");
        assert_eq!(err.to_string(), "API error (401): Incorrect API key provided");
    }

    #[test]
    fn categories() {
        assert_eq!(ProviderError::MissingOption { field: "baseUrl" }.category(), "config");
        assert_eq!(
            ProviderError::JobFailed { job_id: "j".into(), message: "bad audio".into() }.category(),
            "job"
        );
        assert_eq!(
            ProviderError::Timeout { waiting_for: "transcript", after_ms: 10 }.category(),
            "timeout"
        );
        assert_eq!(ProviderError::from_response(500, "oops").category(), "api");
        assert_eq!(
            ProviderError::MalformedResponse { message: "missing field".into() }.category(),
            "parse"
        );
    }

    #[test]
    fn speech_to_text_is_object_safe() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn SpeechToText>();
    }
}
