//! Self-hosted `OpenAI`-compatible adapter (`localAISTT`).
//!
//! `POST {baseUrl}/audio/transcriptions` with bearer auth. The base URL comes
//! from the run's config and is required.

use async_trait::async_trait;
use hark_core::{AudioPayload, ProviderKind, ResolvedCredential, TranscriptionConfig};
use tracing::{debug, instrument};

use crate::openai_compat::{WhisperOptions, build_form, send_transcription};
use crate::provider::{ProviderError, ProviderResult, SpeechToText, require_credential};

/// Credential field holding the bearer token.
pub const API_KEY_FIELD: &str = "localAIApiKey";
/// Model sent when the config names none.
pub const DEFAULT_MODEL: &str = "whisper-1";

/// Fully validated `LocalAI` transcription request.
pub struct LocalAiRequest {
    base_url: String,
    api_key: String,
    model: String,
    options: WhisperOptions,
}

impl LocalAiRequest {
    /// Validate credentials and options.
    pub fn from_parts(
        credential: &ResolvedCredential,
        config: &TranscriptionConfig,
    ) -> ProviderResult<Self> {
        let api_key = require_credential(credential, API_KEY_FIELD)?;
        let base_url = config
            .base_url()
            .ok_or(ProviderError::MissingOption { field: "baseUrl" })?
            .trim_end_matches('/')
            .to_string();
        Ok(Self {
            base_url,
            api_key,
            model: config.model().unwrap_or(DEFAULT_MODEL).to_string(),
            options: WhisperOptions::from_config(config)?,
        })
    }

    /// Transcription URL.
    pub fn url(&self) -> String {
        format!("{}/audio/transcriptions", self.base_url)
    }

    /// Model that will be requested.
    pub fn model(&self) -> &str {
        &self.model
    }
}

/// `LocalAI` adapter.
#[derive(Clone)]
pub struct LocalAiProvider {
    client: reqwest::Client,
}

impl LocalAiProvider {
    /// Create the adapter on a shared HTTP client.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SpeechToText for LocalAiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::LocalAi
    }

    #[instrument(skip_all, fields(provider = "localAISTT", file = %audio.file_name))]
    async fn run(
        &self,
        credential: &ResolvedCredential,
        audio: &AudioPayload,
        config: &TranscriptionConfig,
    ) -> ProviderResult<Option<String>> {
        let request = LocalAiRequest::from_parts(credential, config)?;
        let form = build_form(audio, Some(&request.model), &request.options)?;
        let url = request.url();

        debug!(url = %url, model = %request.model, bytes = audio.len(), "Sending LocalAI request");

        let builder = self
            .client
            .post(&url)
            .bearer_auth(&request.api_key)
            .multipart(form);
        send_transcription(builder, ProviderKind::LocalAi.as_str()).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
