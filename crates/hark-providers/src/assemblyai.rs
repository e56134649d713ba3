//! `AssemblyAI` adapter (`assemblyAiTranscribe`).
//!
//! Three-step job flow against the v2 REST API:
//!
//! 1. `POST /v2/upload` with the raw audio -> `upload_url`
//! 2. `POST /v2/transcript` with `{audio_url, speaker_labels: false}` -> job
//! 3. `GET /v2/transcript/{id}` until the job is `completed` or `error`
//!
//! Polling runs on the interval from settings and gives up after the
//! configured poll timeout. The caller sees a single request/response.

use std::time::Duration;

use async_trait::async_trait;
use hark_core::{AudioPayload, ProviderKind, ResolvedCredential, TranscriptionConfig};
use hark_settings::AssemblyAiSettings;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::provider::{
    ProviderError, ProviderResult, SpeechToText, non_empty_text, require_credential,
};

/// Credential field holding the API key.
pub const API_KEY_FIELD: &str = "assemblyAIApiKey";

/// Validated `AssemblyAI` request inputs.
pub struct AssemblyAiRequest {
    api_key: String,
}

impl AssemblyAiRequest {
    /// Validate credentials. No config option affects this backend.
    pub fn from_parts(
        credential: &ResolvedCredential,
        _config: &TranscriptionConfig,
    ) -> ProviderResult<Self> {
        Ok(Self {
            api_key: require_credential(credential, API_KEY_FIELD)?,
        })
    }
}

#[derive(Deserialize)]
struct UploadResponse {
    upload_url: String,
}

#[derive(Serialize)]
struct TranscriptParams<'a> {
    audio_url: &'a str,
    speaker_labels: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum TranscriptStatus {
    Queued,
    Processing,
    Completed,
    Error,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
struct Transcript {
    id: String,
    status: TranscriptStatus,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// `AssemblyAI` adapter.
#[derive(Clone)]
pub struct AssemblyAiProvider {
    client: reqwest::Client,
    base_url: String,
    poll_interval: Duration,
    poll_timeout: Duration,
}

impl AssemblyAiProvider {
    /// Create the adapter on a shared HTTP client.
    pub fn new(client: reqwest::Client, settings: &AssemblyAiSettings) -> Self {
        Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            poll_interval: settings.poll_interval(),
            poll_timeout: settings.poll_timeout(),
        }
    }

    async fn upload(&self, api_key: &str, audio: &AudioPayload) -> ProviderResult<String> {
        let response = self
            .client
            .post(format!("{}/v2/upload", self.base_url))
            .header(AUTHORIZATION, api_key)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(audio.bytes.clone())
            .send()
            .await?;
        let uploaded: UploadResponse = read_json(response).await?;
        Ok(uploaded.upload_url)
    }

    async fn submit(&self, api_key: &str, audio_url: &str) -> ProviderResult<Transcript> {
        let response = self
            .client
            .post(format!("{}/v2/transcript", self.base_url))
            .header(AUTHORIZATION, api_key)
            .json(&TranscriptParams {
                audio_url,
                speaker_labels: false,
            })
            .send()
            .await?;
        read_json(response).await
    }

    async fn fetch_transcript(&self, api_key: &str, id: &str) -> ProviderResult<Transcript> {
        let response = self
            .client
            .get(format!("{}/v2/transcript/{id}", self.base_url))
            .header(AUTHORIZATION, api_key)
            .send()
            .await?;
        read_json(response).await
    }

    /// Poll until the job settles. Unbounded; the caller applies the deadline.
    async fn wait_for(&self, api_key: &str, mut transcript: Transcript) -> ProviderResult<Option<String>> {
        loop {
            match transcript.status {
                TranscriptStatus::Completed => return Ok(non_empty_text(transcript.text)),
                TranscriptStatus::Error => {
                    return Err(ProviderError::JobFailed {
                        message: transcript
                            .error
                            .unwrap_or_else(|| "no error detail".to_string()),
                        job_id: transcript.id,
                    });
                }
                status => {
                    if status == TranscriptStatus::Unknown {
                        warn!(job_id = %transcript.id, "unrecognized transcript status, still polling");
                    }
                    tokio::time::sleep(self.poll_interval).await;
                    transcript = self.fetch_transcript(api_key, &transcript.id).await?;
                }
            }
        }
    }
}

#[async_trait]
impl SpeechToText for AssemblyAiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::AssemblyAi
    }

    #[instrument(skip_all, fields(provider = "assemblyAiTranscribe", file = %audio.file_name))]
    async fn run(
        &self,
        credential: &ResolvedCredential,
        audio: &AudioPayload,
        config: &TranscriptionConfig,
    ) -> ProviderResult<Option<String>> {
        let request = AssemblyAiRequest::from_parts(credential, config)?;

        debug!(bytes = audio.len(), "Uploading audio to AssemblyAI");
        let audio_url = self.upload(&request.api_key, audio).await?;

        let transcript = self.submit(&request.api_key, &audio_url).await?;
        debug!(job_id = %transcript.id, status = ?transcript.status, "AssemblyAI job submitted");

        let after_ms = u64::try_from(self.poll_timeout.as_millis()).unwrap_or(u64::MAX);
        tokio::time::timeout(self.poll_timeout, self.wait_for(&request.api_key, transcript))
            .await
            .map_err(|_| ProviderError::Timeout {
                waiting_for: "AssemblyAI transcript",
                after_ms,
            })?
    }
}

/// Status check, then JSON. A success body that parses but lacks the fields
/// we need is [`ProviderError::MalformedResponse`].
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> ProviderResult<T> {
    let status = response.status();
    let url = response.url().path().to_string();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ProviderError::from_response(status.as_u16(), &body));
    }
    let value: serde_json::Value = serde_json::from_str(&body)?;
    serde_json::from_value(value).map_err(|e| ProviderError::MalformedResponse {
        message: format!("{url}: {e}"),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
