//! Azure-hosted `OpenAI` Whisper adapter (`openAIWhisper`).
//!
//! One multipart `POST` to the deployment's `audio/transcriptions` route.
//! The deployment pins the model, so no `model` field is sent.

use async_trait::async_trait;
use hark_core::{AudioPayload, ProviderKind, ResolvedCredential, TranscriptionConfig};
use tracing::{debug, instrument};

use crate::openai_compat::{WhisperOptions, build_form, send_transcription};
use crate::provider::{ProviderResult, SpeechToText, require_credential};

/// Credential field holding the API key.
pub const API_KEY_FIELD: &str = "azureOpenAIApiKey";
/// Credential field naming the Whisper deployment.
pub const DEPLOYMENT_FIELD: &str = "azureOpenAIApiDeploymentName";
/// Credential field holding the `api-version` query value.
pub const API_VERSION_FIELD: &str = "azureOpenAIApiVersion";
/// Credential field naming the Azure resource (`{instance}.openai.azure.com`).
pub const INSTANCE_FIELD: &str = "azureOpenAIApiInstanceName";

/// Fully validated Azure transcription request.
pub struct AzureWhisperRequest {
    endpoint: String,
    deployment: String,
    api_version: String,
    api_key: String,
    options: WhisperOptions,
}

impl AzureWhisperRequest {
    /// Validate credentials and options.
    ///
    /// `config.baseUrl` replaces the instance-derived endpoint when set.
    pub fn from_parts(
        credential: &ResolvedCredential,
        config: &TranscriptionConfig,
    ) -> ProviderResult<Self> {
        let api_key = require_credential(credential, API_KEY_FIELD)?;
        let deployment = require_credential(credential, DEPLOYMENT_FIELD)?;
        let api_version = require_credential(credential, API_VERSION_FIELD)?;
        let endpoint = match config.base_url() {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => {
                let instance = require_credential(credential, INSTANCE_FIELD)?;
                format!("https://{instance}.openai.azure.com")
            }
        };
        Ok(Self {
            endpoint,
            deployment,
            api_version,
            api_key,
            options: WhisperOptions::from_config(config)?,
        })
    }

    /// Transcription URL, without the `api-version` query.
    pub fn url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/audio/transcriptions",
            self.endpoint, self.deployment
        )
    }
}

/// Azure Whisper adapter.
#[derive(Clone)]
pub struct AzureWhisperProvider {
    client: reqwest::Client,
}

impl AzureWhisperProvider {
    /// Create the adapter on a shared HTTP client.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SpeechToText for AzureWhisperProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::AzureWhisper
    }

    #[instrument(skip_all, fields(provider = "openAIWhisper", file = %audio.file_name))]
    async fn run(
        &self,
        credential: &ResolvedCredential,
        audio: &AudioPayload,
        config: &TranscriptionConfig,
    ) -> ProviderResult<Option<String>> {
        let request = AzureWhisperRequest::from_parts(credential, config)?;
        let form = build_form(audio, None, &request.options)?;
        let url = request.url();

        debug!(
            url = %url,
            api_version = %request.api_version,
            bytes = audio.len(),
            has_language = request.options.language.is_some(),
            has_prompt = request.options.prompt.is_some(),
            "Sending Azure Whisper request"
        );

        let builder = self
            .client
            .post(&url)
            .query(&[("api-version", request.api_version.as_str())])
            .header("api-key", &request.api_key)
            .multipart(form);
        send_transcription(builder, ProviderKind::AzureWhisper.as_str()).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
