//! Whisper-style `audio/transcriptions` plumbing shared by the Azure and
//! `LocalAI` adapters: multipart form assembly and response handling.

use hark_core::{AudioPayload, TranscriptionConfig};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::error;

use crate::provider::{ProviderError, ProviderResult, non_empty_text, parse_temperature};

/// Optional tuning fields common to every Whisper-compatible endpoint.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct WhisperOptions {
    pub language: Option<String>,
    pub temperature: Option<f64>,
    pub prompt: Option<String>,
}

impl WhisperOptions {
    /// Read the shared options out of a run's config.
    pub fn from_config(config: &TranscriptionConfig) -> ProviderResult<Self> {
        Ok(Self {
            language: config.language().map(str::to_string),
            temperature: parse_temperature(config)?,
            prompt: config.prompt().map(str::to_string),
        })
    }
}

/// Build the multipart body. `model` is omitted for deployments that pin it.
pub(crate) fn build_form(
    audio: &AudioPayload,
    model: Option<&str>,
    options: &WhisperOptions,
) -> ProviderResult<Form> {
    let file = Part::bytes(audio.bytes.to_vec())
        .file_name(audio.file_name.clone())
        .mime_str(audio.mime_type())?;

    let mut form = Form::new()
        .part("file", file)
        .text("response_format", "json");
    if let Some(model) = model {
        form = form.text("model", model.to_string());
    }
    if let Some(language) = &options.language {
        form = form.text("language", language.clone());
    }
    if let Some(temperature) = options.temperature {
        form = form.text("temperature", temperature.to_string());
    }
    if let Some(prompt) = &options.prompt {
        form = form.text("prompt", prompt.clone());
    }
    Ok(form)
}

#[derive(Deserialize)]
struct WhisperResponse {
    #[serde(default)]
    text: Option<String>,
}

/// Send a prepared request and pull `text` out of the JSON reply.
pub(crate) async fn send_transcription(
    request: reqwest::RequestBuilder,
    provider: &'static str,
) -> ProviderResult<Option<String>> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let err = ProviderError::from_response(status.as_u16(), &body);
        error!(provider, status = status.as_u16(), error = %err, "transcription request rejected");
        return Err(err);
    }

    let value: serde_json::Value = serde_json::from_str(&body)?;
    let parsed: WhisperResponse =
        serde_json::from_value(value).map_err(|e| ProviderError::MalformedResponse {
            message: format!("{provider}: {e}"),
        })?;
    Ok(non_empty_text(parsed.text))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_from_config() {
        let config = TranscriptionConfig::new("localAISTT")
            .with_language("de")
            .with_temperature("0.4")
            .with_prompt("");
        let options = WhisperOptions::from_config(&config).unwrap();
        assert_eq!(options.language.as_deref(), Some("de"));
        assert_eq!(options.temperature, Some(0.4));
        assert_eq!(options.prompt, None);
    }

    #[test]
    fn options_reject_bad_temperature() {
        let config = TranscriptionConfig::new("localAISTT").with_temperature("hot");
        assert!(WhisperOptions::from_config(&config).is_err());
    }

    #[test]
    fn form_builds_for_unknown_extension() {
        let audio = AudioPayload::new(vec![1u8, 2, 3], "clip.xyz");
        assert!(build_form(&audio, Some("whisper-1"), &WhisperOptions::default()).is_ok());
    }

    #[test]
    fn temperature_renders_without_float_noise() {
        assert_eq!(0.2f64.to_string(), "0.2");
        assert_eq!(0.123_456_789f64.to_string(), "0.123456789");
    }
}
