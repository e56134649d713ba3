//! Per-run transcription configuration.
//!
//! Supplied by the workflow engine alongside each audio upload. The JSON
//! shape uses the workflow's camelCase keys:
//!
//! ```json
//! {
//!   "name": "localAISTT",
//!   "credentialId": "cred2",
//!   "baseUrl": "http://localhost:8080/v1",
//!   "model": "whisper-1",
//!   "language": "en",
//!   "temperature": "0.2",
//!   "prompt": "Glossary: hark, dispatcher"
//! }
//! ```
//!
//! Optional fields that are present but empty are treated as absent by the
//! accessors. `temperature` stays a string here; adapters parse it right
//! before building their request.

use serde::{Deserialize, Serialize};

use crate::ids::CredentialId;

/// Run-time choice of backend plus its options.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionConfig {
    /// Provider identifier (see [`ProviderKind::as_str`](crate::ProviderKind::as_str)).
    #[serde(rename = "name")]
    pub provider: String,
    /// Reference into the credential store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_id: Option<CredentialId>,
    /// ISO-639-1 language hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Sampling temperature as a decimal string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<String>,
    /// Prompt text to guide the transcription style or vocabulary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Endpoint override (required for `LocalAI`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Model name (`LocalAI` only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.trim().is_empty())
}

impl TranscriptionConfig {
    /// Create a config selecting `provider` with no options set.
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            ..Self::default()
        }
    }

    /// Set the credential reference.
    #[must_use]
    pub fn with_credential(mut self, id: impl Into<CredentialId>) -> Self {
        self.credential_id = Some(id.into());
        self
    }

    /// Set the language hint.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Set the temperature (decimal string).
    #[must_use]
    pub fn with_temperature(mut self, temperature: impl Into<String>) -> Self {
        self.temperature = Some(temperature.into());
        self
    }

    /// Set the prompt text.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Set the endpoint override.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the model name.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Credential reference, if one is set and not blank.
    pub fn credential_id(&self) -> Option<&CredentialId> {
        self.credential_id.as_ref().filter(|id| !id.is_blank())
    }

    /// Language hint, if set and not empty.
    pub fn language(&self) -> Option<&str> {
        non_empty(self.language.as_ref())
    }

    /// Raw temperature string, if set and not empty.
    pub fn temperature(&self) -> Option<&str> {
        non_empty(self.temperature.as_ref())
    }

    /// Prompt text, if set and not empty.
    pub fn prompt(&self) -> Option<&str> {
        non_empty(self.prompt.as_ref())
    }

    /// Endpoint override, if set and not empty.
    pub fn base_url(&self) -> Option<&str> {
        non_empty(self.base_url.as_ref())
    }

    /// Model name, if set and not empty.
    pub fn model(&self) -> Option<&str> {
        non_empty(self.model.as_ref())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_workflow_shape() {
        let config: TranscriptionConfig = serde_json::from_str(
            r#"{"name":"localAISTT","credentialId":"cred2","baseUrl":"http://localhost:8080","temperature":"0.2"}"#,
        )
        .unwrap();
        assert_eq!(config.provider, "localAISTT");
        assert_eq!(config.credential_id().map(CredentialId::as_str), Some("cred2"));
        assert_eq!(config.base_url(), Some("http://localhost:8080"));
        assert_eq!(config.temperature(), Some("0.2"));
        assert!(config.model().is_none());
        assert!(config.language().is_none());
    }

    #[test]
    fn empty_strings_read_as_absent() {
        let config = TranscriptionConfig::new("localAISTT")
            .with_credential("")
            .with_model("")
            .with_temperature("  ")
            .with_language("")
            .with_prompt("");
        assert!(config.credential_id().is_none());
        assert!(config.model().is_none());
        assert!(config.temperature().is_none());
        assert!(config.language().is_none());
        assert!(config.prompt().is_none());
    }

    #[test]
    fn serialization_skips_unset_fields() {
        let config = TranscriptionConfig::new("assemblyAiTranscribe").with_credential("cred1");
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["name"], "assemblyAiTranscribe");
        assert_eq!(json["credentialId"], "cred1");
        assert!(json.get("temperature").is_none());
        assert!(json.get("baseUrl").is_none());
    }

    #[test]
    fn temperature_is_kept_as_string() {
        let config = TranscriptionConfig::new("openAIWhisper").with_temperature("0.20");
        assert_eq!(config.temperature, Some("0.20".to_string()));
    }
}
