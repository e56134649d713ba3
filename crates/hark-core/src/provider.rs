//! The closed set of speech-to-text backends.
//!
//! Workflow configuration names a backend with a stable string identifier.
//! Those identifiers are fixed by existing stored workflows, so they are
//! matched exactly (case-sensitive) and never renamed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A supported transcription backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    /// Azure-hosted `OpenAI` Whisper deployment.
    #[serde(rename = "openAIWhisper")]
    AzureWhisper,
    /// `AssemblyAI` hosted transcription jobs.
    #[serde(rename = "assemblyAiTranscribe")]
    AssemblyAi,
    /// Self-hosted `LocalAI` server with an `OpenAI`-compatible API.
    #[serde(rename = "localAISTT")]
    LocalAi,
}

impl ProviderKind {
    /// Every supported backend, in registration order.
    pub const ALL: [Self; 3] = [Self::AzureWhisper, Self::AssemblyAi, Self::LocalAi];

    /// Stable identifier used in workflow configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AzureWhisper => "openAIWhisper",
            Self::AssemblyAi => "assemblyAiTranscribe",
            Self::LocalAi => "localAISTT",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::AzureWhisper => "Azure OpenAI Whisper",
            Self::AssemblyAi => "AssemblyAI",
            Self::LocalAi => "LocalAI STT",
        }
    }

    /// Look up a backend by its configuration identifier.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The configured provider name matches no known backend.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown speech-to-text provider: {0:?}")]
pub struct UnknownProvider(pub String);

impl FromStr for ProviderKind {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownProvider(s.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
