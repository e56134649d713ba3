//! Construction of the built-in adapters from settings.

use std::sync::Arc;

use hark_settings::{HarkSettings, HttpSettings};
use tracing::debug;

use crate::assemblyai::AssemblyAiProvider;
use crate::azure::AzureWhisperProvider;
use crate::localai::LocalAiProvider;
use crate::provider::{ProviderResult, SpeechToText};

/// User agent sent on every provider request.
const USER_AGENT: &str = concat!("hark/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by all adapters.
pub fn build_http_client(settings: &HttpSettings) -> ProviderResult<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(settings.timeout())
        .connect_timeout(settings.connect_timeout())
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// All built-in adapters, sharing `client`.
pub fn builtin_providers(
    client: &reqwest::Client,
    settings: &HarkSettings,
) -> Vec<Arc<dyn SpeechToText>> {
    let providers: Vec<Arc<dyn SpeechToText>> = vec![
        Arc::new(AzureWhisperProvider::new(client.clone())),
        Arc::new(AssemblyAiProvider::new(client.clone(), &settings.assembly_ai)),
        Arc::new(LocalAiProvider::new(client.clone())),
    ];
    debug!(count = providers.len(), "built-in providers constructed");
    providers
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use hark_core::ProviderKind;

    #[test]
    fn builds_client_from_defaults() {
        assert!(build_http_client(&HttpSettings::default()).is_ok());
    }

    #[test]
    fn one_adapter_per_kind() {
        let client = reqwest::Client::new();
        let providers = builtin_providers(&client, &HarkSettings::default());
        let kinds: Vec<ProviderKind> = providers.iter().map(|p| p.kind()).collect();
        assert_eq!(kinds.len(), ProviderKind::ALL.len());
        for kind in ProviderKind::ALL {
            assert!(kinds.contains(&kind), "missing adapter for {kind}");
        }
    }
}
