//! The transcription dispatcher.
//!
//! One call runs a linear chain of awaited steps:
//!
//! 1. reject a missing config (no I/O at all)
//! 2. resolve credentials (skipped when the config names none)
//! 3. fetch the audio for the run; the upload must name the run's own flow
//!    and chat
//! 4. pick the adapter registered for the configured provider name
//! 5. run it and hand back its text untouched
//!
//! The whole chain races the run's cancellation token and the optional
//! overall deadline. Losing the race drops the chain, which abandons any
//! in-flight request. Nothing is retried and there is no fallback between
//! providers.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use hark_core::{
    AudioUpload, ProviderKind, ResolvedCredential, RunContext, TranscriptionConfig,
    TranscriptionResult,
};
use hark_providers::{ProviderError, SpeechToText, build_http_client, builtin_providers};
use hark_settings::HarkSettings;
use tracing::{Span, debug, info, instrument, warn};

use crate::credentials::{CredentialResolver, FileCredentialStore};
use crate::errors::{DispatchError, StorageError};
use crate::storage::{AudioRetriever, LocalAudioStore};

/// Routes transcription requests to the configured backend.
///
/// Holds only shared, immutable collaborators; one instance serves any number
/// of concurrent dispatches.
pub struct Dispatcher {
    credentials: Arc<dyn CredentialResolver>,
    storage: Arc<dyn AudioRetriever>,
    providers: HashMap<ProviderKind, Arc<dyn SpeechToText>>,
    timeout: Option<Duration>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("providers", &self.provider_kinds())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Start building a dispatcher around the two storage collaborators.
    pub fn builder(
        credentials: Arc<dyn CredentialResolver>,
        storage: Arc<dyn AudioRetriever>,
    ) -> DispatcherBuilder {
        DispatcherBuilder::new(credentials, storage)
    }

    /// Wire the local credential file, local audio store and all built-in
    /// adapters on one shared HTTP client.
    pub fn from_settings(settings: &HarkSettings) -> Result<Self, ProviderError> {
        let client = build_http_client(&settings.http)?;
        let dispatcher = Self::builder(
            Arc::new(FileCredentialStore::from_settings(&settings.credentials)),
            Arc::new(LocalAudioStore::from_settings(&settings.storage)),
        )
        .with_providers(builtin_providers(&client, settings))
        .timeout(settings.dispatch.timeout())
        .build();
        Ok(dispatcher)
    }

    /// Registered backends, in declaration order.
    pub fn provider_kinds(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL
            .into_iter()
            .filter(|kind| self.providers.contains_key(kind))
            .collect()
    }

    /// Transcribe `upload`, returning only the text.
    ///
    /// `Ok(None)` means the backend answered with no transcript.
    pub async fn transcribe(
        &self,
        upload: &AudioUpload,
        config: Option<&TranscriptionConfig>,
        ctx: &RunContext,
    ) -> Result<Option<String>, DispatchError> {
        self.dispatch(upload, config, ctx)
            .await
            .map(TranscriptionResult::into_text)
    }

    /// Transcribe `upload`, returning the text and the backend that produced it.
    #[instrument(
        name = "dispatch",
        skip_all,
        fields(
            flow_id = %ctx.flow_id,
            chat_id = %ctx.chat_id,
            file = %upload.name,
            provider = tracing::field::Empty,
        )
    )]
    pub async fn dispatch(
        &self,
        upload: &AudioUpload,
        config: Option<&TranscriptionConfig>,
        ctx: &RunContext,
    ) -> Result<TranscriptionResult, DispatchError> {
        let Some(config) = config else {
            let err = DispatchError::ConfigMissing;
            warn!(stage = err.stage(), "dispatch rejected: {err}");
            return Err(err);
        };
        let _ = Span::current().record("provider", config.provider.as_str());

        let outcome = tokio::select! {
            biased;
            () = ctx.cancel.cancelled() => Err(DispatchError::Cancelled),
            result = self.run_with_deadline(upload, config, ctx) => result,
        };

        match &outcome {
            Ok(result) => info!(
                chars = result.text.as_deref().map_or(0, |t| t.chars().count()),
                empty = result.is_empty(),
                "transcription complete"
            ),
            Err(err) => warn!(stage = err.stage(), error = %err, "dispatch failed"),
        }
        outcome
    }

    async fn run_with_deadline(
        &self,
        upload: &AudioUpload,
        config: &TranscriptionConfig,
        ctx: &RunContext,
    ) -> Result<TranscriptionResult, DispatchError> {
        let Some(limit) = self.timeout else {
            return self.run_stages(upload, config, ctx).await;
        };
        tokio::time::timeout(limit, self.run_stages(upload, config, ctx))
            .await
            .map_err(|_| DispatchError::TimedOut {
                after_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
            })?
    }

    async fn run_stages(
        &self,
        upload: &AudioUpload,
        config: &TranscriptionConfig,
        ctx: &RunContext,
    ) -> Result<TranscriptionResult, DispatchError> {
        let credential = match config.credential_id() {
            Some(id) => self.credentials.resolve(id, ctx).await?,
            None => {
                debug!("no credential reference, continuing with an empty credential");
                ResolvedCredential::empty()
            }
        };

        if upload.flow_id != ctx.flow_id || upload.chat_id != ctx.chat_id {
            return Err(StorageError::RunMismatch {
                file_name: upload.name.clone(),
                upload_flow: upload.flow_id.to_string(),
                upload_chat: upload.chat_id.to_string(),
            }
            .into());
        }
        let audio = self.storage.fetch(&upload.name, ctx).await?;

        let (kind, provider) = ProviderKind::from_name(&config.provider)
            .and_then(|kind| self.providers.get(&kind).map(|p| (kind, p)))
            .ok_or_else(|| DispatchError::UnsupportedProvider {
                name: config.provider.clone(),
            })?;

        debug!(provider = %kind, bytes = audio.len(), "invoking provider");
        let text = provider
            .run(&credential, &audio, config)
            .await
            .map_err(|source| DispatchError::Provider {
                provider: kind,
                source,
            })?;

        Ok(TranscriptionResult {
            text,
            provider: kind,
        })
    }
}

/// Builder for [`Dispatcher`].
pub struct DispatcherBuilder {
    credentials: Arc<dyn CredentialResolver>,
    storage: Arc<dyn AudioRetriever>,
    providers: HashMap<ProviderKind, Arc<dyn SpeechToText>>,
    timeout: Option<Duration>,
}

impl DispatcherBuilder {
    /// Builder with no adapters and no deadline.
    pub fn new(
        credentials: Arc<dyn CredentialResolver>,
        storage: Arc<dyn AudioRetriever>,
    ) -> Self {
        Self {
            credentials,
            storage,
            providers: HashMap::new(),
            timeout: None,
        }
    }

    /// Register an adapter under its own kind, replacing any previous one.
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn SpeechToText>) -> Self {
        let _ = self.providers.insert(provider.kind(), provider);
        self
    }

    /// Register several adapters.
    #[must_use]
    pub fn with_providers(self, providers: impl IntoIterator<Item = Arc<dyn SpeechToText>>) -> Self {
        providers.into_iter().fold(self, Self::with_provider)
    }

    /// Overall deadline per dispatch. `None` disables it.
    #[must_use]
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Finish building.
    pub fn build(self) -> Dispatcher {
        Dispatcher {
            credentials: self.credentials,
            storage: self.storage,
            providers: self.providers,
            timeout: self.timeout,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use hark_core::{AudioPayload, CredentialId};
    use hark_providers::ProviderResult;

    use crate::errors::CredentialError;

    struct NoCredentials;

    #[async_trait]
    impl CredentialResolver for NoCredentials {
        async fn resolve(
            &self,
            id: &CredentialId,
            _ctx: &RunContext,
        ) -> Result<ResolvedCredential, CredentialError> {
            Err(CredentialError::NotFound(id.clone()))
        }
    }

    struct OneFile;

    #[async_trait]
    impl AudioRetriever for OneFile {
        async fn fetch(&self, file_name: &str, _ctx: &RunContext) -> Result<AudioPayload, StorageError> {
            Ok(AudioPayload::new(b"audio".to_vec(), file_name))
        }
    }

    struct Echo(ProviderKind);

    #[async_trait]
    impl SpeechToText for Echo {
        fn kind(&self) -> ProviderKind {
            self.0
        }

        async fn run(
            &self,
            credential: &ResolvedCredential,
            audio: &AudioPayload,
            _config: &TranscriptionConfig,
        ) -> ProviderResult<Option<String>> {
            Ok(Some(format!("{}:{}", audio.file_name, credential.len())))
        }
    }

    fn dispatcher() -> Dispatcher {
        Dispatcher::builder(Arc::new(NoCredentials), Arc::new(OneFile))
            .with_provider(Arc::new(Echo(ProviderKind::LocalAi)))
            .build()
    }

    fn upload() -> AudioUpload {
        AudioUpload::new("clip.wav", "flow-1", "chat-1")
    }

    #[tokio::test]
    async fn dispatch_reports_provider() {
        let upload = upload();
        let config = TranscriptionConfig::new("localAISTT");
        let result = dispatcher()
            .dispatch(&upload, Some(&config), &upload.run_context())
            .await
            .unwrap();
        assert_eq!(result.provider, ProviderKind::LocalAi);
        assert_eq!(result.text.as_deref(), Some("clip.wav:0"));
    }

    #[tokio::test]
    async fn blank_credential_id_skips_resolver() {
        let upload = upload();
        let config = TranscriptionConfig::new("localAISTT").with_credential("  ");
        let text = dispatcher()
            .transcribe(&upload, Some(&config), &upload.run_context())
            .await
            .unwrap();
        assert_eq!(text.as_deref(), Some("clip.wav:0"));
    }

    #[tokio::test]
    async fn resolver_failure_is_credential_error() {
        let upload = upload();
        let config = TranscriptionConfig::new("localAISTT").with_credential("cred-404");
        let err = dispatcher()
            .transcribe(&upload, Some(&config), &upload.run_context())
            .await
            .unwrap_err();
        assert_matches!(err, DispatchError::Credential(CredentialError::NotFound(_)));
    }

    #[tokio::test]
    async fn upload_from_another_run_is_rejected() {
        let upload = upload();
        let ctx = RunContext::new("flow-2".into(), "chat-1".into());
        let config = TranscriptionConfig::new("localAISTT");
        let err = dispatcher()
            .transcribe(&upload, Some(&config), &ctx)
            .await
            .unwrap_err();
        assert_matches!(
            err,
            DispatchError::Storage(StorageError::RunMismatch { ref upload_flow, .. })
                if upload_flow == "flow-1"
        );
        assert_eq!(err.stage(), "storage");
    }

    #[tokio::test]
    async fn known_kind_without_adapter_is_unsupported() {
        let upload = upload();
        let config = TranscriptionConfig::new("openAIWhisper");
        let err = dispatcher()
            .transcribe(&upload, Some(&config), &upload.run_context())
            .await
            .unwrap_err();
        assert_matches!(err, DispatchError::UnsupportedProvider { name } if name == "openAIWhisper");
    }

    #[tokio::test]
    async fn provider_names_are_case_sensitive() {
        let upload = upload();
        let config = TranscriptionConfig::new("LOCALAISTT");
        let err = dispatcher()
            .transcribe(&upload, Some(&config), &upload.run_context())
            .await
            .unwrap_err();
        assert_eq!(err.stage(), "selection");
    }

    #[test]
    fn builder_registers_by_kind() {
        let dispatcher = Dispatcher::builder(Arc::new(NoCredentials), Arc::new(OneFile))
            .with_providers([
                Arc::new(Echo(ProviderKind::AssemblyAi)) as Arc<dyn SpeechToText>,
                Arc::new(Echo(ProviderKind::LocalAi)),
                Arc::new(Echo(ProviderKind::LocalAi)),
            ])
            .timeout(Some(Duration::from_secs(5)))
            .build();
        assert_eq!(
            dispatcher.provider_kinds(),
            vec![ProviderKind::AssemblyAi, ProviderKind::LocalAi]
        );
        assert!(format!("{dispatcher:?}").contains("AssemblyAi"));
    }

    #[test]
    fn from_settings_registers_all_builtins() {
        let dispatcher = Dispatcher::from_settings(&HarkSettings::default()).unwrap();
        assert_eq!(dispatcher.provider_kinds(), ProviderKind::ALL.to_vec());
    }

    #[test]
    fn dispatcher_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Dispatcher>();
    }
}
