//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` and `#[serde(default)]`
//! so a settings file may contain any subset of fields:
//!
//! ```json
//! {
//!   "storage": { "root": "/var/lib/hark/storage" },
//!   "assemblyAi": { "pollIntervalMs": 1000 }
//! }
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};
use crate::loader::hark_home;

/// Root settings type.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HarkSettings {
    /// Log output settings.
    pub logging: LoggingSettings,
    /// Local audio storage.
    pub storage: StorageSettings,
    /// Local credential store.
    pub credentials: CredentialSettings,
    /// Shared HTTP client.
    pub http: HttpSettings,
    /// Dispatcher-level limits.
    pub dispatch: DispatchSettings,
    /// `AssemblyAI` job polling.
    pub assembly_ai: AssemblyAiSettings,
}

impl HarkSettings {
    /// Reject values that would make the dispatcher misbehave at runtime.
    pub fn validate(&self) -> Result<()> {
        if self.http.timeout_ms == 0 {
            return Err(SettingsError::InvalidValue("http.timeoutMs must be > 0".into()));
        }
        if self.assembly_ai.poll_interval_ms == 0 {
            return Err(SettingsError::InvalidValue(
                "assemblyAi.pollIntervalMs must be > 0".into(),
            ));
        }
        if self.assembly_ai.poll_timeout_ms < self.assembly_ai.poll_interval_ms {
            return Err(SettingsError::InvalidValue(
                "assemblyAi.pollTimeoutMs must be >= pollIntervalMs".into(),
            ));
        }
        if self.assembly_ai.base_url.trim().is_empty() {
            return Err(SettingsError::InvalidValue(
                "assemblyAi.baseUrl must not be empty".into(),
            ));
        }
        if self.dispatch.timeout_ms == Some(0) {
            return Err(SettingsError::InvalidValue(
                "dispatch.timeoutMs must be > 0 when set".into(),
            ));
        }
        Ok(())
    }
}

/// Log output settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of compact text.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Default `storage.maxBytes`: 25 MiB, the Whisper transcription upload limit.
pub const DEFAULT_MAX_AUDIO_BYTES: u64 = 25 * 1024 * 1024;

/// Local audio storage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageSettings {
    /// Root directory; files live at `{root}/{flowId}/{chatId}/{name}`.
    pub root: PathBuf,
    /// Largest recording accepted, in bytes, for every backend.
    ///
    /// Defaults to [`DEFAULT_MAX_AUDIO_BYTES`], the Whisper upload cap.
    /// `AssemblyAI` takes far larger files; raise this when routing long
    /// recordings there.
    pub max_bytes: u64,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            root: hark_home().join("storage"),
            max_bytes: DEFAULT_MAX_AUDIO_BYTES,
        }
    }
}

/// Local credential store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CredentialSettings {
    /// Path to the credentials JSON file.
    pub path: PathBuf,
}

impl Default for CredentialSettings {
    fn default() -> Self {
        Self {
            path: hark_home().join("credentials.json"),
        }
    }
}

/// Shared HTTP client settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpSettings {
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// TCP/TLS connect timeout in milliseconds.
    pub connect_timeout_ms: u64,
}

impl HttpSettings {
    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Connect timeout.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 120_000,
            connect_timeout_ms: 10_000,
        }
    }
}

/// Dispatcher-level limits.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DispatchSettings {
    /// Overall deadline for one dispatch. `None` waits as long as the
    /// collaborators do.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl DispatchSettings {
    /// Overall deadline, if configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// `AssemblyAI` transcription job polling.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssemblyAiSettings {
    /// API base URL.
    pub base_url: String,
    /// Delay between job status checks in milliseconds.
    pub poll_interval_ms: u64,
    /// Give up on a job after this many milliseconds.
    pub poll_timeout_ms: u64,
}

impl AssemblyAiSettings {
    /// Delay between job status checks.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Upper bound on total polling time.
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }
}

impl Default for AssemblyAiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.assemblyai.com".to_string(),
            poll_interval_ms: 3_000,
            poll_timeout_ms: 600_000,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let settings: HarkSettings =
            serde_json::from_str(r#"{"assemblyAi":{"pollIntervalMs":500}}"#).unwrap();
        assert_eq!(settings.assembly_ai.poll_interval_ms, 500);
        assert_eq!(settings.assembly_ai.base_url, "https://api.assemblyai.com");
        assert_eq!(settings.http, HttpSettings::default());
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(HarkSettings::default()).unwrap();
        assert!(json["assemblyAi"]["pollTimeoutMs"].is_u64());
        assert!(json["http"]["connectTimeoutMs"].is_u64());
        assert!(json["storage"]["maxBytes"].is_u64());
        assert!(json["dispatch"].get("timeoutMs").is_none());
    }

    #[test]
    fn durations() {
        let settings = HarkSettings::default();
        assert_eq!(settings.http.timeout(), Duration::from_secs(120));
        assert_eq!(settings.assembly_ai.poll_interval(), Duration::from_secs(3));
        assert_eq!(settings.dispatch.timeout(), None);
    }

    #[test]
    fn validate_rejects_zero_poll_interval() {
        let mut settings = HarkSettings::default();
        settings.assembly_ai.poll_interval_ms = 0;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("pollIntervalMs"));
    }

    #[test]
    fn validate_rejects_zero_dispatch_timeout() {
        let mut settings = HarkSettings::default();
        settings.dispatch.timeout_ms = Some(0);
        assert!(settings.validate().is_err());
    }

    #[test]
    fn default_paths_live_under_hark_home() {
        let settings = HarkSettings::default();
        assert!(settings.storage.root.ends_with(".hark/storage"));
        assert!(settings.credentials.path.ends_with(".hark/credentials.json"));
    }
}
