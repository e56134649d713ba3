//! Error types for dispatch and its collaborators.

use hark_core::{CredentialId, ProviderKind};
use hark_providers::ProviderError;

/// Failure to turn a credential reference into secret material.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// No credential is stored under this id.
    #[error("credential not found: {0}")]
    NotFound(CredentialId),

    /// The store file has a format version this build cannot read.
    #[error("unsupported credential store version: {0}")]
    UnsupportedVersion(u32),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The store file is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure to fetch a stored recording.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Nothing stored at this location.
    #[error("audio file not found: {file_name}")]
    NotFound {
        /// Requested file name.
        file_name: String,
    },

    /// The upload belongs to a different flow or chat than the running one.
    #[error("audio file {file_name} belongs to {upload_flow}/{upload_chat}, not the current run")]
    RunMismatch {
        /// Requested file name.
        file_name: String,
        /// Flow named by the upload.
        upload_flow: String,
        /// Chat named by the upload.
        upload_chat: String,
    },

    /// A path component would escape the run's directory.
    #[error("invalid storage path component: {name:?}")]
    InvalidName {
        /// Offending component.
        name: String,
    },

    /// The file exceeds the configured size limit.
    #[error("audio file {file_name} is {size} bytes, limit is {max}")]
    TooLarge {
        /// Requested file name.
        file_name: String,
        /// Actual size in bytes.
        size: u64,
        /// Configured maximum.
        max: u64,
    },

    /// The file exists but holds no bytes.
    #[error("audio file is empty: {file_name}")]
    Empty {
        /// Requested file name.
        file_name: String,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a dispatch produced no transcript.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The step was invoked without a transcription config.
    #[error("no speech-to-text configuration supplied")]
    ConfigMissing,

    /// Credentials could not be resolved.
    #[error("credential resolution failed: {0}")]
    Credential(#[from] CredentialError),

    /// Audio could not be retrieved.
    #[error("audio retrieval failed: {0}")]
    Storage(#[from] StorageError),

    /// The configured provider name matches no registered adapter.
    #[error("unsupported speech-to-text provider: {name:?}")]
    UnsupportedProvider {
        /// Name as configured.
        name: String,
    },

    /// The adapter rejected its inputs or the backend call failed.
    #[error("{provider} transcription failed: {source}")]
    Provider {
        /// Backend that failed.
        provider: ProviderKind,
        /// Underlying adapter error.
        #[source]
        source: ProviderError,
    },

    /// The caller cancelled the run.
    #[error("dispatch cancelled")]
    Cancelled,

    /// The overall dispatch deadline elapsed.
    #[error("dispatch timed out after {after_ms}ms")]
    TimedOut {
        /// Configured deadline in milliseconds.
        after_ms: u64,
    },
}

impl DispatchError {
    /// Name of the dispatch stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::ConfigMissing => "config",
            Self::Credential(_) => "credentials",
            Self::Storage(_) => "storage",
            Self::UnsupportedProvider { .. } => "selection",
            Self::Provider { .. } => "provider",
            Self::Cancelled => "cancelled",
            Self::TimedOut { .. } => "timeout",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
