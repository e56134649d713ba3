//! # hark-core
//!
//! Foundation types shared by every hark crate:
//!
//! - [`ids`]: Branded ID newtypes (`FlowId`, `ChatId`, `CredentialId`)
//! - [`provider`]: The closed set of transcription backends ([`ProviderKind`])
//! - [`config`]: Per-run transcription configuration ([`TranscriptionConfig`])
//! - [`credential`]: Resolved secret bundles ([`ResolvedCredential`])
//! - [`audio`]: Uploads, payloads, run context and dispatch results
//! - [`logging`]: `tracing` subscriber setup and log capture for tests
//!
//! Everything here is call-scoped data. Nothing holds shared mutable state.

#![deny(unsafe_code)]

pub mod audio;
pub mod config;
pub mod credential;
pub mod ids;
pub mod logging;
pub mod provider;

pub use audio::{AudioPayload, AudioUpload, RunContext, TranscriptionResult, audio_mime_type};
pub use config::TranscriptionConfig;
pub use credential::ResolvedCredential;
pub use ids::{ChatId, CredentialId, FlowId};
pub use provider::{ProviderKind, UnknownProvider};

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
