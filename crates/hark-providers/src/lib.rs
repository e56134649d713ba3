//! # hark-providers
//!
//! Speech-to-text backends behind a single [`SpeechToText`] trait:
//!
//! - [`azure`]: Azure-hosted `OpenAI` Whisper deployment (`openAIWhisper`)
//! - [`assemblyai`]: `AssemblyAI` upload + transcript job polling (`assemblyAiTranscribe`)
//! - [`localai`]: Self-hosted `OpenAI`-compatible server (`localAISTT`)
//!
//! Each adapter turns the untyped credential bag and per-run config into its
//! own typed request first, so missing fields fail before any network I/O.
//! None of them retry.
//!
//! [`factory::builtin_providers`] builds all three sharing one HTTP client.

#![deny(unsafe_code)]

pub mod assemblyai;
pub mod azure;
pub mod error_parsing;
pub mod factory;
pub mod localai;
mod openai_compat;
pub mod provider;

pub use assemblyai::AssemblyAiProvider;
pub use azure::AzureWhisperProvider;
pub use factory::{build_http_client, builtin_providers};
pub use localai::LocalAiProvider;
pub use provider::{ProviderError, ProviderResult, SpeechToText, parse_temperature};
