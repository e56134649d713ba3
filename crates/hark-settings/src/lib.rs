//! # hark-settings
//!
//! Layered configuration for the hark transcription dispatcher.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`HarkSettings::default()`]
//! 2. **Settings file**: `~/.hark/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `HARK_*` overrides (highest priority)
//!
//! Per-run choices (which backend, which credential, language...) are not
//! settings: they arrive with every dispatch as a `TranscriptionConfig`.
//! This crate only covers process-wide knobs such as storage locations and
//! HTTP timeouts.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, hark_home, load_settings, load_settings_from_path, settings_path};
pub use types::*;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
