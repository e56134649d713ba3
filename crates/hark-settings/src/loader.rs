//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`HarkSettings::default()`]
//! 2. If the settings file exists, deep-merge its values over the defaults
//! 3. Apply `HARK_*` environment variable overrides (highest priority)
//! 4. Validate the result
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::HarkSettings;

/// The hark data directory (`~/.hark`).
pub fn hark_home() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".hark")
}

/// Resolve the path to the settings file (`~/.hark/settings.json`).
pub fn settings_path() -> PathBuf {
    hark_home().join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<HarkSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults. Invalid JSON or values that fail
/// [`HarkSettings::validate`] are errors.
pub fn load_settings_from_path(path: &Path) -> Result<HarkSettings> {
    let defaults = serde_json::to_value(HarkSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: HarkSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    settings.validate()?;
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = match target_map.remove(&key) {
                    Some(target_val) => deep_merge(target_val, source_val),
                    None => source_val,
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// Integers must parse and fall within the given range; anything else is
/// logged and ignored so a typo never takes the service down.
pub fn apply_env_overrides(settings: &mut HarkSettings) {
    // ── Logging ─────────────────────────────────────────────────────
    if let Some(v) = read_env_string("HARK_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = read_env_bool("HARK_LOG_JSON") {
        settings.logging.json = v;
    }

    // ── Storage & credentials ───────────────────────────────────────
    if let Some(v) = read_env_string("HARK_STORAGE_ROOT") {
        settings.storage.root = PathBuf::from(v);
    }
    if let Some(v) = read_env_u64("HARK_STORAGE_MAX_BYTES", 1, 1_073_741_824) {
        settings.storage.max_bytes = v;
    }
    if let Some(v) = read_env_string("HARK_CREDENTIALS_PATH") {
        settings.credentials.path = PathBuf::from(v);
    }

    // ── HTTP & dispatch ─────────────────────────────────────────────
    if let Some(v) = read_env_u64("HARK_HTTP_TIMEOUT_MS", 1_000, 3_600_000) {
        settings.http.timeout_ms = v;
    }
    if let Some(v) = read_env_u64("HARK_HTTP_CONNECT_TIMEOUT_MS", 100, 600_000) {
        settings.http.connect_timeout_ms = v;
    }
    if let Some(v) = read_env_u64("HARK_DISPATCH_TIMEOUT_MS", 1_000, 86_400_000) {
        settings.dispatch.timeout_ms = Some(v);
    }

    // ── AssemblyAI ──────────────────────────────────────────────────
    if let Some(v) = read_env_string("HARK_ASSEMBLYAI_BASE_URL") {
        settings.assembly_ai.base_url = v;
    }
    if let Some(v) = read_env_u64("HARK_ASSEMBLYAI_POLL_INTERVAL_MS", 10, 600_000) {
        settings.assembly_ai.poll_interval_ms = v;
    }
    if let Some(v) = read_env_u64("HARK_ASSEMBLYAI_POLL_TIMEOUT_MS", 1_000, 86_400_000) {
        settings.assembly_ai.poll_timeout_ms = v;
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u64` within an inclusive range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.trim().parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}

// ── Env var readers (thin wrappers) ─────────────────────────────────────────

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_bool(name: &str) -> Option<bool> {
    let val = std::env::var(name).ok()?;
    let result = parse_bool(&val);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid boolean env var, ignoring");
    }
    result
}

fn read_env_u64(name: &str, min: u64, max: u64) -> Option<u64> {
    let val = std::env::var(name).ok()?;
    let result = parse_u64_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, min, max, "invalid integer env var, ignoring");
    }
    result
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
