//! API error body parsing shared by all adapters.
//!
//! Recognized envelopes:
//! - `OpenAI`/Azure: `{"error": {"message": "...", "code": "..."}}`
//! - `AssemblyAI`:   `{"error": "..."}`
//! - Detail:         `{"detail": "..."}`
//! - Flat:           `{"message": "...", "code": "..."}`
//!
//! Anything else falls back to the raw body.

use serde_json::Value;

/// Parsed API error information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiErrorInfo {
    /// Human-readable error message.
    pub message: String,
    /// Provider-specific error code (e.g. `"invalid_api_key"`, `"DeploymentNotFound"`).
    pub code: Option<String>,
}

/// Parse an API error response body.
pub fn parse_api_error(body: &str, status: u16) -> ApiErrorInfo {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return raw(body, status);
    };

    if let Some(msg) = json["error"]["message"].as_str() {
        let code = json["error"]["code"]
            .as_str()
            .or_else(|| json["error"]["type"].as_str())
            .map(String::from);
        return ApiErrorInfo {
            message: msg.to_string(),
            code,
        };
    }

    if let Some(msg) = json["error"].as_str() {
        return ApiErrorInfo {
            message: msg.to_string(),
            code: None,
        };
    }

    if let Some(msg) = json["detail"].as_str().or_else(|| json["message"].as_str()) {
        let code = json["code"]
            .as_str()
            .or_else(|| json["type"].as_str())
            .map(String::from);
        return ApiErrorInfo {
            message: msg.to_string(),
            code,
        };
    }

    raw(body, status)
}

fn raw(body: &str, status: u16) -> ApiErrorInfo {
    ApiErrorInfo {
        message: format!("HTTP {status}: {body}"),
        code: None,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
