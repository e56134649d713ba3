//! Uploads, audio payloads, run context and dispatch results.

use std::path::Path;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::ids::{ChatId, FlowId};
use crate::provider::ProviderKind;

/// Reference to a stored recording, as handed over by the workflow engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioUpload {
    /// Stored file name (no directory components).
    pub name: String,
    /// Flow that owns the recording.
    pub flow_id: FlowId,
    /// Conversation the recording belongs to.
    pub chat_id: ChatId,
}

impl AudioUpload {
    /// Create an upload reference.
    pub fn new(name: impl Into<String>, flow_id: impl Into<FlowId>, chat_id: impl Into<ChatId>) -> Self {
        Self {
            name: name.into(),
            flow_id: flow_id.into(),
            chat_id: chat_id.into(),
        }
    }

    /// A fresh run context scoped to this upload's flow and chat.
    pub fn run_context(&self) -> RunContext {
        RunContext::new(self.flow_id.clone(), self.chat_id.clone())
    }
}

/// Identifiers scoping one dispatch to a workflow execution, plus the
/// caller's cancellation signal.
#[derive(Clone, Debug)]
pub struct RunContext {
    /// Flow being executed.
    pub flow_id: FlowId,
    /// Conversation within the flow.
    pub chat_id: ChatId,
    /// Cancelled by the caller to abandon the dispatch.
    pub cancel: CancellationToken,
}

impl RunContext {
    /// Create a context with a fresh (never cancelled) token.
    pub fn new(flow_id: FlowId, chat_id: ChatId) -> Self {
        Self {
            flow_id,
            chat_id,
            cancel: CancellationToken::new(),
        }
    }

    /// Replace the cancellation token with one owned by the caller.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Whether the caller has cancelled this run.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Raw bytes of one recording, held only for the duration of a dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioPayload {
    /// File content.
    pub bytes: Bytes,
    /// Name of the file the bytes came from.
    pub file_name: String,
}

impl AudioPayload {
    /// Wrap bytes read from storage.
    pub fn new(bytes: impl Into<Bytes>, file_name: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            file_name: file_name.into(),
        }
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload has no content.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// MIME type guessed from the file extension.
    pub fn mime_type(&self) -> &'static str {
        audio_mime_type(&self.file_name)
    }
}

/// Guess an audio MIME type from a file name's extension.
///
/// Falls back to `application/octet-stream`; every backend sniffs the
/// container itself, the header only needs to be well-formed.
pub fn audio_mime_type(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("wav") => "audio/wav",
        Some("mp3" | "mpga" | "mpeg") => "audio/mpeg",
        Some("m4a" | "mp4") => "audio/mp4",
        Some("webm") => "audio/webm",
        Some("ogg" | "oga" | "opus") => "audio/ogg",
        Some("flac") => "audio/flac",
        _ => "application/octet-stream",
    }
}

/// Outcome of one dispatch.
///
/// `text == None` is a valid result: the backend answered but produced no
/// transcript (silent or empty audio).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptionResult {
    /// Transcribed text, verbatim from the backend.
    pub text: Option<String>,
    /// Backend that produced it.
    pub provider: ProviderKind,
}

impl TranscriptionResult {
    /// Whether the backend produced no text.
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
    }

    /// Consume and return the text.
    pub fn into_text(self) -> Option<String> {
        self.text
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
