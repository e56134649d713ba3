//! Audio retrieval.
//!
//! [`AudioRetriever`] fetches a stored recording for one run.
//! [`LocalAudioStore`] reads from `{root}/{flowId}/{chatId}/{fileName}`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use hark_core::{AudioPayload, RunContext};
use hark_settings::StorageSettings;
use tracing::debug;

use crate::errors::StorageError;

/// Fetches stored recordings scoped to a run.
#[async_trait]
pub trait AudioRetriever: Send + Sync {
    /// Read `file_name` from the storage area of `ctx`'s flow and chat.
    async fn fetch(&self, file_name: &str, ctx: &RunContext) -> Result<AudioPayload, StorageError>;
}

/// Filesystem-backed audio store.
#[derive(Clone, Debug)]
pub struct LocalAudioStore {
    root: PathBuf,
    max_bytes: u64,
}

impl LocalAudioStore {
    /// Store rooted at `root`, refusing files above `max_bytes`.
    pub fn new(root: impl Into<PathBuf>, max_bytes: u64) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    /// Store at the configured location.
    pub fn from_settings(settings: &StorageSettings) -> Self {
        Self::new(settings.root.clone(), settings.max_bytes)
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of a run's file. Every component must be a plain name.
    pub fn path_for(&self, file_name: &str, ctx: &RunContext) -> Result<PathBuf, StorageError> {
        let flow = plain_component(ctx.flow_id.as_str())?;
        let chat = plain_component(ctx.chat_id.as_str())?;
        let file = plain_component(file_name)?;
        Ok(self.root.join(flow).join(chat).join(file))
    }
}

fn plain_component(name: &str) -> Result<&str, StorageError> {
    let invalid = name.trim().is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if invalid {
        return Err(StorageError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(name)
}

#[async_trait]
impl AudioRetriever for LocalAudioStore {
    async fn fetch(&self, file_name: &str, ctx: &RunContext) -> Result<AudioPayload, StorageError> {
        let path = self.path_for(file_name, ctx)?;
        let not_found = || StorageError::NotFound {
            file_name: file_name.to_string(),
        };

        let meta = match tokio::fs::metadata(&path).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(e.into()),
        };
        if !meta.is_file() {
            return Err(not_found());
        }
        if meta.len() > self.max_bytes {
            return Err(StorageError::TooLarge {
                file_name: file_name.to_string(),
                size: meta.len(),
                max: self.max_bytes,
            });
        }

        let bytes = tokio::fs::read(&path).await?;
        if bytes.is_empty() {
            return Err(StorageError::Empty {
                file_name: file_name.to_string(),
            });
        }
        debug!(path = %path.display(), bytes = bytes.len(), "audio loaded");
        Ok(AudioPayload::new(bytes, file_name))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use hark_core::{ChatId, FlowId};

    fn ctx() -> RunContext {
        RunContext::new(FlowId::from("flow-1"), ChatId::from("chat-1"))
    }

    fn store_with(dir: &Path, name: &str, content: &[u8]) -> LocalAudioStore {
        let run_dir = dir.join("flow-1").join("chat-1");
        std::fs::create_dir_all(&run_dir).unwrap();
        std::fs::write(run_dir.join(name), content).unwrap();
        LocalAudioStore::new(dir, 1024)
    }

    #[tokio::test]
    async fn reads_run_scoped_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with(dir.path(), "memo.wav", b"RIFF");
        let audio = store.fetch("memo.wav", &ctx()).await.unwrap();
        assert_eq!(&audio.bytes[..], b"RIFF");
        assert_eq!(audio.file_name, "memo.wav");
        assert_eq!(audio.mime_type(), "audio/wav");
    }

    #[tokio::test]
    async fn other_run_cannot_see_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with(dir.path(), "memo.wav", b"RIFF");
        let other = RunContext::new(FlowId::from("flow-1"), ChatId::from("chat-2"));
        assert_matches!(
            store.fetch("memo.wav", &other).await,
            Err(StorageError::NotFound { file_name }) if file_name == "memo.wav"
        );
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalAudioStore::new(dir.path(), 1024);
        assert_matches!(
            store.fetch("nothing.mp3", &ctx()).await,
            Err(StorageError::NotFound { .. })
        );
    }

    #[tokio::test]
    async fn traversal_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalAudioStore::new(dir.path(), 1024);
        for name in ["../secret.wav", "..", "a/b.wav", "a\\b.wav", ""] {
            assert_matches!(
                store.fetch(name, &ctx()).await,
                Err(StorageError::InvalidName { .. }),
                "{:?} should be rejected",
                name
            );
        }
        let sneaky = RunContext::new(FlowId::from(".."), ChatId::from("chat-1"));
        assert_matches!(
            store.fetch("memo.wav", &sneaky).await,
            Err(StorageError::InvalidName { name }) if name == ".."
        );
    }

    #[tokio::test]
    async fn oversize_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with(dir.path(), "long.wav", &[0u8; 2048]);
        assert_matches!(
            store.fetch("long.wav", &ctx()).await,
            Err(StorageError::TooLarge { size: 2048, max: 1024, .. })
        );
    }

    #[tokio::test]
    async fn empty_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with(dir.path(), "blank.wav", b"");
        assert_matches!(
            store.fetch("blank.wav", &ctx()).await,
            Err(StorageError::Empty { .. })
        );
    }

    #[test]
    fn path_layout() {
        let store = LocalAudioStore::new("/srv/audio", 10);
        assert_eq!(
            store.path_for("a.ogg", &ctx()).unwrap(),
            PathBuf::from("/srv/audio/flow-1/chat-1/a.ogg")
        );
    }
}
